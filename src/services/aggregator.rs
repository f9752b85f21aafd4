//! Streak and chart aggregation over per-day mood statistics.
//!
//! All functions here are pure: they take the merged upstream rows plus an
//! explicit `today` and recompute everything from scratch. Rows whose date
//! does not parse are dropped and reported back in `invalid_dates`.
//! Counts arrive as `u32` per row and are accumulated as `u64`.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Duration, NaiveDate};

use crate::models::activity::{ActivityStatistic, ActivityTotal};
use crate::models::mood::{
    DailyMoodStat, MoodCategory, MoodId, MoodTotal, MostFrequentMood, MOOD_CATEGORIES,
};
use crate::models::streak::{
    ChartData, MonthlyStreak, RollingWindow, SlotStatus, StreakWindowSlot, WeekBucket,
};
use crate::services::calendar::{window_dates, YearMonth};

/// Rows keyed by their parsed date.
struct DayIndex<'a> {
    by_date: BTreeMap<NaiveDate, &'a DailyMoodStat>,
    invalid_dates: Vec<String>,
}

impl<'a> DayIndex<'a> {
    fn build(daily_stats: &'a [DailyMoodStat]) -> Self {
        let mut by_date = BTreeMap::new();
        let mut invalid_dates = Vec::new();

        for stat in daily_stats {
            match stat.parse_date() {
                Ok(date) => {
                    by_date.insert(date, stat);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping statistic row");
                    invalid_dates.push(stat.date.clone());
                }
            }
        }

        Self {
            by_date,
            invalid_dates,
        }
    }

    fn has_records(&self, date: NaiveDate) -> bool {
        self.by_date
            .get(&date)
            .map(|s| s.has_records())
            .unwrap_or(false)
    }

    fn in_month(&self, ym: YearMonth) -> impl Iterator<Item = (NaiveDate, &'a DailyMoodStat)> + '_ {
        self.by_date
            .iter()
            .filter(move |(date, _)| ym.contains(**date))
            .map(|(date, stat)| (*date, *stat))
    }
}

fn empty_mood_totals() -> BTreeMap<MoodId, u64> {
    MOOD_CATEGORIES.iter().map(|m| (m.id, 0)).collect()
}

fn add_mood_counts(totals: &mut BTreeMap<MoodId, u64>, stat: &DailyMoodStat) {
    for mood in &stat.mood_stats {
        *totals.entry(mood.mood_id).or_insert(0) += u64::from(mood.count);
    }
}

/// Last day of `(year, month)` that can carry a record as of `today`.
fn last_countable_day(ym: YearMonth, today: NaiveDate) -> u32 {
    if ym.contains(today) {
        today.day()
    } else if ym > YearMonth::of(today) {
        0
    } else {
        ym.days()
    }
}

/// Longest run of consecutive recorded days inside `(year, month)`, up to
/// today when the month is the current one.
pub fn compute_monthly_streak(
    daily_stats: &[DailyMoodStat],
    year: i32,
    month: u32,
    today: NaiveDate,
) -> MonthlyStreak {
    let index = DayIndex::build(daily_stats);
    let Some(ym) = YearMonth::new(year, month) else {
        return MonthlyStreak {
            longest_streak: 0,
            invalid_dates: index.invalid_dates,
        };
    };

    let last_day = last_countable_day(ym, today);
    let mut recorded = vec![false; last_day as usize + 1];
    for (date, stat) in index.in_month(ym) {
        let day = date.day();
        if day <= last_day && stat.has_records() {
            recorded[day as usize] = true;
        }
    }

    let mut current = 0u32;
    let mut longest = 0u32;
    for day in 1..=last_day as usize {
        current = match (recorded[day], day > 1 && recorded[day - 1]) {
            (true, true) => current + 1,
            (true, false) => 1,
            (false, _) => 0,
        };
        longest = longest.max(current);
    }

    tracing::debug!(year, month, last_day, longest, "Computed monthly streak");

    MonthlyStreak {
        longest_streak: longest,
        invalid_dates: index.invalid_dates,
    }
}

fn classify_slot(date: NaiveDate, today: NaiveDate, recorded: bool) -> SlotStatus {
    if date > today {
        SlotStatus::Empty
    } else if date == today {
        if recorded {
            SlotStatus::Bookmark
        } else {
            SlotStatus::Plus
        }
    } else if recorded {
        SlotStatus::Check
    } else {
        SlotStatus::Plus
    }
}

/// Five-slot window ending today. `daily_stats` must already contain every
/// month the window touches.
pub fn compute_rolling_window(daily_stats: &[DailyMoodStat], today: NaiveDate) -> RollingWindow {
    let index = DayIndex::build(daily_stats);
    let slots = window_dates(today).map(|date| StreakWindowSlot {
        date,
        status: classify_slot(date, today, index.has_records(date)),
    });

    RollingWindow {
        slots,
        invalid_dates: index.invalid_dates,
    }
}

/// The window shown when statistics could not be loaded.
pub fn fallback_window(today: NaiveDate) -> RollingWindow {
    compute_rolling_window(&[], today)
}

/// Per-day and per-mood totals for one month's rows.
pub fn aggregate_chart_data(daily_stats: &[DailyMoodStat], month_length: u32) -> ChartData {
    let index = DayIndex::build(daily_stats);
    let mut per_day_totals = vec![0u64; month_length as usize];
    let mut per_mood_totals = empty_mood_totals();

    for (date, stat) in &index.by_date {
        let day = date.day();
        if day > month_length {
            continue;
        }
        per_day_totals[day as usize - 1] += u64::from(stat.total_records);
        add_mood_counts(&mut per_mood_totals, stat);
    }

    ChartData {
        per_day_totals,
        per_mood_totals,
        invalid_dates: index.invalid_dates,
    }
}

/// Monday-based weeks of `(year, month)`, clipped to the month's edges.
pub fn aggregate_weekly(daily_stats: &[DailyMoodStat], year: i32, month: u32) -> Vec<WeekBucket> {
    let Some(ym) = YearMonth::new(year, month) else {
        return Vec::new();
    };
    let (Some(first), Some(last)) = (ym.first_day(), ym.last_day()) else {
        return Vec::new();
    };

    let mut buckets = Vec::new();
    let mut week_start = first;
    while week_start <= last {
        let to_sunday = 6 - week_start.weekday().num_days_from_monday() as i64;
        let week_end = (week_start + Duration::days(to_sunday)).min(last);
        buckets.push(WeekBucket {
            week_start,
            week_end,
            total_records: 0,
            per_mood_totals: empty_mood_totals(),
        });
        week_start = week_end + Duration::days(1);
    }

    let index = DayIndex::build(daily_stats);
    for (date, stat) in index.in_month(ym) {
        if let Some(bucket) = buckets
            .iter_mut()
            .find(|b| b.week_start <= date && date <= b.week_end)
        {
            bucket.total_records += u64::from(stat.total_records);
            add_mood_counts(&mut bucket.per_mood_totals, stat);
        }
    }

    buckets
}

/// Highest count wins; ties go to the lower mood id.
pub fn most_frequent_mood(per_mood_totals: &BTreeMap<MoodId, u64>) -> Option<MostFrequentMood> {
    let total: u64 = per_mood_totals.values().sum();
    if total == 0 {
        return None;
    }

    // BTreeMap iterates ids ascending, so keep the first maximum seen.
    let (mood_id, count) = per_mood_totals
        .iter()
        .fold(None::<(MoodId, u64)>, |best, (&id, &count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((id, count)),
        })?;

    Some(MostFrequentMood {
        mood_id,
        count,
        percentage: percentage(count, total),
    })
}

/// Known moods with their reference name and color, in id order. Unknown
/// ids stay in the raw totals map only.
pub fn labelled_mood_totals(per_mood_totals: &BTreeMap<MoodId, u64>) -> Vec<MoodTotal> {
    per_mood_totals
        .iter()
        .filter_map(|(&id, &count)| {
            MoodCategory::by_id(id).map(|category| MoodTotal {
                mood_id: id,
                name: category.name,
                color: category.color,
                count,
            })
        })
        .collect()
}

fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 * 1000.0 / total as f64).round() / 10.0
}

/// Activity totals, most frequent first.
pub fn aggregate_activity(statistic: &ActivityStatistic) -> Vec<ActivityTotal> {
    let monthly = &statistic.monthly;
    let totals: HashMap<&str, u64> = monthly
        .activity_data
        .iter()
        .map(|(id, counts)| (id.as_str(), counts.iter().map(|&c| u64::from(c)).sum()))
        .collect();
    let grand_total: u64 = totals.values().sum();

    let mut activities: Vec<ActivityTotal> = totals
        .into_iter()
        .map(|(id, total)| ActivityTotal {
            activity_id: id.to_string(),
            name: monthly
                .activity_names
                .get(id)
                .cloned()
                .unwrap_or_else(|| id.to_string()),
            total,
            percentage: percentage(total, grand_total),
        })
        .collect();

    activities.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.activity_id.cmp(&b.activity_id))
    });
    activities
}

/// Merges per-month batches by calendar date. A date repeated in a later
/// batch replaces the earlier row. Rows with an invalid date are kept after
/// the dated rows so the aggregation steps can report them.
pub fn merge_by_date<I>(batches: I) -> Vec<DailyMoodStat>
where
    I: IntoIterator<Item = Vec<DailyMoodStat>>,
{
    let mut merged: BTreeMap<NaiveDate, DailyMoodStat> = BTreeMap::new();
    let mut undated = Vec::new();
    for batch in batches {
        for stat in batch {
            match stat.parse_date() {
                Ok(date) => {
                    merged.insert(date, stat);
                }
                Err(_) => undated.push(stat),
            }
        }
    }
    merged.into_values().chain(undated).collect()
}

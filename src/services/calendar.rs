//! Calendar arithmetic on local dates.
//!
//! Every day-boundary decision in the crate is made on the local calendar
//! date at an explicit UTC offset. Nothing here reads the ambient clock.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Utc};
use serde::Serialize;

/// Largest accepted UTC offset in either direction (±14h).
pub const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Number of days in the rolling streak window, today included.
pub const WINDOW_DAYS: usize = 5;

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// 28..=31 for a valid month, 0 otherwise.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }


    pub fn days(self) -> u32 {
        days_in_month(self.year, self.month)
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn last_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.days())
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

/// Calendar date at `utc_offset_minutes` east of UTC.
pub fn local_today(now: DateTime<Utc>, utc_offset_minutes: i32) -> Option<NaiveDate> {
    if utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
        return None;
    }
    let offset = FixedOffset::east_opt(utc_offset_minutes * 60)?;
    Some(now.with_timezone(&offset).date_naive())
}

/// `today - 4 ..= today`, oldest first.
pub fn window_dates(today: NaiveDate) -> [NaiveDate; WINDOW_DAYS] {
    let back = |n: i64| today - Duration::days(n);
    [back(4), back(3), back(2), back(1), today]
}

/// Months whose statistics must be loaded to classify the rolling window.
pub fn window_months(today: NaiveDate) -> Vec<YearMonth> {
    let current = YearMonth::of(today);
    if today.day() as usize <= WINDOW_DAYS {
        vec![current.previous(), current]
    } else {
        vec![current]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(days_in_month(2024, 13), 0);
    }

    #[test]
    fn year_month_stepping() {
        let jan = YearMonth::new(2024, 1).unwrap();
        assert_eq!(jan.previous(), YearMonth { year: 2023, month: 12 });
        assert_eq!(jan.previous().previous(), YearMonth { year: 2023, month: 11 });
        assert!(YearMonth::new(2024, 0).is_none());
        assert_eq!(jan.last_day(), Some(d(2024, 1, 31)));
    }

    #[test]
    fn today_depends_on_offset() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 23, 30, 0).unwrap();
        assert_eq!(local_today(now, 0), Some(d(2024, 3, 1)));
        assert_eq!(local_today(now, 9 * 60), Some(d(2024, 3, 2)));
        assert_eq!(local_today(now, -5 * 60), Some(d(2024, 3, 1)));
        assert_eq!(local_today(now, 15 * 60), None);
    }

    #[test]
    fn window_crosses_leap_february() {
        assert_eq!(
            window_dates(d(2024, 3, 2)),
            [d(2024, 2, 27), d(2024, 2, 28), d(2024, 2, 29), d(2024, 3, 1), d(2024, 3, 2)]
        );
    }

    #[test]
    fn window_months_include_previous_early_in_month() {
        let mar = YearMonth { year: 2024, month: 3 };
        assert_eq!(window_months(d(2024, 3, 5)), vec![mar.previous(), mar]);
        assert_eq!(window_months(d(2024, 3, 6)), vec![mar]);
        assert_eq!(
            window_months(d(2024, 1, 2)),
            vec![YearMonth { year: 2023, month: 12 }, YearMonth { year: 2024, month: 1 }]
        );
    }
}

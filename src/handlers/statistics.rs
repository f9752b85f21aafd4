use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::activity::ActivityTotal;
use crate::models::mood::{DailyMoodStat, MoodId, MoodTotal, MostFrequentMood};
use crate::models::streak::{StreakWindowSlot, WeekBucket};
use crate::services::aggregator::{
    aggregate_activity, aggregate_chart_data, aggregate_weekly, compute_monthly_streak,
    compute_rolling_window, fallback_window, labelled_mood_totals, most_frequent_mood,
};
use crate::services::calendar::{local_today, window_months, YearMonth};
use crate::AppState;

/// Shown to the client whenever the statistics API could not be read.
const LOAD_FAILED: &str = "Failed to load statistics";

/// Query shared by every statistics endpoint. Year and month default to the
/// caller's current local month.
#[derive(Debug, Deserialize, Validate)]
pub struct StatsQuery {
    #[validate(range(min = 1970, max = 9999, message = "Year must be 1970-9999"))]
    pub year: Option<i32>,
    #[validate(range(min = 1, max = 12, message = "Month must be 1-12"))]
    pub month: Option<u32>,
    /// IANA name forwarded to the statistics API.
    #[validate(length(min = 1, max = 64))]
    pub timezone: Option<String>,
    /// Minutes east of UTC; decides where "today" begins and ends.
    pub utc_offset_minutes: Option<i32>,
}

struct RequestContext {
    today: NaiveDate,
    month: YearMonth,
    timezone: String,
}

impl StatsQuery {
    fn resolve(&self, state: &AppState) -> AppResult<RequestContext> {
        self.validate()?;

        let offset = self
            .utc_offset_minutes
            .unwrap_or(state.config.default_utc_offset_minutes);
        let today = local_today(state.clock.now(), offset).ok_or_else(|| {
            AppError::Validation("utc_offset_minutes must be between -840 and 840".into())
        })?;

        let current = YearMonth::of(today);
        let month = YearMonth::new(
            self.year.unwrap_or(current.year),
            self.month.unwrap_or(current.month),
        )
        .ok_or_else(|| AppError::Validation("Month must be 1-12".into()))?;

        Ok(RequestContext {
            today,
            month,
            timezone: self
                .timezone
                .clone()
                .unwrap_or_else(|| state.config.default_timezone.clone()),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct StreakResponse {
    pub year: i32,
    pub month: u32,
    pub today: NaiveDate,
    pub longest_streak: u32,
    pub window: Vec<StreakWindowSlot>,
    pub invalid_dates: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MoodChartResponse {
    pub year: i32,
    pub month: u32,
    pub month_length: u32,
    pub per_day_totals: Vec<u64>,
    pub per_mood_totals: BTreeMap<MoodId, u64>,
    pub mood_totals: Vec<MoodTotal>,
    pub weekly: Vec<WeekBucket>,
    pub most_frequent_mood: Option<MostFrequentMood>,
    pub invalid_dates: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    pub year: i32,
    pub month: u32,
    pub total_records: u32,
    pub activities: Vec<ActivityTotal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Rows of the requested month, plus rows whose date could not be parsed so
/// they still get reported.
fn rows_for_month(rows: Vec<DailyMoodStat>, month: YearMonth) -> Vec<DailyMoodStat> {
    rows.into_iter()
        .filter(|r| r.parse_date().map(|d| month.contains(d)).unwrap_or(true))
        .collect()
}

/// Longest streak of the viewed month plus the five-day window ending today.
///
/// The window months and the viewed month are fetched separately so a
/// failure on one side still leaves the other populated.
pub async fn get_streak(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<StreakResponse>> {
    let ctx = query.resolve(&state)?;

    let window_plan = window_months(ctx.today);
    let viewed_elsewhere = !window_plan.contains(&ctx.month);

    let window_fetch = state
        .stats_api
        .fetch_mood_months(auth_user.id, &window_plan, &ctx.timezone);
    let viewed_fetch = async {
        if viewed_elsewhere {
            Some(
                state
                    .stats_api
                    .fetch_mood_month(auth_user.id, ctx.month, &ctx.timezone)
                    .await
                    .map(|statistic| statistic.monthly.daily_mood_stats),
            )
        } else {
            None
        }
    };
    let (window_rows, viewed_rows) = tokio::join!(window_fetch, viewed_fetch);

    let mut error = None;
    let mut invalid_dates = Vec::new();

    let window = match &window_rows {
        Ok(rows) => compute_rolling_window(rows, ctx.today),
        Err(e) => {
            tracing::warn!(user_id = %auth_user.id, error = %e, "Falling back to empty streak window");
            error = Some(LOAD_FAILED.to_string());
            fallback_window(ctx.today)
        }
    };
    invalid_dates.extend(window.invalid_dates);

    let streak_rows = match viewed_rows {
        Some(fetched) => fetched,
        None => window_rows,
    };
    let longest_streak = match streak_rows {
        Ok(rows) => {
            let streak = compute_monthly_streak(&rows, ctx.month.year, ctx.month.month, ctx.today);
            invalid_dates.extend(streak.invalid_dates);
            streak.longest_streak
        }
        Err(e) => {
            if viewed_elsewhere {
                tracing::warn!(user_id = %auth_user.id, error = %e, "Falling back to zero streak");
            }
            error = Some(LOAD_FAILED.to_string());
            0
        }
    };

    invalid_dates.sort();
    invalid_dates.dedup();

    Ok(Json(StreakResponse {
        year: ctx.month.year,
        month: ctx.month.month,
        today: ctx.today,
        longest_streak,
        window: window.slots.to_vec(),
        invalid_dates,
        error,
    }))
}

/// Month chart data: per-day totals, per-mood totals and weekly buckets.
pub async fn get_mood_chart(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<MoodChartResponse>> {
    let ctx = query.resolve(&state)?;
    let month_length = ctx.month.days();

    let (rows, error) = match state
        .stats_api
        .fetch_mood_month(auth_user.id, ctx.month, &ctx.timezone)
        .await
    {
        Ok(statistic) => (
            rows_for_month(statistic.monthly.daily_mood_stats, ctx.month),
            None,
        ),
        Err(e) => {
            tracing::warn!(user_id = %auth_user.id, error = %e, "Falling back to empty mood chart");
            (Vec::new(), Some(LOAD_FAILED.to_string()))
        }
    };

    let chart = aggregate_chart_data(&rows, month_length);
    let weekly = aggregate_weekly(&rows, ctx.month.year, ctx.month.month);
    let most_frequent_mood = most_frequent_mood(&chart.per_mood_totals);
    let mood_totals = labelled_mood_totals(&chart.per_mood_totals);

    Ok(Json(MoodChartResponse {
        year: ctx.month.year,
        month: ctx.month.month,
        month_length,
        per_day_totals: chart.per_day_totals,
        per_mood_totals: chart.per_mood_totals,
        mood_totals,
        weekly,
        most_frequent_mood,
        invalid_dates: chart.invalid_dates,
        error,
    }))
}

/// Activity totals for the month, most frequent first.
pub async fn get_activity_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<ActivityResponse>> {
    let ctx = query.resolve(&state)?;

    let response = match state
        .stats_api
        .fetch_activity_month(auth_user.id, ctx.month, &ctx.timezone)
        .await
    {
        Ok(statistic) => ActivityResponse {
            year: ctx.month.year,
            month: ctx.month.month,
            total_records: statistic.monthly.total_records,
            activities: aggregate_activity(&statistic),
            error: None,
        },
        Err(e) => {
            tracing::warn!(user_id = %auth_user.id, error = %e, "Falling back to empty activity stats");
            ActivityResponse {
                year: ctx.month.year,
                month: ctx.month.month,
                total_records: 0,
                activities: Vec::new(),
                error: Some(LOAD_FAILED.to_string()),
            }
        }
    };

    Ok(Json(response))
}

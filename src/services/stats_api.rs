//! Client for the remote record-statistics API.

use std::time::Duration;

use futures_util::future::try_join_all;
use serde::{de::DeserializeOwned, Deserialize};
use uuid::Uuid;

use crate::error::StatsError;
use crate::models::activity::ActivityStatistic;
use crate::models::mood::{DailyMoodStat, MoodStatistic};
use crate::services::aggregator::merge_by_date;
use crate::services::calendar::YearMonth;

const MOOD_PATH: &str = "/api/v1/records/statistic/mood";
const ACTIVITY_PATH: &str = "/api/v1/records/statistic/activity";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    status_code: u16,
    data: Option<T>,
}

#[derive(Debug, Clone)]
pub struct StatsApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl StatsApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StatsError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get<T: DeserializeOwned + Default>(
        &self,
        path: &str,
        user_id: Uuid,
        ym: YearMonth,
        timezone: &str,
    ) -> Result<T, StatsError> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(&[
                ("user_id", user_id.to_string()),
                ("month", ym.month.to_string()),
                ("year", ym.year.to_string()),
                ("timezone", timezone.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            tracing::warn!(status, path, year = ym.year, month = ym.month, "Statistics API error");
            return Err(StatsError::UpstreamStatus(status));
        }

        let envelope: Envelope<T> = response.json().await?;
        if !(200..300).contains(&envelope.status_code) {
            tracing::warn!(
                status = envelope.status_code,
                path,
                "Statistics API returned error envelope"
            );
            return Err(StatsError::UpstreamStatus(envelope.status_code));
        }

        Ok(envelope.data.unwrap_or_default())
    }

    pub async fn fetch_mood_month(
        &self,
        user_id: Uuid,
        ym: YearMonth,
        timezone: &str,
    ) -> Result<MoodStatistic, StatsError> {
        self.get(MOOD_PATH, user_id, ym, timezone).await
    }

    pub async fn fetch_activity_month(
        &self,
        user_id: Uuid,
        ym: YearMonth,
        timezone: &str,
    ) -> Result<ActivityStatistic, StatsError> {
        self.get(ACTIVITY_PATH, user_id, ym, timezone).await
    }

    /// Loads every distinct month concurrently and merges the monthly
    /// `dailyMoodStats` rows by date. Fails if any month fails.
    pub async fn fetch_mood_months(
        &self,
        user_id: Uuid,
        months: &[YearMonth],
        timezone: &str,
    ) -> Result<Vec<DailyMoodStat>, StatsError> {
        let mut distinct = months.to_vec();
        distinct.sort();
        distinct.dedup();

        tracing::debug!(user_id = %user_id, months = distinct.len(), "Fetching mood statistics");

        let batches = try_join_all(
            distinct
                .iter()
                .map(|ym| self.fetch_mood_month(user_id, *ym, timezone)),
        )
        .await?;

        Ok(merge_by_date(
            batches.into_iter().map(|s| s.monthly.daily_mood_stats),
        ))
    }
}

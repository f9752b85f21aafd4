use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::StatsError;

pub type MoodId = u8;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Static mood category reference. Ids are stable across clients.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct MoodCategory {
    pub id: MoodId,
    pub name: &'static str,
    pub color: &'static str,
}

pub const MOOD_CATEGORIES: [MoodCategory; 5] = [
    MoodCategory { id: 1, name: "Sad", color: "#6B8DD6" },
    MoodCategory { id: 2, name: "Angry", color: "#E5625E" },
    MoodCategory { id: 3, name: "Normal", color: "#A8A8A8" },
    MoodCategory { id: 4, name: "Joyful", color: "#F6C445" },
    MoodCategory { id: 5, name: "Excellent", color: "#5CC98A" },
];

impl MoodCategory {
    pub fn by_id(id: MoodId) -> Option<&'static MoodCategory> {
        MOOD_CATEGORIES.iter().find(|m| m.id == id)
    }
}

/// Month total of one known mood, labelled for chart legends.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MoodTotal {
    pub mood_id: MoodId,
    pub name: &'static str,
    pub color: &'static str,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MoodCount {
    pub mood_id: MoodId,
    pub count: u32,
}

/// One per-date row of the upstream mood statistic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyMoodStat {
    /// `YYYY-MM-DD`, kept raw so malformed rows can be reported instead of
    /// failing the whole response.
    pub date: String,
    #[serde(default)]
    pub mood_stats: Vec<MoodCount>,
    #[serde(default)]
    pub total_records: u32,
}

impl DailyMoodStat {
    /// Only the zero-padded `YYYY-MM-DD` form is accepted; chrono alone
    /// would also take `2024-3-1`.
    pub fn parse_date(&self) -> Result<NaiveDate, StatsError> {
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT)
            .ok()
            .filter(|date| date.format(DATE_FORMAT).to_string() == self.date)
            .ok_or_else(|| StatsError::InvalidDateFormat(self.date.clone()))
    }

    pub fn has_records(&self) -> bool {
        self.total_records > 0
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MostFrequentMood {
    pub mood_id: MoodId,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodStatisticPeriod {
    #[serde(default)]
    pub daily_mood_stats: Vec<DailyMoodStat>,
}

/// Only the monthly period is read; weekly buckets are recomputed locally.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoodStatistic {
    #[serde(default)]
    pub monthly: MoodStatisticPeriod,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_upstream_row() {
        let row: DailyMoodStat = serde_json::from_str(
            r#"{"date":"2024-03-01","moodStats":[{"moodId":4,"count":2}],"totalRecords":2}"#,
        )
        .unwrap();
        assert_eq!(row.mood_stats, vec![MoodCount { mood_id: 4, count: 2 }]);
        assert_eq!(
            row.parse_date().unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }

    #[test]
    fn malformed_date_is_reported() {
        for raw in ["03/01/2024", "2024-3-1", "2024-03-1", " 2024-03-01", "2024-02-30"] {
            let row = DailyMoodStat {
                date: raw.into(),
                mood_stats: vec![],
                total_records: 1,
            };
            assert!(
                matches!(row.parse_date(), Err(StatsError::InvalidDateFormat(ref d)) if d == raw),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn mood_lookup() {
        assert_eq!(MoodCategory::by_id(4).map(|m| m.name), Some("Joyful"));
        assert!(MoodCategory::by_id(9).is_none());
    }
}

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::mood::MoodId;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    /// Date lies after today.
    Empty,
    /// Past day with at least one record.
    Check,
    /// Day without a record yet, today included.
    Plus,
    /// Today, already recorded.
    Bookmark,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StreakWindowSlot {
    pub date: NaiveDate,
    pub status: SlotStatus,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct MonthlyStreak {
    pub longest_streak: u32,
    pub invalid_dates: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RollingWindow {
    pub slots: [StreakWindowSlot; 5],
    pub invalid_dates: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChartData {
    pub per_day_totals: Vec<u64>,
    pub per_mood_totals: BTreeMap<MoodId, u64>,
    pub invalid_dates: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WeekBucket {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub total_records: u64,
    pub per_mood_totals: BTreeMap<MoodId, u64>,
}

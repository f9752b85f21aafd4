use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Monthly activity statistic as returned by the upstream API. Each entry
/// of `activity_data` holds one count per day of the month.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityMonthly {
    #[serde(default)]
    pub activity_data: HashMap<String, Vec<u32>>,
    #[serde(default)]
    pub activity_names: HashMap<String, String>,
    #[serde(default)]
    pub total_records: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityStatistic {
    #[serde(default)]
    pub monthly: ActivityMonthly,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActivityTotal {
    pub activity_id: String,
    pub name: String,
    pub total: u64,
    pub percentage: f64,
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A recurring weekday and start time the caller wants slots on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePreference {
    /// 0 = Sunday .. 6 = Saturday
    pub day_of_week: u8,
    /// 24h HH:MM
    pub time: String,
}

impl SchedulePreference {
    pub fn new(day_of_week: u8, time: impl Into<String>) -> Self {
        Self {
            day_of_week,
            time: time.into(),
        }
    }
}

/// A candidate appointment that has not been persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSlot {
    pub date: NaiveDate,
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
}

/// A generated slot annotated with what the conflict check found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotPreview {
    #[serde(flatten)]
    pub slot: GeneratedSlot,
    pub existing_count: u32,
    pub is_full: bool,
}

/// Knobs on top of the basic generator inputs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Dates on which no slot is produced
    pub closed_dates: BTreeSet<NaiveDate>,
    /// Overrides the default `count * 14` day-scan bound
    pub max_days_scanned: Option<u32>,
}

/// Everything needed to preview a bulk schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    /// First candidate day; tomorrow in the configured timezone when absent
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    pub preferences: Vec<SchedulePreference>,
    pub count: u32,
    pub duration_minutes: u32,
    #[serde(default)]
    pub closed_dates: Vec<NaiveDate>,
}

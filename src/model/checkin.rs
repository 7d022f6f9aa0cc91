use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use super::WorkerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum ReadinessStatus {
    Green,
    Yellow,
    Red,
}

/// One wellbeing check-in. At most one exists per worker per
/// organization-local calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Checkin {
    pub worker_id: WorkerId,
    #[schema(example = "2025-01-06", value_type = String, format = "date")]
    pub date: NaiveDate,
    /// Organization-local submission time, when the source recorded one.
    #[schema(example = "08:42:00", value_type = Option<String>)]
    pub checked_in_at: Option<NaiveTime>,
    #[schema(example = 82.5)]
    pub readiness_score: f64,
    pub readiness_status: ReadinessStatus,
}

/// The four ordinal wellbeing answers, each on a 1..=10 scale.
/// Higher stress is worse; the others are better when higher.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct ReadinessInputs {
    #[schema(example = 7)]
    pub mood: u8,
    #[schema(example = 3)]
    pub stress: u8,
    #[schema(example = 8)]
    pub sleep: u8,
    #[schema(example = 7)]
    pub physical: u8,
}

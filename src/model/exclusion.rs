use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use super::WorkerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExclusionStatus {
    Pending,
    Approved,
    Rejected,
}

/// Approved leave or exemption. `end` is the last excluded day, not the
/// return date.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExclusionPeriod {
    pub worker_id: WorkerId,
    #[schema(example = "2025-01-10", value_type = String, format = "date")]
    pub start: NaiveDate,
    #[schema(example = "2025-01-12", value_type = String, format = "date")]
    pub end: NaiveDate,
    pub status: ExclusionStatus,
}

impl ExclusionPeriod {
    pub fn is_exclusion_eligible(&self) -> bool {
        self.status == ExclusionStatus::Approved && self.start <= self.end
    }
}

/// Why a day carries no attendance expectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ExclusionReason {
    NotStarted,
    Holiday,
    ApprovedLeave,
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use super::WorkerId;
use super::exclusion::ExclusionReason;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum AttendanceStatus {
    /// Present on time, full credit.
    Green,
    /// Present but late, partial credit.
    Yellow,
    /// Expected and missing, counted with zero credit.
    Absent,
    /// Not expected; neither credited nor counted.
    Excused,
}

/// A finalized daily row as written by the check-in / absence flows.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PersistedAttendance {
    pub worker_id: WorkerId,
    #[schema(example = "2025-01-06", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub score: Option<f64>,
    pub is_counted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    /// Copied verbatim from a persisted daily row.
    Persisted,
    /// Derived from a check-in that has no persisted row yet.
    Checkin,
    /// Inferred from the calendar and exclusion rules.
    Inferred,
}

/// One reconstructed work day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DailyRecord {
    #[schema(example = "2025-01-06", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[schema(example = 100.0)]
    pub score: Option<f64>,
    pub is_counted: bool,
    pub reason: Option<ExclusionReason>,
    pub source: RecordSource,
}

impl DailyRecord {
    pub fn persisted(row: &PersistedAttendance) -> Self {
        Self {
            date: row.date,
            status: row.status,
            score: row.score,
            is_counted: row.is_counted,
            reason: None,
            source: RecordSource::Persisted,
        }
    }

    pub fn present(date: NaiveDate, status: AttendanceStatus, score: f64) -> Self {
        Self {
            date,
            status,
            score: Some(score),
            is_counted: true,
            reason: None,
            source: RecordSource::Checkin,
        }
    }

    pub fn excused(date: NaiveDate, reason: ExclusionReason) -> Self {
        Self {
            date,
            status: AttendanceStatus::Excused,
            score: None,
            is_counted: false,
            reason: Some(reason),
            source: RecordSource::Inferred,
        }
    }

    pub fn absent(date: NaiveDate, score: f64) -> Self {
        Self {
            date,
            status: AttendanceStatus::Absent,
            score: Some(score),
            is_counted: true,
            reason: None,
            source: RecordSource::Inferred,
        }
    }
}

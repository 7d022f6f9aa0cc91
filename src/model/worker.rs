use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{TeamId, WorkerId};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Worker {
    pub id: WorkerId,
    pub team_id: TeamId,
    /// No attendance is expected before this date.
    #[schema(example = "2025-01-06", value_type = String, format = "date")]
    pub effective_start: NaiveDate,
    /// Streak counters as last written by the check-in flow. Never trusted
    /// without re-deriving their validity against the calendar.
    pub current_streak: u32,
    pub longest_streak: u32,
    #[schema(example = "2025-01-10", value_type = Option<String>, format = "date")]
    pub last_checkin: Option<NaiveDate>,
}

impl Worker {
    /// Later of the team-join date and the first check-in date.
    /// A worker who never checked in starts on the join date.
    pub fn effective_start_from(joined: NaiveDate, first_checkin: Option<NaiveDate>) -> NaiveDate {
        match first_checkin {
            Some(first) if first > joined => first,
            _ => joined,
        }
    }
}

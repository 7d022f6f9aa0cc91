use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

use crate::model::{OrganizationId, TeamId, WorkerId};

/// Failure reported by a data-access collaborator. The engine never retries;
/// it wraps this and hands it back to the caller.
#[derive(Debug, Error)]
#[error("{operation} failed: {detail}")]
pub struct SourceError {
    pub operation: &'static str,
    pub detail: String,
}

impl SourceError {
    pub fn new(operation: &'static str, err: impl fmt::Display) -> Self {
        Self {
            operation,
            detail: err.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid range {start}..={end}: {reason}")]
    InvalidRange {
        start: NaiveDate,
        end: NaiveDate,
        reason: String,
    },

    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    InvalidDateKey(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown timezone `{0}`")]
    InvalidTimezone(String),

    #[error("worker {0} not found")]
    UnknownWorker(WorkerId),

    #[error("team {0} not found")]
    UnknownTeam(TeamId),

    #[error("organization {0} not found")]
    UnknownOrganization(OrganizationId),

    #[error(transparent)]
    Upstream(#[from] SourceError),
}

pub type EngineResult<T> = Result<T, EngineError>;

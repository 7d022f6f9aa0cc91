use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use super::calendar::DateRange;
use super::error::SourceError;
use crate::model::attendance::PersistedAttendance;
use crate::model::checkin::Checkin;
use crate::model::exclusion::ExclusionPeriod;
use crate::model::organization::Organization;
use crate::model::team::Team;
use crate::model::worker::Worker;
use crate::model::{OrganizationId, TeamId, WorkerId};

/// Read-only collaborator the engine pulls its inputs from.
///
/// Every list fetch covers all requested workers and the whole range in one
/// call; the engine never asks per day or per worker.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch_worker(&self, worker_id: WorkerId) -> Result<Option<Worker>, SourceError>;

    async fn fetch_team(&self, team_id: TeamId) -> Result<Option<Team>, SourceError>;

    async fn fetch_team_members(&self, team_id: TeamId) -> Result<Vec<Worker>, SourceError>;

    async fn fetch_organization(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Option<Organization>, SourceError>;

    async fn fetch_checkins(
        &self,
        worker_ids: &[WorkerId],
        range: DateRange,
    ) -> Result<Vec<Checkin>, SourceError>;

    /// Approved periods overlapping `range`.
    async fn fetch_approved_exclusions(
        &self,
        worker_ids: &[WorkerId],
        range: DateRange,
    ) -> Result<Vec<ExclusionPeriod>, SourceError>;

    async fn fetch_holidays(
        &self,
        organization_id: OrganizationId,
        range: DateRange,
    ) -> Result<Vec<NaiveDate>, SourceError>;

    async fn fetch_persisted_attendance(
        &self,
        worker_ids: &[WorkerId],
        range: DateRange,
    ) -> Result<Vec<PersistedAttendance>, SourceError>;
}

/// Source of "now". Injected so that "today" is never implicit.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

//! In-memory collaborators for engine and handler tests.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::calendar::DateRange;
use super::error::SourceError;
use super::source::{Clock, DataSource};
use super::Engine;
use crate::config::EngineConfig;
use crate::model::attendance::{AttendanceStatus, PersistedAttendance};
use crate::model::checkin::Checkin;
use crate::model::exclusion::{ExclusionPeriod, ExclusionStatus};
use crate::model::organization::{Holiday, Organization};
use crate::model::team::{Team, WorkDays};
use crate::model::worker::Worker;
use crate::model::{OrganizationId, TeamId, WorkerId};

pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Default)]
pub struct FakeSource {
    pub organizations: Vec<Organization>,
    pub teams: Vec<Team>,
    pub workers: Vec<Worker>,
    pub checkins: Vec<Checkin>,
    pub exclusions: Vec<ExclusionPeriod>,
    pub holidays: Vec<Holiday>,
    pub persisted: Vec<PersistedAttendance>,
    /// Operation name that should fail, e.g. `"fetch_checkins"`.
    pub failing: Option<&'static str>,
    calls: AtomicUsize,
}

impl FakeSource {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self, operation: &'static str) -> Result<(), SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failing {
            Some(failing) if failing == operation => {
                Err(SourceError::new(operation, "connection reset"))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl DataSource for FakeSource {
    async fn fetch_worker(&self, worker_id: WorkerId) -> Result<Option<Worker>, SourceError> {
        self.enter("fetch_worker")?;
        Ok(self.workers.iter().find(|w| w.id == worker_id).cloned())
    }

    async fn fetch_team(&self, team_id: TeamId) -> Result<Option<Team>, SourceError> {
        self.enter("fetch_team")?;
        Ok(self.teams.iter().find(|t| t.id == team_id).cloned())
    }

    async fn fetch_team_members(&self, team_id: TeamId) -> Result<Vec<Worker>, SourceError> {
        self.enter("fetch_team_members")?;
        Ok(self
            .workers
            .iter()
            .filter(|w| w.team_id == team_id)
            .cloned()
            .collect())
    }

    async fn fetch_organization(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Option<Organization>, SourceError> {
        self.enter("fetch_organization")?;
        Ok(self
            .organizations
            .iter()
            .find(|o| o.id == organization_id)
            .cloned())
    }

    async fn fetch_checkins(
        &self,
        worker_ids: &[WorkerId],
        range: DateRange,
    ) -> Result<Vec<Checkin>, SourceError> {
        self.enter("fetch_checkins")?;
        Ok(self
            .checkins
            .iter()
            .filter(|c| worker_ids.contains(&c.worker_id) && range.contains(c.date))
            .cloned()
            .collect())
    }

    async fn fetch_approved_exclusions(
        &self,
        worker_ids: &[WorkerId],
        range: DateRange,
    ) -> Result<Vec<ExclusionPeriod>, SourceError> {
        self.enter("fetch_approved_exclusions")?;
        Ok(self
            .exclusions
            .iter()
            .filter(|p| {
                worker_ids.contains(&p.worker_id)
                    && p.status == ExclusionStatus::Approved
                    && p.start <= range.end()
                    && p.end >= range.start()
            })
            .cloned()
            .collect())
    }

    async fn fetch_holidays(
        &self,
        organization_id: OrganizationId,
        range: DateRange,
    ) -> Result<Vec<NaiveDate>, SourceError> {
        self.enter("fetch_holidays")?;
        Ok(self
            .holidays
            .iter()
            .filter(|h| h.organization_id == organization_id && range.contains(h.date))
            .map(|h| h.date)
            .collect())
    }

    async fn fetch_persisted_attendance(
        &self,
        worker_ids: &[WorkerId],
        range: DateRange,
    ) -> Result<Vec<PersistedAttendance>, SourceError> {
        self.enter("fetch_persisted_attendance")?;
        Ok(self
            .persisted
            .iter()
            .filter(|r| worker_ids.contains(&r.worker_id) && range.contains(r.date))
            .cloned()
            .collect())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn worker(id: WorkerId, team_id: TeamId, effective_start: NaiveDate) -> Worker {
    Worker {
        id,
        team_id,
        effective_start,
        current_streak: 0,
        longest_streak: 0,
        last_checkin: None,
    }
}

pub fn checkin(worker_id: WorkerId, date: NaiveDate, at: NaiveTime, score: f64) -> Checkin {
    Checkin {
        worker_id,
        date,
        checked_in_at: Some(at),
        readiness_score: score,
        readiness_status: super::readiness::status_for(score),
    }
}

/// 2025-01-13 08:30 in Manila.
pub fn manila_monday() -> DateTime<Utc> {
    "2025-01-13T00:30:00Z".parse().unwrap()
}

/// Worker 1 on team 10 in Manila, week of 2025-01-06: persisted GREEN on
/// Monday, nothing on Tuesday, a check-in on Wednesday, a holiday on
/// Thursday and a day of approved leave on Friday.
pub fn manila_week() -> FakeSource {
    FakeSource {
        organizations: vec![Organization {
            id: 100,
            timezone: "Asia/Manila".to_string(),
        }],
        teams: vec![Team {
            id: 10,
            organization_id: 100,
            work_days: WorkDays::MON_FRI,
            shift_start: time(8, 0),
            shift_end: time(17, 0),
        }],
        workers: vec![worker(1, 10, date(2025, 1, 6))],
        persisted: vec![PersistedAttendance {
            worker_id: 1,
            date: date(2025, 1, 6),
            status: AttendanceStatus::Green,
            score: Some(100.0),
            is_counted: true,
        }],
        checkins: vec![checkin(1, date(2025, 1, 8), time(7, 55), 78.0)],
        holidays: vec![Holiday {
            organization_id: 100,
            date: date(2025, 1, 9),
            name: Some("Feast day".to_string()),
        }],
        exclusions: vec![ExclusionPeriod {
            worker_id: 1,
            start: date(2025, 1, 10),
            end: date(2025, 1, 10),
            status: ExclusionStatus::Approved,
        }],
        ..FakeSource::default()
    }
}

pub fn engine_with(source: FakeSource, now: DateTime<Utc>) -> (Engine, Arc<FakeSource>) {
    let source = Arc::new(source);
    let engine = Engine::new(
        source.clone(),
        Arc::new(FixedClock(now)),
        EngineConfig::default(),
    );
    (engine, source)
}


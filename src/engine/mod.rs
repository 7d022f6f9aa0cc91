//! Compliance & readiness calculation engine.
//!
//! Read-only and stateless between calls: each operation fetches what it
//! needs from a [`DataSource`] in one batch per entity type, then computes
//! in memory. Nothing is written back.

pub mod anomaly;
pub mod attendance;
pub mod calendar;
pub mod error;
pub mod exclusion;
pub mod readiness;
pub mod scoring;
pub mod source;
pub mod streak;

#[cfg(test)]
pub mod testing;

pub use error::{EngineError, EngineResult};

use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;
use futures::TryFutureExt;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

use self::anomaly::{Anomaly, AnomalyThresholds, evaluate_worker};
use self::attendance::{AttendancePolicy, WorkerDays};
use self::calendar::{
    DateRange, count_work_days, date_key, end_of_day, format_date_key, is_work_day, parse_date_key,
    parse_tz, start_of_day,
};
use self::exclusion::ExclusionIndex;
use self::scoring::{
    AttendanceBreakdown, BlendWeights, Grade, TeamDays, blend, mean_readiness, round1,
    score_records,
};
use self::source::{Clock, DataSource};
use self::streak::{StreakSummary, streaks_from_history, validate_stored};
use crate::config::EngineConfig;
use crate::model::attendance::DailyRecord;
use crate::model::team::Team;
use crate::model::worker::Worker;
use crate::model::{OrganizationId, TeamId, WorkerId};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PerformanceReport {
    pub worker_id: WorkerId,
    #[schema(example = "2025-01-06", value_type = String, format = "date")]
    pub start: NaiveDate,
    #[schema(example = "2025-01-10", value_type = String, format = "date")]
    pub end: NaiveDate,
    #[schema(example = 66.7)]
    pub score: f64,
    pub grade: Grade,
    #[schema(example = 66.7)]
    pub compliance_rate: f64,
    pub breakdown: AttendanceBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TeamGrade {
    pub team_id: TeamId,
    #[schema(example = "2025-01-06", value_type = String, format = "date")]
    pub start: NaiveDate,
    #[schema(example = "2025-01-10", value_type = String, format = "date")]
    pub end: NaiveDate,
    /// Blended score, whole percent.
    #[schema(example = 86.0)]
    pub score: f64,
    pub grade: Grade,
    #[schema(example = 80.0)]
    pub avg_readiness: f64,
    #[schema(example = 95.0)]
    pub compliance_rate: f64,
    pub members: u32,
    /// Work days of the range that are not organization holidays.
    pub scheduled_days: u32,
    pub days_evaluated: u32,
    pub expected_member_days: u32,
    pub checked_in_member_days: u32,
}

struct WorkerScope {
    worker: Worker,
    team: Team,
    tz: Tz,
}

struct TeamScope {
    team: Team,
    tz: Tz,
    members: Vec<Worker>,
}

pub struct Engine {
    source: Arc<dyn DataSource>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(source: Arc<dyn DataSource>, clock: Arc<dyn Clock>, config: EngineConfig) -> Self {
        Self {
            source,
            clock,
            config,
        }
    }

    /// Parses boundary date keys and validates the span. Runs before any
    /// fetch.
    pub fn date_range(&self, start: &str, end: &str) -> EngineResult<DateRange> {
        DateRange::new(
            parse_date_key(start)?,
            parse_date_key(end)?,
            self.config.max_range_days,
        )
    }

    fn check_range(&self, range: DateRange) -> EngineResult<()> {
        DateRange::new(range.start(), range.end(), self.config.max_range_days).map(|_| ())
    }

    fn today(&self, tz: Tz) -> NaiveDate {
        date_key(self.clock.now(), tz)
    }

    fn policy(&self) -> AttendancePolicy {
        AttendancePolicy::from_config(&self.config)
    }

    async fn organization_tz(&self, organization_id: OrganizationId) -> EngineResult<Tz> {
        let organization = self
            .source
            .fetch_organization(organization_id)
            .await?
            .ok_or(EngineError::UnknownOrganization(organization_id))?;
        parse_tz(&organization.timezone)
    }

    async fn worker_scope(&self, worker_id: WorkerId) -> EngineResult<WorkerScope> {
        let worker = self
            .source
            .fetch_worker(worker_id)
            .await?
            .ok_or(EngineError::UnknownWorker(worker_id))?;
        let team = self
            .source
            .fetch_team(worker.team_id)
            .await?
            .ok_or(EngineError::UnknownTeam(worker.team_id))?;
        let tz = self.organization_tz(team.organization_id).await?;
        Ok(WorkerScope { worker, team, tz })
    }

    async fn team_scope(&self, team_id: TeamId) -> EngineResult<TeamScope> {
        let team = self
            .source
            .fetch_team(team_id)
            .await?
            .ok_or(EngineError::UnknownTeam(team_id))?;
        let (tz, mut members) = futures::try_join!(
            self.organization_tz(team.organization_id),
            self.source.fetch_team_members(team_id).map_err(EngineError::from),
        )?;
        members.sort_by_key(|m| m.id);
        members.dedup_by_key(|m| m.id);
        Ok(TeamScope { team, tz, members })
    }

    async fn exclusions_for(
        &self,
        organization_id: OrganizationId,
        workers: &[Worker],
        range: DateRange,
    ) -> EngineResult<ExclusionIndex> {
        let ids: Vec<WorkerId> = workers.iter().map(|w| w.id).collect();
        let (holidays, periods) = futures::try_join!(
            self.source.fetch_holidays(organization_id, range),
            self.source.fetch_approved_exclusions(&ids, range),
        )?;
        Ok(ExclusionIndex::build(holidays, workers, &periods))
    }

    async fn reconstruct_scoped(
        &self,
        scope: &WorkerScope,
        range: DateRange,
    ) -> EngineResult<Vec<DailyRecord>> {
        let worker_id = scope.worker.id;
        let ids = [worker_id];
        let worker = std::slice::from_ref(&scope.worker);
        let (exclusions, persisted, checkins) = futures::try_join!(
            self.exclusions_for(scope.team.organization_id, worker, range),
            self.source.fetch_persisted_attendance(&ids, range).map_err(EngineError::from),
            self.source.fetch_checkins(&ids, range).map_err(EngineError::from),
        )?;

        let persisted: HashMap<_, _> = persisted
            .into_iter()
            .filter(|row| row.worker_id == worker_id)
            .map(|row| (row.date, row))
            .collect();
        let checkins: HashMap<_, _> = checkins
            .into_iter()
            .filter(|c| c.worker_id == worker_id)
            .map(|c| (c.date, c))
            .collect();

        let days = WorkerDays {
            worker: &scope.worker,
            team: &scope.team,
            today: self.today(scope.tz),
            exclusions: &exclusions,
            persisted: &persisted,
            checkins: &checkins,
        };
        Ok(days.reconstruct(range, &self.policy()))
    }

    /// Every scheduled work day of `range` that has a decidable status.
    #[instrument(skip(self))]
    pub async fn reconstruct_attendance(
        &self,
        worker_id: WorkerId,
        range: DateRange,
    ) -> EngineResult<Vec<DailyRecord>> {
        self.check_range(range)?;
        let scope = self.worker_scope(worker_id).await?;
        self.reconstruct_scoped(&scope, range).await
    }

    #[instrument(skip(self))]
    pub async fn compute_performance(
        &self,
        worker_id: WorkerId,
        range: DateRange,
    ) -> EngineResult<PerformanceReport> {
        let records = self.reconstruct_attendance(worker_id, range).await?;
        let performance = score_records(&records);
        if performance.breakdown.counted_days == 0 {
            debug!(worker_id, "no counted days in range, scoring 0");
        }
        Ok(PerformanceReport {
            worker_id,
            start: range.start(),
            end: range.end(),
            score: performance.score,
            grade: performance.grade,
            compliance_rate: performance.compliance_rate,
            breakdown: performance.breakdown,
        })
    }

    /// Blend of mean check-in readiness and mean daily compliance over the
    /// work days of `range` that are already in the past.
    #[instrument(skip(self))]
    pub async fn compute_team_grade(
        &self,
        team_id: TeamId,
        range: DateRange,
    ) -> EngineResult<TeamGrade> {
        self.check_range(range)?;
        let scope = self.team_scope(team_id).await?;
        let today = self.today(scope.tz);
        let ids: Vec<WorkerId> = scope.members.iter().map(|m| m.id).collect();

        let (exclusions, persisted, checkins) = futures::try_join!(
            self.exclusions_for(scope.team.organization_id, &scope.members, range),
            self.source.fetch_persisted_attendance(&ids, range).map_err(EngineError::from),
            self.source.fetch_checkins(&ids, range).map_err(EngineError::from),
        )?;
        let member_ids: HashSet<WorkerId> = ids.iter().copied().collect();
        let checkins: Vec<_> = checkins
            .into_iter()
            .filter(|c| member_ids.contains(&c.worker_id) && range.contains(c.date))
            .collect();
        let persisted: HashMap<_, _> = persisted
            .into_iter()
            .filter(|row| member_ids.contains(&row.worker_id))
            .map(|row| ((row.worker_id, row.date), row))
            .collect();

        let avg_readiness = mean_readiness(&checkins);
        let checked_in: HashSet<(WorkerId, NaiveDate)> =
            checkins.iter().map(|c| (c.worker_id, c.date)).collect();
        let work_days = scope.team.work_days;
        let team_days = TeamDays {
            members: &scope.members,
            exclusions: &exclusions,
            persisted: &persisted,
            checked_in: &checked_in,
        };
        let days = range
            .days()
            .filter(|day| *day < today && is_work_day(*day, work_days));
        let tally = team_days.compliance(days);
        if tally.days_evaluated == 0 {
            debug!(team_id, "no expected member-days in range, compliance 0");
        }

        let weights = BlendWeights {
            readiness: self.config.readiness_weight,
            compliance: self.config.compliance_weight,
        };
        let (score, grade) = blend(avg_readiness, tally.rate, weights);

        Ok(TeamGrade {
            team_id,
            start: range.start(),
            end: range.end(),
            score,
            grade,
            avg_readiness: round1(avg_readiness),
            compliance_rate: round1(tally.rate),
            members: scope.members.len() as u32,
            scheduled_days: count_work_days(range, work_days, Some(exclusions.holidays())),
            days_evaluated: tally.days_evaluated,
            expected_member_days: tally.expected_member_days,
            checked_in_member_days: tally.checked_in_member_days,
        })
    }

    /// Validity-checked view of the stored streak counters.
    #[instrument(skip(self))]
    pub async fn derive_streak(&self, worker_id: WorkerId) -> EngineResult<StreakSummary> {
        let scope = self.worker_scope(worker_id).await?;
        let today = self.today(scope.tz);
        let worker = &scope.worker;

        // only a gap of two or more days can contain a breaking work day
        let gap = worker.last_checkin.and_then(|last| {
            DateRange::spanning(last + Duration::days(1), today - Duration::days(1))
        });
        let exclusions = match gap {
            Some(gap) => {
                self.exclusions_for(scope.team.organization_id, std::slice::from_ref(worker), gap)
                    .await?
            }
            None => ExclusionIndex::default(),
        };

        Ok(validate_stored(
            worker.current_streak,
            worker.longest_streak,
            worker.last_checkin,
            today,
            scope.team.work_days,
            |day| exclusions.is_excluded(worker.id, day),
        ))
    }

    /// Streaks recomputed from the check-ins inside `range`.
    #[instrument(skip(self))]
    pub async fn streak_history(
        &self,
        worker_id: WorkerId,
        range: DateRange,
    ) -> EngineResult<StreakSummary> {
        self.check_range(range)?;
        let scope = self.worker_scope(worker_id).await?;
        let today = self.today(scope.tz);
        let ids = [worker_id];
        // exclusions must also cover the stretch from the range to today
        let covered = DateRange::spanning(range.start(), range.end().max(today)).unwrap_or(range);

        let worker = std::slice::from_ref(&scope.worker);
        let (exclusions, checkins) = futures::try_join!(
            self.exclusions_for(scope.team.organization_id, worker, covered),
            self.source.fetch_checkins(&ids, range).map_err(EngineError::from),
        )?;
        let dates: Vec<NaiveDate> = checkins
            .iter()
            .filter(|c| c.worker_id == worker_id && range.contains(c.date))
            .map(|c| c.date)
            .collect();

        Ok(streaks_from_history(&dates, today, scope.team.work_days, |day| {
            exclusions.is_excluded(worker_id, day)
        }))
    }

    /// Workers whose score on `as_of` (default: today) fell against their
    /// own trailing baseline, most severe first.
    #[instrument(skip(self))]
    pub async fn detect_anomalies(
        &self,
        team_id: TeamId,
        as_of: Option<NaiveDate>,
    ) -> EngineResult<Vec<Anomaly>> {
        let scope = self.team_scope(team_id).await?;
        let as_of = as_of.unwrap_or_else(|| self.today(scope.tz));
        let window_start = as_of - Duration::days(i64::from(self.config.anomaly_window_days));
        let window = DateRange::spanning(window_start, as_of).unwrap_or(DateRange::single(as_of));
        let ids: Vec<WorkerId> = scope.members.iter().map(|m| m.id).collect();
        debug!(
            team_id,
            as_of = %format_date_key(as_of),
            from = %start_of_day(window.start(), scope.tz),
            until = %end_of_day(as_of, scope.tz),
            "evaluating readiness window"
        );

        let checkins = self.source.fetch_checkins(&ids, window).await?;

        let mut by_worker: BTreeMap<WorkerId, (Option<f64>, Vec<f64>)> =
            ids.iter().map(|id| (*id, (None, Vec::new()))).collect();
        for checkin in checkins.iter().filter(|c| window.contains(c.date)) {
            let Some((today_score, history)) = by_worker.get_mut(&checkin.worker_id) else {
                continue;
            };
            if checkin.date == as_of {
                *today_score = Some(checkin.readiness_score);
            } else {
                history.push(checkin.readiness_score);
            }
        }

        let thresholds = AnomalyThresholds::from_config(&self.config);
        let mut anomalies: Vec<Anomaly> = by_worker
            .into_iter()
            .filter_map(|(worker_id, (today_score, history))| {
                evaluate_worker(worker_id, as_of, today_score?, &history, &thresholds)
            })
            .collect();
        anomalies.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then(b.drop.total_cmp(&a.drop))
                .then(a.worker_id.cmp(&b.worker_id))
        });
        Ok(anomalies)
    }
}

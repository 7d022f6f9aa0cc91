use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use moka::future::Cache;
use sqlx::{FromRow, MySqlPool};
use std::str::FromStr;
use std::time::Duration;

use crate::config::Config;
use crate::engine::calendar::DateRange;
use crate::engine::error::SourceError;
use crate::engine::source::DataSource;
use crate::model::attendance::{AttendanceStatus, PersistedAttendance};
use crate::model::checkin::{Checkin, ReadinessStatus};
use crate::model::exclusion::{ExclusionPeriod, ExclusionStatus};
use crate::model::organization::{Holiday, Organization};
use crate::model::team::Team;
use crate::model::worker::Worker;
use crate::model::{OrganizationId, TeamId, WorkerId};

/// MySQL-backed [`DataSource`]. Organization and team metadata changes
/// rarely and is cached; everything per worker and per day is read fresh.
pub struct MySqlDataSource {
    pool: MySqlPool,
    organizations: Cache<OrganizationId, Organization>,
    teams: Cache<TeamId, Team>,
}

impl MySqlDataSource {
    pub fn new(pool: MySqlPool, config: &Config) -> Self {
        let ttl = Duration::from_secs(config.meta_cache_ttl_secs);
        Self {
            pool,
            organizations: Cache::builder()
                .max_capacity(config.meta_cache_capacity)
                .time_to_live(ttl)
                .build(),
            teams: Cache::builder()
                .max_capacity(config.meta_cache_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }
}

/* =========================
Row types
========================= */

const WORKER_COLUMNS: &str = r#"
    w.id, w.team_id, w.joined_on, w.current_streak, w.longest_streak, w.last_checkin_date,
    (SELECT MIN(c.checkin_date) FROM checkins c WHERE c.worker_id = w.id) AS first_checkin
"#;

#[derive(Debug, FromRow)]
struct WorkerRow {
    id: u64,
    team_id: u64,
    joined_on: NaiveDate,
    current_streak: u32,
    longest_streak: u32,
    last_checkin_date: Option<NaiveDate>,
    first_checkin: Option<NaiveDate>,
}

impl From<WorkerRow> for Worker {
    fn from(row: WorkerRow) -> Self {
        Worker {
            id: row.id,
            team_id: row.team_id,
            effective_start: Worker::effective_start_from(row.joined_on, row.first_checkin),
            current_streak: row.current_streak,
            longest_streak: row.longest_streak,
            last_checkin: row.last_checkin_date,
        }
    }
}

#[derive(Debug, FromRow)]
struct TeamRow {
    id: u64,
    organization_id: u64,
    work_days: String,
    shift_start: NaiveTime,
    shift_end: NaiveTime,
}

impl TryFrom<TeamRow> for Team {
    type Error = SourceError;

    fn try_from(row: TeamRow) -> Result<Self, Self::Error> {
        Ok(Team {
            id: row.id,
            organization_id: row.organization_id,
            work_days: parse_column("fetch_team", &row.work_days)?,
            shift_start: row.shift_start,
            shift_end: row.shift_end,
        })
    }
}

#[derive(Debug, FromRow)]
struct OrganizationRow {
    id: u64,
    timezone: String,
}

#[derive(Debug, FromRow)]
struct CheckinRow {
    worker_id: u64,
    checkin_date: NaiveDate,
    checked_in_at: Option<NaiveTime>,
    readiness_score: f64,
    readiness_status: String,
}

impl TryFrom<CheckinRow> for Checkin {
    type Error = SourceError;

    fn try_from(row: CheckinRow) -> Result<Self, Self::Error> {
        Ok(Checkin {
            worker_id: row.worker_id,
            date: row.checkin_date,
            checked_in_at: row.checked_in_at,
            readiness_score: row.readiness_score,
            readiness_status: parse_column::<ReadinessStatus>(
                "fetch_checkins",
                &row.readiness_status,
            )?,
        })
    }
}

#[derive(Debug, FromRow)]
struct ExclusionRow {
    worker_id: u64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    status: String,
}

impl TryFrom<ExclusionRow> for ExclusionPeriod {
    type Error = SourceError;

    fn try_from(row: ExclusionRow) -> Result<Self, Self::Error> {
        Ok(ExclusionPeriod {
            worker_id: row.worker_id,
            start: row.start_date,
            end: row.end_date,
            status: parse_column::<ExclusionStatus>("fetch_approved_exclusions", &row.status)?,
        })
    }
}

#[derive(Debug, FromRow)]
struct AttendanceRow {
    worker_id: u64,
    attendance_date: NaiveDate,
    status: String,
    score: Option<f64>,
    is_counted: bool,
}

impl TryFrom<AttendanceRow> for PersistedAttendance {
    type Error = SourceError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        Ok(PersistedAttendance {
            worker_id: row.worker_id,
            date: row.attendance_date,
            status: parse_column::<AttendanceStatus>("fetch_persisted_attendance", &row.status)?,
            score: row.score,
            is_counted: row.is_counted,
        })
    }
}

fn parse_column<T>(operation: &'static str, raw: &str) -> Result<T, SourceError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| SourceError::new(operation, format!("bad column value `{raw}`: {e}")))
}

/// `?, ?, ?` for an `IN (...)` list.
fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, SourceError>
where
    T: TryFrom<R, Error = SourceError>,
{
    rows.into_iter().map(T::try_from).collect()
}

/* =========================
DataSource
========================= */

#[async_trait]
impl DataSource for MySqlDataSource {
    async fn fetch_worker(&self, worker_id: WorkerId) -> Result<Option<Worker>, SourceError> {
        let sql = format!("SELECT {WORKER_COLUMNS} FROM workers w WHERE w.id = ?");
        let row = sqlx::query_as::<_, WorkerRow>(&sql)
            .bind(worker_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| SourceError::new("fetch_worker", e))?;
        Ok(row.map(Worker::from))
    }

    async fn fetch_team(&self, team_id: TeamId) -> Result<Option<Team>, SourceError> {
        if let Some(team) = self.teams.get(&team_id).await {
            return Ok(Some(team));
        }
        let row = sqlx::query_as::<_, TeamRow>(
            r#"
            SELECT id, organization_id, work_days, shift_start, shift_end
            FROM teams
            WHERE id = ?
            "#,
        )
        .bind(team_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SourceError::new("fetch_team", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let team = Team::try_from(row)?;
        self.teams.insert(team_id, team.clone()).await;
        Ok(Some(team))
    }

    async fn fetch_team_members(&self, team_id: TeamId) -> Result<Vec<Worker>, SourceError> {
        let sql =
            format!("SELECT {WORKER_COLUMNS} FROM workers w WHERE w.team_id = ? ORDER BY w.id");
        let rows = sqlx::query_as::<_, WorkerRow>(&sql)
            .bind(team_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SourceError::new("fetch_team_members", e))?;
        Ok(rows.into_iter().map(Worker::from).collect())
    }

    async fn fetch_organization(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Option<Organization>, SourceError> {
        if let Some(organization) = self.organizations.get(&organization_id).await {
            return Ok(Some(organization));
        }
        let row = sqlx::query_as::<_, OrganizationRow>(
            "SELECT id, timezone FROM organizations WHERE id = ?",
        )
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SourceError::new("fetch_organization", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let organization = Organization {
            id: row.id,
            timezone: row.timezone,
        };
        self.organizations
            .insert(organization_id, organization.clone())
            .await;
        Ok(Some(organization))
    }

    async fn fetch_checkins(
        &self,
        worker_ids: &[WorkerId],
        range: DateRange,
    ) -> Result<Vec<Checkin>, SourceError> {
        if worker_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            r#"
            SELECT worker_id, checkin_date, checked_in_at, readiness_score, readiness_status
            FROM checkins
            WHERE worker_id IN ({}) AND checkin_date BETWEEN ? AND ?
            ORDER BY worker_id, checkin_date
            "#,
            placeholders(worker_ids.len())
        );
        let mut query = sqlx::query_as::<_, CheckinRow>(&sql);
        for id in worker_ids {
            query = query.bind(*id);
        }
        let rows = query
            .bind(range.start())
            .bind(range.end())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SourceError::new("fetch_checkins", e))?;
        convert_all(rows)
    }

    async fn fetch_approved_exclusions(
        &self,
        worker_ids: &[WorkerId],
        range: DateRange,
    ) -> Result<Vec<ExclusionPeriod>, SourceError> {
        if worker_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            r#"
            SELECT worker_id, start_date, end_date, status
            FROM exclusion_periods
            WHERE worker_id IN ({})
              AND status = 'approved'
              AND start_date <= ? AND end_date >= ?
            ORDER BY worker_id, start_date
            "#,
            placeholders(worker_ids.len())
        );
        let mut query = sqlx::query_as::<_, ExclusionRow>(&sql);
        for id in worker_ids {
            query = query.bind(*id);
        }
        let rows = query
            .bind(range.end())
            .bind(range.start())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SourceError::new("fetch_approved_exclusions", e))?;
        convert_all(rows)
    }

    async fn fetch_holidays(
        &self,
        organization_id: OrganizationId,
        range: DateRange,
    ) -> Result<Vec<NaiveDate>, SourceError> {
        let rows = sqlx::query_as::<_, Holiday>(
            r#"
            SELECT organization_id, holiday_date, name
            FROM holidays
            WHERE organization_id = ? AND holiday_date BETWEEN ? AND ?
            ORDER BY holiday_date
            "#,
        )
        .bind(organization_id)
        .bind(range.start())
        .bind(range.end())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SourceError::new("fetch_holidays", e))?;
        Ok(rows.into_iter().map(|holiday| holiday.date).collect())
    }

    async fn fetch_persisted_attendance(
        &self,
        worker_ids: &[WorkerId],
        range: DateRange,
    ) -> Result<Vec<PersistedAttendance>, SourceError> {
        if worker_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            r#"
            SELECT worker_id, attendance_date, status, score, is_counted
            FROM daily_attendance
            WHERE worker_id IN ({}) AND attendance_date BETWEEN ? AND ?
            ORDER BY worker_id, attendance_date
            "#,
            placeholders(worker_ids.len())
        );
        let mut query = sqlx::query_as::<_, AttendanceRow>(&sql);
        for id in worker_ids {
            query = query.bind(*id);
        }
        let rows = query
            .bind(range.start())
            .bind(range.end())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SourceError::new("fetch_persisted_attendance", e))?;
        convert_all(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::team::WorkDays;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn placeholders_match_bind_count() {
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?, ?, ?");
    }

    #[test]
    fn worker_row_uses_first_checkin_when_later_than_join() {
        let worker = Worker::from(WorkerRow {
            id: 1,
            team_id: 10,
            joined_on: date(2025, 1, 6),
            current_streak: 2,
            longest_streak: 4,
            last_checkin_date: Some(date(2025, 1, 9)),
            first_checkin: Some(date(2025, 1, 8)),
        });
        assert_eq!(worker.effective_start, date(2025, 1, 8));
        assert_eq!(worker.last_checkin, Some(date(2025, 1, 9)));
    }

    #[test]
    fn string_columns_are_parsed_or_rejected() {
        let team = Team::try_from(TeamRow {
            id: 10,
            organization_id: 100,
            work_days: "MON,WED,FRI".to_string(),
            shift_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            shift_end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        })
        .unwrap();
        assert!(!team.work_days.contains(chrono::Weekday::Tue));

        let bad = PersistedAttendance::try_from(AttendanceRow {
            worker_id: 1,
            attendance_date: date(2025, 1, 6),
            status: "late".to_string(),
            score: None,
            is_counted: true,
        })
        .unwrap_err();
        assert_eq!(bad.operation, "fetch_persisted_attendance");

        let status =
            parse_column::<ExclusionStatus>("fetch_approved_exclusions", "Approved").unwrap();
        assert_eq!(status, ExclusionStatus::Approved);
        assert_eq!(
            parse_column::<WorkDays>("fetch_team", " MON ").unwrap(),
            WorkDays::from_weekdays([chrono::Weekday::Mon])
        );
    }
}

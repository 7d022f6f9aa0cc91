//! Lazy attendance reconstruction.
//!
//! Walks every scheduled work day of a range and decides what the day's
//! record is, whether or not a row was ever persisted for it. Per day, first
//! match wins:
//!
//! 1. before the worker's effective start: nothing
//! 2. persisted daily row: emitted verbatim
//! 3. check-in without a row: GREEN or YELLOW from the shift classifier
//! 4. excluded (holiday, approved leave): EXCUSED
//! 5. strictly before today: ABSENT
//! 6. today or later: nothing

use chrono::{Duration, NaiveDate, NaiveTime};
use std::collections::HashMap;

use super::calendar::{DateRange, is_work_day};
use super::exclusion::ExclusionIndex;
use crate::config::EngineConfig;
use crate::model::attendance::{AttendanceStatus, DailyRecord, PersistedAttendance};
use crate::model::checkin::Checkin;
use crate::model::team::Team;
use crate::model::worker::Worker;

/// Credit per status and the late threshold.
#[derive(Debug, Clone, Copy)]
pub struct AttendancePolicy {
    pub full_credit: f64,
    pub partial_credit: f64,
    pub late_grace: Duration,
}

impl AttendancePolicy {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            full_credit: 100.0,
            partial_credit: config.partial_credit,
            late_grace: Duration::minutes(i64::from(config.late_grace_minutes)),
        }
    }

    /// A check-in after shift start plus grace is late. Sources that did not
    /// record a time get the benefit of the doubt.
    pub fn classify_arrival(
        &self,
        at: Option<NaiveTime>,
        shift_start: NaiveTime,
    ) -> AttendanceStatus {
        match at {
            Some(at) if at.signed_duration_since(shift_start) > self.late_grace => {
                AttendanceStatus::Yellow
            }
            _ => AttendanceStatus::Green,
        }
    }

    pub fn score_for(&self, status: AttendanceStatus) -> Option<f64> {
        match status {
            AttendanceStatus::Green => Some(self.full_credit),
            AttendanceStatus::Yellow => Some(self.partial_credit),
            AttendanceStatus::Absent => Some(0.0),
            AttendanceStatus::Excused => None,
        }
    }
}

/// Everything reconstruction needs for one worker, already fetched.
pub struct WorkerDays<'a> {
    pub worker: &'a Worker,
    pub team: &'a Team,
    pub today: NaiveDate,
    pub exclusions: &'a ExclusionIndex,
    pub persisted: &'a HashMap<NaiveDate, PersistedAttendance>,
    pub checkins: &'a HashMap<NaiveDate, Checkin>,
}

impl WorkerDays<'_> {
    /// Ordered by date; identical inputs always give an identical list.
    pub fn reconstruct(&self, range: DateRange, policy: &AttendancePolicy) -> Vec<DailyRecord> {
        range
            .days()
            .filter(|date| is_work_day(*date, self.team.work_days))
            .filter_map(|date| self.resolve_day(date, policy))
            .collect()
    }

    fn resolve_day(&self, date: NaiveDate, policy: &AttendancePolicy) -> Option<DailyRecord> {
        if date < self.worker.effective_start {
            return None;
        }
        if let Some(row) = self.persisted.get(&date) {
            return Some(DailyRecord::persisted(row));
        }
        if let Some(checkin) = self.checkins.get(&date) {
            let status = policy.classify_arrival(checkin.checked_in_at, self.team.shift_start);
            let score = policy.score_for(status).unwrap_or_default();
            return Some(DailyRecord::present(date, status, score));
        }
        if let Some(reason) = self.exclusions.classify(self.worker.id, date) {
            return Some(DailyRecord::excused(date, reason));
        }
        if date < self.today {
            let score = policy.score_for(AttendanceStatus::Absent).unwrap_or_default();
            return Some(DailyRecord::absent(date, score));
        }
        None
    }
}

//! Performance scores, compliance rates and letter grades.
//!
//! Individual and team numbers share [`round1`] and [`Grade::from_score`] so
//! dashboards never disagree on rounding or thresholds.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use strum_macros::Display;
use utoipa::ToSchema;

use super::exclusion::ExclusionIndex;
use crate::model::attendance::{AttendanceStatus, DailyRecord, PersistedAttendance};
use crate::model::checkin::Checkin;
use crate::model::exclusion::ExclusionReason;
use crate::model::worker::Worker;
use crate::model::WorkerId;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display, ToSchema,
)]
pub enum Grade {
    #[serde(rename = "A+")]
    #[strum(serialize = "A+")]
    APlus,
    #[serde(rename = "A")]
    #[strum(serialize = "A")]
    A,
    #[serde(rename = "A-")]
    #[strum(serialize = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    #[strum(serialize = "B+")]
    BPlus,
    #[serde(rename = "B")]
    #[strum(serialize = "B")]
    B,
    #[serde(rename = "B-")]
    #[strum(serialize = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    #[strum(serialize = "C+")]
    CPlus,
    #[serde(rename = "C")]
    #[strum(serialize = "C")]
    C,
    #[serde(rename = "C-")]
    #[strum(serialize = "C-")]
    CMinus,
    #[serde(rename = "D+")]
    #[strum(serialize = "D+")]
    DPlus,
    #[serde(rename = "D")]
    #[strum(serialize = "D")]
    D,
    #[serde(rename = "D-")]
    #[strum(serialize = "D-")]
    DMinus,
    #[serde(rename = "F")]
    #[strum(serialize = "F")]
    F,
}

const GRADE_TABLE: [(f64, Grade); 12] = [
    (97.0, Grade::APlus),
    (93.0, Grade::A),
    (90.0, Grade::AMinus),
    (87.0, Grade::BPlus),
    (83.0, Grade::B),
    (80.0, Grade::BMinus),
    (77.0, Grade::CPlus),
    (73.0, Grade::C),
    (70.0, Grade::CMinus),
    (67.0, Grade::DPlus),
    (63.0, Grade::D),
    (60.0, Grade::DMinus),
];

impl Grade {
    /// Applied to the score rounded to a whole percent. Total: NaN and
    /// negatives land on F.
    pub fn from_score(score: f64) -> Grade {
        let rounded = score.round();
        GRADE_TABLE
            .iter()
            .find(|(min, _)| rounded >= *min)
            .map_or(Grade::F, |(_, grade)| *grade)
    }
}

/// One decimal place, the precision every reported percentage uses.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn mean(total: f64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { total / count as f64 }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct AttendanceBreakdown {
    pub green: u32,
    pub yellow: u32,
    pub absent: u32,
    pub excused: u32,
    pub counted_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PerformanceScore {
    /// Mean credit over counted days, 0 when nothing was counted.
    #[schema(example = 66.7)]
    pub score: f64,
    pub grade: Grade,
    /// Share of counted days the worker was present.
    #[schema(example = 66.7)]
    pub compliance_rate: f64,
    pub breakdown: AttendanceBreakdown,
}

/// EXCUSED and other uncounted days are left out of both numerator and
/// denominator.
pub fn score_records(records: &[DailyRecord]) -> PerformanceScore {
    let mut breakdown = AttendanceBreakdown::default();
    let mut credit = 0.0;
    let mut present = 0u32;

    for record in records {
        match record.status {
            AttendanceStatus::Green => breakdown.green += 1,
            AttendanceStatus::Yellow => breakdown.yellow += 1,
            AttendanceStatus::Absent => breakdown.absent += 1,
            AttendanceStatus::Excused => breakdown.excused += 1,
        }
        if !record.is_counted || record.status == AttendanceStatus::Excused {
            continue;
        }
        breakdown.counted_days += 1;
        credit += record.score.unwrap_or(0.0);
        if matches!(record.status, AttendanceStatus::Green | AttendanceStatus::Yellow) {
            present += 1;
        }
    }

    let counted = breakdown.counted_days as usize;
    let score = round1(mean(credit, counted));
    PerformanceScore {
        score,
        grade: Grade::from_score(score),
        compliance_rate: round1(mean(f64::from(present) * 100.0, counted)),
        breakdown,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BlendWeights {
    pub readiness: f64,
    pub compliance: f64,
}

/// Day-by-day expectation tally for a team.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplianceTally {
    /// Mean of the per-day rates, in percent.
    pub rate: f64,
    pub days_evaluated: u32,
    pub expected_member_days: u32,
    pub checked_in_member_days: u32,
}

/// Already-fetched inputs for the team compliance tally.
pub struct TeamDays<'a> {
    pub members: &'a [Worker],
    pub exclusions: &'a ExclusionIndex,
    pub persisted: &'a HashMap<(WorkerId, NaiveDate), PersistedAttendance>,
    pub checked_in: &'a HashSet<(WorkerId, NaiveDate)>,
}

impl TeamDays<'_> {
    /// `None` when the member was not expected on `day`, otherwise whether
    /// they showed up. A persisted row settles the day just as reconstruction
    /// emits it verbatim, so both views count the same member-days.
    fn member_day(&self, worker_id: WorkerId, day: NaiveDate) -> Option<bool> {
        let reason = self.exclusions.classify(worker_id, day);
        if reason == Some(ExclusionReason::NotStarted) {
            return None;
        }
        if let Some(row) = self.persisted.get(&(worker_id, day)) {
            let counted = row.is_counted && row.status != AttendanceStatus::Excused;
            let present = matches!(row.status, AttendanceStatus::Green | AttendanceStatus::Yellow);
            return counted.then_some(present);
        }
        if reason.is_some() {
            return None;
        }
        Some(self.checked_in.contains(&(worker_id, day)))
    }

    /// For each day: members who checked in among those expected, divided by
    /// members expected. Days nobody was expected on are skipped.
    pub fn compliance(&self, days: impl IntoIterator<Item = NaiveDate>) -> ComplianceTally {
        let mut tally = ComplianceTally::default();
        let mut rate_sum = 0.0;

        for day in days {
            let expected: Vec<bool> = self
                .members
                .iter()
                .filter_map(|m| self.member_day(m.id, day))
                .collect();
            if expected.is_empty() {
                continue;
            }
            let present = expected.iter().filter(|present| **present).count();

            tally.days_evaluated += 1;
            tally.expected_member_days += expected.len() as u32;
            tally.checked_in_member_days += present as u32;
            rate_sum += present as f64 / expected.len() as f64 * 100.0;
        }

        tally.rate = mean(rate_sum, tally.days_evaluated as usize);
        tally
    }
}

pub fn mean_readiness<'a>(checkins: impl IntoIterator<Item = &'a Checkin>) -> f64 {
    let (total, count) = checkins
        .into_iter()
        .fold((0.0, 0usize), |(total, count), c| (total + c.readiness_score, count + 1));
    mean(total, count)
}

/// Weighted blend of readiness and compliance, rounded to a whole percent
/// before grading.
pub fn blend(avg_readiness: f64, compliance_rate: f64, weights: BlendWeights) -> (f64, Grade) {
    let score = (avg_readiness * weights.readiness + compliance_rate * weights.compliance).round();
    (score, Grade::from_score(score))
}

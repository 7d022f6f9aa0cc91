//! Exclusion rules: not-yet-started, holidays, approved leave.
//!
//! Leave periods are merged into sorted, disjoint spans per worker once per
//! request, so the per-day membership test never rescans the raw list.

use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

use crate::model::exclusion::{ExclusionPeriod, ExclusionReason};
use crate::model::worker::Worker;
use crate::model::WorkerId;

/// Sorted, merged, inclusive date spans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaveIndex {
    spans: Vec<(NaiveDate, NaiveDate)>,
}

impl LeaveIndex {
    pub fn from_spans(spans: impl IntoIterator<Item = (NaiveDate, NaiveDate)>) -> Self {
        let mut spans: Vec<_> = spans.into_iter().filter(|(start, end)| start <= end).collect();
        spans.sort_unstable();

        let mut merged: Vec<(NaiveDate, NaiveDate)> = Vec::with_capacity(spans.len());
        for (start, end) in spans {
            match merged.last_mut() {
                // overlapping or directly adjacent
                Some(last) if last.1.succ_opt().is_none_or(|next| start <= next) => {
                    last.1 = last.1.max(end);
                }
                _ => merged.push((start, end)),
            }
        }
        Self { spans: merged }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        let idx = self.spans.partition_point(|(start, _)| *start <= date);
        idx > 0 && self.spans[idx - 1].1 >= date
    }
}

#[derive(Debug, Clone)]
struct WorkerWindow {
    effective_start: NaiveDate,
    leave: LeaveIndex,
}

/// Per-request exclusion state for one organization's workers.
#[derive(Debug, Clone, Default)]
pub struct ExclusionIndex {
    holidays: HashSet<NaiveDate>,
    workers: HashMap<WorkerId, WorkerWindow>,
}

impl ExclusionIndex {
    /// Only approved periods of the given workers are indexed; everything
    /// else in `periods` is ignored.
    pub fn build(
        holidays: impl IntoIterator<Item = NaiveDate>,
        workers: &[Worker],
        periods: &[ExclusionPeriod],
    ) -> Self {
        let mut spans: HashMap<WorkerId, Vec<(NaiveDate, NaiveDate)>> = HashMap::new();
        for period in periods.iter().filter(|p| p.is_exclusion_eligible()) {
            spans
                .entry(period.worker_id)
                .or_default()
                .push((period.start, period.end));
        }

        let workers = workers
            .iter()
            .map(|worker| {
                let leave = spans
                    .remove(&worker.id)
                    .map(LeaveIndex::from_spans)
                    .unwrap_or_default();
                (
                    worker.id,
                    WorkerWindow {
                        effective_start: worker.effective_start,
                        leave,
                    },
                )
            })
            .collect();

        Self {
            holidays: holidays.into_iter().collect(),
            workers,
        }
    }

    pub fn holidays(&self) -> &HashSet<NaiveDate> {
        &self.holidays
    }

    /// First matching rule wins: not started, then holiday, then approved
    /// leave. Callers filter non-work days before asking.
    ///
    /// A worker that was not part of [`ExclusionIndex::build`] is only
    /// subject to the holiday rule.
    pub fn classify(&self, worker_id: WorkerId, date: NaiveDate) -> Option<ExclusionReason> {
        let window = self.workers.get(&worker_id);
        if window.is_some_and(|w| date < w.effective_start) {
            return Some(ExclusionReason::NotStarted);
        }
        if self.holidays.contains(&date) {
            return Some(ExclusionReason::Holiday);
        }
        if window.is_some_and(|w| w.leave.contains(date)) {
            return Some(ExclusionReason::ApprovedLeave);
        }
        None
    }

    pub fn is_excluded(&self, worker_id: WorkerId, date: NaiveDate) -> bool {
        self.classify(worker_id, date).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::exclusion::ExclusionStatus;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn worker(id: WorkerId, effective_start: NaiveDate) -> Worker {
        Worker {
            id,
            team_id: 1,
            effective_start,
            current_streak: 0,
            longest_streak: 0,
            last_checkin: None,
        }
    }

    fn period(
        worker_id: WorkerId,
        start: NaiveDate,
        end: NaiveDate,
        status: ExclusionStatus,
    ) -> ExclusionPeriod {
        ExclusionPeriod {
            worker_id,
            start,
            end,
            status,
        }
    }

    #[test]
    fn leave_spans_merge_overlapping_and_adjacent() {
        let index = LeaveIndex::from_spans([
            (date(2025, 1, 10), date(2025, 1, 12)),
            (date(2025, 1, 1), date(2025, 1, 3)),
            (date(2025, 1, 4), date(2025, 1, 5)),
            (date(2025, 1, 11), date(2025, 1, 11)),
            (date(2025, 2, 2), date(2025, 2, 1)),
        ]);
        assert_eq!(
            index.spans,
            vec![
                (date(2025, 1, 1), date(2025, 1, 5)),
                (date(2025, 1, 10), date(2025, 1, 12)),
            ]
        );
    }

    #[test]
    fn end_date_is_the_last_excluded_day() {
        let index = LeaveIndex::from_spans([(date(2025, 1, 10), date(2025, 1, 12))]);
        assert!(!index.contains(date(2025, 1, 9)));
        assert!(index.contains(date(2025, 1, 10)));
        assert!(index.contains(date(2025, 1, 12)));
        assert!(!index.contains(date(2025, 1, 13)));
    }

    #[test]
    fn only_approved_periods_exclude() {
        let workers = [worker(7, date(2024, 1, 1))];
        let periods = [
            period(7, date(2025, 1, 6), date(2025, 1, 6), ExclusionStatus::Pending),
            period(7, date(2025, 1, 7), date(2025, 1, 7), ExclusionStatus::Rejected),
            period(7, date(2025, 1, 8), date(2025, 1, 8), ExclusionStatus::Approved),
        ];
        let index = ExclusionIndex::build([], &workers, &periods);
        assert_eq!(index.classify(7, date(2025, 1, 6)), None);
        assert_eq!(index.classify(7, date(2025, 1, 7)), None);
        assert_eq!(
            index.classify(7, date(2025, 1, 8)),
            Some(ExclusionReason::ApprovedLeave)
        );
    }

    #[test]
    fn holiday_wins_over_leave() {
        let workers = [worker(1, date(2024, 1, 1))];
        let periods = [period(1, date(2025, 1, 8), date(2025, 1, 10), ExclusionStatus::Approved)];
        let index = ExclusionIndex::build([date(2025, 1, 9)], &workers, &periods);
        assert_eq!(index.classify(1, date(2025, 1, 9)), Some(ExclusionReason::Holiday));
        assert_eq!(
            index.classify(1, date(2025, 1, 10)),
            Some(ExclusionReason::ApprovedLeave)
        );
    }

    #[test]
    fn not_started_wins_over_everything() {
        let workers = [worker(1, date(2025, 1, 10))];
        let periods = [period(1, date(2025, 1, 1), date(2025, 1, 31), ExclusionStatus::Approved)];
        let index = ExclusionIndex::build([date(2025, 1, 9)], &workers, &periods);
        assert_eq!(index.classify(1, date(2025, 1, 9)), Some(ExclusionReason::NotStarted));
        assert_eq!(
            index.classify(1, date(2025, 1, 10)),
            Some(ExclusionReason::ApprovedLeave)
        );
    }

    #[test]
    fn leave_is_scoped_to_its_worker() {
        let workers = [worker(1, date(2024, 1, 1)), worker(2, date(2024, 1, 1))];
        let periods = [period(1, date(2025, 1, 8), date(2025, 1, 8), ExclusionStatus::Approved)];
        let index = ExclusionIndex::build([], &workers, &periods);
        assert!(index.is_excluded(1, date(2025, 1, 8)));
        assert!(!index.is_excluded(2, date(2025, 1, 8)));
        // unknown workers only see holidays
        assert!(!index.is_excluded(99, date(2025, 1, 8)));
    }
}

//! Consecutive-compliance streaks.
//!
//! A gap between two check-ins does not break a streak when every day
//! strictly inside it is either off schedule or excused (holiday, approved
//! leave).

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

use super::calendar::{is_work_day, next_work_day};
use crate::model::team::WorkDays;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StreakSummary {
    pub current: u32,
    pub longest: u32,
    #[schema(example = "2025-01-10", value_type = Option<String>, format = "date")]
    pub last_checkin: Option<NaiveDate>,
    /// Whether the last check-in still connects to today.
    pub continues: bool,
    /// First scheduled day after the last check-in.
    #[schema(example = "2025-01-13", value_type = Option<String>, format = "date")]
    pub next_due: Option<NaiveDate>,
}

/// True when a streak ending on `last` is still alive on `today`.
pub fn streak_continues(
    last: NaiveDate,
    today: NaiveDate,
    work_days: WorkDays,
    excused: impl Fn(NaiveDate) -> bool,
) -> bool {
    if last + Duration::days(1) >= today {
        return true;
    }
    last.iter_days()
        .skip(1)
        .take_while(|day| *day < today)
        .all(|day| !is_work_day(day, work_days) || excused(day))
}

/// Re-derives the validity of the counters written by the check-in flow.
/// A stale streak reads as zero; the longest streak is never lower than the
/// current one.
pub fn validate_stored(
    current: u32,
    longest: u32,
    last_checkin: Option<NaiveDate>,
    today: NaiveDate,
    work_days: WorkDays,
    excused: impl Fn(NaiveDate) -> bool,
) -> StreakSummary {
    let continues =
        last_checkin.is_some_and(|last| streak_continues(last, today, work_days, excused));
    let current = if continues { current } else { 0 };
    StreakSummary {
        current,
        longest: longest.max(current),
        last_checkin,
        continues,
        next_due: last_checkin.and_then(|last| next_work_day(last, work_days)),
    }
}

/// Recomputes both counters from a check-in date sequence.
pub fn streaks_from_history(
    dates: &[NaiveDate],
    today: NaiveDate,
    work_days: WorkDays,
    excused: impl Fn(NaiveDate) -> bool,
) -> StreakSummary {
    let mut dates: Vec<NaiveDate> = dates.iter().copied().filter(|d| *d <= today).collect();
    dates.sort_unstable();
    dates.dedup();

    let Some(&last) = dates.last() else {
        return StreakSummary {
            current: 0,
            longest: 0,
            last_checkin: None,
            continues: false,
            next_due: None,
        };
    };

    let mut run = 1u32;
    let mut longest = 1u32;
    for pair in dates.windows(2) {
        run = if streak_continues(pair[0], pair[1], work_days, &excused) {
            run + 1
        } else {
            1
        };
        longest = longest.max(run);
    }

    let continues = streak_continues(last, today, work_days, &excused);
    StreakSummary {
        current: if continues { run } else { 0 },
        longest,
        last_checkin: Some(last),
        continues,
        next_due: next_work_day(last, work_days),
    }
}

//! Timezone-aware day arithmetic.
//!
//! Every function takes the organization's zone explicitly; nothing here
//! reads the process-local zone. Components join on [`NaiveDate`] values that
//! were reduced through the organization zone first, and serialize them as
//! `YYYY-MM-DD` at the boundary.

use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use chrono_tz::Tz;
use std::collections::HashSet;

use super::error::{EngineError, EngineResult};
use crate::model::team::WorkDays;

pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

pub fn parse_tz(name: &str) -> EngineResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| EngineError::InvalidTimezone(name.to_string()))
}

/// The organization-local calendar date an instant falls on.
pub fn date_key(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

pub fn format_date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

pub fn parse_date_key(raw: &str) -> EngineResult<NaiveDate> {
    let raw = raw.trim();
    // only the canonical zero-padded form is a key
    if raw.len() != 10 {
        return Err(EngineError::InvalidDateKey(raw.to_string()));
    }
    NaiveDate::parse_from_str(raw, DATE_KEY_FORMAT)
        .map_err(|_| EngineError::InvalidDateKey(raw.to_string()))
}

/// First instant of `date` in `tz`. When local midnight does not exist
/// (DST gap), the first existing wall time after it is used.
pub fn start_of_day(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    local_to_utc(date.and_time(NaiveTime::MIN), tz)
}

/// Last millisecond of `date` in `tz`.
pub fn end_of_day(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    start_of_day(date + Duration::days(1), tz) - Duration::milliseconds(1)
}

fn local_to_utc(local: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    let mut candidate = local;
    // gaps are at most a couple of hours in the tz database
    for _ in 0..48 {
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(at) => return at.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => return earliest.with_timezone(&Utc),
            LocalResult::None => candidate += Duration::minutes(30),
        }
    }
    Utc.from_utc_datetime(&local)
}

pub fn is_work_day(date: NaiveDate, work_days: WorkDays) -> bool {
    work_days.contains(date.weekday())
}

pub fn count_work_days(
    range: DateRange,
    work_days: WorkDays,
    holidays: Option<&HashSet<NaiveDate>>,
) -> u32 {
    range
        .days()
        .filter(|date| is_work_day(*date, work_days))
        .filter(|date| holidays.is_none_or(|set| !set.contains(date)))
        .count() as u32
}

/// The first work day strictly after `date`, or `None` for an empty schedule.
pub fn next_work_day(date: NaiveDate, work_days: WorkDays) -> Option<NaiveDate> {
    if work_days.is_empty() {
        return None;
    }
    (1..=7)
        .map(|offset| date + Duration::days(offset))
        .find(|candidate| is_work_day(*candidate, work_days))
}

/// Inclusive range of local calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Validated constructor for caller-supplied ranges.
    pub fn new(start: NaiveDate, end: NaiveDate, max_days: u32) -> EngineResult<Self> {
        if end < start {
            return Err(EngineError::InvalidRange {
                start,
                end,
                reason: "end precedes start".to_string(),
            });
        }
        let range = Self { start, end };
        if range.len_days() > i64::from(max_days) {
            return Err(EngineError::InvalidRange {
                start,
                end,
                reason: format!("span of {} days exceeds {}", range.len_days(), max_days),
            });
        }
        Ok(range)
    }

    /// Unbounded constructor for ranges the engine derives itself.
    pub fn spanning(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |date| *date <= end)
    }
}

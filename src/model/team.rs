use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use super::{OrganizationId, TeamId};

const WEEKDAY_NAMES: [&str; 7] = ["MON", "TUE", "WED", "THU", "FRI", "SAT", "SUN"];

/// Set of weekdays a team is scheduled to work.
///
/// Stored and serialized as a comma separated list of short names,
/// e.g. `MON,TUE,WED,THU,FRI`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WorkDays(u8);

#[derive(Debug, thiserror::Error)]
#[error("invalid work day `{0}`")]
pub struct ParseWorkDaysError(pub String);

impl WorkDays {
    #[cfg(test)]
    pub const MON_FRI: WorkDays = WorkDays(0b0001_1111);

    pub fn from_weekdays(days: impl IntoIterator<Item = Weekday>) -> Self {
        Self(days.into_iter().fold(0, |acc, day| acc | bit(day)))
    }

    pub fn contains(self, day: Weekday) -> bool {
        self.0 & bit(day) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ]
        .into_iter()
        .filter(move |day| self.contains(*day))
    }
}

#[inline]
fn bit(day: Weekday) -> u8 {
    1 << day.num_days_from_monday()
}

impl FromStr for WorkDays {
    type Err = ParseWorkDaysError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut days = Vec::new();
        for raw in s.split(',').map(str::trim).filter(|part| !part.is_empty()) {
            // chrono accepts "mon", "MON" and "Monday" alike
            let day = raw
                .parse::<Weekday>()
                .map_err(|_| ParseWorkDaysError(raw.to_string()))?;
            days.push(day);
        }
        Ok(Self::from_weekdays(days))
    }
}

impl fmt::Display for WorkDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self
            .iter()
            .map(|day| WEEKDAY_NAMES[day.num_days_from_monday() as usize])
            .collect();
        write!(f, "{}", names.join(","))
    }
}

impl Serialize for WorkDays {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for WorkDays {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Team {
    pub id: TeamId,
    pub organization_id: OrganizationId,
    #[schema(example = "MON,TUE,WED,THU,FRI", value_type = String)]
    pub work_days: WorkDays,
    /// Nominal shift start, organization-local. Drives the late classifier.
    #[schema(example = "08:00:00", value_type = String)]
    pub shift_start: NaiveTime,
    #[schema(example = "17:00:00", value_type = String)]
    pub shift_end: NaiveTime,
}

//! Accumulated work duration measured in whole seconds.

use super::TaskDomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3_600;

/// Total time worked on a task.
///
/// Stored as whole seconds with no day component, so totals past 24 hours
/// render as `25:00:00` rather than wrapping. Text form is `HH:MM:SS` with at
/// least two hour digits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkDuration(u64);

impl WorkDuration {
    /// The empty duration.
    pub const ZERO: Self = Self(0);

    /// Creates a duration from whole seconds.
    #[must_use]
    pub const fn from_secs(seconds: u64) -> Self {
        Self(seconds)
    }

    /// Creates a duration from hour, minute, and second components.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidDuration`] when minutes or seconds
    /// exceed 59 or the total does not fit in `u64` seconds.
    pub fn from_hms(hours: u64, minutes: u64, seconds: u64) -> Result<Self, TaskDomainError> {
        if minutes >= SECONDS_PER_MINUTE || seconds >= SECONDS_PER_MINUTE {
            return Err(TaskDomainError::InvalidDuration(format!(
                "{hours:02}:{minutes:02}:{seconds:02}"
            )));
        }
        hours
            .checked_mul(SECONDS_PER_HOUR)
            .and_then(|total| total.checked_add(minutes * SECONDS_PER_MINUTE + seconds))
            .map(Self)
            .ok_or_else(|| {
                TaskDomainError::InvalidDuration(format!("{hours}:{minutes:02}:{seconds:02}"))
            })
    }

    /// Returns the whole elapsed seconds between two instants.
    ///
    /// Sub-second remainders are truncated. An `end` earlier than `start`
    /// yields [`WorkDuration::ZERO`].
    #[must_use]
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let seconds = end.signed_duration_since(start).num_seconds();
        Self(u64::try_from(seconds).unwrap_or(0))
    }

    /// Returns the number of whole seconds.
    #[must_use]
    pub const fn as_secs(self) -> u64 {
        self.0
    }

    /// Adds a session to the accumulated total.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::DurationOverflow`] when the sum does not fit.
    pub fn checked_add(self, elapsed: Self) -> Result<Self, TaskDomainError> {
        self.0
            .checked_add(elapsed.0)
            .map(Self)
            .ok_or(TaskDomainError::DurationOverflow {
                total: self,
                elapsed,
            })
    }

    const fn components(self) -> (u64, u64, u64) {
        let hours = self.0.div_euclid(SECONDS_PER_HOUR);
        let minutes = self.0.rem_euclid(SECONDS_PER_HOUR).div_euclid(SECONDS_PER_MINUTE);
        let seconds = self.0.rem_euclid(SECONDS_PER_MINUTE);
        (hours, minutes, seconds)
    }
}

impl fmt::Display for WorkDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (hours, minutes, seconds) = self.components();
        write!(f, "{hours:02}:{minutes:02}:{seconds:02}")
    }
}

impl FromStr for WorkDuration {
    type Err = TaskDomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || TaskDomainError::InvalidDuration(value.to_owned());
        let mut parts = value.trim().split(':');
        let (Some(hours), Some(minutes), Some(seconds), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        if minutes.len() != 2 || seconds.len() != 2 || hours.len() < 2 {
            return Err(invalid());
        }
        let parse = |part: &str| part.parse::<u64>().map_err(|_| invalid());
        Self::from_hms(parse(hours)?, parse(minutes)?, parse(seconds)?)
    }
}

impl Serialize for WorkDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WorkDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

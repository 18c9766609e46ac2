//! Fixed bar duration.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::IndexError;

const MINUTE: i64 = 60;
const HOUR: i64 = 3_600;
const DAY: i64 = 86_400;

/// A positive bar duration in whole seconds.
///
/// Timestamps are aligned to an interval when `unix_seconds mod secs == 0`.
/// Serializes as a compact string such as `"1m"`, `"15m"`, `"4h"` or `"1d"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Interval(i64);

impl Interval {
    /// One minute.
    pub const M1: Self = Self(MINUTE);
    /// Five minutes.
    pub const M5: Self = Self(5 * MINUTE);
    /// Fifteen minutes.
    pub const M15: Self = Self(15 * MINUTE);
    /// One hour.
    pub const H1: Self = Self(HOUR);
    /// One UTC day.
    pub const D1: Self = Self(DAY);
    /// One week.
    pub const W1: Self = Self(7 * DAY);

    /// Build an interval from a number of seconds.
    ///
    /// # Errors
    /// Returns `InvalidArg` when `secs` is not strictly positive.
    pub fn from_secs(secs: i64) -> Result<Self, IndexError> {
        if secs <= 0 {
            return Err(IndexError::InvalidArg(format!(
                "interval must be positive, got {secs}s"
            )));
        }
        Ok(Self(secs))
    }

    /// Build an interval of `n` minutes.
    ///
    /// # Errors
    /// Returns `InvalidArg` when `n` is zero.
    pub fn minutes(n: u32) -> Result<Self, IndexError> {
        Self::from_secs(i64::from(n) * MINUTE)
    }

    /// Length in seconds.
    #[must_use]
    pub const fn secs(self) -> i64 {
        self.0
    }

    /// Length as a `chrono` delta.
    #[must_use]
    pub const fn as_delta(self) -> TimeDelta {
        TimeDelta::seconds(self.0)
    }

    /// True if `ts` falls exactly on an interval boundary.
    #[must_use]
    pub fn is_aligned(self, ts: DateTime<Utc>) -> bool {
        ts.timestamp_subsec_nanos() == 0 && ts.timestamp().rem_euclid(self.0) == 0
    }

    /// Round `ts` down to the enclosing interval boundary.
    #[must_use]
    pub fn floor(self, ts: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let s = ts.timestamp();
        DateTime::from_timestamp(s - s.rem_euclid(self.0), 0)
    }

    /// Number of whole intervals from `from` to `to` (negative when `to < from`).
    #[must_use]
    pub fn steps_between(self, from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
        (to.timestamp() - from.timestamp()).div_euclid(self.0)
    }

    /// `ts` shifted by `n` intervals.
    #[must_use]
    pub fn offset(self, ts: DateTime<Utc>, n: i64) -> Option<DateTime<Utc>> {
        let delta = TimeDelta::try_seconds(self.0.checked_mul(n)?)?;
        ts.checked_add_signed(delta)
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::M1
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0;
        if s % DAY == 0 {
            write!(f, "{}d", s / DAY)
        } else if s % HOUR == 0 {
            write!(f, "{}h", s / HOUR)
        } else if s % MINUTE == 0 {
            write!(f, "{}m", s / MINUTE)
        } else {
            write!(f, "{s}s")
        }
    }
}

impl FromStr for Interval {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| IndexError::InvalidArg(format!("interval '{s}' has no unit")))?;
        let (num, unit) = s.split_at(split);
        let n: i64 = num
            .parse()
            .map_err(|_| IndexError::InvalidArg(format!("invalid interval '{s}'")))?;
        let mult = match unit {
            "s" => 1,
            "m" => MINUTE,
            "h" => HOUR,
            "d" => DAY,
            "w" => 7 * DAY,
            other => {
                return Err(IndexError::InvalidArg(format!(
                    "unknown interval unit '{other}' in '{s}'"
                )));
            }
        };
        let secs = n
            .checked_mul(mult)
            .ok_or_else(|| IndexError::InvalidArg(format!("interval '{s}' overflows")))?;
        Self::from_secs(secs)
    }
}

impl TryFrom<String> for Interval {
    type Error = IndexError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Interval> for String {
    fn from(i: Interval) -> Self {
        i.to_string()
    }
}

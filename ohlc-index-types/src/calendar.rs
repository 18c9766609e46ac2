//! Expected timestamp grid and missing runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::IndexError;
use crate::interval::Interval;

/// Every expected timestamp from `start` to `end` inclusive, one `interval` apart.
///
/// A calendar is a derived value with no storage of its own; indexes into it are
/// whole interval steps from `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    /// First expected timestamp.
    pub start: DateTime<Utc>,
    /// Last expected timestamp.
    pub end: DateTime<Utc>,
    /// Spacing between timestamps.
    pub interval: Interval,
}

impl Calendar {
    /// Build a calendar over `[start, end]`.
    ///
    /// # Errors
    /// Returns `InvalidArg` if either bound is off the interval grid or `end < start`.
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Interval,
    ) -> Result<Self, IndexError> {
        if !interval.is_aligned(start) || !interval.is_aligned(end) {
            return Err(IndexError::InvalidArg(format!(
                "calendar bounds {start}..{end} are not aligned to {interval}"
            )));
        }
        if end < start {
            return Err(IndexError::InvalidArg(format!(
                "calendar end {end} precedes start {start}"
            )));
        }
        Ok(Self {
            start,
            end,
            interval,
        })
    }

    /// Number of expected timestamps.
    #[must_use]
    pub fn len(&self) -> usize {
        usize::try_from(self.interval.steps_between(self.start, self.end) + 1).unwrap_or(0)
    }

    /// Calendars always hold at least their start timestamp.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Position of `ts` on the grid, if it lies on it.
    #[must_use]
    pub fn index_of(&self, ts: DateTime<Utc>) -> Option<usize> {
        if ts < self.start || ts > self.end || !self.interval.is_aligned(ts) {
            return None;
        }
        usize::try_from(self.interval.steps_between(self.start, ts)).ok()
    }

    /// Timestamp at grid position `i`.
    #[must_use]
    pub fn ts_at(&self, i: usize) -> Option<DateTime<Utc>> {
        let ts = self.interval.offset(self.start, i64::try_from(i).ok()?)?;
        (ts <= self.end).then_some(ts)
    }

    /// True if `ts` is one of the expected timestamps.
    #[must_use]
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.index_of(ts).is_some()
    }

    /// Iterate over every expected timestamp in order.
    pub fn iter(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        (0..self.len()).filter_map(|i| self.ts_at(i))
    }

    /// Smallest calendar covering both `self` and `other`.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the intervals differ.
    pub fn union(&self, other: &Self) -> Result<Self, IndexError> {
        if self.interval != other.interval {
            return Err(IndexError::InvalidArg(format!(
                "cannot union calendars with intervals {} and {}",
                self.interval, other.interval
            )));
        }
        Ok(Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            interval: self.interval,
        })
    }
}

/// A maximal run of consecutive missing timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    /// First missing timestamp.
    pub start: DateTime<Utc>,
    /// Last missing timestamp.
    pub end: DateTime<Utc>,
    /// Number of missing timestamps.
    pub len: usize,
}

impl Gap {
    /// True if `ts` lies within `[start, end]`.
    #[must_use]
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts <= self.end
    }
}

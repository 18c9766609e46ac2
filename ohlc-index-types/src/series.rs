//! Ordered bars of one `(exchange, pair)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bar::Bar;
use crate::ids::{ExchangeId, PairId, SeriesKey};

/// Bars for a single exchange and pair, ordered by timestamp.
///
/// Stages never edit a series in place; they return a derived series via
/// [`Series::derive`] so the raw input stays available for auditing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Source exchange.
    pub exchange: ExchangeId,
    /// Trading pair.
    pub pair: PairId,
    /// Bars in strictly increasing timestamp order.
    pub bars: Vec<Bar>,
}

impl Series {
    /// Build a series from its identity and bars.
    pub fn new(exchange: impl Into<ExchangeId>, pair: impl Into<PairId>, bars: Vec<Bar>) -> Self {
        Self {
            exchange: exchange.into(),
            pair: pair.into(),
            bars,
        }
    }

    /// `(exchange, pair)` identity of this series.
    #[must_use]
    pub fn key(&self) -> SeriesKey {
        SeriesKey {
            exchange: self.exchange.clone(),
            pair: self.pair.clone(),
        }
    }

    /// Number of bars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// True if the series has no bars.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Timestamp of the first bar.
    #[must_use]
    pub fn first_ts(&self) -> Option<DateTime<Utc>> {
        self.bars.first().map(|b| b.ts)
    }

    /// Timestamp of the last bar.
    #[must_use]
    pub fn last_ts(&self) -> Option<DateTime<Utc>> {
        self.bars.last().map(|b| b.ts)
    }

    /// A new series with the same identity and the given bars.
    #[must_use]
    pub fn derive(&self, bars: Vec<Bar>) -> Self {
        Self {
            exchange: self.exchange.clone(),
            pair: self.pair.clone(),
            bars,
        }
    }

    /// Bars strictly after `cutoff`, for incremental runs on new data only.
    #[must_use]
    pub fn after(&self, cutoff: DateTime<Utc>) -> Self {
        self.derive(self.bars.iter().filter(|b| b.ts > cutoff).copied().collect())
    }

    /// Bars within `[start, end]`.
    #[must_use]
    pub fn between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.derive(
            self.bars
                .iter()
                .filter(|b| b.ts >= start && b.ts <= end)
                .copied()
                .collect(),
        )
    }

    /// Number of bars flagged as imputed.
    #[must_use]
    pub fn imputed_count(&self) -> usize {
        self.bars.iter().filter(|b| b.is_imputed()).count()
    }
}

//! Merged index bar.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bar::Ohlc;
use crate::ids::ExchangeId;

/// One timestamp of the merged index.
///
/// `prices` is `None` exactly when no exchange contributed, which marks an
/// index-level gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexBar {
    /// Interval start, UTC.
    pub ts: DateTime<Utc>,
    /// Blended prices, absent for an index-level gap.
    pub prices: Option<Ohlc>,
    /// Summed volume of the contributing exchanges.
    pub volume: f64,
    /// Exchanges whose bars were averaged into `prices`.
    pub contributing: BTreeSet<ExchangeId>,
    /// True when every contributing bar was imputed.
    pub is_imputed: bool,
}

impl IndexBar {
    /// An index-level gap at `ts`.
    #[must_use]
    pub const fn gap(ts: DateTime<Utc>) -> Self {
        Self {
            ts,
            prices: None,
            volume: 0.0,
            contributing: BTreeSet::new(),
            is_imputed: false,
        }
    }

    /// True if no exchange contributed at this timestamp.
    #[must_use]
    pub fn is_gap(&self) -> bool {
        self.contributing.is_empty()
    }

    /// Closing price, if this is not a gap.
    #[must_use]
    pub fn close(&self) -> Option<f64> {
        self.prices.map(|p| p.close)
    }
}

//! A single OHLCV bar and its provenance flags.

use std::fmt;

use bitflags::bitflags;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

bitflags! {
    /// Provenance markers set by the per-exchange pipeline.
    ///
    /// Raw bars carry no flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct BarFlags: u8 {
        /// Produced by gap imputation; carries no traded volume.
        const IMPUTED = 1;
        /// `open` was rewritten to the preceding bar's close.
        const OPEN_ALIGNED = 1 << 1;
        /// `high` and/or `low` were widened to bound open and close.
        const RANGE_WIDENED = 1 << 2;
    }
}

/// Named bar field, used for per-field computations and error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarField {
    /// Opening price.
    Open,
    /// Highest price.
    High,
    /// Lowest price.
    Low,
    /// Closing price.
    Close,
    /// Traded volume.
    Volume,
}

/// The four price fields in canonical order.
pub const PRICE_FIELDS: [BarField; 4] = [BarField::Open, BarField::High, BarField::Low, BarField::Close];

impl fmt::Display for BarField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Open => "open",
            Self::High => "high",
            Self::Low => "low",
            Self::Close => "close",
            Self::Volume => "volume",
        })
    }
}

/// Open/high/low/close prices without a timestamp or volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ohlc {
    /// Opening price.
    pub open: f64,
    /// Highest price.
    pub high: f64,
    /// Lowest price.
    pub low: f64,
    /// Closing price.
    pub close: f64,
}

impl Ohlc {
    /// Build a flat bar where every price equals `price`.
    #[must_use]
    pub const fn flat(price: f64) -> Self {
        Self {
            open: price,
            high: price,
            low: price,
            close: price,
        }
    }

    /// True when `low <= min(open, close)` and `max(open, close) <= high`.
    #[must_use]
    pub fn is_envelope_valid(&self) -> bool {
        self.low <= self.open.min(self.close) && self.open.max(self.close) <= self.high
    }

    /// Widen high/low so the envelope bounds every price; returns `true` if anything changed.
    pub fn widen_envelope(&mut self) -> bool {
        let hi = self.high.max(self.open).max(self.close).max(self.low);
        let lo = self.low.min(self.open).min(self.close).min(self.high);
        let changed = hi != self.high || lo != self.low;
        self.high = hi;
        self.low = lo;
        changed
    }

    /// Read a price field; `Volume` is not a price and yields `None`.
    #[must_use]
    pub const fn get(&self, field: BarField) -> Option<f64> {
        match field {
            BarField::Open => Some(self.open),
            BarField::High => Some(self.high),
            BarField::Low => Some(self.low),
            BarField::Close => Some(self.close),
            BarField::Volume => None,
        }
    }

    /// Overwrite a price field; `Volume` is ignored.
    pub const fn set(&mut self, field: BarField, value: f64) {
        match field {
            BarField::Open => self.open = value,
            BarField::High => self.high = value,
            BarField::Low => self.low = value,
            BarField::Close => self.close = value,
            BarField::Volume => {}
        }
    }
}

/// One interval of trading on a single exchange.
///
/// The exchange and pair are carried once by the owning [`crate::Series`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Interval start, UTC.
    pub ts: DateTime<Utc>,
    /// Opening price.
    pub open: f64,
    /// Highest price.
    pub high: f64,
    /// Lowest price.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Traded volume in base units.
    pub volume: f64,
    /// Provenance flags.
    #[serde(default = "BarFlags::empty", skip_serializing_if = "BarFlags::is_empty")]
    pub flags: BarFlags,
}

impl Bar {
    /// Build a raw bar with no flags.
    #[must_use]
    pub const fn new(
        ts: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            ts,
            open,
            high,
            low,
            close,
            volume,
            flags: BarFlags::empty(),
        }
    }

    /// Build a bar at `ts` from prices and a volume.
    #[must_use]
    pub const fn from_ohlc(ts: DateTime<Utc>, p: Ohlc, volume: f64, flags: BarFlags) -> Self {
        Self {
            ts,
            open: p.open,
            high: p.high,
            low: p.low,
            close: p.close,
            volume,
            flags,
        }
    }

    /// Prices of this bar.
    #[must_use]
    pub const fn ohlc(&self) -> Ohlc {
        Ohlc {
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
        }
    }

    /// Replace the prices, keeping timestamp, volume and flags.
    pub const fn set_ohlc(&mut self, p: Ohlc) {
        self.open = p.open;
        self.high = p.high;
        self.low = p.low;
        self.close = p.close;
    }

    /// Read any field by name.
    #[must_use]
    pub const fn get(&self, field: BarField) -> f64 {
        match field {
            BarField::Open => self.open,
            BarField::High => self.high,
            BarField::Low => self.low,
            BarField::Close => self.close,
            BarField::Volume => self.volume,
        }
    }

    /// True if this bar was produced by imputation.
    #[must_use]
    pub const fn is_imputed(&self) -> bool {
        self.flags.contains(BarFlags::IMPUTED)
    }

    /// First field holding NaN or an infinity, if any.
    #[must_use]
    pub fn first_non_finite(&self) -> Option<BarField> {
        [
            BarField::Open,
            BarField::High,
            BarField::Low,
            BarField::Close,
            BarField::Volume,
        ]
        .into_iter()
        .find(|f| !self.get(*f).is_finite())
    }

    /// True when `low <= min(open, close)` and `max(open, close) <= high`.
    #[must_use]
    pub fn is_envelope_valid(&self) -> bool {
        self.ohlc().is_envelope_valid()
    }
}

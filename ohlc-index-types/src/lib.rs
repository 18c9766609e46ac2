//! Data transfer objects, configuration and error types shared across the ohlc-index crates.
#![warn(missing_docs)]

mod attribution;
mod bar;
mod calendar;
mod config;
mod error;
mod ids;
mod index;
mod interval;
mod reports;
mod series;
mod warning;

pub use attribution::{Attribution, Span};
pub use bar::{Bar, BarField, BarFlags, Ohlc, PRICE_FIELDS};
pub use calendar::{Calendar, Gap};
pub use config::{ExchangeConfig, IndexConfig, PairConfig, Resampling};
pub use error::{ErrorContext, IndexError, MalformedReason};
pub use ids::{ExchangeId, PairId, SeriesKey};
pub use index::IndexBar;
pub use interval::Interval;
pub use reports::{
    Discontinuity, ExchangeQuality, ExcludedExchange, QualityReport, SeriesDiagnostics,
    UnresolvedGap,
};
pub use series::Series;
pub use warning::{IndexWarning, UnresolvedReason};

//! Re-export of foundational types from `ohlc-index-types`.
// Consolidated re-exports so downstream crates can depend on `ohlc-index-core` only

pub use ohlc_index_types::{
    Attribution, Bar, BarField, BarFlags, Calendar, Discontinuity, ErrorContext, ExchangeConfig,
    ExchangeId, ExchangeQuality, ExcludedExchange, Gap, IndexBar, IndexConfig, IndexError,
    IndexWarning, Interval, MalformedReason, Ohlc, PRICE_FIELDS, PairConfig, PairId,
    QualityReport, Resampling, Series, SeriesDiagnostics, SeriesKey, Span, UnresolvedGap,
    UnresolvedReason,
};

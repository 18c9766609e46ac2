//! ohlc-index turns per-exchange OHLC bar series for a trading pair into one
//! continuous, volume-weighted index series plus a quality report.
//!
//! Overview
//! - Each exchange series is validated, repaired, placed on a calendar shared
//!   by every exchange of the pair, gap-imputed and open/close aligned.
//! - The prepared series are merged into one bar per timestamp, weighting each
//!   exchange by its traded volume. Timestamps no exchange covers become
//!   index-level gaps.
//! - A [`QualityReport`] records coverage, imputed and unresolved gaps, open
//!   corrections, excluded exchanges and a per-exchange [`Attribution`].
//!
//! Key behaviors and trade-offs
//! - Imputation: only gaps up to `max_impute_len` bars with observed data on
//!   both sides are filled, using a per-field centered mean. Imputed bars carry
//!   zero volume and so never outweigh a real trade in the merge. Longer or
//!   open-ended gaps stay missing and are reported.
//! - Exclusion: a malformed, duplicated or unregistered series removes only
//!   that exchange. The pair fails only when nothing is left.
//! - Concurrency: [`IndexAssembler::assemble_concurrent`] and
//!   [`BatchBuilder`] run per-exchange stages on Tokio's blocking pool and join
//!   before merging; results match the synchronous path exactly.
//! - Determinism: exchanges are reduced in id order, so the same inputs in any
//!   order serialize to the same bytes.
//!
//! Examples
//! ```rust
//! use chrono::DateTime;
//! use ohlc_index::{Bar, IndexAssembler, Series};
//!
//! let t = |m: i64| DateTime::from_timestamp(m * 60, 0).unwrap();
//! let bar = |m, px: f64, v| Bar::new(t(m), px, px, px, px, v);
//! let a = Series::new("binance", "BTCUSD", vec![bar(0, 100.0, 3.0), bar(1, 101.0, 3.0)]);
//! let b = Series::new("kraken", "BTCUSD", vec![bar(0, 104.0, 1.0), bar(1, 105.0, 1.0)]);
//!
//! let assembler = IndexAssembler::builder().build()?;
//! let index = assembler.assemble("BTCUSD", vec![a, b])?;
//! assert_eq!(index.bars[0].close(), Some(101.0));
//! assert_eq!(index.bars[0].volume, 4.0);
//! assert_eq!(index.quality.total_bars, 2);
//! # Ok::<(), ohlc_index::IndexError>(())
//! ```
//!
//! Many pairs at once:
//! ```rust,ignore
//! let report = assembler
//!     .batch()
//!     .series(all_series)?
//!     .run()
//!     .await?;
//! for (pair, index) in &report.results {
//!     println!("{pair}: {} bars", index.bars.len());
//! }
//! ```
//!
//! See `ohlc-index/examples/` for a runnable end-to-end demonstration.
#![warn(missing_docs)]

mod assembler;
pub(crate) mod core;

pub use assembler::AssembledIndex;
pub use assembler::batch::{BatchBuilder, BatchReport};
pub use core::{IndexAssembler, IndexAssemblerBuilder};

// Re-export core types for convenience
pub use ohlc_index_core::{
    Attribution, Bar, BarField, BarFlags, Calendar, Discontinuity, ErrorContext, ExchangeConfig,
    ExchangeId, ExchangeQuality, ExcludedExchange, Gap, IndexBar, IndexConfig, IndexError,
    IndexWarning, Interval, MalformedReason, Ohlc, PairConfig, PairId, QualityReport,
    Resampling, Series, SeriesDiagnostics, SeriesKey, Span, UnresolvedGap, UnresolvedReason,
};

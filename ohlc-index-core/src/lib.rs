//! ohlc-index-core
//!
//! Pure algorithms behind the ohlc-index engine, plus re-exports of the shared types.
//!
//! - `types`: bars, series, calendars, configuration, errors and reports.
//! - `timeseries`: the per-exchange stages (calendar scan, gap imputation,
//!   open/close alignment), the cross-exchange volume-weighted merge, and
//!   resampling/diagnostic helpers.
//!
//! Every function here is synchronous and free of I/O. Stages take their input
//! by reference and return derived values, so independent exchanges can be
//! processed on separate threads without coordination.
#![warn(missing_docs)]

/// Time-series stages and helpers.
pub mod timeseries;
pub mod types;

pub use timeseries::align::{AlignOutcome, align_index, align_open_close};
pub use timeseries::calendar::{
    CalendarScan, scan_series, scan_series_within, shared_calendar, validate_series,
};
pub use timeseries::diagnostics::diagnose;
pub use timeseries::impute::{ImputeOutcome, ImputeParams, impute_gaps};
pub use timeseries::infer::estimate_step_seconds;
pub use timeseries::merge::{index_gaps, merge_volume_weighted};
pub use timeseries::resample::{resample_index, resample_series, resampled_interval};
pub use timeseries::util::{repair_envelopes, round_price};
pub use types::*;

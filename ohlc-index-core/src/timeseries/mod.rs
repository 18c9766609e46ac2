//! Time-series stages shared by the assembler.
//!
//! Modules include:
//! - `calendar`: validate a series and find its gaps against the expected grid
//! - `impute`: fill short interior gaps with a centered moving average
//! - `align`: snap each open to the preceding close
//! - `merge`: volume-weighted blend of many exchanges into one index
//! - `resample`: aggregate bars to a coarser cadence
//! - `diagnostics`: health summary of raw input
/// Open/close alignment.
pub mod align;
/// Calendar construction and gap detection.
pub mod calendar;
/// Raw input health checks.
pub mod diagnostics;
/// Centered-window gap imputation.
pub mod impute;
/// Cadence inference.
pub mod infer;
/// Volume-weighted cross-exchange merge.
pub mod merge;
/// Resampling to daily/weekly/hourly/minute buckets.
pub mod resample;
/// Small numeric and invariant helpers.
pub mod util;

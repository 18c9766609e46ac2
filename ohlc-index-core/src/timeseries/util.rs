//! Shared helpers for bar normalization and invariants.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::{BarFlags, Series};

/// Repair bars whose high/low do not bound their open and close.
///
/// Returns a derived series where every bar satisfies
/// `low <= min(open, close) <= max(open, close) <= high`, plus the number of
/// bars that needed widening. Repaired bars are flagged `RANGE_WIDENED`.
#[must_use]
pub fn repair_envelopes(series: &Series) -> (Series, usize) {
    let mut repaired = 0usize;
    let bars = series
        .bars
        .iter()
        .map(|b| {
            let mut out = *b;
            let mut p = out.ohlc();
            if p.widen_envelope() {
                out.set_ohlc(p);
                out.flags |= BarFlags::RANGE_WIDENED;
                repaired += 1;
            }
            out
        })
        .collect();
    (series.derive(bars), repaired)
}

/// Round `value` to `dp` decimal places, half away from zero.
///
/// Values outside the range of `Decimal` are returned unchanged.
///
/// ```
/// use ohlc_index_core::round_price;
/// assert_eq!(round_price(100.125, 2), 100.13);
/// assert_eq!(round_price(-0.5, 0), -1.0);
/// ```
#[must_use]
pub fn round_price(value: f64, dp: u32) -> f64 {
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

/// Arithmetic mean, `None` for an empty input.
pub(crate) fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, n) = values
        .into_iter()
        .fold((0.0_f64, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

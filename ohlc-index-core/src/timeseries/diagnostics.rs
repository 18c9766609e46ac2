use crate::timeseries::infer::estimate_step_seconds;
use crate::{Discontinuity, Interval, Series, SeriesDiagnostics};

/// Summarize the shape of a raw input series without rejecting anything.
///
/// Bars are inspected in the order supplied. A step between consecutive bars
/// that is neither `interval` nor zero counts as a discontinuity (backwards
/// steps included); a zero step counts as a duplicate timestamp. Envelope
/// counters only look at rows whose prices are all finite.
///
/// Used for the quality report of both accepted and excluded exchanges.
#[must_use]
pub fn diagnose(series: &Series, interval: Interval) -> SeriesDiagnostics {
    let mut d = SeriesDiagnostics {
        bars: series.bars.len(),
        first: series.bars.iter().map(|b| b.ts).min(),
        last: series.bars.iter().map(|b| b.ts).max(),
        cadence_secs: estimate_step_seconds(series.bars.iter().map(|b| b.ts)),
        ..SeriesDiagnostics::default()
    };

    let step = interval.as_delta();
    for w in series.bars.windows(2) {
        let delta = w[1].ts - w[0].ts;
        if delta.is_zero() {
            d.duplicate_timestamps += 1;
        } else if delta != step {
            let gap = Discontinuity {
                before: w[0].ts,
                after: w[1].ts,
            };
            d.first_discontinuity.get_or_insert(gap);
            d.last_discontinuity = Some(gap);
            d.discontinuities += 1;
        }
    }

    for b in &series.bars {
        if b.volume < 0.0 {
            d.negative_volume_rows += 1;
        }
        if b.first_non_finite().is_some() {
            d.non_finite_rows += 1;
            continue;
        }
        if b.high < b.open.max(b.close).max(b.low) {
            d.invalid_highs += 1;
        }
        if b.low > b.open.min(b.close).min(b.high) {
            d.invalid_lows += 1;
        }
    }
    d
}

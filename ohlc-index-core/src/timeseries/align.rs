use crate::{BarFlags, IndexBar, Interval, Series};

/// Result of [`align_open_close`].
#[derive(Debug, Clone, PartialEq)]
pub struct AlignOutcome {
    /// Derived series with corrected opens.
    pub series: Series,
    /// Bars whose open was rewritten.
    pub aligned: usize,
    /// Bars whose high or low had to move to contain the new open.
    pub widened: usize,
}

/// Snap each bar's open to the preceding bar's close.
///
/// Single pass in time order. A bar is corrected only when the bar exactly one
/// `interval` earlier exists and `|open - prev.close| > tolerance`; the first
/// bar and bars following a hole are left as they are. After correction the
/// high/low are widened to contain the new open. `close` and `volume` are never
/// modified.
///
/// ```
/// use chrono::DateTime;
/// use ohlc_index_core::{align_open_close, Bar, Interval, Series};
///
/// let t = |s| DateTime::from_timestamp(s, 0).unwrap();
/// let series = Series::new("a", "BTCUSD", vec![
///     Bar::new(t(0), 99.0, 101.0, 98.0, 100.0, 1.0),
///     Bar::new(t(60), 105.0, 107.0, 104.0, 106.0, 1.0),
/// ]);
/// let out = align_open_close(&series, Interval::M1, 0.01);
/// assert_eq!(out.series.bars[1].open, 100.0);
/// assert_eq!(out.series.bars[1].low, 100.0);
/// assert_eq!(out.series.bars[1].close, 106.0);
/// assert_eq!((out.aligned, out.widened), (1, 1));
/// ```
#[must_use]
pub fn align_open_close(series: &Series, interval: Interval, tolerance: f64) -> AlignOutcome {
    let mut bars = series.bars.clone();
    let mut aligned = 0usize;
    let mut widened = 0usize;
    let step = interval.as_delta();
    for i in 1..bars.len() {
        let prev = bars[i - 1];
        let cur = &mut bars[i];
        if cur.ts - prev.ts != step || (cur.open - prev.close).abs() <= tolerance {
            continue;
        }
        cur.open = prev.close;
        cur.flags |= BarFlags::OPEN_ALIGNED;
        aligned += 1;
        if cur.open > cur.high || cur.open < cur.low {
            cur.high = cur.high.max(cur.open);
            cur.low = cur.low.min(cur.open);
            cur.flags |= BarFlags::RANGE_WIDENED;
            widened += 1;
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        exchange = %series.exchange,
        pair = %series.pair,
        aligned,
        widened,
        "aligned opens"
    );

    AlignOutcome {
        series: series.derive(bars),
        aligned,
        widened,
    }
}

/// Apply the same open/close rule to a merged index, in place.
///
/// Only pairs of adjacent non-gap bars exactly one `interval` apart are
/// considered. Returns the number of opens rewritten.
pub fn align_index(bars: &mut [IndexBar], interval: Interval, tolerance: f64) -> usize {
    let step = interval.as_delta();
    let mut aligned = 0usize;
    for i in 1..bars.len() {
        let (head, tail) = bars.split_at_mut(i);
        let prev = &head[i - 1];
        let cur = &mut tail[0];
        let (Some(pp), Some(cp)) = (prev.prices, cur.prices.as_mut()) else {
            continue;
        };
        if cur.ts - prev.ts != step || (cp.open - pp.close).abs() <= tolerance {
            continue;
        }
        cp.open = pp.close;
        cp.high = cp.high.max(cp.open);
        cp.low = cp.low.min(cp.open);
        aligned += 1;
    }
    aligned
}

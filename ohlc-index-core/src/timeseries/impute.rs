use crate::timeseries::calendar::CalendarScan;
use crate::timeseries::util::{mean, round_price};
use crate::{
    Bar, BarFlags, Calendar, Gap, IndexConfig, Ohlc, PRICE_FIELDS, Series, UnresolvedGap,
    UnresolvedReason,
};

/// Settings for [`impute_gaps`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImputeParams {
    /// Longest gap, in bars, that may be filled.
    pub max_len: usize,
    /// Bars searched on each side of a missing timestamp.
    pub half_width: usize,
    /// Decimal places imputed prices are rounded to.
    pub precision: Option<u32>,
}

impl From<&IndexConfig> for ImputeParams {
    fn from(cfg: &IndexConfig) -> Self {
        Self {
            max_len: cfg.max_impute_len,
            half_width: cfg.impute_half_width(),
            precision: cfg.price_precision,
        }
    }
}

/// Result of [`impute_gaps`].
#[derive(Debug, Clone, PartialEq)]
pub struct ImputeOutcome {
    /// Observed bars plus imputed bars, in time order.
    pub series: Series,
    /// Gaps that were filled completely.
    pub resolved: Vec<Gap>,
    /// Gaps left untouched, with the reason.
    pub unresolved: Vec<UnresolvedGap>,
}

impl ImputeOutcome {
    /// Bars added by imputation.
    #[must_use]
    pub fn imputed_bars(&self) -> usize {
        self.resolved.iter().map(|g| g.len).sum()
    }
}

/// Fill short interior gaps with a centered moving average.
///
/// For each missing timestamp `t`, every price field is the mean of that field
/// over the observed bars within `half_width` steps of `t`. Imputed bars never
/// feed another imputation. Volume is set to zero and the bar is flagged
/// `IMPUTED`.
///
/// Each imputed price therefore lies within the low/high envelope of the
/// observed bars in its window, which can reach past the bars adjacent to the
/// gap when `half_width` is larger than one. With `half_width == 1` the bound
/// is exactly the two neighbours.
///
/// A gap stays unresolved, with no bar produced for any of its timestamps, when:
/// - it touches either end of the calendar (`OpenEnded`),
/// - it is longer than `max_len` (`TooLong`),
/// - any of its timestamps lacks an observed bar on one side within the window
///   (`InsufficientWindow`).
///
/// ```
/// use chrono::DateTime;
/// use ohlc_index_core::{impute_gaps, scan_series, Bar, ImputeParams, Interval, Series};
///
/// let bar = |s, px| Bar::new(DateTime::from_timestamp(s, 0).unwrap(), px, px, px, px, 10.0);
/// let series = Series::new("a", "BTCUSD", vec![bar(0, 100.0), bar(60, 102.0), bar(180, 106.0)]);
/// let scan = scan_series(&series, Interval::M1).unwrap();
/// let params = ImputeParams { max_len: 1, half_width: 1, precision: None };
/// let out = impute_gaps(&series, &scan, params);
/// let filled = out.series.bars[2];
/// assert!(filled.is_imputed());
/// assert_eq!(filled.close, 104.0);
/// assert_eq!(filled.volume, 0.0);
/// ```
#[must_use]
pub fn impute_gaps(series: &Series, scan: &CalendarScan, params: ImputeParams) -> ImputeOutcome {
    let cal = &scan.calendar;
    let mut grid: Vec<Option<Ohlc>> = vec![None; cal.len()];
    for b in series.bars.iter().filter(|b| !b.is_imputed()) {
        if let Some(i) = cal.index_of(b.ts) {
            grid[i] = Some(b.ohlc());
        }
    }

    let mut filled: Vec<Bar> = Vec::new();
    let mut resolved = Vec::new();
    let mut unresolved = Vec::new();
    for gap in &scan.gaps {
        let skip = if scan.is_open_ended(gap) {
            Some(UnresolvedReason::OpenEnded)
        } else if gap.len > params.max_len {
            Some(UnresolvedReason::TooLong {
                max: params.max_len,
            })
        } else {
            None
        };
        if let Some(reason) = skip {
            unresolved.push(UnresolvedGap { gap: *gap, reason });
            continue;
        }
        if let Some(bars) = fill_gap(cal, &grid, gap, params) {
            filled.extend(bars);
            resolved.push(*gap);
        } else {
            unresolved.push(UnresolvedGap {
                gap: *gap,
                reason: UnresolvedReason::InsufficientWindow,
            });
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        exchange = %series.exchange,
        pair = %series.pair,
        resolved = resolved.len(),
        unresolved = unresolved.len(),
        imputed_bars = filled.len(),
        "imputed gaps"
    );

    let mut bars = series.bars.clone();
    bars.extend(filled);
    bars.sort_by_key(|b| b.ts);
    ImputeOutcome {
        series: series.derive(bars),
        resolved,
        unresolved,
    }
}

/// Imputed bars for every timestamp of `gap`, or `None` if any one cannot be filled.
fn fill_gap(
    cal: &Calendar,
    grid: &[Option<Ohlc>],
    gap: &Gap,
    params: ImputeParams,
) -> Option<Vec<Bar>> {
    let first = cal.index_of(gap.start)?;
    let last_idx = grid.len().checked_sub(1)?;
    let mut out = Vec::with_capacity(gap.len);
    for i in first..first + gap.len {
        let lo = i.saturating_sub(params.half_width);
        let hi = i.saturating_add(params.half_width).min(last_idx);
        let before: Vec<Ohlc> = grid[lo..i].iter().flatten().copied().collect();
        let after: Vec<Ohlc> = grid[i + 1..=hi].iter().flatten().copied().collect();
        if before.is_empty() || after.is_empty() {
            return None;
        }

        let mut p = Ohlc::flat(0.0);
        for field in PRICE_FIELDS {
            let v = mean(
                before
                    .iter()
                    .chain(after.iter())
                    .filter_map(|o| o.get(field)),
            )?;
            p.set(field, params.precision.map_or(v, |dp| round_price(v, dp)));
        }
        p.widen_envelope();
        out.push(Bar::from_ohlc(cal.ts_at(i)?, p, 0.0, BarFlags::IMPUTED));
    }
    Some(out)
}

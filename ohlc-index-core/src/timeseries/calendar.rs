use chrono::{DateTime, Utc};

use crate::{Calendar, Gap, IndexError, Interval, MalformedReason, Series};

/// Calendar of a series together with its missing runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarScan {
    /// Expected timestamps.
    pub calendar: Calendar,
    /// Maximal runs of expected timestamps with no bar, in time order.
    pub gaps: Vec<Gap>,
}

impl CalendarScan {
    /// Total missing timestamps across all gaps.
    #[must_use]
    pub fn missing(&self) -> usize {
        self.gaps.iter().map(|g| g.len).sum()
    }

    /// True if `gap` touches either end of the calendar, leaving one side without data.
    #[must_use]
    pub fn is_open_ended(&self, gap: &Gap) -> bool {
        gap.start <= self.calendar.start || gap.end >= self.calendar.end
    }
}

/// Check a series against the ingestion contract.
///
/// Bars are checked in order; for each bar the numeric fields must be finite,
/// volume non-negative, the timestamp aligned to `interval` and strictly after
/// the previous one.
///
/// # Errors
/// Returns `MalformedSeries` naming the first offending bar, or `Empty` for a
/// series with no bars.
pub fn validate_series(series: &Series, interval: Interval) -> Result<(), IndexError> {
    let fail = |ts: Option<DateTime<Utc>>, reason: MalformedReason| {
        Err(IndexError::malformed(
            series.pair.clone(),
            series.exchange.clone(),
            ts,
            reason,
        ))
    };
    if series.is_empty() {
        return fail(None, MalformedReason::Empty);
    }
    let mut prev: Option<DateTime<Utc>> = None;
    for b in &series.bars {
        if let Some(field) = b.first_non_finite() {
            return fail(Some(b.ts), MalformedReason::NonFinite { field });
        }
        if b.volume < 0.0 {
            return fail(Some(b.ts), MalformedReason::NegativeVolume);
        }
        if !interval.is_aligned(b.ts) {
            return fail(Some(b.ts), MalformedReason::NotAligned { interval });
        }
        if let Some(p) = prev
            && b.ts <= p
        {
            return fail(Some(b.ts), MalformedReason::NotIncreasing { previous: p });
        }
        prev = Some(b.ts);
    }
    Ok(())
}

/// Build the calendar spanning a series' own first..last bar and list its gaps.
///
/// ```
/// use chrono::DateTime;
/// use ohlc_index_core::{scan_series, Bar, Interval, Series};
///
/// let bar = |s| Bar::new(DateTime::from_timestamp(s, 0).unwrap(), 1.0, 1.0, 1.0, 1.0, 1.0);
/// let series = Series::new("kraken", "BTCUSD", vec![bar(0), bar(60), bar(240)]);
/// let scan = scan_series(&series, Interval::M1).unwrap();
/// assert_eq!(scan.calendar.len(), 5);
/// assert_eq!(scan.gaps.len(), 1);
/// assert_eq!(scan.gaps[0].len, 2);
/// ```
///
/// # Errors
/// Returns `MalformedSeries` if the series fails [`validate_series`].
pub fn scan_series(series: &Series, interval: Interval) -> Result<CalendarScan, IndexError> {
    validate_series(series, interval)?;
    let (Some(first), Some(last)) = (series.first_ts(), series.last_ts()) else {
        return Err(IndexError::malformed(
            series.pair.clone(),
            series.exchange.clone(),
            None,
            MalformedReason::Empty,
        ));
    };
    let calendar = Calendar::new(first, last, interval)?;
    Ok(CalendarScan {
        calendar,
        gaps: interior_gaps(series, interval),
    })
}

/// Like [`scan_series`], but against an enclosing calendar shared by several exchanges.
///
/// Expected timestamps before the first bar or after the last bar become
/// leading/trailing gaps; these are open-ended.
///
/// # Errors
/// - `MalformedSeries` if the series fails [`validate_series`].
/// - `InvalidArg` if `span` does not cover the series.
pub fn scan_series_within(series: &Series, span: &Calendar) -> Result<CalendarScan, IndexError> {
    let interval = span.interval;
    validate_series(series, interval)?;
    let (Some(first), Some(last)) = (series.first_ts(), series.last_ts()) else {
        return Err(IndexError::malformed(
            series.pair.clone(),
            series.exchange.clone(),
            None,
            MalformedReason::Empty,
        ));
    };
    if first < span.start || last > span.end {
        return Err(IndexError::InvalidArg(format!(
            "series {} spans {first}..{last}, outside calendar {}..{}",
            series.key(),
            span.start,
            span.end
        )));
    }

    let mut gaps = Vec::new();
    if first > span.start {
        gaps.push(missing_run(span.start, first - interval.as_delta(), interval));
    }
    gaps.extend(interior_gaps(series, interval));
    if last < span.end {
        gaps.push(missing_run(last + interval.as_delta(), span.end, interval));
    }
    Ok(CalendarScan {
        calendar: *span,
        gaps,
    })
}

/// Smallest calendar covering every series.
///
/// Series are assumed valid; use [`validate_series`] first.
///
/// # Errors
/// Returns `InvalidArg` if `series` is empty or holds only empty series.
pub fn shared_calendar<'a, I>(series: I, interval: Interval) -> Result<Calendar, IndexError>
where
    I: IntoIterator<Item = &'a Series>,
{
    let mut bounds: Option<(DateTime<Utc>, DateTime<Utc>)> = None;
    for s in series {
        if let (Some(first), Some(last)) = (s.first_ts(), s.last_ts()) {
            bounds = Some(match bounds {
                None => (first, last),
                Some((lo, hi)) => (lo.min(first), hi.max(last)),
            });
        }
    }
    let (start, end) =
        bounds.ok_or_else(|| IndexError::InvalidArg("no bars to build a calendar from".into()))?;
    Calendar::new(start, end, interval)
}

fn interior_gaps(series: &Series, interval: Interval) -> Vec<Gap> {
    series
        .bars
        .windows(2)
        .filter_map(|w| {
            let steps = interval.steps_between(w[0].ts, w[1].ts);
            (steps > 1).then(|| {
                missing_run(
                    w[0].ts + interval.as_delta(),
                    w[1].ts - interval.as_delta(),
                    interval,
                )
            })
        })
        .collect()
}

/// Gap covering `[first_missing, last_missing]` inclusive.
fn missing_run(
    first_missing: DateTime<Utc>,
    last_missing: DateTime<Utc>,
    interval: Interval,
) -> Gap {
    let len = interval.steps_between(first_missing, last_missing) + 1;
    Gap {
        start: first_missing,
        end: last_missing,
        len: usize::try_from(len).unwrap_or(0),
    }
}

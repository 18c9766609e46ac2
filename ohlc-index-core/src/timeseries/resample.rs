use chrono::offset::LocalResult;
use chrono::offset::Offset;
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Utc};
use std::collections::BTreeSet;

use crate::{Bar, BarFlags, ExchangeId, IndexBar, IndexError, Interval, Ohlc, Resampling, Series};

const DAY: i64 = 86_400;

const fn week_start_day(day: i64) -> i64 {
    day - ((day + 3).rem_euclid(7))
}

/// Items that can be folded into time buckets.
///
/// `start` opens a bucket from an item, `absorb` folds a later item into it and
/// `finish` emits the aggregated item stamped at the bucket start. Items for
/// which `start` yields `None` never open a bucket.
trait Bucketed: Sized {
    type Acc;
    fn ts(&self) -> DateTime<Utc>;
    fn start(&self) -> Option<Self::Acc>;
    fn absorb(acc: &mut Self::Acc, item: &Self);
    fn finish(bucket: DateTime<Utc>, acc: Self::Acc) -> Self;
}

struct BarAgg {
    p: Ohlc,
    volume: f64,
    flags: BarFlags,
    all_imputed: bool,
}

impl Bucketed for Bar {
    type Acc = BarAgg;

    fn ts(&self) -> DateTime<Utc> {
        self.ts
    }

    fn start(&self) -> Option<BarAgg> {
        Some(BarAgg {
            p: self.ohlc(),
            volume: self.volume,
            flags: self.flags,
            all_imputed: self.is_imputed(),
        })
    }

    fn absorb(acc: &mut BarAgg, b: &Self) {
        acc.p.high = acc.p.high.max(b.high);
        acc.p.low = acc.p.low.min(b.low);
        acc.p.close = b.close;
        acc.volume += b.volume;
        acc.flags |= b.flags;
        acc.all_imputed &= b.is_imputed();
    }

    fn finish(bucket: DateTime<Utc>, acc: BarAgg) -> Self {
        let mut flags = acc.flags;
        flags.set(BarFlags::IMPUTED, acc.all_imputed);
        Self::from_ohlc(bucket, acc.p, acc.volume, flags)
    }
}

struct IndexAgg {
    p: Ohlc,
    volume: f64,
    contributing: BTreeSet<ExchangeId>,
    all_imputed: bool,
}

impl Bucketed for IndexBar {
    type Acc = IndexAgg;

    fn ts(&self) -> DateTime<Utc> {
        self.ts
    }

    fn start(&self) -> Option<IndexAgg> {
        self.prices.map(|p| IndexAgg {
            p,
            volume: self.volume,
            contributing: self.contributing.clone(),
            all_imputed: self.is_imputed,
        })
    }

    fn absorb(acc: &mut IndexAgg, b: &Self) {
        let Some(p) = b.prices else {
            return;
        };
        acc.p.high = acc.p.high.max(p.high);
        acc.p.low = acc.p.low.min(p.low);
        acc.p.close = p.close;
        acc.volume += b.volume;
        acc.contributing.extend(b.contributing.iter().cloned());
        acc.all_imputed &= b.is_imputed;
    }

    fn finish(bucket: DateTime<Utc>, acc: IndexAgg) -> Self {
        Self {
            ts: bucket,
            prices: Some(acc.p),
            volume: acc.volume,
            contributing: acc.contributing,
            is_imputed: acc.all_imputed,
        }
    }
}

/// Generic resampler that groups time-ordered items by a bucket function and
/// aggregates within each bucket.
fn resample_by<T, F>(items: &[T], bucket_of: F) -> Vec<T>
where
    T: Bucketed,
    F: Fn(DateTime<Utc>) -> Option<DateTime<Utc>>,
{
    let mut out: Vec<T> = Vec::new();
    let mut cur: Option<(DateTime<Utc>, T::Acc)> = None;
    for item in items {
        let Some(bucket) = bucket_of(item.ts()) else {
            continue;
        };
        if let Some((b, acc)) = cur.as_mut()
            && *b == bucket
        {
            T::absorb(acc, item);
            continue;
        }
        let Some(acc) = item.start() else {
            continue;
        };
        if let Some((b, prev)) = cur.replace((bucket, acc)) {
            out.push(T::finish(b, prev));
        }
    }
    if let Some((b, acc)) = cur {
        out.push(T::finish(b, acc));
    }
    out
}

fn local_midnight_utc_for_date(
    ts: DateTime<Utc>,
    date: NaiveDate,
    tz: chrono_tz::Tz,
) -> Option<DateTime<Utc>> {
    let naive_midnight = date.and_hms_opt(0, 0, 0)?;
    match tz.from_local_datetime(&naive_midnight) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(dt1, _) => Some(dt1.with_timezone(&Utc)),
        LocalResult::None => {
            // Midnight skipped by a DST jump: use the UTC day start.
            let day = ts.timestamp().div_euclid(DAY);
            DateTime::from_timestamp(day * DAY, 0)
        }
    }
}

fn bucket_day(ts: DateTime<Utc>, tz: Option<chrono_tz::Tz>) -> Option<DateTime<Utc>> {
    let Some(tz) = tz else {
        let day = ts.timestamp().div_euclid(DAY);
        return DateTime::from_timestamp(day * DAY, 0);
    };
    let local = ts.with_timezone(&tz);
    local_midnight_utc_for_date(ts, local.date_naive(), tz)
}

fn bucket_week(ts: DateTime<Utc>, tz: Option<chrono_tz::Tz>) -> Option<DateTime<Utc>> {
    let Some(tz) = tz else {
        let ws = week_start_day(ts.timestamp().div_euclid(DAY));
        return DateTime::from_timestamp(ws * DAY, 0);
    };
    let local = ts.with_timezone(&tz);
    let date = local.date_naive();
    let days_from_monday = i64::from(local.weekday().num_days_from_monday());
    let week_start_date = date
        .checked_sub_signed(chrono::Duration::days(days_from_monday))
        .unwrap_or(date);
    local_midnight_utc_for_date(ts, week_start_date, tz)
}

fn bucket_minutes(
    ts: DateTime<Utc>,
    minutes: i64,
    tz: Option<chrono_tz::Tz>,
) -> Option<DateTime<Utc>> {
    let step = minutes * 60;
    let Some(tz) = tz else {
        let bucket = ts.timestamp() - ts.timestamp().rem_euclid(step);
        return DateTime::from_timestamp(bucket, 0);
    };
    let local = ts.with_timezone(&tz);
    let date = local.date_naive();
    let seconds_since_midnight = i64::from(local.num_seconds_from_midnight());
    let bucket_sec = seconds_since_midnight - seconds_since_midnight.rem_euclid(step);
    let naive_midnight = date.and_hms_opt(0, 0, 0)?;
    let local_bucket_naive = naive_midnight + chrono::Duration::seconds(bucket_sec);
    match tz.from_local_datetime(&local_bucket_naive) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(dt1, dt2) => {
            // Keep the mapping whose offset matches `ts` so the repeated hour
            // after a fall-back transition yields distinct buckets.
            let local_offset = local.offset().fix().local_minus_utc();
            let dt1_offset = dt1.offset().fix().local_minus_utc();
            if dt1_offset == local_offset {
                Some(dt1.with_timezone(&Utc))
            } else {
                Some(dt2.with_timezone(&Utc))
            }
        }
        LocalResult::None => {
            let bucket = ts.timestamp() - ts.timestamp().rem_euclid(step);
            DateTime::from_timestamp(bucket, 0)
        }
    }
}

fn resample_items<T: Bucketed>(
    items: &[T],
    mode: Resampling,
    tz: Option<chrono_tz::Tz>,
) -> Result<Option<Vec<T>>, IndexError> {
    let out = match mode {
        Resampling::None => return Ok(None),
        Resampling::Minutes(0) => {
            return Err(IndexError::InvalidArg(
                "resample minutes must be positive".into(),
            ));
        }
        Resampling::Minutes(m) => resample_by(items, |ts| bucket_minutes(ts, i64::from(m), tz)),
        Resampling::Hourly => resample_by(items, |ts| bucket_minutes(ts, 60, tz)),
        Resampling::Daily => resample_by(items, |ts| bucket_day(ts, tz)),
        Resampling::Weekly => resample_by(items, |ts| bucket_week(ts, tz)),
    };
    Ok(Some(out))
}

/// Nominal interval after resampling from `base`.
///
/// # Errors
/// Returns `InvalidArg` for `Minutes(0)`, or when the target is finer than
/// `base` or not a whole multiple of it.
pub fn resampled_interval(base: Interval, mode: Resampling) -> Result<Interval, IndexError> {
    mode.coarsen(base)
}

/// Resample an exchange series to a coarser cadence.
///
/// - Open = first open in the bucket, High = max high, Low = min low,
///   Close = last close, Volume = sum.
/// - The output bar is stamped at the bucket start (local midnight or local
///   minute boundary when `tz` is given, UTC otherwise; weeks start Monday).
/// - A bucket is flagged `IMPUTED` only if every input bar was imputed; other
///   flags are unioned.
///
/// `Resampling::None` returns the series unchanged.
///
/// # Errors
/// Returns `InvalidArg` for `Minutes(0)`.
pub fn resample_series(
    series: &Series,
    mode: Resampling,
    tz: Option<chrono_tz::Tz>,
) -> Result<Series, IndexError> {
    Ok(resample_items(&series.bars, mode, tz)?
        .map_or_else(|| series.clone(), |bars| series.derive(bars)))
}

/// Resample a merged index to a coarser cadence.
///
/// Same aggregation rules as [`resample_series`]. Index-level gap bars are
/// ignored, so a bucket containing only gaps produces no output bar. The
/// contributing set of a bucket is the union of its inputs and it is imputed
/// only if every non-gap input was.
///
/// ```
/// use std::collections::BTreeSet;
/// use chrono::DateTime;
/// use ohlc_index_core::{resample_index, ExchangeId, IndexBar, Ohlc, Resampling};
///
/// let t = |s| DateTime::from_timestamp(s, 0).unwrap();
/// let bar = |s, px: f64, v: f64| IndexBar {
///     ts: t(s),
///     prices: Some(Ohlc::flat(px)),
///     volume: v,
///     contributing: BTreeSet::from([ExchangeId::new("a")]),
///     is_imputed: false,
/// };
/// let bars = vec![bar(0, 10.0, 1.0), IndexBar::gap(t(1_800)), bar(3_540, 12.0, 2.0), bar(3_600, 9.0, 1.0)];
/// let hourly = resample_index(&bars, Resampling::Hourly, None).unwrap();
/// assert_eq!(hourly.len(), 2);
/// let p = hourly[0].prices.unwrap();
/// assert_eq!((p.open, p.high, p.close), (10.0, 12.0, 12.0));
/// assert_eq!(hourly[0].volume, 3.0);
/// ```
///
/// # Errors
/// Returns `InvalidArg` for `Minutes(0)`.
pub fn resample_index(
    bars: &[IndexBar],
    mode: Resampling,
    tz: Option<chrono_tz::Tz>,
) -> Result<Vec<IndexBar>, IndexError> {
    Ok(resample_items(bars, mode, tz)?.unwrap_or_else(|| bars.to_vec()))
}

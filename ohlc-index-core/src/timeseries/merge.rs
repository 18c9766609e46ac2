use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::{Bar, Calendar, ExchangeId, Gap, IndexBar, IndexError, Ohlc, PRICE_FIELDS, Series};

/// Blend per-exchange series into one index bar per calendar timestamp.
///
/// At each timestamp `t`, with `P(t)` the exchanges holding a bar at `t` and
/// `E(t)` those of them with positive volume:
/// - `E(t)` non-empty: every price is the volume-weighted mean over `E(t)`, the
///   volume is the sum, and `contributing = E(t)`.
/// - `E(t)` empty but `P(t)` not: unweighted mean over the observed zero-volume
///   bars, or over the imputed bars if none were observed; volume is zero and
///   `is_imputed` is set when only imputed bars were averaged.
/// - `P(t)` empty: an index-level gap.
///
/// Series are reduced in exchange id order so the result does not depend on
/// the order they are passed in.
///
/// # Errors
/// Returns `InvalidArg` if two series share an exchange, or a bar is not on `calendar`.
pub fn merge_volume_weighted(
    calendar: &Calendar,
    series: &[Series],
) -> Result<Vec<IndexBar>, IndexError> {
    let mut ordered: Vec<&Series> = series.iter().collect();
    ordered.sort_by(|a, b| a.exchange.cmp(&b.exchange));
    for w in ordered.windows(2) {
        if w[0].exchange == w[1].exchange {
            return Err(IndexError::InvalidArg(format!(
                "exchange {} supplied twice to merge",
                w[0].exchange
            )));
        }
    }

    let mut cursors = vec![0usize; ordered.len()];
    let mut out = Vec::with_capacity(calendar.len());
    let mut present: Vec<(&ExchangeId, &Bar)> = Vec::with_capacity(ordered.len());
    for ts in calendar.iter() {
        present.clear();
        for (s, cur) in ordered.iter().zip(cursors.iter_mut()) {
            let Some(b) = s.bars.get(*cur) else {
                continue;
            };
            if b.ts < ts {
                return Err(off_calendar(s, b, calendar));
            }
            if b.ts == ts {
                present.push((&s.exchange, b));
                *cur += 1;
            }
        }
        out.push(blend(ts, &present));
    }
    for (s, cur) in ordered.iter().zip(cursors.iter()) {
        if let Some(b) = s.bars.get(*cur) {
            return Err(off_calendar(s, b, calendar));
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        exchanges = ordered.len(),
        bars = out.len(),
        gaps = out.iter().filter(|b| b.is_gap()).count(),
        "merged index"
    );

    Ok(out)
}

fn off_calendar(s: &Series, b: &Bar, calendar: &Calendar) -> IndexError {
    IndexError::InvalidArg(format!(
        "bar {} of {} is not on calendar {}..{} every {}",
        b.ts.to_rfc3339(),
        s.key(),
        calendar.start.to_rfc3339(),
        calendar.end.to_rfc3339(),
        calendar.interval
    ))
}

fn blend(ts: DateTime<Utc>, present: &[(&ExchangeId, &Bar)]) -> IndexBar {
    let traded: Vec<&(&ExchangeId, &Bar)> =
        present.iter().filter(|(_, b)| b.volume > 0.0).collect();
    if !traded.is_empty() {
        let scale = weight_scale(traded.iter().map(|(_, b)| b.volume));
        let denom: f64 = traded.iter().map(|(_, b)| b.volume * scale).sum();
        let mut p = Ohlc::flat(0.0);
        for field in PRICE_FIELDS {
            let num: f64 = traded
                .iter()
                .map(|(_, b)| b.volume * scale * b.get(field))
                .sum();
            p.set(field, num / denom);
        }
        p.widen_envelope();
        let total: f64 = traded.iter().map(|(_, b)| b.volume).sum();
        return IndexBar {
            ts,
            prices: Some(p),
            volume: total.min(f64::MAX),
            contributing: traded.iter().map(|(ex, _)| (*ex).clone()).collect(),
            is_imputed: false,
        };
    }

    let observed: Vec<&(&ExchangeId, &Bar)> =
        present.iter().filter(|(_, b)| !b.is_imputed()).collect();
    let (pool, is_imputed) = if observed.is_empty() {
        (present.iter().collect::<Vec<_>>(), true)
    } else {
        (observed, false)
    };
    if pool.is_empty() {
        return IndexBar::gap(ts);
    }

    let n = pool.len() as f64;
    let mut p = Ohlc::flat(0.0);
    for field in PRICE_FIELDS {
        p.set(field, pool.iter().map(|(_, b)| b.get(field)).sum::<f64>() / n);
    }
    p.widen_envelope();
    IndexBar {
        ts,
        prices: Some(p),
        volume: 0.0,
        contributing: pool.iter().map(|(ex, _)| (*ex).clone()).collect::<BTreeSet<_>>(),
        is_imputed,
    }
}

/// Power of two that brings the largest volume into `[1, 2)`.
///
/// Scaling by a power of two is exact, so weighted sums cannot overflow while
/// results for ordinary volumes stay bit-identical to the unscaled sums.
fn weight_scale(volumes: impl Iterator<Item = f64>) -> f64 {
    let max = volumes.fold(0.0f64, f64::max);
    if max <= 0.0 || !max.is_finite() {
        return 1.0;
    }
    let exp = (max.log2().floor() as i32).clamp(-1022, 1023);
    2.0f64.powi(-exp)
}

/// Maximal runs of index-level gap bars.
///
/// `bars` must be in time order, one per calendar step.
#[must_use]
pub fn index_gaps(bars: &[IndexBar]) -> Vec<Gap> {
    let mut out: Vec<Gap> = Vec::new();
    let mut run: Option<Gap> = None;
    for b in bars {
        if b.is_gap() {
            run = Some(match run {
                Some(g) => Gap {
                    end: b.ts,
                    len: g.len + 1,
                    ..g
                },
                None => Gap {
                    start: b.ts,
                    end: b.ts,
                    len: 1,
                },
            });
        } else if let Some(g) = run.take() {
            out.push(g);
        }
    }
    out.extend(run);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BarFlags, Interval};

    fn t(sec: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(sec, 0).unwrap()
    }

    #[test]
    fn zero_volume_everywhere_falls_back_to_plain_mean() {
        let cal = Calendar::new(t(0), t(0), Interval::M1).unwrap();
        let a = Series::new("a", "X", vec![Bar::new(t(0), 10.0, 10.0, 10.0, 10.0, 0.0)]);
        let b = Series::new("b", "X", vec![Bar::new(t(0), 20.0, 20.0, 20.0, 20.0, 0.0)]);
        let out = merge_volume_weighted(&cal, &[a, b]).unwrap();
        assert_eq!(out[0].close(), Some(15.0));
        assert_eq!(out[0].volume, 0.0);
        assert_eq!(out[0].contributing.len(), 2);
        assert!(!out[0].is_imputed);
    }

    #[test]
    fn imputed_only_is_marked() {
        let cal = Calendar::new(t(0), t(0), Interval::M1).unwrap();
        let mut bar = Bar::new(t(0), 10.0, 10.0, 10.0, 10.0, 0.0);
        bar.flags = BarFlags::IMPUTED;
        let a = Series::new("a", "X", vec![bar]);
        let out = merge_volume_weighted(&cal, &[a]).unwrap();
        assert!(out[0].is_imputed);
        assert!(!out[0].is_gap());
    }

    #[test]
    fn off_grid_bar_is_rejected() {
        let cal = Calendar::new(t(0), t(120), Interval::M1).unwrap();
        let a = Series::new("a", "X", vec![Bar::new(t(30), 1.0, 1.0, 1.0, 1.0, 1.0)]);
        assert!(merge_volume_weighted(&cal, &[a]).is_err());
        let late = Series::new("a", "X", vec![Bar::new(t(180), 1.0, 1.0, 1.0, 1.0, 1.0)]);
        assert!(merge_volume_weighted(&cal, &[late]).is_err());
    }

    #[test]
    fn gap_runs_are_grouped() {
        let cal = Calendar::new(t(0), t(240), Interval::M1).unwrap();
        let a = Series::new(
            "a",
            "X",
            vec![
                Bar::new(t(0), 1.0, 1.0, 1.0, 1.0, 1.0),
                Bar::new(t(180), 1.0, 1.0, 1.0, 1.0, 1.0),
            ],
        );
        let out = merge_volume_weighted(&cal, &[a]).unwrap();
        let gaps = index_gaps(&out);
        assert_eq!(gaps.len(), 2);
        assert_eq!((gaps[0].start, gaps[0].end, gaps[0].len), (t(60), t(120), 2));
        assert_eq!((gaps[1].start, gaps[1].len), (t(240), 1));
    }
}

use chrono::{DateTime, TimeDelta, Utc};

/// Estimate a representative step (in seconds) from positive adjacent timestamp
/// deltas.
///
/// Prefer the mode (most frequent positive delta); if there is no unique mode,
/// return the lower median.
///
/// Unique mode (60s):
///
/// ```
/// use chrono::DateTime;
/// use ohlc_index_core::estimate_step_seconds;
///
/// // Adjacent deltas: 60,60,60,120,180  => unique mode is 60
/// let ts = [0, 60, 120, 180, 300, 480].map(|s| DateTime::from_timestamp(s, 0).unwrap());
/// assert_eq!(estimate_step_seconds(ts), Some(60));
/// ```
///
/// No unique mode: fall back to lower median (60s):
///
/// ```
/// use chrono::DateTime;
/// use ohlc_index_core::estimate_step_seconds;
///
/// // Adjacent deltas: 60,60,120,120  => lower median is 60
/// let ts = [0, 60, 120, 240, 360].map(|s| DateTime::from_timestamp(s, 0).unwrap());
/// assert_eq!(estimate_step_seconds(ts), Some(60));
/// ```
///
/// The input order does not matter; duplicates are ignored. Returns `None` if
/// fewer than two distinct timestamps are present.
#[must_use]
pub fn estimate_step_seconds<I>(timestamps: I) -> Option<i64>
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let mut ts: Vec<DateTime<Utc>> = timestamps.into_iter().collect();
    if ts.len() < 2 {
        return None;
    }
    ts.sort_unstable();

    let mut deltas: Vec<i64> = Vec::with_capacity(ts.len().saturating_sub(1));
    let mut last = ts[0];
    for cur in ts.into_iter().skip(1) {
        let dt: TimeDelta = cur - last;
        if dt > TimeDelta::zero() {
            deltas.push(dt.num_seconds());
            last = cur;
        }
    }
    if deltas.is_empty() {
        return None;
    }
    deltas.sort_unstable();

    let mut best_delta: i64 = deltas[0];
    let mut best_count: usize = 0;
    let mut num_best_candidates: usize = 0;

    let mut cur_delta: i64 = deltas[0];
    let mut cur_count: usize = 1;
    for &d in deltas.iter().skip(1) {
        if d == cur_delta {
            cur_count += 1;
            continue;
        }
        if cur_count > best_count {
            best_count = cur_count;
            best_delta = cur_delta;
            num_best_candidates = 1;
        } else if cur_count == best_count {
            num_best_candidates = num_best_candidates.saturating_add(1);
        }
        cur_delta = d;
        cur_count = 1;
    }
    if cur_count > best_count {
        best_delta = cur_delta;
        num_best_candidates = 1;
    } else if cur_count == best_count {
        num_best_candidates = num_best_candidates.saturating_add(1);
    }

    if num_best_candidates == 1 {
        return Some(best_delta);
    }

    // Lower median
    let mid = deltas.len() / 2;
    if deltas.len() % 2 == 1 {
        Some(deltas[mid])
    } else {
        Some(deltas[mid - 1])
    }
}

//! Small hand-written inputs on a one-minute grid starting 2024-01-01T00:00Z.

use chrono::{DateTime, TimeDelta, Utc};
use ohlc_index_core::{Bar, Series};

/// Pair used by every scenario.
pub const PAIR: &str = "BTCUSD";

/// Timestamp of minute `m` of the scenario grid.
#[must_use]
pub fn minute(m: i64) -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(1_704_067_200 + m * 60)
}

fn flat(m: i64, px: f64, volume: f64) -> Bar {
    Bar::new(minute(m), px, px, px, px, volume)
}

/// Exchange `a` trades 10 per bar at minutes 0, 1 and 3; exchange `b` trades 1
/// per bar at minutes 0 through 3.
///
/// With `max_impute_len = 1` and `impute_window = 2`, `a`'s minute 2 is imputed
/// at 104 and carries no volume, so the index at minute 2 is `b`'s bar alone.
#[must_use]
pub fn imputed_bar_carries_no_weight() -> Vec<Series> {
    vec![
        Series::new(
            "a",
            PAIR,
            vec![flat(0, 100.0, 10.0), flat(1, 102.0, 10.0), flat(3, 106.0, 10.0)],
        ),
        Series::new(
            "b",
            PAIR,
            vec![
                flat(0, 101.0, 1.0),
                flat(1, 103.0, 1.0),
                flat(2, 105.0, 1.0),
                flat(3, 107.0, 1.0),
            ],
        ),
    ]
}

/// One exchange whose second bar opens at 105 after a close of 100.
#[must_use]
pub fn open_jump() -> Vec<Series> {
    vec![Series::new(
        "a",
        PAIR,
        vec![
            Bar::new(minute(0), 99.0, 101.0, 98.0, 100.0, 5.0),
            Bar::new(minute(1), 105.0, 108.0, 104.0, 107.0, 5.0),
            Bar::new(minute(2), 107.0, 109.0, 106.0, 108.0, 5.0),
        ],
    )]
}

/// Exchange `a` is silent for minutes 1 through 5; exchange `b` stops after
/// minute 2. Minutes 3 through 5 have no data anywhere.
#[must_use]
pub fn long_outage() -> Vec<Series> {
    vec![
        Series::new(
            "a",
            PAIR,
            vec![flat(0, 100.0, 2.0), flat(6, 106.0, 2.0), flat(7, 107.0, 2.0)],
        ),
        Series::new(
            "b",
            PAIR,
            vec![flat(0, 100.5, 1.0), flat(1, 101.5, 1.0), flat(2, 102.5, 1.0)],
        ),
    ]
}

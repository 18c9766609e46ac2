//! Deterministic fixture series for CI-safe tests and examples.
//!
//! - [`RandomWalk`] generates correlated per-exchange series from a seed.
//! - [`by_pair`] returns canned multi-exchange inputs with realistic holes.
//! - [`scenarios`] holds small hand-written inputs with known expected output.

use chrono::{DateTime, Utc};
use ohlc_index_core::{Bar, Interval, Series};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

mod fixtures;

pub use fixtures::scenarios;

/// Seeded random-walk market shared by several exchanges.
///
/// Every exchange follows the same mid-price path with its own noise, so the
/// series are correlated like real venues quoting one pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomWalk {
    /// Timestamp of the first bar; should be aligned to `interval`.
    pub start: DateTime<Utc>,
    /// Bar duration.
    pub interval: Interval,
    /// Bars per exchange.
    pub bars: usize,
    /// Starting mid price.
    pub price: f64,
    /// Largest relative move of the mid price per bar.
    pub volatility: f64,
    /// Average volume per bar on the first exchange; later exchanges trade less.
    pub volume: f64,
}

impl RandomWalk {
    /// Walk of `bars` bars from `start`, at 100.0 with 0.2% moves and volume 10.
    #[must_use]
    pub const fn new(start: DateTime<Utc>, interval: Interval, bars: usize) -> Self {
        Self {
            start,
            interval,
            bars,
            price: 100.0,
            volatility: 0.002,
            volume: 10.0,
        }
    }

    /// Set the starting mid price.
    #[must_use]
    pub const fn price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    /// Set the per-bar relative move bound.
    #[must_use]
    pub const fn volatility(mut self, volatility: f64) -> Self {
        self.volatility = volatility;
        self
    }

    /// Set the average volume of the first exchange.
    #[must_use]
    pub const fn volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    /// One gap-free series per exchange, identical for identical arguments.
    #[must_use]
    pub fn generate(&self, exchanges: &[&str], pair: &str, seed: u64) -> Vec<Series> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut mid = Vec::with_capacity(self.bars + 1);
        let mut px = self.price;
        for _ in 0..=self.bars {
            mid.push(px);
            px *= 1.0 + self.volatility * rng.random_range(-1.0..=1.0);
        }

        exchanges
            .iter()
            .enumerate()
            .map(|(k, exchange)| {
                let mut rng = StdRng::seed_from_u64(seed ^ ((k as u64 + 1) << 32));
                let share = self.volume / (k as f64 + 1.0);
                let noise = self.price * self.volatility * 0.25;
                let bars = mid
                    .windows(2)
                    .enumerate()
                    .filter_map(|(i, w)| {
                        let ts = self.interval.offset(self.start, i64::try_from(i).ok()?)?;
                        let open = w[0] + noise * rng.random_range(-1.0..=1.0);
                        let close = w[1] + noise * rng.random_range(-1.0..=1.0);
                        let high = open.max(close) + noise * rng.random_range(0.0..=1.0);
                        let low = open.min(close) - noise * rng.random_range(0.0..=1.0);
                        let volume = share * rng.random_range(0.5..=1.5);
                        Some(Bar::new(ts, open, high, low, close, volume))
                    })
                    .collect();
                Series::new(*exchange, pair, bars)
            })
            .collect()
    }
}

/// Remove `len` bars starting at position `from`, leaving a gap.
#[must_use]
pub fn drop_range(series: &Series, from: usize, len: usize) -> Series {
    let bars = series
        .bars
        .iter()
        .enumerate()
        .filter(|(i, _)| *i < from || *i >= from.saturating_add(len))
        .map(|(_, b)| *b)
        .collect();
    series.derive(bars)
}

/// Canned inputs for a pair, or `None` for an unknown pair.
///
/// - `BTCUSD`: binance (complete), coinbase (2-bar hole), kraken (6-bar hole
///   and a late start), 120 one-minute bars from 2024-01-01.
/// - `ETHUSD`: binance and kraken, complete, 60 bars.
#[must_use]
pub fn by_pair(pair: &str) -> Option<Vec<Series>> {
    let start = DateTime::from_timestamp(1_704_067_200, 0)?;
    match pair {
        "BTCUSD" => {
            let mut s = RandomWalk::new(start, Interval::M1, 120)
                .price(42_000.0)
                .generate(&["binance", "coinbase", "kraken"], pair, 7);
            s[1] = drop_range(&s[1], 30, 2);
            s[2] = drop_range(&drop_range(&s[2], 70, 6), 0, 5);
            Some(s)
        }
        "ETHUSD" => Some(
            RandomWalk::new(start, Interval::M1, 60)
                .price(2_300.0)
                .volume(50.0)
                .generate(&["binance", "kraken"], pair, 11),
        ),
        _ => None,
    }
}

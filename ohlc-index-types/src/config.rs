//! Configuration for the index engine and its exchange registry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::IndexError;
use crate::ids::{ExchangeId, PairId};
use crate::interval::Interval;

/// Forced resampling mode for the assembled index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Resampling {
    /// Keep the base interval.
    #[default]
    None,
    /// Resample to buckets of this many minutes.
    Minutes(u32),
    /// Resample to hourly cadence.
    Hourly,
    /// Resample to daily cadence.
    Daily,
    /// Resample to weekly cadence (weeks start Monday).
    Weekly,
}

impl Resampling {
    /// Bucket width for this mode, `None` when the base interval is kept.
    ///
    /// # Errors
    /// Returns `InvalidArg` for `Minutes(0)`.
    pub fn target(self) -> Result<Option<Interval>, IndexError> {
        match self {
            Self::None => Ok(None),
            Self::Minutes(m) => Interval::minutes(m).map(Some),
            Self::Hourly => Ok(Some(Interval::H1)),
            Self::Daily => Ok(Some(Interval::D1)),
            Self::Weekly => Ok(Some(Interval::W1)),
        }
    }

    /// Interval of bars resampled from `base`.
    ///
    /// # Errors
    /// Returns `InvalidArg` for `Minutes(0)`, or when the target is not a whole
    /// multiple of `base` (which includes every target finer than `base`).
    pub fn coarsen(self, base: Interval) -> Result<Interval, IndexError> {
        let Some(target) = self.target()? else {
            return Ok(base);
        };
        if target.secs() % base.secs() != 0 {
            return Err(IndexError::InvalidArg(format!(
                "cannot resample {base} bars to {target}: not a whole multiple"
            )));
        }
        Ok(target)
    }
}

/// Per-pair registry entry for one exchange.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PairConfig {
    /// The venue's own symbol for the pair, e.g. `"tBTCUSD"`.
    pub symbol: Option<String>,
}

/// Registry entry for one exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// Run open/close alignment on this exchange's series.
    pub align_open_close: bool,
    /// Pairs this exchange is expected to supply.
    pub pairs: BTreeMap<PairId, PairConfig>,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            align_open_close: true,
            pairs: BTreeMap::new(),
        }
    }
}

/// Global configuration for the `IndexAssembler`.
///
/// Loaded once, validated, and shared read-only by every pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Bar duration of every input series.
    pub interval: Interval,
    /// Longest gap, in bars, eligible for imputation.
    pub max_impute_len: usize,
    /// Full width `w` of the centered imputation window, in bars; each side spans `w / 2`.
    pub impute_window: usize,
    /// Largest `|open - previous close|` left untouched by alignment.
    pub oc_tolerance: f64,
    /// Decimal places imputed prices are rounded to; `None` keeps full precision.
    pub price_precision: Option<u32>,
    /// Also align opens across contiguous runs of the merged index.
    pub align_index: bool,
    /// Resample the assembled index to a coarser cadence.
    pub resampling: Resampling,
    /// Timezone for daily/weekly/minute bucket boundaries when resampling; UTC if unset.
    pub timezone: Option<chrono_tz::Tz>,
    /// Exchange registry. Empty means every exchange is accepted for every pair.
    pub exchanges: BTreeMap<ExchangeId, ExchangeConfig>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            interval: Interval::M1,
            max_impute_len: 3,
            impute_window: 6,
            oc_tolerance: 1e-9,
            price_precision: None,
            align_index: false,
            resampling: Resampling::None,
            timezone: None,
            exchanges: BTreeMap::new(),
        }
    }
}

/// Most decimal places accepted for `price_precision`.
const MAX_PRECISION: u32 = 12;

impl IndexConfig {
    /// Parse and validate a JSON configuration document.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the document does not parse or fails [`IndexConfig::validate`].
    pub fn from_json_str(json: &str) -> Result<Self, IndexError> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| IndexError::invalid_config(format!("parse error: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check value ranges.
    ///
    /// # Errors
    /// Returns `InvalidConfig` when:
    /// - `impute_window` is below 2 (no room for a point on each side),
    /// - `oc_tolerance` is negative or not finite,
    /// - `price_precision` exceeds 12,
    /// - `resampling` is `Minutes(0)` or not a whole multiple of `interval`.
    pub fn validate(&self) -> Result<(), IndexError> {
        if self.impute_window < 2 {
            return Err(IndexError::invalid_config(format!(
                "impute_window must be at least 2, got {}",
                self.impute_window
            )));
        }
        if !self.oc_tolerance.is_finite() || self.oc_tolerance < 0.0 {
            return Err(IndexError::invalid_config(format!(
                "oc_tolerance must be finite and non-negative, got {}",
                self.oc_tolerance
            )));
        }
        if let Some(p) = self.price_precision
            && p > MAX_PRECISION
        {
            return Err(IndexError::invalid_config(format!(
                "price_precision must be at most {MAX_PRECISION}, got {p}"
            )));
        }
        if let Err(e) = self.resampling.coarsen(self.interval) {
            let msg = match e {
                IndexError::InvalidArg(msg) => msg,
                other => other.to_string(),
            };
            return Err(IndexError::invalid_config(format!("resampling: {msg}")));
        }
        Ok(())
    }

    /// Half-width of the imputation window in bars (at least 1).
    #[must_use]
    pub fn impute_half_width(&self) -> usize {
        (self.impute_window / 2).max(1)
    }

    /// Exchanges registered for `pair`, in id order.
    #[must_use]
    pub fn exchanges_for_pair(&self, pair: &PairId) -> Vec<&ExchangeId> {
        self.exchanges
            .iter()
            .filter(|(_, ex)| ex.pairs.contains_key(pair))
            .map(|(id, _)| id)
            .collect()
    }

    /// True if the series `(exchange, pair)` may contribute.
    ///
    /// A pair that no exchange lists is unrestricted.
    #[must_use]
    pub fn is_registered(&self, exchange: &ExchangeId, pair: &PairId) -> bool {
        let listed = self.exchanges_for_pair(pair);
        listed.is_empty() || listed.contains(&exchange)
    }

    /// Whether open/close alignment runs for `exchange`.
    #[must_use]
    pub fn align_enabled(&self, exchange: &ExchangeId) -> bool {
        self.exchanges
            .get(exchange)
            .is_none_or(|ex| ex.align_open_close)
    }
}

use std::sync::Arc;

use ohlc_index_core::{
    ExchangeConfig, ExchangeId, IndexConfig, IndexError, Interval, Resampling,
};

/// Assembles volume-weighted indexes from per-exchange series.
///
/// Cheap to clone: the validated configuration is shared behind an `Arc` and
/// never mutated after [`IndexAssemblerBuilder::build`].
#[derive(Debug, Clone)]
pub struct IndexAssembler {
    pub(crate) cfg: Arc<IndexConfig>,
}

/// Builder for constructing an [`IndexAssembler`] with custom configuration.
#[derive(Debug, Clone, Default)]
pub struct IndexAssemblerBuilder {
    cfg: IndexConfig,
}

impl IndexAssemblerBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults: one-minute bars, gaps of up to 3 bars imputed from a 6-bar
    /// window, open/close tolerance `1e-9`, no rounding, no index-level
    /// alignment, no resampling and an empty exchange registry (every exchange
    /// accepted for every pair).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration, e.g. one loaded with
    /// [`IndexConfig::from_json_str`].
    #[must_use]
    pub fn config(mut self, cfg: IndexConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Bar duration every input series must follow.
    #[must_use]
    pub const fn interval(mut self, interval: Interval) -> Self {
        self.cfg.interval = interval;
        self
    }

    /// Longest gap, in bars, eligible for imputation.
    ///
    /// Longer gaps are reported as unresolved and never filled, so a long
    /// outage on one exchange cannot bias the index with invented prices.
    #[must_use]
    pub const fn max_impute_len(mut self, bars: usize) -> Self {
        self.cfg.max_impute_len = bars;
        self
    }

    /// Full width of the centered imputation window, in bars.
    #[must_use]
    pub const fn impute_window(mut self, bars: usize) -> Self {
        self.cfg.impute_window = bars;
        self
    }

    /// Largest `|open - previous close|` left untouched by alignment.
    #[must_use]
    pub const fn oc_tolerance(mut self, tolerance: f64) -> Self {
        self.cfg.oc_tolerance = tolerance;
        self
    }

    /// Round imputed prices to `dp` decimal places.
    #[must_use]
    pub const fn price_precision(mut self, dp: Option<u32>) -> Self {
        self.cfg.price_precision = dp;
        self
    }

    /// Also align opens across contiguous runs of the merged index.
    #[must_use]
    pub const fn align_index(mut self, yes: bool) -> Self {
        self.cfg.align_index = yes;
        self
    }

    /// Resample the assembled index to a coarser cadence.
    #[must_use]
    pub const fn resampling(mut self, mode: Resampling) -> Self {
        self.cfg.resampling = mode;
        self
    }

    /// Timezone for day, week and minute bucket boundaries when resampling.
    #[must_use]
    pub const fn timezone(mut self, tz: chrono_tz::Tz) -> Self {
        self.cfg.timezone = Some(tz);
        self
    }

    /// Register an exchange.
    ///
    /// Once any exchange lists a pair, only exchanges listing it contribute to
    /// that pair; the others are excluded and reported.
    #[must_use]
    pub fn exchange(mut self, id: impl Into<ExchangeId>, entry: ExchangeConfig) -> Self {
        self.cfg.exchanges.insert(id.into(), entry);
        self
    }

    /// Validate the configuration and build the assembler.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if [`IndexConfig::validate`] fails.
    pub fn build(self) -> Result<IndexAssembler, IndexError> {
        self.cfg.validate()?;
        Ok(IndexAssembler {
            cfg: Arc::new(self.cfg),
        })
    }
}

impl IndexAssembler {
    /// Start building a new assembler.
    ///
    /// ```
    /// use ohlc_index::{IndexAssembler, Interval, Resampling};
    ///
    /// let assembler = IndexAssembler::builder()
    ///     .interval(Interval::M5)
    ///     .max_impute_len(2)
    ///     .resampling(Resampling::Hourly)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(assembler.config().interval, Interval::M5);
    /// ```
    #[must_use]
    pub fn builder() -> IndexAssemblerBuilder {
        IndexAssemblerBuilder::new()
    }

    /// The validated configuration in effect.
    #[must_use]
    pub fn config(&self) -> &IndexConfig {
        &self.cfg
    }
}

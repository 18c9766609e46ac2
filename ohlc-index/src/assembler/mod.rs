pub mod batch;
mod pipeline;
mod report;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::IndexAssembler;
use ohlc_index_core::{
    ExcludedExchange, IndexBar, IndexConfig, IndexError, Interval, PairId, QualityReport,
    Resampling, Series, align_index, index_gaps, merge_volume_weighted, resample_index,
    resampled_interval, shared_calendar,
};
use pipeline::{Prepared, intake, prepare};
use report::ReportParts;

/// A finished index for one pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssembledIndex {
    /// Trading pair.
    pub pair: PairId,
    /// Cadence of `bars`; coarser than the input interval when resampled.
    pub interval: Interval,
    /// One bar per timestamp, index-level gaps included (unless resampled).
    pub bars: Vec<IndexBar>,
    /// Quality summary, always describing the base-interval assembly.
    pub quality: QualityReport,
}

impl AssembledIndex {
    /// Resample the bars to a coarser cadence using UTC bucket boundaries.
    ///
    /// # Errors
    /// Returns `InvalidArg` for `Minutes(0)` or a target that is not a whole
    /// multiple of the current interval.
    pub fn resample(&self, mode: Resampling) -> Result<Self, IndexError> {
        self.resample_in(mode, None)
    }

    /// Resample with day, week and minute boundaries taken in `tz`.
    ///
    /// The quality report is carried over unchanged.
    ///
    /// # Errors
    /// As [`resample`](Self::resample).
    pub fn resample_in(
        &self,
        mode: Resampling,
        tz: Option<chrono_tz::Tz>,
    ) -> Result<Self, IndexError> {
        Ok(Self {
            pair: self.pair.clone(),
            interval: resampled_interval(self.interval, mode)?,
            bars: resample_index(&self.bars, mode, tz)?,
            quality: self.quality.clone(),
        })
    }

    /// Bars that carry prices.
    pub fn priced(&self) -> impl Iterator<Item = &IndexBar> {
        self.bars.iter().filter(|b| !b.is_gap())
    }
}

fn all_rejected(pair: PairId, excluded: Vec<ExcludedExchange>) -> IndexError {
    IndexError::AllExchangesRejected {
        pair,
        errors: excluded.into_iter().map(|x| x.error).collect(),
    }
}

impl IndexAssembler {
    /// Assemble the index for `pair` from one series per exchange.
    ///
    /// Behavior:
    /// - Series for another pair, for an exchange not registered for `pair`,
    ///   for an exchange supplied twice, or failing validation are excluded.
    ///   The rest of the pair carries on and the exclusions are reported.
    /// - Survivors share one calendar spanning all of them. Each is repaired,
    ///   scanned, imputed and aligned on its own, then all are merged by volume.
    /// - The result is identical for any ordering of `series`.
    ///
    /// # Errors
    /// Returns `AllExchangesRejected` when no series survives intake; the
    /// per-exchange errors are inside.
    pub fn assemble(
        &self,
        pair: impl Into<PairId>,
        series: Vec<Series>,
    ) -> Result<AssembledIndex, IndexError> {
        self.assemble_pair(pair.into(), series)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "ohlc_index::assemble",
            skip(self, series),
            fields(pair = %pair, series = series.len()),
        )
    )]
    fn assemble_pair(&self, pair: PairId, series: Vec<Series>) -> Result<AssembledIndex, IndexError> {
        let intake = intake(&self.cfg, &pair, series);
        if intake.accepted.is_empty() {
            return Err(all_rejected(pair, intake.excluded));
        }
        let span = shared_calendar(intake.accepted.iter().map(|(s, _)| s), self.cfg.interval)?;
        let prepared = intake
            .accepted
            .into_iter()
            .map(|(s, d)| prepare(&self.cfg, &span, s, d))
            .collect::<Result<Vec<_>, _>>()?;
        finish(&self.cfg, pair, span, prepared, intake.excluded)
    }

    /// Like [`assemble`](Self::assemble), with the per-exchange stages run on
    /// Tokio's blocking pool.
    ///
    /// All exchanges are joined before the merge, so the output is the same as
    /// the synchronous path.
    ///
    /// # Errors
    /// As [`assemble`](Self::assemble); a panicked per-exchange task fails the
    /// pair with `Other`.
    pub async fn assemble_concurrent(
        &self,
        pair: impl Into<PairId>,
        series: Vec<Series>,
    ) -> Result<AssembledIndex, IndexError> {
        self.assemble_pair_concurrent(pair.into(), series).await
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "ohlc_index::assemble_concurrent",
            skip(self, series),
            fields(pair = %pair, series = series.len()),
        )
    )]
    async fn assemble_pair_concurrent(
        &self,
        pair: PairId,
        series: Vec<Series>,
    ) -> Result<AssembledIndex, IndexError> {
        let intake = intake(&self.cfg, &pair, series);
        if intake.accepted.is_empty() {
            return Err(all_rejected(pair, intake.excluded));
        }
        let span = shared_calendar(intake.accepted.iter().map(|(s, _)| s), self.cfg.interval)?;

        let tasks = intake.accepted.into_iter().map(|(s, d)| {
            let cfg = Arc::clone(&self.cfg);
            let key = s.key();
            async move {
                tokio::task::spawn_blocking(move || prepare(&cfg, &span, s, d))
                    .await
                    .unwrap_or_else(|e| {
                        Err(IndexError::Other(format!("pipeline for {key} failed: {e}")))
                    })
            }
        });
        let prepared = futures::future::join_all(tasks)
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;
        finish(&self.cfg, pair, span, prepared, intake.excluded)
    }

    /// Start a multi-pair batch.
    #[must_use]
    pub const fn batch(&self) -> batch::BatchBuilder<'_> {
        batch::BatchBuilder::new(self)
    }
}

/// Merge prepared exchanges and build the report.
fn finish(
    cfg: &IndexConfig,
    pair: PairId,
    span: ohlc_index_core::Calendar,
    prepared: Vec<Prepared>,
    excluded: Vec<ExcludedExchange>,
) -> Result<AssembledIndex, IndexError> {
    let (series, exchanges): (Vec<Series>, Vec<_>) =
        prepared.into_iter().map(|p| (p.series, p.quality)).unzip();
    let mut bars = merge_volume_weighted(&span, &series)?;
    if cfg.align_index {
        let _aligned = align_index(&mut bars, cfg.interval, cfg.oc_tolerance);
        #[cfg(feature = "tracing")]
        tracing::debug!(pair = %pair, aligned = _aligned, "aligned index opens");
    }
    let gaps = index_gaps(&bars);

    let quality = ReportParts {
        pair: &pair,
        span: &span,
        bars: &bars,
        index_gaps: gaps,
        exchanges,
        excluded,
    }
    .finish();

    #[cfg(feature = "tracing")]
    tracing::info!(
        pair = %pair,
        exchanges = quality.exchanges.len(),
        excluded = quality.excluded.len(),
        bars = quality.total_bars,
        gap_bars = quality.gap_bars,
        imputed_bars = quality.imputed_bars,
        unresolved_gaps = quality.unresolved_gap_count(),
        "assembled index"
    );

    let interval = resampled_interval(cfg.interval, cfg.resampling)?;
    let bars = resample_index(&bars, cfg.resampling, cfg.timezone)?;
    Ok(AssembledIndex {
        pair,
        interval,
        bars,
        quality,
    })
}

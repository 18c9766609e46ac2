use std::collections::BTreeMap;

use ohlc_index_core::{
    AlignOutcome, Calendar, ExchangeId, ExchangeQuality, ExcludedExchange, ImputeParams,
    IndexConfig, IndexError, PairId, Series, SeriesDiagnostics, align_open_close, diagnose,
    impute_gaps, repair_envelopes, scan_series_within, validate_series,
};

/// Input series sorted into contributors and exclusions.
pub(crate) struct Intake {
    pub(crate) accepted: Vec<(Series, SeriesDiagnostics)>,
    pub(crate) excluded: Vec<ExcludedExchange>,
}

/// A per-exchange series after the calendar, imputation and alignment stages.
pub(crate) struct Prepared {
    pub(crate) series: Series,
    pub(crate) quality: ExchangeQuality,
}

/// Screen the inputs for `pair`.
///
/// A series is excluded when it belongs to another pair, its exchange is not
/// registered for the pair, its exchange appears more than once (every copy
/// is excluded) or it fails validation. Both lists come back in exchange id order.
pub(crate) fn intake(cfg: &IndexConfig, pair: &PairId, series: Vec<Series>) -> Intake {
    let mut seen: BTreeMap<ExchangeId, usize> = BTreeMap::new();
    for s in &series {
        *seen.entry(s.exchange.clone()).or_default() += 1;
    }

    let mut accepted = Vec::new();
    let mut excluded = Vec::new();
    for s in series {
        let diagnostics = diagnose(&s, cfg.interval);
        let verdict = if s.pair != *pair {
            Err(IndexError::PairMismatch {
                pair: pair.clone(),
                exchange: s.exchange.clone(),
                found: s.pair.clone(),
            })
        } else if !cfg.is_registered(&s.exchange, pair) {
            Err(IndexError::Unregistered {
                pair: pair.clone(),
                exchange: s.exchange.clone(),
            })
        } else if seen.get(&s.exchange).is_some_and(|n| *n > 1) {
            Err(IndexError::DuplicateExchange {
                pair: pair.clone(),
                exchange: s.exchange.clone(),
            })
        } else {
            validate_series(&s, cfg.interval)
        };
        match verdict {
            Ok(()) => accepted.push((s, diagnostics)),
            Err(error) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(pair = %pair, exchange = %s.exchange, error = %error, "excluded exchange");
                excluded.push(ExcludedExchange {
                    exchange: s.exchange,
                    error,
                    diagnostics,
                });
            }
        }
    }
    accepted.sort_by(|a, b| a.0.exchange.cmp(&b.0.exchange));
    excluded.sort_by(|a, b| a.exchange.cmp(&b.exchange));
    Intake { accepted, excluded }
}

/// Run one exchange through envelope repair, the shared-calendar scan, gap
/// imputation and (unless disabled for the exchange) open/close alignment.
///
/// # Errors
/// Returns `InvalidArg` if `span` does not cover the series.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "ohlc_index::pipeline::prepare",
        skip(cfg, span, series, diagnostics),
        fields(exchange = %series.exchange, pair = %series.pair, bars = series.len()),
    )
)]
pub(crate) fn prepare(
    cfg: &IndexConfig,
    span: &Calendar,
    series: Series,
    diagnostics: SeriesDiagnostics,
) -> Result<Prepared, IndexError> {
    let (repaired, repaired_ranges) = repair_envelopes(&series);
    let scan = scan_series_within(&repaired, span)?;
    let imputed = impute_gaps(&repaired, &scan, ImputeParams::from(cfg));
    let imputed_bars = imputed.imputed_bars();
    let aligned = if cfg.align_enabled(&series.exchange) {
        align_open_close(&imputed.series, cfg.interval, cfg.oc_tolerance)
    } else {
        AlignOutcome {
            series: imputed.series,
            aligned: 0,
            widened: 0,
        }
    };

    #[cfg(feature = "tracing")]
    for u in &imputed.unresolved {
        tracing::warn!(
            exchange = %series.exchange,
            pair = %series.pair,
            start = %u.gap.start,
            len = u.gap.len,
            reason = %u.reason,
            "unresolved gap"
        );
    }

    let slots = span.len() as f64;
    let quality = ExchangeQuality {
        exchange: series.exchange.clone(),
        raw_bars: series.len(),
        imputed_bars,
        aligned_opens: aligned.aligned,
        widened_ranges: repaired_ranges + aligned.widened,
        resolved_gaps: imputed.resolved.len(),
        unresolved_gaps: imputed.unresolved,
        coverage: series.len() as f64 / slots,
        filled_coverage: aligned.series.len() as f64 / slots,
        diagnostics,
    };
    Ok(Prepared {
        series: aligned.series,
        quality,
    })
}

use std::collections::BTreeMap;

use ohlc_index_core::{
    Attribution, Calendar, ExchangeId, ExchangeQuality, ExcludedExchange, Gap, IndexBar,
    IndexWarning, PairId, QualityReport, Span,
};

/// Continuous spans of index timestamps each exchange contributed to.
///
/// `bars` hold one entry per calendar step, so consecutive bars are adjacent
/// in time. Spans are ordered by exchange, then start.
pub(crate) fn build_attribution(pair: &PairId, bars: &[IndexBar]) -> Attribution {
    let mut attr = Attribution::new(pair.clone());
    let mut open: BTreeMap<&ExchangeId, Span> = BTreeMap::new();
    for b in bars {
        open.retain(|ex, span| {
            let still = b.contributing.contains(*ex);
            if !still {
                attr.push(((*ex).clone(), *span));
            }
            still
        });
        for ex in &b.contributing {
            open.entry(ex)
                .and_modify(|s| s.end = b.ts)
                .or_insert(Span {
                    start: b.ts,
                    end: b.ts,
                });
        }
    }
    attr.spans
        .extend(open.into_iter().map(|(ex, span)| (ex.clone(), span)));
    attr.spans
        .sort_by(|a, b| (&a.0, a.1.start).cmp(&(&b.0, b.1.start)));
    attr
}

/// Every non-fatal finding: exclusions, unresolved per-exchange gaps, then
/// runs of timestamps no exchange covered.
pub(crate) fn collect_warnings(
    pair: &PairId,
    exchanges: &[ExchangeQuality],
    excluded: &[ExcludedExchange],
    index_gaps: &[Gap],
) -> Vec<IndexWarning> {
    let mut out: Vec<IndexWarning> = excluded
        .iter()
        .map(|x| IndexWarning::ExchangeExcluded {
            pair: pair.clone(),
            exchange: x.exchange.clone(),
            error: x.error.clone(),
        })
        .collect();
    for q in exchanges {
        out.extend(q.unresolved_gaps.iter().map(|u| IndexWarning::UnresolvedGap {
            pair: pair.clone(),
            exchange: q.exchange.clone(),
            gap: u.gap,
            reason: u.reason,
        }));
    }
    out.extend(index_gaps.iter().map(|g| IndexWarning::AllExchangesMissing {
        pair: pair.clone(),
        start: g.start,
        end: g.end,
        len: g.len,
    }));
    out
}

pub(crate) struct ReportParts<'a> {
    pub(crate) pair: &'a PairId,
    pub(crate) span: &'a Calendar,
    pub(crate) bars: &'a [IndexBar],
    pub(crate) index_gaps: Vec<Gap>,
    pub(crate) exchanges: Vec<ExchangeQuality>,
    pub(crate) excluded: Vec<ExcludedExchange>,
}

impl ReportParts<'_> {
    pub(crate) fn finish(self) -> QualityReport {
        let warnings =
            collect_warnings(self.pair, &self.exchanges, &self.excluded, &self.index_gaps);
        QualityReport {
            pair: self.pair.clone(),
            interval: self.span.interval,
            start: Some(self.span.start),
            end: Some(self.span.end),
            total_bars: self.bars.len(),
            gap_bars: self.bars.iter().filter(|b| b.is_gap()).count(),
            imputed_bars: self.bars.iter().filter(|b| b.is_imputed).count(),
            attribution: build_attribution(self.pair, self.bars),
            index_gaps: self.index_gaps,
            exchanges: self.exchanges,
            excluded: self.excluded,
            warnings,
        }
    }
}

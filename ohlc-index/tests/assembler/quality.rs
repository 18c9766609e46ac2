use crate::helpers::*;
use ohlc_index::UnresolvedReason;

#[test]
fn canned_market_report() {
    let index = assembler(3, 6)
        .assemble("BTCUSD", by_pair("BTCUSD").unwrap())
        .unwrap();
    let q = &index.quality;
    assert_eq!(q.total_bars, 120);
    assert_eq!(q.gap_bars, 0);
    assert!(q.index_gaps.is_empty());
    assert_eq!(q.start, Some(minute(0)));
    assert_eq!(q.end, Some(minute(119)));
    assert_eq!(
        q.exchanges
            .iter()
            .map(|e| e.exchange.as_str())
            .collect::<Vec<_>>(),
        vec!["binance", "coinbase", "kraken"]
    );

    let binance = q.exchange("binance").unwrap();
    assert_eq!(binance.coverage, 1.0);
    assert_eq!(binance.coverage_pct(), 100.0);
    assert_eq!(binance.diagnostics.cadence_secs, Some(60));

    let coinbase = q.exchange("coinbase").unwrap();
    assert_eq!((coinbase.imputed_bars, coinbase.resolved_gaps), (2, 1));
    assert_eq!(coinbase.filled_coverage, 1.0);
    assert_eq!(coinbase.diagnostics.discontinuities, 1);

    let kraken = q.exchange("kraken").unwrap();
    assert_eq!(kraken.raw_bars, 109);
    assert!((kraken.coverage - 109.0 / 120.0).abs() < 1e-12);
    let reasons: Vec<_> = kraken.unresolved_gaps.iter().map(|u| u.reason).collect();
    assert_eq!(
        reasons,
        vec![UnresolvedReason::OpenEnded, UnresolvedReason::TooLong { max: 3 }]
    );
    assert_eq!(kraken.unresolved_gaps[1].gap.start, minute(70));
    assert_eq!(kraken.unresolved_gaps[1].gap.len, 6);

    // binance covers everything, so no index bar is built from imputed data alone
    assert_eq!(q.imputed_bars, 0);
    assert!(index.bars.iter().all(|b| b.contributing.contains("binance")));
    assert_eq!(q.attribution.spans_for(&"binance".into()).count(), 1);
    assert_eq!(q.attribution.spans_for(&"kraken".into()).count(), 2);
}

#[test]
fn every_index_bar_keeps_the_envelope() {
    let index = assembler(3, 6)
        .assemble("BTCUSD", by_pair("BTCUSD").unwrap())
        .unwrap();
    for b in index.priced() {
        let p = b.prices.unwrap();
        assert!(p.low <= p.open.min(p.close));
        assert!(p.high >= p.open.max(p.close));
        assert!(b.volume >= 0.0);
    }
}

#[test]
fn clean_run_has_no_warnings() {
    let inputs = scenarios::imputed_bar_carries_no_weight();
    let index = assembler(1, 2).assemble(PAIR, inputs).unwrap();
    assert!(index.quality.warnings.is_empty());
    assert!(index.quality.excluded.is_empty());
    assert_eq!(index.quality.attribution.spans.len(), 3);
}

use crate::helpers::*;
use ohlc_index::{IndexError, PairId, Series};

fn market() -> Vec<Series> {
    let mut all = by_pair("BTCUSD").unwrap();
    all.extend(by_pair("ETHUSD").unwrap());
    all
}

#[tokio::test]
async fn batch_assembles_each_pair_and_collects_failures() {
    let assembler = assembler(3, 6);
    let mut inputs = market();
    inputs.push(Series::new("binance", "SOLUSD", vec![]));

    let report = assembler.batch().series(inputs).unwrap().run().await.unwrap();
    assert_eq!(
        report.results.keys().map(PairId::as_str).collect::<Vec<_>>(),
        vec!["BTCUSD", "ETHUSD"]
    );
    assert_eq!(report.warnings.len(), 1);
    assert!(matches!(
        &report.warnings[0],
        IndexError::AllExchangesRejected { pair, .. } if pair.as_str() == "SOLUSD"
    ));

    let btc = &report.results[&PairId::from("BTCUSD")];
    let direct = assembler
        .assemble("BTCUSD", by_pair("BTCUSD").unwrap())
        .unwrap();
    assert_eq!(btc, &direct);
    assert_eq!(report.results[&PairId::from("ETHUSD")].bars.len(), 60);
}

#[tokio::test]
async fn batch_rejects_duplicate_series() {
    let assembler = assembler(3, 6);
    let btc = by_pair("BTCUSD").unwrap();

    let err = assembler
        .batch()
        .add_series(btc[0].clone())
        .unwrap()
        .add_series(btc[0].clone())
        .err()
        .unwrap();
    assert!(matches!(err, IndexError::InvalidArg(ref msg) if msg.contains("duplicate")));

    let mut doubled = btc.clone();
    doubled.push(btc[1].clone());
    assert!(assembler.batch().series(doubled).is_err());

    // same exchange on another pair is fine
    let eth = by_pair("ETHUSD").unwrap();
    assert!(
        assembler
            .batch()
            .add_series(btc[0].clone())
            .unwrap()
            .add_series(eth[0].clone())
            .is_ok()
    );
}

#[tokio::test]
async fn empty_batch_is_an_error() {
    let err = assembler(3, 6).batch().run().await.unwrap_err();
    assert!(matches!(err, IndexError::InvalidArg(_)));
}

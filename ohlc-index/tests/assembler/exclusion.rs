use chrono::TimeDelta;

use crate::helpers::*;
use ohlc_index::{Bar, IndexError, IndexWarning, MalformedReason, Series};

fn off_grid(exchange: &str) -> Series {
    let ts = minute(1) + TimeDelta::seconds(30);
    Series::new(
        exchange,
        PAIR,
        vec![
            Bar::new(minute(0), 1.0, 1.0, 1.0, 1.0, 1.0),
            Bar::new(ts, 1.0, 1.0, 1.0, 1.0, 1.0),
        ],
    )
}

#[test]
fn malformed_exchange_is_excluded_and_the_pair_continues() {
    let clean = assembler(1, 2)
        .assemble(PAIR, scenarios::imputed_bar_carries_no_weight())
        .unwrap();

    let mut inputs = scenarios::imputed_bar_carries_no_weight();
    inputs.push(off_grid("c"));
    inputs.push(Series::new("d", "ETHUSD", vec![Bar::new(minute(0), 1.0, 1.0, 1.0, 1.0, 1.0)]));
    let index = assembler(1, 2).assemble(PAIR, inputs).unwrap();

    assert_eq!(index.bars, clean.bars);
    let excluded = &index.quality.excluded;
    assert_eq!(excluded.len(), 2);
    assert!(matches!(
        &excluded[0].error,
        IndexError::MalformedSeries {
            reason: MalformedReason::NotAligned { .. },
            ts: Some(_),
            ..
        }
    ));
    assert_eq!(excluded[0].diagnostics.bars, 2);
    assert!(matches!(&excluded[1].error, IndexError::PairMismatch { found, .. } if found.as_str() == "ETHUSD"));

    let ctx = excluded[0].error.context();
    assert_eq!(ctx.exchange.map(|e| e.as_str()), Some("c"));
    assert_eq!(ctx.pair.map(|p| p.as_str()), Some(PAIR));

    let excluded_warnings = index
        .quality
        .warnings
        .iter()
        .filter(|w| matches!(w, IndexWarning::ExchangeExcluded { .. }))
        .count();
    assert_eq!(excluded_warnings, 2);
}

#[test]
fn non_finite_and_negative_volume_are_rejected() {
    let mut nan = Bar::new(minute(1), 1.0, 1.0, 1.0, 1.0, 1.0);
    nan.close = f64::NAN;
    let neg = Bar::new(minute(1), 1.0, 1.0, 1.0, 1.0, -1.0);
    let inputs = vec![
        Series::new("a", PAIR, vec![Bar::new(minute(0), 1.0, 1.0, 1.0, 1.0, 1.0), nan]),
        Series::new("b", PAIR, vec![Bar::new(minute(0), 1.0, 1.0, 1.0, 1.0, 1.0), neg]),
        Series::new("c", PAIR, vec![Bar::new(minute(0), 2.0, 2.0, 2.0, 2.0, 1.0)]),
    ];
    let index = assembler(3, 6).assemble(PAIR, inputs).unwrap();
    let reasons: Vec<_> = index
        .quality
        .excluded
        .iter()
        .map(|x| match &x.error {
            IndexError::MalformedSeries { reason, .. } => reason.clone(),
            other => panic!("unexpected: {other:?}"),
        })
        .collect();
    assert_eq!(reasons.len(), 2);
    assert!(matches!(reasons[0], MalformedReason::NonFinite { .. }));
    assert_eq!(reasons[1], MalformedReason::NegativeVolume);
    assert_eq!(index.quality.excluded[0].diagnostics.non_finite_rows, 1);
    assert_eq!(index.bars.len(), 1);
}

#[test]
fn duplicated_exchange_is_excluded_entirely() {
    let mut inputs = scenarios::imputed_bar_carries_no_weight();
    inputs.push(inputs[0].clone());
    let index = assembler(1, 2).assemble(PAIR, inputs).unwrap();
    assert_eq!(index.quality.excluded.len(), 2);
    assert!(
        index
            .quality
            .excluded
            .iter()
            .all(|x| matches!(x.error, IndexError::DuplicateExchange { .. }))
    );
    assert_eq!(index.quality.exchanges.len(), 1);
    assert!(index.priced().all(|b| b.contributing.len() == 1));
}

#[test]
fn nothing_left_is_an_error() {
    let err = assembler(3, 6)
        .assemble(PAIR, vec![off_grid("a"), Series::new("b", PAIR, vec![])])
        .unwrap_err();
    match err {
        IndexError::AllExchangesRejected { pair, errors } => {
            assert_eq!(pair.as_str(), PAIR);
            assert_eq!(errors.len(), 2);
            assert!(errors.iter().all(IndexError::is_exchange_scoped));
        }
        other => panic!("unexpected: {other:?}"),
    }

    let err = assembler(3, 6).assemble(PAIR, vec![]).unwrap_err();
    assert!(matches!(err, IndexError::AllExchangesRejected { ref errors, .. } if errors.is_empty()));
}

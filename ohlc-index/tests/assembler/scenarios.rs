use std::collections::BTreeSet;

use crate::helpers::*;
use ohlc_index::{
    ExchangeId, Gap, IndexAssembler, IndexWarning, UnresolvedReason,
};

#[test]
fn imputed_bar_is_weighted_out_of_the_merge() {
    let index = assembler(1, 2)
        .assemble(PAIR, scenarios::imputed_bar_carries_no_weight())
        .unwrap();
    assert_eq!(index.bars.len(), 4);

    let t2 = &index.bars[2];
    assert_eq!(t2.ts, minute(2));
    assert_eq!(t2.volume, 1.0);
    assert_eq!(t2.contributing, BTreeSet::from([ExchangeId::new("b")]));
    assert_eq!(t2.close(), Some(105.0));
    assert!(!t2.is_imputed);

    let a = index.quality.exchange("a").unwrap();
    assert_eq!((a.imputed_bars, a.resolved_gaps), (1, 1));
    assert!(a.unresolved_gaps.is_empty());
    assert_eq!(index.quality.imputed_bars, 0);
    assert_eq!(index.quality.gap_bars, 0);

    // both exchanges traded at minute 0
    let t0 = &index.bars[0];
    assert_eq!(t0.volume, 11.0);
    let expected = (10.0 * 100.0 + 101.0) / 11.0;
    assert!((t0.close().unwrap() - expected).abs() < 1e-9);
}

#[test]
fn open_jump_is_snapped_to_previous_close() {
    let index = IndexAssembler::builder()
        .oc_tolerance(0.01)
        .build()
        .unwrap()
        .assemble(PAIR, scenarios::open_jump())
        .unwrap();
    let p = index.bars[1].prices.unwrap();
    assert_eq!(p.open, 100.0);
    assert_eq!(p.low, 100.0);
    assert_eq!(p.high, 108.0);
    assert_eq!(p.close, 107.0);
    assert_eq!(index.bars[2].prices.unwrap().open, 107.0);

    let a = index.quality.exchange("a").unwrap();
    assert_eq!((a.aligned_opens, a.widened_ranges), (1, 1));
}

#[test]
fn long_outage_stays_missing_where_nobody_covers_it() {
    let index = assembler(3, 6)
        .assemble(PAIR, scenarios::long_outage())
        .unwrap();
    let q = &index.quality;
    assert_eq!(q.total_bars, 8);
    assert_eq!(q.gap_bars, 3);
    assert_eq!(
        q.index_gaps,
        vec![Gap {
            start: minute(3),
            end: minute(5),
            len: 3
        }]
    );
    for m in [1, 2] {
        let b = &index.bars[m];
        assert_eq!(b.contributing, BTreeSet::from([ExchangeId::new("b")]));
    }
    assert!(index.bars[3..6].iter().all(|b| b.is_gap() && b.prices.is_none()));

    let a = q.exchange("a").unwrap();
    assert_eq!(a.imputed_bars, 0);
    assert_eq!(a.unresolved_gaps.len(), 1);
    assert_eq!(a.unresolved_gaps[0].gap.len, 5);
    assert_eq!(a.unresolved_gaps[0].reason, UnresolvedReason::TooLong { max: 3 });
    let b = q.exchange("b").unwrap();
    assert_eq!(b.unresolved_gaps[0].reason, UnresolvedReason::OpenEnded);
    assert_eq!(q.unresolved_gap_count(), 2);

    assert!(q.warnings.contains(&IndexWarning::AllExchangesMissing {
        pair: PAIR.into(),
        start: minute(3),
        end: minute(5),
        len: 3,
    }));
    let unresolved = q
        .warnings
        .iter()
        .filter(|w| matches!(w, IndexWarning::UnresolvedGap { .. }))
        .count();
    assert_eq!(unresolved, 2);

    let spans_a: Vec<_> = q.attribution.spans_for(&"a".into()).collect();
    assert_eq!(spans_a, vec![span(0, 0), span(6, 7)]);
    let spans_b: Vec<_> = q.attribution.spans_for(&"b".into()).collect();
    assert_eq!(spans_b, vec![span(0, 2)]);
}

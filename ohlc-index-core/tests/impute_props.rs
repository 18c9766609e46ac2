use chrono::{DateTime, Utc};
use ohlc_index_core::{
    Bar, BarField, ImputeParams, Interval, PRICE_FIELDS, Series, UnresolvedReason, impute_gaps,
    scan_series,
};
use proptest::prelude::*;

fn t(step: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(step * 60, 0).unwrap()
}

/// Minute series with coherent OHLC and random holes; both ends are present.
fn arb_series() -> impl Strategy<Value = Series> {
    proptest::collection::vec(
        (
            any::<bool>(),
            10.0f64..1_000.0,
            -5.0f64..5.0,
            0.0f64..3.0,
            0.0f64..3.0,
            0.0f64..50.0,
        ),
        2..60,
    )
    .prop_map(|rows| {
        let last = rows.len() - 1;
        let bars = rows
            .iter()
            .enumerate()
            .filter(|(i, row)| *i == 0 || *i == last || row.0)
            .map(|(i, &(_, open, drift, up, down, volume))| {
                let close = open + drift;
                Bar::new(
                    t(i as i64),
                    open,
                    open.max(close) + up,
                    open.min(close) - down,
                    close,
                    volume,
                )
            })
            .collect();
        Series::new("a", "BTCUSD", bars)
    })
}

fn arb_params() -> impl Strategy<Value = ImputeParams> {
    (1usize..5, 1usize..4).prop_map(|(max_len, half_width)| ImputeParams {
        max_len,
        half_width,
        precision: None,
    })
}

proptest! {
    #[test]
    fn imputed_prices_stay_within_the_window(s in arb_series(), params in arb_params()) {
        let scan = scan_series(&s, Interval::M1).unwrap();
        let out = impute_gaps(&s, &scan, params);
        let h = params.half_width as i64;
        for b in out.series.bars.iter().filter(|b| b.is_imputed()) {
            prop_assert_eq!(b.volume, 0.0);
            prop_assert!(b.is_envelope_valid());
            let window: Vec<&Bar> = s
                .bars
                .iter()
                .filter(|o| Interval::M1.steps_between(b.ts, o.ts).abs() <= h)
                .collect();
            prop_assert!(window.iter().any(|o| o.ts < b.ts));
            prop_assert!(window.iter().any(|o| o.ts > b.ts));
            for field in [BarField::Open, BarField::Close] {
                let lo = window.iter().map(|o| o.get(field)).fold(f64::INFINITY, f64::min);
                let hi = window.iter().map(|o| o.get(field)).fold(f64::NEG_INFINITY, f64::max);
                let v = b.get(field);
                prop_assert!(v >= lo - 1e-9 && v <= hi + 1e-9, "{field} {v} outside [{lo}, {hi}]");
            }
        }
    }

    #[test]
    fn observed_bars_pass_through(s in arb_series(), params in arb_params()) {
        let scan = scan_series(&s, Interval::M1).unwrap();
        let out = impute_gaps(&s, &scan, params);
        let observed: Vec<Bar> = out.series.bars.iter().filter(|b| !b.is_imputed()).copied().collect();
        prop_assert_eq!(&observed, &s.bars);
        prop_assert_eq!(out.series.len(), s.len() + out.imputed_bars());
        for w in out.series.bars.windows(2) {
            prop_assert!(w[0].ts < w[1].ts);
        }
    }

    #[test]
    fn every_gap_is_resolved_whole_or_not_at_all(s in arb_series(), params in arb_params()) {
        let scan = scan_series(&s, Interval::M1).unwrap();
        let out = impute_gaps(&s, &scan, params);
        prop_assert_eq!(out.resolved.len() + out.unresolved.len(), scan.gaps.len());
        for g in &out.resolved {
            prop_assert!(g.len <= params.max_len);
            let n = out.series.bars.iter().filter(|b| g.contains(b.ts)).count();
            prop_assert_eq!(n, g.len);
        }
        for u in &out.unresolved {
            prop_assert!(out.series.bars.iter().all(|b| !u.gap.contains(b.ts)));
            if let UnresolvedReason::TooLong { max } = u.reason {
                prop_assert!(u.gap.len > max);
            }
        }
    }
}

#[test]
fn imputation_is_a_centered_mean_per_field() {
    let bar = |step, o, h, l, c| Bar::new(t(step), o, h, l, c, 1.0);
    let s = Series::new(
        "a",
        "BTCUSD",
        vec![
            bar(0, 10.0, 12.0, 9.0, 11.0),
            bar(1, 11.0, 13.0, 10.0, 12.0),
            bar(3, 13.0, 15.0, 12.0, 14.0),
            bar(4, 14.0, 16.0, 13.0, 15.0),
        ],
    );
    let scan = scan_series(&s, Interval::M1).unwrap();
    let params = ImputeParams {
        max_len: 1,
        half_width: 2,
        precision: None,
    };
    let out = impute_gaps(&s, &scan, params);
    let filled = out.series.bars[2];
    assert_eq!(filled.ts, t(2));
    let expected = [12.0, 14.0, 11.0, 13.0];
    for (field, want) in PRICE_FIELDS.into_iter().zip(expected) {
        assert_eq!(filled.get(field), want, "{field}");
    }
}

#[test]
fn long_gap_is_left_alone() {
    let bar = |step| Bar::new(t(step), 1.0, 1.0, 1.0, 1.0, 1.0);
    let s = Series::new("a", "BTCUSD", vec![bar(0), bar(5)]);
    let scan = scan_series(&s, Interval::M1).unwrap();
    let params = ImputeParams {
        max_len: 3,
        half_width: 3,
        precision: None,
    };
    let out = impute_gaps(&s, &scan, params);
    assert_eq!(out.series, s);
    assert_eq!(out.unresolved.len(), 1);
    assert_eq!(out.unresolved[0].reason, UnresolvedReason::TooLong { max: 3 });
}

#[test]
fn narrow_window_leaves_the_middle_of_a_gap_unresolved() {
    let bar = |step| Bar::new(t(step), 1.0, 1.0, 1.0, 1.0, 1.0);
    let s = Series::new("a", "BTCUSD", vec![bar(0), bar(4)]);
    let scan = scan_series(&s, Interval::M1).unwrap();
    let params = ImputeParams {
        max_len: 3,
        half_width: 1,
        precision: None,
    };
    let out = impute_gaps(&s, &scan, params);
    assert_eq!(out.series.len(), 2);
    assert_eq!(out.unresolved[0].reason, UnresolvedReason::InsufficientWindow);
}

#[test]
fn precision_rounds_imputed_prices_only() {
    let bar = |step, px| Bar::new(t(step), px, px, px, px, 1.0);
    let s = Series::new("a", "BTCUSD", vec![bar(0, 1.001), bar(2, 1.004)]);
    let scan = scan_series(&s, Interval::M1).unwrap();
    let params = ImputeParams {
        max_len: 1,
        half_width: 1,
        precision: Some(2),
    };
    let out = impute_gaps(&s, &scan, params);
    assert_eq!(out.series.bars[0].close, 1.001);
    assert_eq!(out.series.bars[1].close, 1.0);
}

#[test]
fn wide_window_reaches_past_the_adjacent_bars() {
    let bar = |step, px| Bar::new(t(step), px, px, px, px, 1.0);
    let s = Series::new(
        "a",
        "BTCUSD",
        vec![bar(0, 100.0), bar(1, 110.0), bar(3, 120.0), bar(4, 300.0)],
    );
    let scan = scan_series(&s, Interval::M1).unwrap();

    let narrow = impute_gaps(&s, &scan, ImputeParams { max_len: 1, half_width: 1, precision: None });
    assert_eq!(narrow.series.bars[2].close, 115.0);

    let wide = impute_gaps(&s, &scan, ImputeParams { max_len: 1, half_width: 2, precision: None });
    let filled = wide.series.bars[2];
    assert!(filled.is_imputed());
    assert_eq!(filled.close, 157.5);
    assert!(filled.close > 120.0 && filled.close <= 300.0);
}

use crate::helpers::*;
use ohlc_index::{IndexAssembler, IndexError, Interval, Resampling};

#[test]
fn configured_resampling_matches_resampling_afterwards() {
    let inputs = by_pair("BTCUSD").unwrap();
    let base = assembler(3, 6).assemble("BTCUSD", inputs.clone()).unwrap();
    let configured = IndexAssembler::builder()
        .max_impute_len(3)
        .impute_window(6)
        .resampling(Resampling::Minutes(5))
        .build()
        .unwrap()
        .assemble("BTCUSD", inputs)
        .unwrap();

    assert_eq!(configured, base.resample(Resampling::Minutes(5)).unwrap());
    assert_eq!(configured.interval, Interval::M5);
    assert_eq!(Interval::minutes(5).unwrap(), Interval::M5);
    assert_eq!(configured.bars.len(), 24);
    assert_eq!(configured.bars[1].ts, minute(5));

    // report still describes the base interval
    assert_eq!(configured.quality.interval, Interval::M1);
    assert_eq!(configured.quality.total_bars, 120);

    let base_volume: f64 = base.bars.iter().map(|b| b.volume).sum();
    let volume: f64 = configured.bars.iter().map(|b| b.volume).sum();
    assert!((base_volume - volume).abs() < 1e-6 * base_volume);
}

#[test]
fn hourly_bucket_spans_the_minute_range() {
    let base = assembler(3, 6)
        .assemble("BTCUSD", by_pair("BTCUSD").unwrap())
        .unwrap();
    let hourly = base.resample(Resampling::Hourly).unwrap();
    assert_eq!(hourly.interval, Interval::H1);
    assert_eq!(hourly.bars.len(), 2);

    let first = hourly.bars[0].prices.unwrap();
    let minutes = base.bars[..60].iter().filter_map(|b| b.prices);
    let (lo, hi) = minutes.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        (lo.min(p.low), hi.max(p.high))
    });
    assert_eq!(first.low, lo);
    assert_eq!(first.high, hi);
    assert_eq!(first.open, base.bars[0].prices.unwrap().open);
    assert_eq!(first.close, base.bars[59].prices.unwrap().close);
}

#[test]
fn zero_minute_buckets_are_rejected() {
    let base = assembler(3, 6)
        .assemble("BTCUSD", by_pair("BTCUSD").unwrap())
        .unwrap();
    assert!(base.resample(Resampling::Minutes(0)).is_err());
}

#[test]
fn finer_or_uneven_targets_are_rejected() {
    let hourly = || IndexAssembler::builder().interval(Interval::H1);
    for mode in [Resampling::Minutes(15), Resampling::Minutes(90)] {
        let err = hourly().resampling(mode).build().unwrap_err();
        assert!(matches!(err, IndexError::InvalidConfig(_)), "{mode:?}: {err:?}");
    }
    assert!(hourly().resampling(Resampling::Minutes(120)).build().is_ok());

    let inputs = RandomWalk::new(minute(0), Interval::H1, 6).generate(&["x", "y"], "BTCUSD", 3);
    let index = hourly().build().unwrap().assemble("BTCUSD", inputs).unwrap();
    assert_eq!(index.bars.len(), 6);
    assert!(matches!(
        index.resample(Resampling::Minutes(15)),
        Err(IndexError::InvalidArg(_))
    ));
    let daily = index.resample(Resampling::Daily).unwrap();
    assert_eq!(daily.interval, Interval::D1);
    assert_eq!(daily.bars.len(), 1);
}

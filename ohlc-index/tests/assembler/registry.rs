use crate::helpers::*;
use ohlc_index::{ExchangeConfig, IndexAssembler, IndexConfig, IndexError};

#[test]
fn unlisted_exchange_is_excluded_once_the_pair_is_listed() {
    let assembler = IndexAssembler::builder()
        .max_impute_len(1)
        .impute_window(2)
        .exchange("a", listing(&[PAIR]))
        .exchange("b", listing(&["ETHUSD"]))
        .build()
        .unwrap();
    let index = assembler
        .assemble(PAIR, scenarios::imputed_bar_carries_no_weight())
        .unwrap();
    assert_eq!(index.quality.exchanges.len(), 1);
    assert!(matches!(
        index.quality.excluded[0].error,
        IndexError::Unregistered { .. }
    ));
    // without b, minute 2 only has a's imputed bar
    assert!(index.bars[2].is_imputed);
    assert_eq!(index.bars[2].volume, 0.0);
    assert_eq!(index.quality.imputed_bars, 1);
}

#[test]
fn alignment_can_be_switched_off_per_exchange() {
    let assembler = IndexAssembler::builder()
        .oc_tolerance(0.01)
        .exchange(
            "a",
            ExchangeConfig {
                align_open_close: false,
                ..listing(&[PAIR])
            },
        )
        .build()
        .unwrap();
    let index = assembler.assemble(PAIR, scenarios::open_jump()).unwrap();
    assert_eq!(index.bars[1].prices.unwrap().open, 105.0);
    assert_eq!(index.quality.exchange("a").unwrap().aligned_opens, 0);
}

#[test]
fn index_level_alignment_is_opt_in() {
    let inputs = scenarios::long_outage();
    let plain = assembler(3, 6).assemble(PAIR, inputs.clone()).unwrap();
    let aligned = IndexAssembler::builder()
        .align_index(true)
        .build()
        .unwrap()
        .assemble(PAIR, inputs)
        .unwrap();
    // minute 1 is b alone, already aligned within b; minute 0 blends a and b
    let prev = aligned.bars[0].prices.unwrap();
    let cur = aligned.bars[1].prices.unwrap();
    assert_eq!(cur.open, prev.close);
    assert_ne!(plain.bars[1].prices.unwrap().open, plain.bars[0].prices.unwrap().close);
    assert_eq!(aligned.bars[7].prices.unwrap().open, aligned.bars[6].prices.unwrap().close);
}

#[test]
fn config_document_drives_the_assembler() {
    let cfg = IndexConfig::from_json_str(
        r#"{
            "max_impute_len": 1,
            "impute_window": 2,
            "exchanges": { "a": { "pairs": { "BTCUSD": { "symbol": "XBTUSD" } } } }
        }"#,
    )
    .unwrap();
    let index = IndexAssembler::builder()
        .config(cfg)
        .build()
        .unwrap()
        .assemble(PAIR, scenarios::imputed_bar_carries_no_weight())
        .unwrap();
    assert_eq!(index.quality.exchanges.len(), 1);
    assert_eq!(index.quality.excluded.len(), 1);
}

use crate::helpers::*;
use ohlc_index::{IndexAssembler, Series};
use proptest::prelude::*;

fn json(assembler: &IndexAssembler, inputs: Vec<Series>) -> Vec<u8> {
    let index = assembler.assemble("BTCUSD", inputs).unwrap();
    serde_json::to_vec(&index).unwrap()
}

#[test]
fn repeated_runs_serialize_identically() {
    let assembler = assembler(3, 6);
    let inputs = by_pair("BTCUSD").unwrap();
    assert_eq!(
        json(&assembler, inputs.clone()),
        json(&assembler, inputs)
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn input_order_never_changes_the_output(
        seed in 0u64..1_000,
        shuffle in Just(by_pair("BTCUSD").unwrap()).prop_shuffle(),
    ) {
        let assembler = assembler(3, 6);
        let walk = RandomWalk::new(minute(0), ohlc_index::Interval::M1, 40)
            .generate(&["x", "y", "z"], "BTCUSD", seed);
        let mut reversed = walk.clone();
        reversed.reverse();
        prop_assert_eq!(json(&assembler, walk), json(&assembler, reversed));
        prop_assert_eq!(
            json(&assembler, shuffle),
            json(&assembler, by_pair("BTCUSD").unwrap())
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_path_matches_sync_path() {
    let assembler = assembler(3, 6);
    let inputs = by_pair("BTCUSD").unwrap();
    let sync = assembler.assemble("BTCUSD", inputs.clone()).unwrap();
    let concurrent = assembler
        .assemble_concurrent("BTCUSD", inputs)
        .await
        .unwrap();
    assert_eq!(sync, concurrent);
}

#[tokio::test]
async fn concurrent_path_reports_rejections() {
    let err = assembler(3, 6)
        .assemble_concurrent("BTCUSD", vec![Series::new("a", "BTCUSD", vec![])])
        .await
        .unwrap_err();
    assert!(matches!(err, ohlc_index::IndexError::AllExchangesRejected { .. }));
}

// Re-export fixtures so tests can `use crate::helpers::*;`
pub use ohlc_index_mock::scenarios::{PAIR, minute};
pub use ohlc_index_mock::{RandomWalk, by_pair, drop_range, scenarios};

use ohlc_index::{ExchangeConfig, IndexAssembler, PairConfig, PairId, Span};

/// Assembler with the given imputation limits and default everything else.
pub fn assembler(max_impute_len: usize, impute_window: usize) -> IndexAssembler {
    IndexAssembler::builder()
        .max_impute_len(max_impute_len)
        .impute_window(impute_window)
        .build()
        .unwrap()
}

/// Registry entry listing `pairs`.
pub fn listing(pairs: &[&str]) -> ExchangeConfig {
    ExchangeConfig {
        pairs: pairs
            .iter()
            .map(|p| (PairId::from(*p), PairConfig::default()))
            .collect(),
        ..ExchangeConfig::default()
    }
}

/// Span between two scenario minutes, inclusive.
pub fn span(from: i64, to: i64) -> Span {
    Span {
        start: minute(from),
        end: minute(to),
    }
}

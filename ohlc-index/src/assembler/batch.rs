use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::AssembledIndex;
use crate::IndexAssembler;
use ohlc_index_core::{IndexError, PairId, Series, SeriesKey};

/// Outcome of a multi-pair batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Assembled indexes keyed by pair.
    pub results: BTreeMap<PairId, AssembledIndex>,
    /// Pairs that produced nothing, one error each.
    pub warnings: Vec<IndexError>,
}

/// Builder to assemble indexes for many pairs at once.
pub struct BatchBuilder<'a> {
    pub(crate) assembler: &'a IndexAssembler,
    pub(crate) series: Vec<Series>,
}

impl<'a> BatchBuilder<'a> {
    /// Create a new builder bound to an `IndexAssembler`.
    #[must_use]
    pub const fn new(assembler: &'a IndexAssembler) -> Self {
        Self {
            assembler,
            series: Vec::new(),
        }
    }

    /// Replace the input series.
    ///
    /// Series may cover any number of pairs; they are grouped by pair in `run()`.
    ///
    /// # Errors
    /// Returns `InvalidArg` if two series share an exchange and pair.
    pub fn series(mut self, series: Vec<Series>) -> Result<Self, IndexError> {
        let mut seen = HashSet::new();
        for s in &series {
            let key = s.key();
            if !seen.insert(key.clone()) {
                return Err(duplicate(&key));
            }
        }
        self.series = series;
        Ok(self)
    }

    /// Add a single series.
    ///
    /// # Errors
    /// Returns `InvalidArg` if a series for the same exchange and pair was already added.
    pub fn add_series(mut self, series: Series) -> Result<Self, IndexError> {
        if self
            .series
            .iter()
            .any(|s| s.exchange == series.exchange && s.pair == series.pair)
        {
            return Err(duplicate(&series.key()));
        }
        self.series.push(series);
        Ok(self)
    }

    /// Assemble every pair concurrently.
    ///
    /// Behavior:
    /// - Each pair runs through [`IndexAssembler::assemble_concurrent`]; pairs
    ///   are independent and joined at the end.
    /// - A pair that fails contributes its error to `warnings` without
    ///   aborting the batch.
    ///
    /// # Errors
    /// Returns `InvalidArg` only if no series were added.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "ohlc_index::batch::run",
            skip(self),
            fields(series = self.series.len()),
        )
    )]
    pub async fn run(self) -> Result<BatchReport, IndexError> {
        if self.series.is_empty() {
            return Err(IndexError::InvalidArg("no series specified for batch".into()));
        }

        let mut by_pair: BTreeMap<PairId, Vec<Series>> = BTreeMap::new();
        for s in self.series {
            by_pair.entry(s.pair.clone()).or_default().push(s);
        }

        let assembler = self.assembler;
        let tasks = by_pair.into_iter().map(|(pair, series)| async move {
            let out = assembler.assemble_concurrent(pair.clone(), series).await;
            (pair, out)
        });

        let mut results = BTreeMap::new();
        let mut warnings = Vec::new();
        for (pair, out) in futures::future::join_all(tasks).await {
            match out {
                Ok(index) => {
                    results.insert(pair, index);
                }
                Err(e) => warnings.push(e),
            }
        }
        Ok(BatchReport { results, warnings })
    }
}

fn duplicate(key: &SeriesKey) -> IndexError {
    IndexError::InvalidArg(format!("duplicate series '{key}' in batch"))
}

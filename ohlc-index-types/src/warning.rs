//! Non-fatal findings recorded while assembling an index.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::Gap;
use crate::error::{ErrorContext, IndexError};
use crate::ids::{ExchangeId, PairId};

/// Why a gap was left unfilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum UnresolvedReason {
    /// Longer than the configured `max_impute_len`.
    TooLong {
        /// Limit in effect.
        max: usize,
    },
    /// Touches the start or end of the shared calendar, so one side has no data.
    OpenEnded,
    /// Some missing timestamp had no observed bar on one side within the window.
    InsufficientWindow,
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong { max } => write!(f, "longer than max_impute_len={max}"),
            Self::OpenEnded => f.write_str("open-ended"),
            Self::InsufficientWindow => f.write_str("no data on both sides within window"),
        }
    }
}

/// A recorded, non-fatal issue. Each variant carries its pair and location.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum IndexWarning {
    /// A per-exchange gap was not imputed.
    #[error("unresolved gap on {exchange}/{pair} {}: {reason}", gap_span(.gap))]
    UnresolvedGap {
        /// Trading pair.
        pair: PairId,
        /// Exchange with the gap.
        exchange: ExchangeId,
        /// Location of the gap.
        gap: Gap,
        /// Why it stayed open.
        reason: UnresolvedReason,
    },

    /// No exchange had data over a run of timestamps.
    #[error("all exchanges missing for {pair} {}..{} ({len} bars)", rfc3339(.start), rfc3339(.end))]
    AllExchangesMissing {
        /// Trading pair.
        pair: PairId,
        /// First timestamp of the run.
        start: DateTime<Utc>,
        /// Last timestamp of the run.
        end: DateTime<Utc>,
        /// Number of index-level gap bars in the run.
        len: usize,
    },

    /// An exchange series was excluded from the index.
    #[error("excluded {exchange} from {pair}: {error}")]
    ExchangeExcluded {
        /// Trading pair.
        pair: PairId,
        /// Excluded exchange.
        exchange: ExchangeId,
        /// Reason for exclusion.
        error: IndexError,
    },
}

fn rfc3339(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

fn gap_span(gap: &Gap) -> String {
    format!("{}..{} ({} bars)", rfc3339(&gap.start), rfc3339(&gap.end), gap.len)
}

impl IndexWarning {
    /// Pair, exchange and first timestamp this warning refers to.
    #[must_use]
    pub fn context(&self) -> ErrorContext<'_> {
        match self {
            Self::UnresolvedGap {
                pair, exchange, gap, ..
            } => ErrorContext {
                pair: Some(pair),
                exchange: Some(exchange),
                ts: Some(gap.start),
            },
            Self::AllExchangesMissing { pair, start, .. } => ErrorContext {
                pair: Some(pair),
                exchange: None,
                ts: Some(*start),
            },
            Self::ExchangeExcluded {
                pair,
                exchange,
                error,
            } => ErrorContext {
                pair: Some(pair),
                exchange: Some(exchange),
                ts: error.context().ts,
            },
        }
    }
}

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bar::BarField;
use crate::ids::{ExchangeId, PairId};
use crate::interval::Interval;

/// Unified error type for the ohlc-index workspace.
///
/// Series-level failures carry the pair, the exchange and, when known, the
/// offending timestamp so they can be reported without losing context.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IndexError {
    /// Input series violates the ingestion contract; that exchange is excluded.
    #[error("malformed series {exchange}/{pair}{}: {reason}", at(.ts))]
    MalformedSeries {
        /// Trading pair of the series.
        pair: PairId,
        /// Exchange of the series.
        exchange: ExchangeId,
        /// First offending timestamp, if the problem is bar-specific.
        ts: Option<DateTime<Utc>>,
        /// What was wrong.
        reason: MalformedReason,
    },

    /// The same exchange supplied more than one series for a pair.
    #[error("duplicate series for {exchange}/{pair}")]
    DuplicateExchange {
        /// Trading pair being assembled.
        pair: PairId,
        /// Exchange that appeared twice.
        exchange: ExchangeId,
    },

    /// A series was passed for a different pair than the one being assembled.
    #[error("series {exchange}/{found} passed while assembling {pair}")]
    PairMismatch {
        /// Trading pair being assembled.
        pair: PairId,
        /// Exchange of the stray series.
        exchange: ExchangeId,
        /// Pair the stray series belongs to.
        found: PairId,
    },

    /// The exchange is not registered for this pair in the configuration.
    #[error("exchange {exchange} is not registered for {pair}")]
    Unregistered {
        /// Trading pair being assembled.
        pair: PairId,
        /// Exchange missing from the registry.
        exchange: ExchangeId,
    },

    /// Every input series for the pair was excluded; nothing can be produced.
    #[error("all exchanges rejected for {pair}: {errors:?}")]
    AllExchangesRejected {
        /// Trading pair being assembled.
        pair: PairId,
        /// One error per excluded series.
        errors: Vec<IndexError>,
    },

    /// Configuration failed validation.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Unknown/opaque error, e.g. a worker task that panicked.
    #[error("unknown error: {0}")]
    Other(String),
}

fn at(ts: &Option<DateTime<Utc>>) -> String {
    ts.map_or_else(String::new, |t| format!(" at {}", t.to_rfc3339()))
}

/// Why a series was rejected as malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum MalformedReason {
    /// The series holds no bars.
    Empty,
    /// A timestamp is not on the interval grid.
    NotAligned {
        /// Interval the timestamp was checked against.
        interval: Interval,
    },
    /// A timestamp does not exceed its predecessor.
    NotIncreasing {
        /// Timestamp of the preceding bar.
        previous: DateTime<Utc>,
    },
    /// A numeric field is NaN or infinite.
    NonFinite {
        /// Field holding the bad value.
        field: BarField,
    },
    /// Volume is below zero.
    NegativeVolume,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("series is empty"),
            Self::NotAligned { interval } => write!(f, "timestamp not aligned to {interval}"),
            Self::NotIncreasing { previous } => {
                write!(f, "timestamp not after previous {}", previous.to_rfc3339())
            }
            Self::NonFinite { field } => write!(f, "{field} is not finite"),
            Self::NegativeVolume => f.write_str("volume is negative"),
        }
    }
}

/// Traceability context attached to an error or warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorContext<'a> {
    /// Trading pair, when known.
    pub pair: Option<&'a PairId>,
    /// Exchange, when the problem is exchange-specific.
    pub exchange: Option<&'a ExchangeId>,
    /// Timestamp, when the problem is bar-specific.
    pub ts: Option<DateTime<Utc>>,
}

impl IndexError {
    /// Helper: build a `MalformedSeries` error.
    pub fn malformed(
        pair: impl Into<PairId>,
        exchange: impl Into<ExchangeId>,
        ts: Option<DateTime<Utc>>,
        reason: MalformedReason,
    ) -> Self {
        Self::MalformedSeries {
            pair: pair.into(),
            exchange: exchange.into(),
            ts,
            reason,
        }
    }

    /// Helper: build an `InvalidConfig` error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// True if this error removes a single exchange while the pair carries on.
    #[must_use]
    pub const fn is_exchange_scoped(&self) -> bool {
        matches!(
            self,
            Self::MalformedSeries { .. }
                | Self::DuplicateExchange { .. }
                | Self::PairMismatch { .. }
                | Self::Unregistered { .. }
        )
    }

    /// Pair, exchange and timestamp this error refers to.
    #[must_use]
    pub const fn context(&self) -> ErrorContext<'_> {
        match self {
            Self::MalformedSeries {
                pair, exchange, ts, ..
            } => ErrorContext {
                pair: Some(pair),
                exchange: Some(exchange),
                ts: *ts,
            },
            Self::DuplicateExchange { pair, exchange }
            | Self::PairMismatch { pair, exchange, .. }
            | Self::Unregistered { pair, exchange } => ErrorContext {
                pair: Some(pair),
                exchange: Some(exchange),
                ts: None,
            },
            Self::AllExchangesRejected { pair, .. } => ErrorContext {
                pair: Some(pair),
                exchange: None,
                ts: None,
            },
            Self::InvalidConfig(_) | Self::InvalidArg(_) | Self::Other(_) => ErrorContext {
                pair: None,
                exchange: None,
                ts: None,
            },
        }
    }

    /// Flatten nested `AllExchangesRejected` structures into a plain vector.
    #[must_use]
    pub fn flatten(self) -> Vec<Self> {
        match self {
            Self::AllExchangesRejected { errors, .. } => {
                errors.into_iter().flat_map(Self::flatten).collect()
            }
            other => vec![other],
        }
    }
}

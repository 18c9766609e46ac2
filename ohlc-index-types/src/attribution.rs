//! Attribution types for merged index spans.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ExchangeId, PairId};

/// A continuous span of timestamps `[start..=end]` that an exchange contributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Inclusive start timestamp.
    pub start: DateTime<Utc>,
    /// Inclusive end timestamp.
    pub end: DateTime<Utc>,
}

/// Attribution of a merged index: which exchange fed which timestamp spans.
///
/// Behavior:
/// - Built after merging by walking each index bar's contributing set and
///   emitting a span whenever an exchange's contribution is interrupted.
/// - Useful for auditing coverage and spotting exchanges that drop out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    /// Pair the attribution refers to.
    pub pair: PairId,
    /// Collected spans annotated by exchange.
    pub spans: Vec<(ExchangeId, Span)>,
}

impl Attribution {
    /// Create a new attribution container for a pair.
    #[must_use]
    pub const fn new(pair: PairId) -> Self {
        Self {
            pair,
            spans: vec![],
        }
    }

    /// Record an exchange span contribution.
    pub fn push(&mut self, item: (ExchangeId, Span)) {
        self.spans.push(item);
    }

    /// Spans contributed by `exchange`, in the order recorded.
    pub fn spans_for<'a>(&'a self, exchange: &'a ExchangeId) -> impl Iterator<Item = Span> + 'a {
        self.spans
            .iter()
            .filter(move |(ex, _)| ex == exchange)
            .map(|(_, s)| *s)
    }
}

//! Quality report produced alongside every assembled index.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::attribution::Attribution;
use crate::calendar::Gap;
use crate::error::IndexError;
use crate::ids::{ExchangeId, PairId};
use crate::interval::Interval;
use crate::warning::{IndexWarning, UnresolvedReason};

/// Two adjacent bars further apart than one interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discontinuity {
    /// Last timestamp before the jump.
    pub before: DateTime<Utc>,
    /// First timestamp after the jump.
    pub after: DateTime<Utc>,
}

/// Read-only health summary of a raw input series.
///
/// Computed before validation so rejected series are described too.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeriesDiagnostics {
    /// Number of bars.
    pub bars: usize,
    /// First timestamp.
    pub first: Option<DateTime<Utc>>,
    /// Last timestamp.
    pub last: Option<DateTime<Utc>>,
    /// Most common spacing between bars, in seconds.
    pub cadence_secs: Option<i64>,
    /// Adjacent pairs spaced by anything other than the configured interval.
    pub discontinuities: usize,
    /// Earliest discontinuity.
    pub first_discontinuity: Option<Discontinuity>,
    /// Latest discontinuity.
    pub last_discontinuity: Option<Discontinuity>,
    /// Bars sharing a timestamp with their predecessor.
    pub duplicate_timestamps: usize,
    /// Bars with any NaN or infinite field.
    pub non_finite_rows: usize,
    /// Bars with negative volume.
    pub negative_volume_rows: usize,
    /// Bars whose high is below another price.
    pub invalid_highs: usize,
    /// Bars whose low is above another price.
    pub invalid_lows: usize,
}

/// A gap left unfilled on one exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedGap {
    /// Location of the gap.
    pub gap: Gap,
    /// Why it stayed open.
    pub reason: UnresolvedReason,
}

/// Per-exchange contribution to an index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeQuality {
    /// Exchange.
    pub exchange: ExchangeId,
    /// Observed bars supplied.
    pub raw_bars: usize,
    /// Bars produced by imputation.
    pub imputed_bars: usize,
    /// Bars whose open was rewritten.
    pub aligned_opens: usize,
    /// Bars whose high/low were widened, either to repair the input or after alignment.
    pub widened_ranges: usize,
    /// Gaps filled by imputation.
    pub resolved_gaps: usize,
    /// Gaps left open.
    pub unresolved_gaps: Vec<UnresolvedGap>,
    /// Observed bars divided by the shared calendar length, in `[0, 1]`.
    pub coverage: f64,
    /// Observed plus imputed bars divided by the shared calendar length.
    pub filled_coverage: f64,
    /// Health of the raw input.
    pub diagnostics: SeriesDiagnostics,
}

impl ExchangeQuality {
    /// Coverage as a percentage.
    #[must_use]
    pub fn coverage_pct(&self) -> f64 {
        self.coverage * 100.0
    }
}

/// An input series that did not contribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedExchange {
    /// Exchange.
    pub exchange: ExchangeId,
    /// Why it was excluded.
    pub error: IndexError,
    /// Health of the raw input.
    pub diagnostics: SeriesDiagnostics,
}

/// Aggregate quality summary handed to audit and metadata consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Trading pair.
    pub pair: PairId,
    /// Base interval of the index.
    pub interval: Interval,
    /// First index timestamp.
    pub start: Option<DateTime<Utc>>,
    /// Last index timestamp.
    pub end: Option<DateTime<Utc>>,
    /// Index bars produced, gaps included.
    pub total_bars: usize,
    /// Index bars with no contributing exchange.
    pub gap_bars: usize,
    /// Index bars built only from imputed data.
    pub imputed_bars: usize,
    /// Maximal runs of index-level gap bars.
    pub index_gaps: Vec<Gap>,
    /// Contributing exchanges in id order.
    pub exchanges: Vec<ExchangeQuality>,
    /// Exchanges excluded from the index.
    pub excluded: Vec<ExcludedExchange>,
    /// Spans each exchange contributed to.
    pub attribution: Attribution,
    /// Every non-fatal issue, with pair/exchange/timestamp context.
    pub warnings: Vec<IndexWarning>,
}

impl QualityReport {
    /// Total unresolved gaps across all exchanges.
    #[must_use]
    pub fn unresolved_gap_count(&self) -> usize {
        self.exchanges.iter().map(|e| e.unresolved_gaps.len()).sum()
    }

    /// Quality entry for `exchange`, if it contributed.
    #[must_use]
    pub fn exchange(&self, exchange: &str) -> Option<&ExchangeQuality> {
        self.exchanges.iter().find(|e| e.exchange.as_str() == exchange)
    }
}

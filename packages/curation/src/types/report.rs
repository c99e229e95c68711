//! Run results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::scored::{CuratedPaper, ScoredPaper};

/// One enrichment source failing for one paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentFailure {
    pub paper_id: String,
    pub source: String,
    pub message: String,
}

/// Counters and non-fatal failures collected during a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Papers returned by the fetcher
    pub fetched: usize,

    /// Papers not seen in any earlier run
    pub new: usize,

    /// Papers dropped because an earlier run already handled them
    pub skipped_seen: usize,

    /// New papers dropped by the relevance filter or keyword prefilter
    pub prefiltered_out: usize,

    /// The relevance filter was configured but fell back to keywords
    pub relevance_fallback: bool,

    pub enrichment_failures: Vec<EnrichmentFailure>,

    /// Papers whose structuring stage fell back to extracted sentences
    pub structuring_fallbacks: usize,

    /// Papers whose compression stage fell back to structured fields
    pub compression_fallbacks: usize,

    pub delivery_failures: Vec<String>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Some stage degraded.
    pub fn is_degraded(&self) -> bool {
        !self.enrichment_failures.is_empty()
            || self.relevance_fallback
            || self.structuring_fallbacks > 0
            || self.compression_fallbacks > 0
            || !self.delivery_failures.is_empty()
    }

    /// Failures for one enrichment source.
    pub fn failures_for(&self, source: &str) -> usize {
        self.enrichment_failures
            .iter()
            .filter(|f| f.source == source)
            .count()
    }
}

/// The outcome of a completed run.
///
/// An aborted run never produces a report, so an empty `papers` list always
/// means "nothing new", not "something broke".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_at: DateTime<Utc>,

    /// Every candidate, ranked
    pub ranked: Vec<ScoredPaper>,

    /// Top-N with summaries, in rank order
    pub papers: Vec<CuratedPaper>,

    pub summary: RunSummary,
}

impl RunReport {
    pub fn empty(run_at: DateTime<Utc>, summary: RunSummary) -> Self {
        Self {
            run_at,
            ranked: Vec::new(),
            papers: Vec::new(),
            summary,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }
}

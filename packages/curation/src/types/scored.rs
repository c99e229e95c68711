//! Ranked paper records.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::paper::Paper;
use crate::types::summary::Summary;

/// A paper with its per-dimension sub-scores and weighted total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPaper {
    pub paper: Paper,

    /// Scorer name to sub-score in [0, 1], in pipeline order
    pub scores: IndexMap<String, f64>,

    /// Weighted total in [0, 100]
    pub total: f64,
}

impl ScoredPaper {
    pub fn id(&self) -> &str {
        &self.paper.id
    }

    /// Sub-score for one dimension.
    pub fn score(&self, name: &str) -> Option<f64> {
        self.scores.get(name).copied()
    }
}

/// A ranked paper with its summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuratedPaper {
    pub scored: ScoredPaper,
    pub summary: Summary,
}

impl CuratedPaper {
    pub fn paper(&self) -> &Paper {
        &self.scored.paper
    }

    pub fn total(&self) -> f64 {
        self.scored.total
    }
}

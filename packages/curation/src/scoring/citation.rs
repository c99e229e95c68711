use crate::error::ScoreError;
use crate::scoring::{tier_score, Scorer};
use crate::types::config::CitationConfig;
use crate::types::paper::Paper;

/// Citation tiers plus an influential-citation bonus, clamped to 1.0.
///
/// Papers never looked up (no citation data) score 0.0.
#[derive(Debug, Clone)]
pub struct CitationScorer {
    config: CitationConfig,
}

impl CitationScorer {
    pub fn new(config: CitationConfig) -> Self {
        Self { config }
    }
}

impl Default for CitationScorer {
    fn default() -> Self {
        Self::new(CitationConfig::default())
    }
}

impl Scorer for CitationScorer {
    fn name(&self) -> &str {
        "citation"
    }

    fn score(&self, paper: &Paper) -> Result<f64, ScoreError> {
        let citations = tier_score(paper.citation_count.unwrap_or(0), &self.config.tiers);
        let influential = tier_score(
            paper.influential_citation_count.unwrap_or(0),
            &self.config.influential_tiers,
        );
        Ok((citations + influential).min(1.0))
    }
}

use indexmap::IndexMap;
use tracing::warn;

use crate::error::ConfigError;
use crate::scoring::Scorer;
use crate::types::paper::Paper;
use crate::types::scored::ScoredPaper;

/// Weighted combination of scorers.
///
/// `total = Σ(wᵢ·sᵢ) / Σwᵢ × 100`, weights fixed at construction.
pub struct ScoringPipeline {
    scorers: Vec<(Box<dyn Scorer>, f64)>,
    total_weight: f64,
}

impl ScoringPipeline {
    /// Fails if there are no scorers or any weight is not finite and > 0.
    pub fn new(scorers: Vec<(Box<dyn Scorer>, f64)>) -> Result<Self, ConfigError> {
        if scorers.is_empty() {
            return Err(ConfigError::EmptyPipeline);
        }
        for (scorer, weight) in &scorers {
            if !(weight.is_finite() && *weight > 0.0) {
                return Err(ConfigError::InvalidWeight {
                    scorer: scorer.name().to_string(),
                    weight: *weight,
                });
            }
        }
        let total_weight = scorers.iter().map(|(_, w)| w).sum();
        Ok(Self {
            scorers,
            total_weight,
        })
    }

    /// Scorer names in pipeline order.
    pub fn names(&self) -> Vec<&str> {
        self.scorers.iter().map(|(s, _)| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.scorers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scorers.is_empty()
    }

    /// Score one paper. A failing or non-finite dimension counts as 0.0.
    pub fn score(&self, paper: &Paper) -> ScoredPaper {
        let mut scores = IndexMap::with_capacity(self.scorers.len());
        let mut weighted = 0.0;

        for (scorer, weight) in &self.scorers {
            let value = match scorer.score(paper) {
                Ok(v) if v.is_finite() => v.clamp(0.0, 1.0),
                Ok(v) => {
                    warn!(paper_id = %paper.id, scorer = scorer.name(), value = v, "Non-finite score, using 0");
                    0.0
                }
                Err(e) => {
                    warn!(paper_id = %paper.id, scorer = scorer.name(), error = %e, "Scorer failed, using 0");
                    0.0
                }
            };
            weighted += weight * value;
            scores.insert(scorer.name().to_string(), value);
        }

        let total = (weighted / self.total_weight * 100.0).clamp(0.0, 100.0);
        ScoredPaper {
            paper: paper.clone(),
            scores,
            total,
        }
    }

    /// Score all papers and sort by total, descending.
    ///
    /// The sort is stable: equal totals keep input order.
    pub fn rank(&self, papers: &[Paper]) -> Vec<ScoredPaper> {
        let mut scored: Vec<ScoredPaper> = papers.iter().map(|p| self.score(p)).collect();
        scored.sort_by(|a, b| b.total.total_cmp(&a.total));
        scored
    }
}

impl std::fmt::Debug for ScoringPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let weights: Vec<(&str, f64)> = self.scorers.iter().map(|(s, w)| (s.name(), *w)).collect();
        f.debug_struct("ScoringPipeline")
            .field("scorers", &weights)
            .finish()
    }
}

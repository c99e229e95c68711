use regex::{Regex, RegexBuilder};
use tracing::warn;

use crate::error::ScoreError;
use crate::scoring::Scorer;
use crate::types::config::AuthorConfig;
use crate::types::paper::Paper;

/// Binary: 1.0 when any affiliation names a known institution.
///
/// Matching is case-insensitive on word boundaries, so "MIT" matches
/// "MIT CSAIL" but not "Smith College".
#[derive(Debug, Clone)]
pub struct AuthorScorer {
    patterns: Vec<Regex>,
}

impl AuthorScorer {
    pub fn new(config: &AuthorConfig) -> Self {
        let patterns = config
            .institutions
            .iter()
            .map(|inst| inst.trim())
            .filter(|inst| !inst.is_empty())
            .filter_map(|inst| {
                RegexBuilder::new(&format!(r"\b{}\b", regex::escape(inst)))
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| warn!(institution = inst, error = %e, "Skipping institution"))
                    .ok()
            })
            .collect();
        Self { patterns }
    }

    pub fn matches(&self, affiliation: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(affiliation))
    }
}

impl Default for AuthorScorer {
    fn default() -> Self {
        Self::new(&AuthorConfig::default())
    }
}

impl Scorer for AuthorScorer {
    fn name(&self) -> &str {
        "author"
    }

    fn score(&self, paper: &Paper) -> Result<f64, ScoreError> {
        let hit = paper.institutions.iter().any(|inst| self.matches(inst));
        Ok(if hit { 1.0 } else { 0.0 })
    }
}

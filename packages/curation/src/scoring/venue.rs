use regex::{Regex, RegexBuilder};

use crate::error::ScoreError;
use crate::scoring::Scorer;
use crate::types::config::VenueConfig;
use crate::types::paper::Paper;

/// Top-venue match plus verified publication, additive and clamped.
///
/// Venue and journal are both checked against the top-venue list, on word
/// boundaries so "acl" does not match "Oracle".
#[derive(Debug, Clone)]
pub struct VenueScorer {
    patterns: Vec<Regex>,
    top_venue_score: f64,
    published_score: f64,
}

impl VenueScorer {
    pub fn new(config: &VenueConfig) -> Self {
        let patterns = config
            .top_venues
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .filter_map(|v| {
                RegexBuilder::new(&format!(r"\b{}\b", regex::escape(v)))
                    .case_insensitive(true)
                    .build()
                    .ok()
            })
            .collect();
        Self {
            patterns,
            top_venue_score: config.top_venue_score,
            published_score: config.published_score,
        }
    }

    pub fn is_top_venue(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(name))
    }
}

impl Default for VenueScorer {
    fn default() -> Self {
        Self::new(&VenueConfig::default())
    }
}

impl Scorer for VenueScorer {
    fn name(&self) -> &str {
        "venue"
    }

    fn score(&self, paper: &Paper) -> Result<f64, ScoreError> {
        let top = [paper.venue.as_deref(), paper.journal.as_deref()]
            .into_iter()
            .flatten()
            .any(|name| self.is_top_venue(name));

        let mut score = 0.0;
        if top {
            score += self.top_venue_score;
        }
        if paper.is_published() {
            score += self.published_score;
        }
        Ok(score.min(1.0))
    }
}

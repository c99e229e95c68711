//! Scoring dimensions and the weighted pipeline that combines them.
//!
//! A scorer is a capability (`paper -> [0, 1]`), not a class hierarchy.
//! Built-in scorers are looked up by name in a [`ScorerRegistry`] and
//! assembled into a [`ScoringPipeline`] from a
//! [`ScoringConfig`](crate::types::config::ScoringConfig).

pub mod author;
pub mod citation;
pub mod freshness;
pub mod keyword;
pub mod pipeline;
pub mod registry;
pub mod venue;

pub use author::AuthorScorer;
pub use citation::CitationScorer;
pub use freshness::FreshnessScorer;
pub use keyword::KeywordScorer;
pub use pipeline::ScoringPipeline;
pub use registry::{ScorerFactory, ScorerRegistry};
pub use venue::VenueScorer;

use crate::error::ScoreError;
use crate::types::paper::Paper;

/// One scoring dimension.
///
/// Implementations should be total and return values in [0, 1]. The
/// pipeline still guards against errors and out-of-range values.
pub trait Scorer: Send + Sync {
    /// Dimension name, used as the key in [`ScoredPaper::scores`](crate::ScoredPaper).
    fn name(&self) -> &str;

    fn score(&self, paper: &Paper) -> Result<f64, ScoreError>;
}

/// Highest tier reached by `value`, or 0.0 below the first tier.
pub(crate) fn tier_score(value: u64, tiers: &[crate::types::config::Tier]) -> f64 {
    tiers
        .iter()
        .rev()
        .find(|t| value >= t.min)
        .map(|t| t.score)
        .unwrap_or(0.0)
}

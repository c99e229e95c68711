//! Named scorer constructors.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::error::ConfigError;
use crate::scoring::{
    AuthorScorer, CitationScorer, FreshnessScorer, KeywordScorer, Scorer, ScoringPipeline,
    VenueScorer,
};
use crate::types::config::ScoringConfig;

/// Builds one scorer from the scoring config and the run's reference time.
pub type ScorerFactory =
    Arc<dyn Fn(&ScoringConfig, DateTime<Utc>) -> Box<dyn Scorer> + Send + Sync>;

/// Maps scorer names to constructors.
///
/// [`ScorerRegistry::builtin`] knows `citation`, `author`, `venue`,
/// `freshness` and `keyword`; applications can register more.
#[derive(Clone)]
pub struct ScorerRegistry {
    factories: IndexMap<String, ScorerFactory>,
}

impl ScorerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            factories: IndexMap::new(),
        }
    }

    /// Registry with every built-in scorer.
    pub fn builtin() -> Self {
        Self::new()
            .with("citation", |c, _| Box::new(CitationScorer::new(c.citation.clone())))
            .with("author", |c, _| Box::new(AuthorScorer::new(&c.author)))
            .with("venue", |c, _| Box::new(VenueScorer::new(&c.venue)))
            .with("freshness", |c, now| Box::new(FreshnessScorer::new(&c.freshness, now)))
            .with("keyword", |c, _| Box::new(KeywordScorer::new(&c.keyword)))
    }

    /// Register (or replace) a scorer constructor.
    pub fn with<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&ScoringConfig, DateTime<Utc>) -> Box<dyn Scorer> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build the pipeline described by `config.weights`, in that order.
    pub fn build(
        &self,
        config: &ScoringConfig,
        now: DateTime<Utc>,
    ) -> Result<ScoringPipeline, ConfigError> {
        config.validate()?;

        let mut scorers = Vec::with_capacity(config.weights.len());
        for (name, weight) in &config.weights {
            let factory = self
                .factories
                .get(name)
                .ok_or_else(|| ConfigError::UnknownScorer(name.clone()))?;
            scorers.push((factory(config, now), *weight));
        }
        ScoringPipeline::new(scorers)
    }
}

impl Default for ScorerRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for ScorerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}

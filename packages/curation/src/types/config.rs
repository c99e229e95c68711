//! Configuration types for scoring, summarization and aggregation.
//!
//! Every tunable (weights, tiers, allow-lists, keyword lists) is data. The
//! defaults reproduce the values the digest has always shipped with; a TOML
//! file can override any subset thanks to `#[serde(default)]`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One step of a tiered scale: at least `min` gives `score`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub min: u64,
    pub score: f64,
}

impl Tier {
    pub const fn new(min: u64, score: f64) -> Self {
        Self { min, score }
    }
}

fn validate_tiers(name: &str, tiers: &[Tier]) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidTiers {
        name: name.to_string(),
        reason,
    };

    for pair in tiers.windows(2) {
        if pair[1].min <= pair[0].min {
            return Err(invalid(format!(
                "thresholds must be strictly ascending ({} then {})",
                pair[0].min, pair[1].min
            )));
        }
        if pair[1].score < pair[0].score {
            return Err(invalid("scores must not decrease".into()));
        }
    }
    if let Some(t) = tiers.iter().find(|t| !(0.0..=1.0).contains(&t.score)) {
        return Err(invalid(format!("score {} outside [0, 1]", t.score)));
    }
    Ok(())
}

/// Citation tiers plus influential-citation bonus tiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CitationConfig {
    pub tiers: Vec<Tier>,
    pub influential_tiers: Vec<Tier>,
}

impl Default for CitationConfig {
    fn default() -> Self {
        Self {
            tiers: vec![
                Tier::new(1, 0.1),
                Tier::new(5, 0.25),
                Tier::new(10, 0.4),
                Tier::new(20, 0.55),
                Tier::new(50, 0.75),
                Tier::new(100, 1.0),
            ],
            influential_tiers: vec![Tier::new(1, 0.1), Tier::new(5, 0.2), Tier::new(10, 0.3)],
        }
    }
}

impl CitationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_tiers("citation", &self.tiers)?;
        validate_tiers("influential_citation", &self.influential_tiers)
    }
}

/// Institutions whose presence marks a paper as coming from a known lab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorConfig {
    pub institutions: Vec<String>,
}

impl Default for AuthorConfig {
    fn default() -> Self {
        let institutions = [
            // industry labs
            "google", "deepmind", "openai", "meta", "microsoft", "apple", "nvidia", "amazon",
            "bytedance", "tencent", "alibaba", "baidu", "anthropic", "mistral",
            // universities
            "stanford", "mit", "berkeley", "cmu", "carnegie mellon", "harvard", "oxford",
            "cambridge", "tsinghua", "peking", "princeton", "eth zurich", "mila", "inria",
            "caltech", "columbia", "university of washington", "cornell",
        ];
        Self {
            institutions: institutions.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Top-venue list and the two additive venue components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VenueConfig {
    pub top_venues: Vec<String>,

    /// Added when venue or journal matches a top venue
    pub top_venue_score: f64,

    /// Added when formal publication was verified
    pub published_score: f64,
}

impl Default for VenueConfig {
    fn default() -> Self {
        let venues = [
            "neurips", "nips", "icml", "iclr", "aaai", "ijcai", "cvpr", "iccv", "eccv", "acl",
            "emnlp", "naacl", "coling", "kdd", "www", "sigir", "wsdm", "nature", "science",
            "jmlr", "pami", "tpami", "transactions on neural networks",
        ];
        Self {
            top_venues: venues.iter().map(|s| s.to_string()).collect(),
            top_venue_score: 0.6,
            published_score: 0.4,
        }
    }
}

impl VenueConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("venue.top_venue_score", self.top_venue_score),
            ("venue.published_score", self.published_score),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    name: name.into(),
                    reason: format!("{} outside [0, 1]", value),
                });
            }
        }
        Ok(())
    }
}

/// Recency decay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreshnessConfig {
    /// Age at which the score reaches 0.5
    pub half_life_weeks: f64,

    /// Papers at most this old score 1.0
    pub fresh_days: f64,
}

impl Default for FreshnessConfig {
    fn default() -> Self {
        Self {
            half_life_weeks: 2.0,
            fresh_days: 1.0,
        }
    }
}

impl FreshnessConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.half_life_weeks.is_finite() && self.half_life_weeks > 0.0) {
            return Err(ConfigError::Invalid {
                name: "freshness.half_life_weeks".into(),
                reason: format!("must be > 0, got {}", self.half_life_weeks),
            });
        }
        if !(self.fresh_days.is_finite() && self.fresh_days >= 0.0) {
            return Err(ConfigError::Invalid {
                name: "freshness.fresh_days".into(),
                reason: format!("must be >= 0, got {}", self.fresh_days),
            });
        }
        Ok(())
    }
}

/// Research-interest keywords.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    pub keywords: Vec<String>,

    /// Number of matches that yields a full score
    pub saturation: usize,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        let keywords = [
            "LLM",
            "large language model",
            "GPT",
            "reasoning",
            "chain-of-thought",
            "multimodal",
            "vision-language",
            "agent",
            "tool use",
            "quantization",
            "efficient",
            "diffusion",
            "transformer",
        ];
        Self {
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            saturation: 3,
        }
    }
}

impl KeywordConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.saturation == 0 {
            return Err(ConfigError::Invalid {
                name: "keyword.saturation".into(),
                reason: "must be >= 1".into(),
            });
        }
        Ok(())
    }
}

/// Which scorers run, their weights, and each scorer's parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Scorer name to weight, in pipeline order
    pub weights: IndexMap<String, f64>,
    pub citation: CitationConfig,
    pub author: AuthorConfig,
    pub venue: VenueConfig,
    pub freshness: FreshnessConfig,
    pub keyword: KeywordConfig,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let weights = [
            ("citation", 30.0),
            ("author", 20.0),
            ("venue", 20.0),
            ("freshness", 15.0),
            ("keyword", 15.0),
        ]
        .into_iter()
        .map(|(name, w)| (name.to_string(), w))
        .collect();

        Self {
            weights,
            citation: CitationConfig::default(),
            author: AuthorConfig::default(),
            venue: VenueConfig::default(),
            freshness: FreshnessConfig::default(),
            keyword: KeywordConfig::default(),
        }
    }
}

impl ScoringConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the keyword list.
    pub fn with_keywords(mut self, keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.keyword.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Replace all weights.
    pub fn with_weights<'a>(mut self, weights: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        self.weights = weights
            .into_iter()
            .map(|(name, w)| (name.to_string(), w))
            .collect();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.citation.validate()?;
        self.venue.validate()?;
        self.freshness.validate()?;
        self.keyword.validate()
    }
}

/// Language of the compressed bullets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputLanguage {
    #[default]
    #[serde(rename = "en", alias = "english")]
    English,
    #[serde(rename = "zh", alias = "chinese")]
    Chinese,
}

/// Three-stage summarizer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    /// Sentences kept by the extraction stage
    pub key_sentences: usize,

    pub language: OutputLanguage,

    pub structure_temperature: f32,

    pub compress_temperature: f32,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            key_sentences: 3,
            language: OutputLanguage::English,
            structure_temperature: 0.2,
            compress_temperature: 0.6,
        }
    }
}

impl SummarizerConfig {
    pub fn with_language(mut self, language: OutputLanguage) -> Self {
        self.language = language;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.key_sentences == 0 {
            return Err(ConfigError::Invalid {
                name: "summarizer.key_sentences".into(),
                reason: "must be >= 1".into(),
            });
        }
        Ok(())
    }
}

/// Per-run orchestration settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    pub categories: Vec<String>,

    /// Submission window, counted back from the run time
    pub lookback_days: u32,

    /// Cap passed to the fetcher
    pub max_results: usize,

    /// Papers summarized and delivered
    pub top_n: usize,

    /// Keep only this many keyword-ranked candidates before enrichment
    pub prefilter_limit: Option<usize>,

    /// Free-text research interests; when set, an LLM picks the candidates
    pub research_interests: Option<String>,

    /// Candidates kept by the relevance filter
    pub relevance_limit: usize,

    /// Papers enriched concurrently; 1 is fully sequential
    pub enrichment_concurrency: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            categories: ["cs.AI", "cs.LG", "cs.CV", "cs.CL"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            lookback_days: 2,
            max_results: 200,
            top_n: 5,
            prefilter_limit: None,
            research_interests: None,
            relevance_limit: 10,
            enrichment_concurrency: 1,
        }
    }
}

impl AggregatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories(mut self, categories: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_lookback_days(mut self, days: u32) -> Self {
        self.lookback_days = days;
        self
    }

    pub fn with_prefilter_limit(mut self, limit: usize) -> Self {
        self.prefilter_limit = Some(limit);
        self
    }

    pub fn with_research_interests(mut self, interests: impl Into<String>) -> Self {
        self.research_interests = Some(interests.into());
        self
    }

    pub fn with_relevance_limit(mut self, limit: usize) -> Self {
        self.relevance_limit = limit;
        self
    }

    /// Research interests, if set and not blank.
    pub fn interests(&self) -> Option<&str> {
        self.research_interests
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn with_enrichment_concurrency(mut self, concurrency: usize) -> Self {
        self.enrichment_concurrency = concurrency;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("aggregator.max_results", self.max_results),
            ("aggregator.top_n", self.top_n),
            ("aggregator.relevance_limit", self.relevance_limit),
            ("aggregator.enrichment_concurrency", self.enrichment_concurrency),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    name: name.into(),
                    reason: "must be >= 1".into(),
                });
            }
        }
        if self.lookback_days == 0 {
            return Err(ConfigError::Invalid {
                name: "aggregator.lookback_days".into(),
                reason: "must be >= 1".into(),
            });
        }
        Ok(())
    }
}

/// Everything the core needs, as loaded from a config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurationConfig {
    pub aggregator: AggregatorConfig,
    pub scoring: ScoringConfig,
    pub summarizer: SummarizerConfig,
}

impl CurationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.aggregator.validate()?;
        self.scoring.validate()?;
        self.summarizer.validate()
    }
}

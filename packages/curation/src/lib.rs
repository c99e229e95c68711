//! arXiv paper curation library.
//!
//! Fetches recent submissions, enriches them with citation and publication
//! metadata, ranks them with a weighted set of scorers, and summarizes the
//! best ones into three bullets each.
//!
//! # Design
//!
//! - Scorers are a capability (`paper -> [0, 1]`) looked up by name
//! - The summarizer is three fixed stages with an explicit fallback after
//!   each LLM call
//! - Every collaborator (fetcher, enrichers, LLM, delivery, dedup) is a
//!   trait; the concrete clients live behind features
//! - Only fetch, dedup, LLM auth and config errors abort a run
//!
//! # Usage
//!
//! ```rust,ignore
//! use curation::{Aggregator, MemorySeenStore, Summarizer, SummarizerConfig};
//! use curation::testing::{MockFetcher, MockLlm};
//!
//! let aggregator = Aggregator::new(
//!     Arc::new(MockFetcher::new(papers)),
//!     Arc::new(MemorySeenStore::new()),
//!     Summarizer::new(Arc::new(MockLlm::new()), SummarizerConfig::default()),
//! );
//!
//! let report = aggregator.run(Utc::now()).await?;
//! println!("{}", render_message(&report, Utc::now().date_naive()));
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Collaborator interfaces (Fetcher, Enricher, Llm, DeliveryChannel, SeenStore)
//! - [`types`] - Papers, scores, summaries, run reports and configuration
//! - [`scoring`] - Scorers, registry and the weighted pipeline
//! - [`summarize`] - Extract, structure and compress stages
//! - [`pipeline`] - Aggregator run and delivery fan-out
//! - [`render`] - Chat message and Markdown report rendering
//! - [`stores`] - Dedup stores (memory, SQLite)
//! - [`sources`] - arXiv, Semantic Scholar and Crossref adapters
//! - [`channels`] - Telegram delivery
//! - [`testing`] - Mock implementations for testing

pub mod ai;
pub mod channels;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod scoring;
pub mod sources;
pub mod stores;
pub mod summarize;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{
    ConfigError, CurationError, DeliveryError, EnrichmentError, FetchError, LlmError, Result,
    ScoreError, Stage, StoreError, SummarizationError,
};
pub use traits::{
    delivery::DeliveryChannel,
    enricher::Enricher,
    fetcher::{FetchQuery, Fetcher},
    llm::{Llm, Prompt},
    store::SeenStore,
};
pub use types::{
    config::{
        AggregatorConfig, AuthorConfig, CitationConfig, CurationConfig, FreshnessConfig,
        KeywordConfig, OutputLanguage, ScoringConfig, SummarizerConfig, Tier, VenueConfig,
    },
    paper::{Enrichment, Paper, PublicationStatus},
    report::{EnrichmentFailure, RunReport, RunSummary},
    scored::{CuratedPaper, ScoredPaper},
    summary::{StructuredFields, Summary},
};

pub use pipeline::{deliver, Aggregator, DeliveryReport};
pub use render::{render_markdown, render_message, report_caption};
pub use scoring::{
    AuthorScorer, CitationScorer, FreshnessScorer, KeywordScorer, Scorer, ScorerFactory,
    ScorerRegistry, ScoringPipeline, VenueScorer,
};
pub use summarize::{extract_key_sentences, Summarizer};

// Re-export stores
pub use stores::MemorySeenStore;

#[cfg(feature = "sqlite")]
pub use stores::SqliteSeenStore;

// Re-export adapters
#[cfg(feature = "openai")]
pub use ai::OpenAiLlm;

#[cfg(feature = "scholar")]
pub use sources::{ArxivFetcher, CrossrefEnricher, SemanticScholarEnricher};

#[cfg(feature = "telegram")]
pub use channels::TelegramChannel;

//! Typed errors for the curation library.
//!
//! Uses `thiserror` for library errors (not `anyhow`). Only [`CurationError`]
//! aborts a run; every other error is recorded and the run degrades.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Fatal errors that abort an aggregator run before any delivery.
#[derive(Debug, Error)]
pub enum CurationError {
    /// Candidate papers could not be fetched
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Dedup store unavailable, seen-state cannot be guaranteed
    #[error("dedup store error: {0}")]
    Store(#[from] StoreError),

    /// LLM credentials rejected
    #[error("LLM authentication failed: {0}")]
    LlmAuth(String),

    /// Invalid configuration
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors from the paper fetcher.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport or upstream API failure
    #[error("request failed: {0}")]
    Request(#[source] BoxError),

    /// Upstream response could not be parsed
    #[error("invalid response: {0}")]
    Parse(String),

    /// Query rejected before sending
    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },
}

/// A single enrichment source failing for a single paper.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("{provider} request failed: {message}")]
    Request { provider: String, message: String },

    #[error("{provider} returned an unparseable response: {message}")]
    Parse { provider: String, message: String },
}

/// Errors surfaced by an [`Llm`](crate::traits::llm::Llm) implementation.
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    /// Credentials rejected; never worth retrying or degrading around
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Quota exhausted or rate limited after the client's own retries
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Any other failure (network, server, empty completion)
    #[error("request failed: {0}")]
    Request(String),
}

impl LlmError {
    pub fn is_auth(&self) -> bool {
        matches!(self, LlmError::Auth(_))
    }
}

/// Summarization stage identifiers, used in errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Structure,
    Compress,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Structure => write!(f, "structure"),
            Stage::Compress => write!(f, "compress"),
        }
    }
}

/// An LLM-backed summarization stage failed; the caller falls back.
#[derive(Debug, Clone, Error)]
pub enum SummarizationError {
    #[error("{stage} stage LLM call failed: {source}")]
    Llm {
        stage: Stage,
        #[source]
        source: LlmError,
    },

    #[error("{stage} stage response unparseable: {reason}")]
    Unparseable { stage: Stage, reason: String },
}

impl SummarizationError {
    /// The underlying LLM error, if this was a call failure.
    pub fn llm_error(&self) -> Option<&LlmError> {
        match self {
            SummarizationError::Llm { source, .. } => Some(source),
            SummarizationError::Unparseable { .. } => None,
        }
    }
}

/// Delivery channel failures. Never abort a run.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("delivery channel not configured")]
    NotConfigured,

    #[error("send failed: {0}")]
    Send(#[source] BoxError),

    #[error("cannot read {path}: {message}")]
    File { path: String, message: String },
}

/// Dedup store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(#[source] BoxError),
}

/// Invalid scorer or pipeline configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("scoring pipeline has no scorers")]
    EmptyPipeline,

    #[error("weight for scorer '{scorer}' must be finite and > 0, got {weight}")]
    InvalidWeight { scorer: String, weight: f64 },

    #[error("unknown scorer: {0}")]
    UnknownScorer(String),

    #[error("invalid tiers for {name}: {reason}")]
    InvalidTiers { name: String, reason: String },

    #[error("invalid setting {name}: {reason}")]
    Invalid { name: String, reason: String },
}

/// A scorer could not compute a value. The pipeline records 0.0.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("missing data: {0}")]
    MissingData(&'static str),

    #[error("invalid input: {0}")]
    Invalid(String),
}

/// Result type alias for aggregator runs.
pub type Result<T> = std::result::Result<T, CurationError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for delivery operations.
pub type DeliveryResult<T> = std::result::Result<T, DeliveryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarization_error_exposes_llm_error() {
        let err = SummarizationError::Llm {
            stage: Stage::Structure,
            source: LlmError::Auth("bad key".into()),
        };
        assert!(err.llm_error().is_some_and(LlmError::is_auth));
        assert!(err.to_string().starts_with("structure stage"));

        let err = SummarizationError::Unparseable {
            stage: Stage::Compress,
            reason: "2 bullets".into(),
        };
        assert!(err.llm_error().is_none());
    }

    #[test]
    fn test_fatal_conversions() {
        let err: CurationError = FetchError::Parse("truncated feed".into()).into();
        assert!(matches!(err, CurationError::Fetch(_)));

        let err: CurationError = ConfigError::EmptyPipeline.into();
        assert!(matches!(err, CurationError::Config(ConfigError::EmptyPipeline)));
    }
}

//! Error types for the LLM client.
//!
//! Errors are classified by how the caller should react to them: some are
//! worth retrying, some never are, and one means the breaker is open.

use std::time::Duration;

use thiserror::Error;

/// Result type for LLM client operations.
pub type Result<T> = std::result::Result<T, LlmError>;

/// LLM client errors.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Configuration error (missing or malformed API key, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (DNS, TCP, TLS, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// 401/403 from the provider
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// 429 from the provider
    #[error("Rate limited (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    /// 400-class rejection other than auth and rate limits (prompt too long etc.)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 5xx from the provider
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Parse error (invalid JSON, empty choices)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Too many consecutive failures; requests are short-circuited
    #[error("Circuit open after {failures} consecutive failures")]
    CircuitOpen { failures: u32 },
}

impl LlmError {
    /// Classify a non-success HTTP status into an error.
    pub fn from_status(status: u16, body: String, retry_after: Option<Duration>) -> Self {
        match status {
            401 | 403 => LlmError::Auth(body),
            429 => LlmError::RateLimited { retry_after },
            400..=499 => LlmError::BadRequest(body),
            _ => LlmError::Server {
                status,
                message: body,
            },
        }
    }

    /// Whether another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LlmError::Network(_)
                | LlmError::RateLimited { .. }
                | LlmError::Server { .. }
                | LlmError::Parse(_)
        )
    }

    /// Whether the failure is caused by credentials rather than the request.
    pub fn is_auth(&self) -> bool {
        matches!(self, LlmError::Auth(_))
    }
}

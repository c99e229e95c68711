//! OpenAI-compatible chat completion client
//!
//! A small REST client for `/chat/completions` with no domain logic. Every
//! non-success response is classified (auth, rate limit, bad request, server)
//! so callers and the built-in retry loop can react differently.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm_client::LlmClient;
//!
//! let client = LlmClient::from_env()?;
//! let text = client
//!     .generate(Some("You are terse."), "Summarize Rust in one line.", 0.3)
//!     .await?;
//! ```

pub mod error;
pub mod retry;
pub mod types;

pub use error::{LlmError, Result};
pub use retry::{call_with_retry, CircuitBreaker, CircuitState, RetryPolicy};
pub use types::*;

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::Client;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Chat completion client with retry and circuit breaking.
#[derive(Clone)]
pub struct LlmClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    policy: RetryPolicy,
    breaker: Arc<CircuitBreaker>,
}

impl LlmClient {
    /// Create a client for the given API key.
    ///
    /// Fails if the key is empty or contains line breaks or tabs, which
    /// usually means it was pasted with surrounding garbage.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = sanitize_key(&api_key.into())?;
        let http_client = Client::builder()
            .timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            policy: RetryPolicy::default(),
            breaker: Arc::new(CircuitBreaker::default()),
        })
    }

    /// Create from `OPENAI_API_KEY`, honouring `OPENAI_MODEL` and `OPENAI_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| LlmError::Config("OPENAI_API_KEY not set".into()))?;
        let mut client = Self::new(api_key)?;

        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            if !model.trim().is_empty() {
                client = client.with_model(model.trim());
            }
        }
        if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
            if !url.trim().is_empty() {
                client = client.with_base_url(url.trim());
            }
        }
        Ok(client)
    }

    /// Set a custom base URL (proxies, compatible providers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the default model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the completion token cap.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the circuit breaker.
    pub fn with_circuit_breaker(mut self, breaker: CircuitBreaker) -> Self {
        self.breaker = Arc::new(breaker);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.breaker.state()
    }

    /// Close the circuit breaker by hand.
    pub fn reset_circuit(&self) {
        self.breaker.reset();
    }

    /// Single prompt with optional system message, retried per policy.
    pub async fn generate(
        &self,
        system: Option<&str>,
        prompt: &str,
        temperature: f32,
    ) -> Result<String> {
        let mut request = ChatRequest::new(&self.model)
            .temperature(temperature)
            .max_tokens(self.max_tokens);
        if let Some(system) = system {
            request = request.message(Message::system(system));
        }
        request = request.message(Message::user(prompt));

        let response = call_with_retry(&self.policy, &self.breaker, || {
            self.chat_completion(&request)
        })
        .await?;

        Ok(response.content)
    }

    /// One chat completion attempt, no retry.
    pub async fn chat_completion(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "LLM request failed");
                LlmError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "LLM API error");
            return Err(LlmError::from_status(
                status.as_u16(),
                error_text,
                retry_after,
            ));
        }

        let raw: types::ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let content = raw
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| LlmError::Parse("Empty completion".into()))?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis() as u64,
            "LLM chat completion"
        );

        Ok(ChatResponse {
            content,
            usage: raw.usage,
        })
    }
}

fn sanitize_key(raw: &str) -> Result<String> {
    let key = raw.trim();
    if key.is_empty() {
        return Err(LlmError::Config("API key is empty".into()));
    }
    if key.contains(['\r', '\n', '\t']) {
        return Err(LlmError::Config(
            "API key contains line breaks or tabs".into(),
        ));
    }
    Ok(key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder() {
        let client = LlmClient::new("  sk-test ")
            .unwrap()
            .with_base_url("https://custom.api.com/v1/")
            .with_model("gpt-4o");

        assert_eq!(client.api_key, "sk-test");
        assert_eq!(client.base_url(), "https://custom.api.com/v1");
        assert_eq!(client.model(), "gpt-4o");
        assert_eq!(client.circuit_state(), CircuitState::Closed);
    }

    #[test]
    fn test_rejects_malformed_keys() {
        assert!(matches!(LlmClient::new(""), Err(LlmError::Config(_))));
        assert!(matches!(
            LlmClient::new("sk-abc\ndef"),
            Err(LlmError::Config(_))
        ));
    }
}

//! OpenAI-compatible implementation of the [`Llm`] trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use curation::ai::OpenAiLlm;
//!
//! let llm = OpenAiLlm::from_env()?;
//! let summarizer = Summarizer::new(Arc::new(llm), SummarizerConfig::default());
//! ```

use async_trait::async_trait;
use llm_client::LlmClient;

use crate::error::LlmError;
use crate::traits::llm::{Llm, Prompt};

/// Chat-completions backed LLM.
///
/// Retries and circuit breaking happen inside [`LlmClient`]; this adapter
/// only maps its errors onto the three cases the summarizer cares about.
#[derive(Clone)]
pub struct OpenAiLlm {
    client: LlmClient,
}

impl OpenAiLlm {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    /// Create from `OPENAI_API_KEY`, `OPENAI_MODEL` and `OPENAI_BASE_URL`.
    pub fn from_env() -> Result<Self, LlmError> {
        LlmClient::from_env().map(Self::new).map_err(map_error)
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }
}

#[async_trait]
impl Llm for OpenAiLlm {
    async fn complete(&self, prompt: &Prompt, temperature: f32) -> Result<String, LlmError> {
        let text = self
            .client
            .generate(prompt.system.as_deref(), &prompt.user, temperature)
            .await
            .map_err(map_error)?;

        if text.trim().is_empty() {
            return Err(LlmError::Request("empty completion".into()));
        }
        Ok(text)
    }
}

fn map_error(err: llm_client::LlmError) -> LlmError {
    match err {
        llm_client::LlmError::Auth(message) => LlmError::Auth(message),
        llm_client::LlmError::Config(message) => LlmError::Auth(message),
        e @ llm_client::LlmError::RateLimited { .. } => LlmError::RateLimited(e.to_string()),
        e => LlmError::Request(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        assert!(map_error(llm_client::LlmError::Auth("401".into())).is_auth());
        assert!(map_error(llm_client::LlmError::Config("OPENAI_API_KEY not set".into())).is_auth());
        assert!(matches!(
            map_error(llm_client::LlmError::RateLimited { retry_after: None }),
            LlmError::RateLimited(_)
        ));
        assert!(matches!(
            map_error(llm_client::LlmError::Server {
                status: 503,
                message: "overloaded".into()
            }),
            LlmError::Request(_)
        ));
        assert!(matches!(
            map_error(llm_client::LlmError::CircuitOpen { failures: 5 }),
            LlmError::Request(_)
        ));
    }
}

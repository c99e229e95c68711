//! LLM completion trait.
//!
//! The summarizer only needs "prompt in, text out". Retry, backoff and
//! circuit breaking live inside implementations.

use async_trait::async_trait;

use crate::error::LlmError;

/// System and user parts of one completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: Option<String>,
    pub user: String,
}

impl Prompt {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            system: None,
            user: user.into(),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

#[async_trait]
pub trait Llm: Send + Sync {
    /// Complete `prompt` at `temperature`, returning the raw text.
    async fn complete(&self, prompt: &Prompt, temperature: f32) -> Result<String, LlmError>;
}

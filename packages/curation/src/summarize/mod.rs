//! Three-stage summarizer: extract, structure, compress.
//!
//! Each stage is a plain function and can be called on its own. The
//! [`Summarizer`] runs them in a fixed order with an explicit fallback after
//! each LLM stage:
//!
//! 1. [`extract_key_sentences`]: rule-based, never fails
//! 2. [`structure`]: LLM, falls back to [`fallback_structure`]
//! 3. [`compress`]: LLM, falls back to [`fallback_bullets`]
//!
//! Only an authentication failure escapes; it means every later call would
//! fail the same way.

pub mod compress;
pub mod extract;
pub mod prompts;
pub mod structure;

pub use compress::{compress, fallback_bullets, parse_bullets};
pub use extract::{extract_key_sentences, split_sentences};
pub use structure::{fallback_structure, parse_structured, structure};

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{CurationError, SummarizationError};
use crate::traits::llm::Llm;
use crate::types::config::SummarizerConfig;
use crate::types::paper::Paper;
use crate::types::summary::Summary;

/// Runs the three stages for one paper at a time.
#[derive(Clone)]
pub struct Summarizer {
    llm: Option<Arc<dyn Llm>>,
    config: SummarizerConfig,
}

impl Summarizer {
    pub fn new(llm: Arc<dyn Llm>, config: SummarizerConfig) -> Self {
        Self {
            llm: Some(llm),
            config,
        }
    }

    /// Summarizer with no LLM: both LLM stages always take their fallback.
    pub fn extractive_only(config: SummarizerConfig) -> Self {
        Self { llm: None, config }
    }

    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }

    pub fn llm(&self) -> Option<&dyn Llm> {
        self.llm.as_deref()
    }

    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }

    /// Summarize one paper, degrading stage by stage.
    ///
    /// Returns `Err` only for [`CurationError::LlmAuth`].
    pub async fn summarize(&self, paper: &Paper) -> Result<Summary, CurationError> {
        let sentences = extract_key_sentences(&paper.abstract_text, self.config.key_sentences);
        let title = display_title(paper);
        let title = title.as_str();

        let Some(llm) = self.llm.as_deref() else {
            let fields = fallback_structure(&sentences, title);
            return Ok(Summary {
                bullets: fallback_bullets(&fields),
                structured_by_llm: false,
                compressed_by_llm: false,
            });
        };

        let structured = structure(
            llm,
            &sentences,
            title,
            self.config.structure_temperature,
        )
        .await;
        let (fields, structured_by_llm) = match structured {
            Ok(fields) => (fields, true),
            Err(e) => {
                check_fatal(&e)?;
                warn!(paper_id = %paper.id, error = %e, "Structuring failed, using extracted sentences");
                (fallback_structure(&sentences, title), false)
            }
        };

        let compressed = compress(
            llm,
            &fields,
            title,
            self.config.language,
            self.config.compress_temperature,
        )
        .await;
        let (bullets, compressed_by_llm) = match compressed {
            Ok(bullets) => (bullets, true),
            Err(e) => {
                check_fatal(&e)?;
                warn!(paper_id = %paper.id, error = %e, "Compression failed, using structured fields");
                (fallback_bullets(&fields), false)
            }
        };

        debug!(paper_id = %paper.id, structured_by_llm, compressed_by_llm, "Summarized paper");
        Ok(Summary {
            bullets,
            structured_by_llm,
            compressed_by_llm,
        })
    }
}

/// Title used in prompts and fallbacks; the abstract URL when the title is blank.
fn display_title(paper: &Paper) -> String {
    let title = paper.title.trim();
    if title.is_empty() {
        paper.abs_url()
    } else {
        title.to_string()
    }
}

fn check_fatal(err: &SummarizationError) -> Result<(), CurationError> {
    match err.llm_error() {
        Some(llm_err) if llm_err.is_auth() => Err(CurationError::LlmAuth(llm_err.to_string())),
        _ => Ok(()),
    }
}

impl std::fmt::Debug for Summarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Summarizer")
            .field("has_llm", &self.llm.is_some())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::testing::{test_paper, MockLlm};

    fn paper() -> Paper {
        let mut paper = test_paper("2402.00001");
        paper.title = "Subgoal Planning".into();
        paper.abstract_text = "LLMs struggle with planning. We propose subgoals. \
            It works on benchmarks. Nothing else matters."
            .into();
        paper
    }

    #[tokio::test]
    async fn test_both_stages_succeed() {
        let llm = Arc::new(
            MockLlm::new()
                .with_response("Problem: p\nMethod: m\nResult: r")
                .with_response("• one\n• two\n• three"),
        );
        let summarizer = Summarizer::new(llm.clone(), SummarizerConfig::default());

        let summary = summarizer.summarize(&paper()).await.unwrap();
        assert_eq!(summary.bullets, ["one", "two", "three"]);
        assert!(summary.structured_by_llm && summary.compressed_by_llm);
        assert_eq!(llm.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_structuring_failure_still_compresses() {
        let llm = Arc::new(
            MockLlm::new()
                .with_error(LlmError::Request("503".into()))
                .with_response("• one\n• two\n• three"),
        );
        let summarizer = Summarizer::new(llm.clone(), SummarizerConfig::default());

        let summary = summarizer.summarize(&paper()).await.unwrap();
        assert!(!summary.structured_by_llm);
        assert!(summary.compressed_by_llm);

        // compression received the extracted sentences
        let calls = llm.calls();
        assert!(calls[1].prompt.user.contains("- Problem: LLMs struggle with planning."));
    }

    #[tokio::test]
    async fn test_both_stages_fail() {
        let llm = Arc::new(
            MockLlm::new()
                .with_response("garbage")
                .with_response("• only one"),
        );
        let summarizer = Summarizer::new(llm, SummarizerConfig::default());

        let summary = summarizer.summarize(&paper()).await.unwrap();
        assert!(summary.is_fallback());
        assert!(summary.bullets.iter().all(|b| !b.is_empty()));
        assert_eq!(summary.bullets[0], "LLMs struggle with planning.");
    }

    #[tokio::test]
    async fn test_auth_failure_is_fatal() {
        let llm = Arc::new(MockLlm::new().with_error(LlmError::Auth("401".into())));
        let summarizer = Summarizer::new(llm, SummarizerConfig::default());

        let err = summarizer.summarize(&paper()).await.unwrap_err();
        assert!(matches!(err, CurationError::LlmAuth(_)));
    }

    #[tokio::test]
    async fn test_extractive_only() {
        let summarizer = Summarizer::extractive_only(SummarizerConfig::default());
        let mut empty = paper();
        empty.abstract_text = String::new();

        let summary = summarizer.summarize(&empty).await.unwrap();
        assert_eq!(summary.bullets, ["Subgoal Planning", "Subgoal Planning", "Subgoal Planning"]);
        assert!(summary.is_fallback());
    }

    #[tokio::test]
    async fn test_blank_title_and_abstract_keep_bullets_non_empty() {
        let summarizer = Summarizer::extractive_only(SummarizerConfig::default());
        let mut blank = paper();
        blank.title = "  ".into();
        blank.abstract_text = String::new();

        let summary = summarizer.summarize(&blank).await.unwrap();
        assert!(summary.bullets.iter().all(|b| !b.trim().is_empty()));
        assert_eq!(summary.bullets[0], "https://arxiv.org/abs/2402.00001");
    }
}

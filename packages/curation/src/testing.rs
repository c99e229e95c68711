//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the curation library
//! without making real LLM, network or messaging calls.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::error::{
    DeliveryError, DeliveryResult, EnrichmentError, FetchError, FetchResult, LlmError, ScoreError,
};
use crate::scoring::Scorer;
use crate::traits::{
    delivery::DeliveryChannel,
    enricher::Enricher,
    fetcher::{FetchQuery, Fetcher},
    llm::{Llm, Prompt},
};
use crate::types::paper::{Enrichment, Paper};

/// Fixed publication time used by [`test_paper`].
pub fn test_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 20, 8, 0, 0).unwrap()
}

/// A minimal paper with a neutral title and abstract.
pub fn test_paper(id: &str) -> Paper {
    Paper::new(
        id,
        format!("Paper {}", id),
        "We study a problem. We propose a method. Results improve.",
        test_time(),
    )
    .with_authors(["A. Author"])
    .with_categories(["cs.AI"])
}

/// Record of a call made to the mock LLM.
#[derive(Debug, Clone)]
pub struct MockLlmCall {
    pub prompt: Prompt,
    pub temperature: f32,
}

/// A mock LLM.
///
/// Queued responses are returned first, in order. Once the queue is empty
/// it answers by prompt shape: labelled fields for structuring prompts,
/// three bullets for anything else.
#[derive(Default)]
pub struct MockLlm {
    queue: Arc<RwLock<VecDeque<Result<String, LlmError>>>>,
    always: Arc<RwLock<Option<LlmError>>>,
    calls: Arc<RwLock<Vec<MockLlmCall>>>,
}

impl MockLlm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response.
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.queue.write().unwrap().push_back(Ok(text.into()));
        self
    }

    /// Queue a failure.
    pub fn with_error(self, error: LlmError) -> Self {
        self.queue.write().unwrap().push_back(Err(error));
        self
    }

    /// Fail every call that is not answered by the queue.
    pub fn failing(self, error: LlmError) -> Self {
        *self.always.write().unwrap() = Some(error);
        self
    }

    pub fn calls(&self) -> Vec<MockLlmCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }

    fn default_response(prompt: &Prompt) -> String {
        if prompt.user.contains("KEY SENTENCES") {
            "- Problem: A stated problem.\n- Method: A proposed method.\n- Result: A measured result."
                .to_string()
        } else {
            "• Addresses a problem\n• Uses a method\n• Reports a result".to_string()
        }
    }
}

#[async_trait]
impl Llm for MockLlm {
    async fn complete(&self, prompt: &Prompt, temperature: f32) -> Result<String, LlmError> {
        self.calls.write().unwrap().push(MockLlmCall {
            prompt: prompt.clone(),
            temperature,
        });

        if let Some(queued) = self.queue.write().unwrap().pop_front() {
            return queued;
        }
        if let Some(err) = self.always.read().unwrap().clone() {
            return Err(err);
        }
        Ok(Self::default_response(prompt))
    }
}

/// A mock fetcher returning a fixed paper list.
#[derive(Default)]
pub struct MockFetcher {
    papers: Vec<Paper>,
    fail: bool,
    queries: Arc<RwLock<Vec<FetchQuery>>>,
}

impl MockFetcher {
    pub fn new(papers: Vec<Paper>) -> Self {
        Self {
            papers,
            ..Default::default()
        }
    }

    /// Fetcher whose every call fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn queries(&self) -> Vec<FetchQuery> {
        self.queries.read().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, query: &FetchQuery) -> FetchResult<Vec<Paper>> {
        self.queries.write().unwrap().push(query.clone());
        if self.fail {
            return Err(FetchError::Request("mock network down".into()));
        }
        Ok(self
            .papers
            .iter()
            .take(query.max_results)
            .cloned()
            .collect())
    }
}

/// A mock enrichment source.
///
/// Returns configured patches by paper id, an empty patch for unknown ids,
/// and an error for ids marked as failing.
pub struct MockEnricher {
    source: String,
    patches: HashMap<String, Enrichment>,
    failing: HashSet<String>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockEnricher {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            patches: HashMap::new(),
            failing: HashSet::new(),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn with_patch(mut self, id: impl Into<String>, patch: Enrichment) -> Self {
        self.patches.insert(id.into(), patch);
        self
    }

    pub fn fail_for(mut self, id: impl Into<String>) -> Self {
        self.failing.insert(id.into());
        self
    }

    /// Paper ids looked up, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl Enricher for MockEnricher {
    fn source(&self) -> &str {
        &self.source
    }

    async fn enrich(&self, paper: &Paper) -> Result<Enrichment, EnrichmentError> {
        self.calls.write().unwrap().push(paper.id.clone());
        if self.failing.contains(&paper.id) {
            return Err(EnrichmentError::Request {
                provider: self.source.clone(),
                message: "mock failure".into(),
            });
        }
        Ok(self.patches.get(&paper.id).cloned().unwrap_or_default())
    }
}

/// Record of a delivery made through the mock channel.
#[derive(Debug, Clone, PartialEq)]
pub enum MockDelivery {
    Text(String),
    File {
        path: PathBuf,
        caption: Option<String>,
    },
}

/// A mock delivery channel that records what it was asked to send.
#[derive(Default)]
pub struct MockChannel {
    fail_text: bool,
    fail_files: bool,
    sent: Arc<RwLock<Vec<MockDelivery>>>,
}

impl MockChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_text(mut self) -> Self {
        self.fail_text = true;
        self
    }

    pub fn failing_files(mut self) -> Self {
        self.fail_files = true;
        self
    }

    pub fn sent(&self) -> Vec<MockDelivery> {
        self.sent.read().unwrap().clone()
    }
}

#[async_trait]
impl DeliveryChannel for MockChannel {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send(&self, text: &str) -> DeliveryResult<()> {
        if self.fail_text {
            return Err(DeliveryError::Send("mock send failure".into()));
        }
        self.sent
            .write()
            .unwrap()
            .push(MockDelivery::Text(text.to_string()));
        Ok(())
    }

    async fn send_file(&self, path: &Path, caption: Option<&str>) -> DeliveryResult<()> {
        if self.fail_files {
            return Err(DeliveryError::Send("mock upload failure".into()));
        }
        self.sent.write().unwrap().push(MockDelivery::File {
            path: path.to_path_buf(),
            caption: caption.map(str::to_string),
        });
        Ok(())
    }
}

/// A scorer returning fixed values by paper id, 0.0 otherwise.
pub struct FixedScorer {
    name: String,
    scores: HashMap<String, f64>,
}

impl FixedScorer {
    pub fn new(name: impl Into<String>, scores: &[(&str, f64)]) -> Self {
        Self {
            name: name.into(),
            scores: scores.iter().map(|(id, s)| (id.to_string(), *s)).collect(),
        }
    }
}

impl Scorer for FixedScorer {
    fn name(&self) -> &str {
        &self.name
    }

    fn score(&self, paper: &Paper) -> Result<f64, ScoreError> {
        Ok(self.scores.get(&paper.id).copied().unwrap_or(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_llm_queue_then_default() {
        let llm = MockLlm::new()
            .with_response("first")
            .with_error(LlmError::Request("boom".into()));

        let prompt = Prompt::new("KEY SENTENCES: x");
        assert_eq!(llm.complete(&prompt, 0.1).await.unwrap(), "first");
        assert!(llm.complete(&prompt, 0.1).await.is_err());
        assert!(llm.complete(&prompt, 0.1).await.unwrap().contains("Problem:"));
        assert_eq!(llm.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_mock_llm_failing() {
        let llm = MockLlm::new().failing(LlmError::Auth("nope".into()));
        let err = llm.complete(&Prompt::new("x"), 0.5).await.unwrap_err();
        assert!(err.is_auth());
    }

    #[tokio::test]
    async fn test_mock_enricher() {
        let enricher = MockEnricher::new("s2")
            .with_patch("a", Enrichment::new().with_citations(3, 0))
            .fail_for("b");

        assert_eq!(
            enricher.enrich(&test_paper("a")).await.unwrap().citation_count,
            Some(3)
        );
        assert!(enricher.enrich(&test_paper("b")).await.is_err());
        assert!(enricher.enrich(&test_paper("c")).await.unwrap().is_empty());
        assert_eq!(enricher.calls(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_mock_channel() {
        let channel = MockChannel::new();
        channel.send("hello").await.unwrap();
        assert_eq!(channel.sent(), vec![MockDelivery::Text("hello".into())]);

        let failing = MockChannel::new().failing_text();
        assert!(failing.send("hello").await.is_err());
    }
}

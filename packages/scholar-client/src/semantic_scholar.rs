//! Semantic Scholar Graph API client.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScholarError};
use crate::limiter::SourceLimiter;

const BASE_URL: &str = "https://api.semanticscholar.org/graph/v1";

const PAPER_FIELDS: &str = "title,citationCount,influentialCitationCount,venue,year,\
authors,authors.affiliations,publicationTypes,externalIds";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S2Paper {
    #[serde(default)]
    pub paper_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub citation_count: Option<u64>,
    #[serde(default)]
    pub influential_citation_count: Option<u64>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub authors: Vec<S2Author>,
    #[serde(default)]
    pub publication_types: Option<Vec<String>>,
    #[serde(default)]
    pub external_ids: Option<serde_json::Value>,
}

impl S2Paper {
    /// Non-empty affiliations across all authors, in order, deduplicated.
    pub fn affiliations(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for author in &self.authors {
            for aff in &author.affiliations {
                let aff = aff.trim();
                if !aff.is_empty() && !out.iter().any(|a| a == aff) {
                    out.push(aff.to_string());
                }
            }
        }
        out
    }

    pub fn venue(&self) -> Option<&str> {
        self.venue.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S2Author {
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub affiliations: Vec<String>,
}

#[derive(Clone)]
pub struct SemanticScholarClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    limiter: SourceLimiter,
}

impl SemanticScholarClient {
    pub fn new(api_key: Option<String>, limiter: SourceLimiter) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("arxiv-digest/0.1")
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ScholarError::Client(e.to_string()))?;
        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            limiter,
        })
    }

    /// Limiter matching the public quota: 0.5s with a key, 1.5s without.
    pub fn default_limiter(has_key: bool) -> SourceLimiter {
        let interval = if has_key {
            Duration::from_millis(500)
        } else {
            Duration::from_millis(1500)
        };
        SourceLimiter::min_interval("semantic_scholar", interval)
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Look a paper up by arXiv id. `Ok(None)` when Semantic Scholar does not know it.
    pub async fn paper_by_arxiv_id(&self, arxiv_id: &str) -> Result<Option<S2Paper>> {
        let url = format!("{}/paper/ARXIV:{}", self.base_url, arxiv_id);

        self.limiter.until_ready().await;
        let mut request = self.client.get(&url).query(&[("fields", PAPER_FIELDS)]);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let resp = request.send().await?;
        let status = resp.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!(arxiv_id, "Paper not indexed by Semantic Scholar");
            return Ok(None);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ScholarError::Api {
                service: "Semantic Scholar",
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        parse_paper(&body).map(Some)
    }
}

/// Parse a `/paper/{id}` response body.
pub fn parse_paper(body: &str) -> Result<S2Paper> {
    serde_json::from_str(body).map_err(|e| ScholarError::Parse {
        service: "Semantic Scholar",
        message: e.to_string(),
    })
}

//! Crossref works search, used to tell whether a preprint has been published.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScholarError};
use crate::limiter::SourceLimiter;

const BASE_URL: &str = "https://api.crossref.org";

/// Prefix length compared when matching titles.
const TITLE_PREFIX: usize = 50;

/// Publication status of a title according to Crossref.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublicationCheck {
    pub published: bool,
    pub journal: Option<String>,
    pub doi: Option<String>,
    pub publisher: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WorksResponse {
    message: WorksMessage,
}

#[derive(Debug, Deserialize)]
struct WorksMessage {
    #[serde(default)]
    items: Vec<WorkItem>,
}

#[derive(Debug, Deserialize)]
struct WorkItem {
    #[serde(default)]
    title: Vec<String>,
    #[serde(rename = "container-title", default)]
    container_title: Vec<String>,
    #[serde(rename = "DOI", default)]
    doi: Option<String>,
    #[serde(default)]
    publisher: Option<String>,
}

#[derive(Clone)]
pub struct CrossrefClient {
    client: reqwest::Client,
    base_url: String,
    mailto: Option<String>,
    limiter: SourceLimiter,
}

impl CrossrefClient {
    /// `mailto` puts requests in Crossref's polite pool.
    pub fn new(mailto: Option<String>, limiter: SourceLimiter) -> Result<Self> {
        let mailto = mailto.filter(|m| !m.trim().is_empty());
        let user_agent = match &mailto {
            Some(m) => format!("arXiv-Digest/0.1 (mailto:{})", m.trim()),
            None => "arXiv-Digest/0.1".to_string(),
        };
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ScholarError::Client(e.to_string()))?;
        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
            mailto,
            limiter,
        })
    }

    pub fn default_limiter() -> SourceLimiter {
        SourceLimiter::min_interval("crossref", Duration::from_secs(1))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn mailto(&self) -> Option<&str> {
        self.mailto.as_deref()
    }

    /// Search by title and report whether the best hit looks like a publication of it.
    pub async fn check_published(&self, title: &str) -> Result<PublicationCheck> {
        let url = format!("{}/works", self.base_url);

        self.limiter.until_ready().await;
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("query.title", title),
                ("rows", "1"),
                ("select", "title,container-title,DOI,publisher"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ScholarError::Api {
                service: "Crossref",
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        parse_works(&body, title)
    }
}

/// Interpret a `/works` response for `query_title`.
pub fn parse_works(body: &str, query_title: &str) -> Result<PublicationCheck> {
    let works: WorksResponse = serde_json::from_str(body).map_err(|e| ScholarError::Parse {
        service: "Crossref",
        message: e.to_string(),
    })?;

    let Some(item) = works.message.items.into_iter().next() else {
        return Ok(PublicationCheck::default());
    };

    let item_title = item.title.first().map(String::as_str).unwrap_or("");
    if !titles_match(query_title, item_title) {
        tracing::debug!(query = query_title, found = item_title, "Crossref title mismatch");
        return Ok(PublicationCheck::default());
    }

    let journal = item
        .container_title
        .into_iter()
        .map(|t| t.trim().to_string())
        .find(|t| !t.is_empty());

    Ok(PublicationCheck {
        published: journal.is_some(),
        journal,
        doi: item.doi.filter(|d| !d.trim().is_empty()),
        publisher: item.publisher.filter(|p| !p.trim().is_empty()),
    })
}

/// Compare lowercased prefixes of both titles.
///
/// Only trusted when the compared prefix is longer than 10 characters.
pub fn titles_match(query: &str, found: &str) -> bool {
    let a = normalize(query);
    let b = normalize(found);
    let n = a.chars().count().min(b.chars().count()).min(TITLE_PREFIX);
    if n <= 10 {
        return false;
    }
    a.chars().take(n).eq(b.chars().take(n))
}

fn normalize(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

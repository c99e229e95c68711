//! Paper source trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::FetchResult;
use crate::types::paper::Paper;

/// What to fetch: categories and a submission window.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchQuery {
    pub categories: Vec<String>,
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
    pub max_results: usize,
}

impl FetchQuery {
    pub fn new(categories: Vec<String>, since: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        Self {
            categories,
            since,
            until,
            max_results: 200,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

/// Source of candidate papers.
///
/// Errors are surfaced to the caller, which treats them as fatal.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Papers submitted within the query window, newest first.
    async fn fetch(&self, query: &FetchQuery) -> FetchResult<Vec<Paper>>;
}

//! arXiv listing as a [`Fetcher`].

use async_trait::async_trait;
use scholar_client::{ArxivClient, ArxivEntry, ArxivQuery, ScholarError};
use tracing::debug;

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::{FetchQuery, Fetcher};
use crate::types::paper::Paper;

/// Fetches recent submissions from the arXiv export API.
pub struct ArxivFetcher {
    client: ArxivClient,
}

impl ArxivFetcher {
    pub fn new(client: ArxivClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for ArxivFetcher {
    async fn fetch(&self, query: &FetchQuery) -> FetchResult<Vec<Paper>> {
        if query.categories.is_empty() {
            return Err(FetchError::InvalidQuery {
                reason: "no categories".into(),
            });
        }
        if query.since >= query.until {
            return Err(FetchError::InvalidQuery {
                reason: format!("empty window {} .. {}", query.since, query.until),
            });
        }

        let arxiv_query = ArxivQuery {
            categories: query.categories.clone(),
            submitted_from: query.since,
            submitted_to: query.until,
            max_results: query.max_results,
        };
        let entries = self.client.search(&arxiv_query).await.map_err(fetch_error)?;
        debug!(entries = entries.len(), "arXiv entries received");

        Ok(entries.into_iter().map(to_paper).collect())
    }
}

pub(crate) fn to_paper(entry: ArxivEntry) -> Paper {
    let mut paper = Paper::new(entry.arxiv_id, entry.title, entry.summary, entry.published)
        .with_authors(entry.authors)
        .with_categories(entry.categories);
    if let Some(url) = entry.pdf_url {
        paper = paper.with_pdf_url(url);
    }
    paper
}

fn fetch_error(err: ScholarError) -> FetchError {
    match err {
        ScholarError::Parse { message, .. } => FetchError::Parse(message),
        other => FetchError::Request(Box::new(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_time;
    use scholar_client::SourceLimiter;

    #[test]
    fn test_entry_to_paper() {
        let entry = ArxivEntry {
            arxiv_id: "2402.12345".into(),
            title: "Reasoning Agents".into(),
            summary: "We propose agents.".into(),
            authors: vec!["Ada".into(), "Alan".into()],
            categories: vec!["cs.AI".into(), "cs.CL".into(), "cs.AI".into()],
            published: test_time(),
            pdf_url: Some("https://arxiv.org/pdf/2402.12345v1".into()),
        };

        let paper = to_paper(entry);
        assert_eq!(paper.id, "2402.12345");
        assert_eq!(paper.categories, vec!["cs.AI", "cs.CL"]);
        assert_eq!(paper.authors.len(), 2);
        assert!(paper.citation_count.is_none());
        assert!(!paper.is_published());
    }

    #[tokio::test]
    async fn test_rejects_empty_categories() {
        let client = ArxivClient::new(SourceLimiter::unlimited("arxiv")).unwrap();
        let fetcher = ArxivFetcher::new(client);
        let now = test_time();
        let query = FetchQuery::new(Vec::new(), now - chrono::Duration::days(1), now);

        let err = fetcher.fetch(&query).await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidQuery { .. }));
    }

    #[test]
    fn test_parse_error_mapping() {
        let err = fetch_error(ScholarError::Parse {
            service: "arxiv",
            message: "bad xml".into(),
        });
        assert!(matches!(err, FetchError::Parse(m) if m == "bad xml"));
    }
}

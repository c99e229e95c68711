//! Crossref publication check as an [`Enricher`].

use async_trait::async_trait;
use scholar_client::{CrossrefClient, PublicationCheck, ScholarError};

use crate::error::EnrichmentError;
use crate::traits::enricher::Enricher;
use crate::types::paper::{Enrichment, Paper};

const SOURCE: &str = "crossref";

/// Looks the title up in Crossref and reports formal publication.
///
/// An unmatched title is a normal outcome and yields an empty patch, so the
/// paper stays a preprint.
pub struct CrossrefEnricher {
    client: CrossrefClient,
}

impl CrossrefEnricher {
    pub fn new(client: CrossrefClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Enricher for CrossrefEnricher {
    fn source(&self) -> &str {
        SOURCE
    }

    async fn enrich(&self, paper: &Paper) -> Result<Enrichment, EnrichmentError> {
        let check = self
            .client
            .check_published(&paper.title)
            .await
            .map_err(enrichment_error)?;
        Ok(to_enrichment(check))
    }
}

pub(crate) fn to_enrichment(check: PublicationCheck) -> Enrichment {
    if !check.published {
        return Enrichment::new();
    }
    Enrichment {
        published: Some(true),
        journal: check.journal,
        doi: check.doi,
        publisher: check.publisher,
        ..Enrichment::new()
    }
}

fn enrichment_error(err: ScholarError) -> EnrichmentError {
    match err {
        ScholarError::Parse { message, .. } => EnrichmentError::Parse {
            provider: SOURCE.to_string(),
            message,
        },
        other => EnrichmentError::Request {
            provider: SOURCE.to_string(),
            message: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_paper;

    #[test]
    fn test_published() {
        let patch = to_enrichment(PublicationCheck {
            published: true,
            journal: Some("Nature Machine Intelligence".into()),
            doi: Some("10.1038/xyz".into()),
            publisher: Some("Springer".into()),
        });
        let paper = test_paper("a").enriched(&patch);
        assert!(paper.is_published());
        assert_eq!(paper.doi.as_deref(), Some("10.1038/xyz"));
    }

    #[test]
    fn test_unmatched_is_empty() {
        let patch = to_enrichment(PublicationCheck::default());
        assert!(patch.is_empty());
    }
}

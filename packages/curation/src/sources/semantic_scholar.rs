//! Semantic Scholar citations, affiliations and venue as an [`Enricher`].

use async_trait::async_trait;
use scholar_client::{S2Paper, ScholarError, SemanticScholarClient};
use tracing::debug;

use crate::error::EnrichmentError;
use crate::traits::enricher::Enricher;
use crate::types::paper::{Enrichment, Paper};

const SOURCE: &str = "semantic_scholar";

pub struct SemanticScholarEnricher {
    client: SemanticScholarClient,
}

impl SemanticScholarEnricher {
    pub fn new(client: SemanticScholarClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Enricher for SemanticScholarEnricher {
    fn source(&self) -> &str {
        SOURCE
    }

    async fn enrich(&self, paper: &Paper) -> Result<Enrichment, EnrichmentError> {
        match self.client.paper_by_arxiv_id(&paper.id).await {
            Ok(Some(s2)) => Ok(to_enrichment(&s2)),
            Ok(None) => {
                debug!(paper_id = %paper.id, "Not indexed by Semantic Scholar yet");
                Ok(Enrichment::new())
            }
            Err(e) => Err(enrichment_error(e)),
        }
    }
}

pub(crate) fn to_enrichment(s2: &S2Paper) -> Enrichment {
    let mut patch = Enrichment::new()
        .with_citations(
            s2.citation_count.unwrap_or(0),
            s2.influential_citation_count.unwrap_or(0),
        )
        .with_institutions(s2.affiliations());
    if let Some(venue) = s2.venue() {
        patch = patch.with_venue(venue);
    }
    patch
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
    use scholar_client::S2Author;

    #[test]
    fn test_to_enrichment() {
        let s2 = S2Paper {
            citation_count: Some(42),
            influential_citation_count: Some(3),
            venue: Some(" NeurIPS ".into()),
            authors: vec![
                S2Author {
                    name: Some("Ada".into()),
                    affiliations: vec!["MIT".into()],
                    ..Default::default()
                },
                S2Author {
                    name: Some("Alan".into()),
                    affiliations: vec!["MIT".into(), "Stanford University".into()],
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let patch = to_enrichment(&s2);
        assert_eq!(patch.citation_count, Some(42));
        assert_eq!(patch.influential_citation_count, Some(3));
        assert_eq!(patch.institutions, vec!["MIT", "Stanford University"]);
        assert_eq!(patch.venue.as_deref(), Some("NeurIPS"));
        assert!(patch.published.is_none());
    }

    #[test]
    fn test_missing_counts_are_zero() {
        let patch = to_enrichment(&S2Paper::default());
        assert_eq!(patch.citation_count, Some(0));
        assert!(patch.venue.is_none());
    }

    #[test]
    fn test_error_names_source() {
        let err = enrichment_error(ScholarError::Api {
            service: "semantic_scholar",
            status: 429,
            message: "slow down".into(),
        });
        assert!(err.to_string().starts_with("semantic_scholar"));
    }
}

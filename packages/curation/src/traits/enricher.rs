//! Metadata enrichment trait.

use async_trait::async_trait;

use crate::error::EnrichmentError;
use crate::types::paper::{Enrichment, Paper};

/// One metadata source (citations, venue, publication status).
///
/// Each call is independent; a failure affects only this source for this
/// paper. Rate limiting is the implementation's concern.
#[async_trait]
pub trait Enricher: Send + Sync {
    /// Stable source name used in logs and run summaries.
    fn source(&self) -> &str;

    /// Fields this source knows about `paper`. An unknown paper is an empty
    /// patch, not an error.
    async fn enrich(&self, paper: &Paper) -> Result<Enrichment, EnrichmentError>;
}

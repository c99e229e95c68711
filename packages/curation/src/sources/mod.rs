//! Paper sources and enrichment providers.
//!
//! Bind the [`Fetcher`](crate::traits::fetcher::Fetcher) and
//! [`Enricher`](crate::traits::enricher::Enricher) traits to the clients in
//! `scholar-client` (requires `scholar` feature).

#[cfg(feature = "scholar")]
mod arxiv;

#[cfg(feature = "scholar")]
mod crossref;

#[cfg(feature = "scholar")]
mod semantic_scholar;

#[cfg(feature = "scholar")]
pub use arxiv::ArxivFetcher;

#[cfg(feature = "scholar")]
pub use crossref::CrossrefEnricher;

#[cfg(feature = "scholar")]
pub use semantic_scholar::SemanticScholarEnricher;

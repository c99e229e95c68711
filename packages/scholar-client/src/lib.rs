//! REST clients for scholarly metadata sources.
//!
//! Thin clients for the arXiv export API (Atom), the Semantic Scholar Graph
//! API and Crossref works search. Each client takes a [`SourceLimiter`] so the
//! caller decides how requests to a source are paced and shared.
//!
//! # Example
//!
//! ```rust,ignore
//! use scholar_client::{SemanticScholarClient, CrossrefClient};
//!
//! let s2 = SemanticScholarClient::new(None, SemanticScholarClient::default_limiter(false))?;
//! if let Some(paper) = s2.paper_by_arxiv_id("2402.12345").await? {
//!     println!("{} citations", paper.citation_count.unwrap_or(0));
//! }
//!
//! let crossref = CrossrefClient::new(Some("me@example.org".into()), CrossrefClient::default_limiter())?;
//! let check = crossref.check_published("Attention Is All You Need").await?;
//! ```

pub mod arxiv;
pub mod crossref;
pub mod error;
pub mod limiter;
pub mod semantic_scholar;

pub use arxiv::{parse_atom_feed, ArxivClient, ArxivEntry, ArxivQuery, ARXIV_MIN_INTERVAL};
pub use crossref::{CrossrefClient, PublicationCheck};
pub use error::{Result, ScholarError};
pub use limiter::SourceLimiter;
pub use semantic_scholar::{S2Author, S2Paper, SemanticScholarClient};

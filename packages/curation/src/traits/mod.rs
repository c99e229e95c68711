//! Collaborator traits.
//!
//! These are the narrow interfaces the core calls out through: paper
//! fetching, metadata enrichment, LLM completion, delivery and dedup.

pub mod delivery;
pub mod enricher;
pub mod fetcher;
pub mod llm;
pub mod store;

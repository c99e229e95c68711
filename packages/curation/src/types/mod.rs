//! Data types for the curation pipeline.

pub mod config;
pub mod paper;
pub mod report;
pub mod scored;
pub mod summary;

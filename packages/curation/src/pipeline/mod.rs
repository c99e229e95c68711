//! Run orchestration.
//!
//! - [`Aggregator`]: fetch, dedup, enrich, rank, summarize, mark seen
//! - [`deliver`]: send a rendered digest and report file through a channel

pub mod aggregator;
pub mod deliver;
pub mod relevance;

pub use aggregator::Aggregator;
pub use deliver::{deliver, DeliveryReport};
pub use relevance::{parse_relevant_ids, select_relevant};

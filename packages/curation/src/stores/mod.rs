//! Dedup store implementations.
//!
//! Available backends:
//! - `MemorySeenStore` - In-memory storage (always available)
//! - `SqliteSeenStore` - SQLite file-based storage (requires `sqlite` feature)

pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::MemorySeenStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteSeenStore;

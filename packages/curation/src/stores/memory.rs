//! In-memory dedup store for testing and one-shot runs.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::RwLock;

use crate::error::StoreResult;
use crate::traits::store::SeenStore;

/// In-memory set of seen paper ids.
///
/// Useful for testing and development. Seen state is lost on restart.
#[derive(Default)]
pub struct MemorySeenStore {
    seen: RwLock<HashSet<String>>,
}

impl MemorySeenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `ids`.
    pub fn with_seen(ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            seen: RwLock::new(ids.into_iter().map(Into::into).collect()),
        }
    }

    /// Forget everything.
    pub fn clear(&self) {
        self.seen.write().unwrap().clear();
    }
}

#[async_trait]
impl SeenStore for MemorySeenStore {
    async fn has_seen(&self, id: &str) -> StoreResult<bool> {
        Ok(self.seen.read().unwrap().contains(id))
    }

    async fn mark_seen(&self, id: &str) -> StoreResult<()> {
        self.seen.write().unwrap().insert(id.to_string());
        Ok(())
    }

    async fn seen_count(&self) -> StoreResult<usize> {
        Ok(self.seen.read().unwrap().len())
    }
}

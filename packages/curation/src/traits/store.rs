//! Dedup store trait.
//!
//! The only state that survives between runs: which paper ids have already
//! been processed.

use async_trait::async_trait;

use crate::error::StoreResult;

#[async_trait]
pub trait SeenStore: Send + Sync {
    async fn has_seen(&self, id: &str) -> StoreResult<bool>;

    /// Idempotent: marking an already seen id is a no-op.
    async fn mark_seen(&self, id: &str) -> StoreResult<()>;

    /// Mark many ids. Backends may override with a batched write.
    async fn mark_all_seen(&self, ids: &[String]) -> StoreResult<()> {
        for id in ids {
            self.mark_seen(id).await?;
        }
        Ok(())
    }

    /// Number of ids recorded.
    async fn seen_count(&self) -> StoreResult<usize>;
}

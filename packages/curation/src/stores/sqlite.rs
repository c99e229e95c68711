//! SQLite dedup store.
//!
//! One table of processed paper ids. Good for:
//! - Scheduled daily runs on a single machine
//! - Local development with persistent seen-state

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::error::{StoreError, StoreResult};
use crate::traits::store::SeenStore;

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(Box::new(e))
}

/// SQLite-backed set of seen paper ids.
pub struct SqliteSeenStore {
    pool: SqlitePool,
}

impl SqliteSeenStore {
    /// Open (and migrate) the store at `database_url`.
    ///
    /// # Example URLs
    /// - `sqlite://./digest.db?mode=rwc` - File-based, created if missing
    /// - `sqlite::memory:` - Use [`SqliteSeenStore::in_memory`] instead
    pub async fn new(database_url: &str) -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(backend)?;
        Self::from_pool(pool).await
    }

    /// Ephemeral store (for testing).
    ///
    /// A single connection, since every SQLite in-memory connection is its
    /// own database.
    pub async fn in_memory() -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(backend)?;
        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> StoreResult<Self> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS seen_papers (
                id TEXT PRIMARY KEY,
                seen_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl SeenStore for SqliteSeenStore {
    async fn has_seen(&self, id: &str) -> StoreResult<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM seen_papers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        Ok(row.is_some())
    }

    async fn mark_seen(&self, id: &str) -> StoreResult<()> {
        sqlx::query("INSERT OR IGNORE INTO seen_papers (id, seen_at) VALUES (?, ?)")
            .bind(id)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn mark_all_seen(&self, ids: &[String]) -> StoreResult<()> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await.map_err(backend)?;
        for id in ids {
            sqlx::query("INSERT OR IGNORE INTO seen_papers (id, seen_at) VALUES (?, ?)")
                .bind(id)
                .bind(&now)
                .execute(&mut *tx)
                .await
                .map_err(backend)?;
        }
        tx.commit().await.map_err(backend)?;
        Ok(())
    }

    async fn seen_count(&self) -> StoreResult<usize> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM seen_papers")
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;
        Ok(count.max(0) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mark_and_check() {
        let store = SqliteSeenStore::in_memory().await.unwrap();
        assert!(!store.has_seen("2402.12345").await.unwrap());

        store.mark_seen("2402.12345").await.unwrap();
        assert!(store.has_seen("2402.12345").await.unwrap());
        assert!(!store.has_seen("2402.99999").await.unwrap());
    }

    #[tokio::test]
    async fn test_idempotent() {
        let store = SqliteSeenStore::in_memory().await.unwrap();
        store.mark_seen("a").await.unwrap();
        store.mark_seen("a").await.unwrap();
        store
            .mark_all_seen(&["a".into(), "b".into(), "c".into()])
            .await
            .unwrap();
        assert_eq!(store.seen_count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("seen.db").display());

        {
            let store = SqliteSeenStore::new(&url).await.unwrap();
            store.mark_seen("2402.00001").await.unwrap();
            store.pool().close().await;
        }

        let reopened = SqliteSeenStore::new(&url).await.unwrap();
        assert!(reopened.has_seen("2402.00001").await.unwrap());
    }
}

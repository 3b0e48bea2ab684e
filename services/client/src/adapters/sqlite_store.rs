//! services/client/src/adapters/sqlite_store.rs
//!
//! This module contains the storage adapter, the concrete implementation of
//! the `KeyValueStore` port from the `core` crate. Entries live in a single
//! SQLite table accessed through `sqlx`.

use alttrack_core::ports::{KeyValueStore, PortError, PortResult, StorageWrite};
use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

/// A storage adapter that implements the `KeyValueStore` port.
#[derive(Clone)]
pub struct SqliteKeyValueStore {
    pool: SqlitePool,
}

impl SqliteKeyValueStore {
    /// Creates a new `SqliteKeyValueStore`.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// A helper function to run the storage migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn storage_error(e: sqlx::Error) -> PortError {
    PortError::Storage(e.to_string())
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)
    }

    /// Applies the whole batch in one transaction; a failed write rolls back the rest.
    async fn apply(&self, writes: &[StorageWrite]) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        for write in writes {
            match write {
                StorageWrite::Put { key, value } => {
                    sqlx::query(
                        "INSERT INTO kv_store (key, value) VALUES (?, ?) \
                         ON CONFLICT(key) DO UPDATE SET value = excluded.value, \
                         updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                    )
                    .bind(key)
                    .bind(value)
                    .execute(&mut *tx)
                    .await
                    .map_err(storage_error)?;
                }
                StorageWrite::Remove { key } => {
                    sqlx::query("DELETE FROM kv_store WHERE key = ?")
                        .bind(key)
                        .execute(&mut *tx)
                        .await
                        .map_err(storage_error)?;
                }
            }
        }

        tx.commit().await.map_err(storage_error)?;
        debug!(writes = writes.len(), "Committed storage batch");
        Ok(())
    }
}

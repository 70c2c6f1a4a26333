use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use rusqlite::OptionalExtension;
use tracing::debug;

use crate::database::{get_connection_info, SqlitePool};
use super::errors::StorageError;
use super::KeyValueStore;

/// Key-value store backed by the `key_value_store` SQLite table.
///
/// rusqlite is synchronous, so every call runs on the blocking thread pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Wrap an already migrated pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let pool = self.pool.clone();
        let key = key.to_string();

        tokio::task::spawn_blocking(move || -> Result<Option<String>, StorageError> {
            debug!("Reading key {} from SQLite", key);
            let conn = pool.get()?;
            let value = conn
                .query_row(
                    "SELECT value FROM key_value_store WHERE key = ?1",
                    [&key],
                    |row| row.get::<_, String>(0),
                )
                .optional()?;
            Ok(value)
        })
        .await?
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let pool = self.pool.clone();
        let key = key.to_string();
        let value = value.to_string();

        tokio::task::spawn_blocking(move || -> Result<(), StorageError> {
            debug!("Writing key {} to SQLite ({} bytes)", key, value.len());
            let conn = pool.get()?;
            let updated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
            conn.execute(
                "INSERT INTO key_value_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                (&key, &value, &updated_at),
            )?;
            Ok(())
        })
        .await?
    }

    fn describe(&self) -> String {
        get_connection_info(&self.pool)
    }
}

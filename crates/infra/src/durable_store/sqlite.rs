//! SQLite-backed key/value store.

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use super::r#trait::{DurableStore, DurableStoreError};

/// SQLite-backed durable store.
///
/// Cheap to clone (the pool is shared). Each `set` is a single upsert statement,
/// which SQLite commits atomically.
#[derive(Debug, Clone)]
pub struct SqliteDurableStore {
    pool: SqlitePool,
}

impl SqliteDurableStore {
    /// Open (creating if missing) the database file at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, DurableStoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Self::from_pool(pool).await
    }

    /// Connect with a URL such as `sqlite://cache.db` or `sqlite::memory:`.
    ///
    /// In-memory databases live and die with their single connection, so the
    /// pool keeps exactly one open and never reaps it.
    pub async fn connect(url: &str) -> Result<Self, DurableStoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool_options = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(4)
        };
        let pool = pool_options.connect_with(options).await?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, creating the table if needed.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, DurableStoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl DurableStore for SqliteDurableStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DurableStoreError> {
        let row = sqlx::query(
            r#"
            SELECT value
            FROM kv_store
            WHERE key = ?1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(row.try_get("value")?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), DurableStoreError> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key)
            DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(&value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), DurableStoreError> {
        sqlx::query(
            r#"
            DELETE FROM kv_store
            WHERE key = ?1
            "#,
        )
        .bind(key)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

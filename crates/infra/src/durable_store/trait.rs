use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// Durable store operation error.
///
/// These are **infrastructure errors** (IO, database, key validation) as
/// opposed to domain errors (validation, invariants).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DurableStoreError {
    #[error("io error: {0}")]
    Io(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("lock poisoned")]
    Poisoned,
}

impl From<std::io::Error> for DurableStoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<sqlx::Error> for DurableStoreError {
    fn from(value: sqlx::Error) -> Self {
        Self::Database(value.to_string())
    }
}

/// Process-external key/value persistence used to survive restarts.
///
/// ## Contract
///
/// - `get` returns `Ok(None)` for an absent key.
/// - `set` replaces the whole value and is crash-safe at the granularity of one
///   call: after a crash the key holds either the old or the new value.
/// - `remove` of an absent key is `Ok(())`.
/// - `get`/`set`/`remove` are the only suspension points callers should expect.
///
/// Implementations may be slow (disk, database) but must not reorder calls
/// issued sequentially by one caller.
#[async_trait]
pub trait DurableStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, DurableStoreError>;

    async fn set(&self, key: &str, value: String) -> Result<(), DurableStoreError>;

    async fn remove(&self, key: &str) -> Result<(), DurableStoreError>;
}

#[async_trait]
impl<S> DurableStore for Arc<S>
where
    S: DurableStore + ?Sized,
{
    async fn get(&self, key: &str) -> Result<Option<String>, DurableStoreError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), DurableStoreError> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), DurableStoreError> {
        (**self).remove(key).await
    }
}

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::r#trait::{DurableStore, DurableStoreError};

/// In-memory key/value store.
///
/// Intended for tests/dev. Nothing survives the process.
#[derive(Debug, Default)]
pub struct InMemoryDurableStore {
    values: RwLock<HashMap<String, String>>,
}

impl InMemoryDurableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value (e.g. a payload written by an older client).
    pub fn with_value(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Ok(mut values) = self.values.write() {
            values.insert(key.into(), value.into());
        }
        self
    }

    /// Synchronous peek for assertions.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.values.read().ok()?.get(key).cloned()
    }
}

#[async_trait]
impl DurableStore for InMemoryDurableStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DurableStoreError> {
        let values = self.values.read().map_err(|_| DurableStoreError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), DurableStoreError> {
        let mut values = self.values.write().map_err(|_| DurableStoreError::Poisoned)?;
        values.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), DurableStoreError> {
        let mut values = self.values.write().map_err(|_| DurableStoreError::Poisoned)?;
        values.remove(key);
        Ok(())
    }
}

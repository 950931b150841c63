//! File-backed key/value store: one JSON document per key.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::r#trait::{DurableStore, DurableStoreError};

/// Stores each key as `<dir>/<key>.json`.
///
/// `set` writes a uniquely named temporary sibling, flushes and syncs it, then
/// renames it over the target, so readers and crash recovery only ever see a
/// complete old or new document.
#[derive(Debug, Clone)]
pub struct FileDurableStore {
    dir: PathBuf,
}

impl FileDurableStore {
    /// Open (and create if needed) the store directory.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, DurableStoreError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            DurableStoreError::Io(format!("failed to create store directory {dir:?}: {e}"))
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, DurableStoreError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn validate_key(key: &str) -> Result<(), DurableStoreError> {
    let well_formed = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if well_formed {
        Ok(())
    } else {
        Err(DurableStoreError::InvalidKey(key.to_string()))
    }
}

#[async_trait]
impl DurableStore for FileDurableStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DurableStoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DurableStoreError::Io(format!("failed to read {path:?}: {e}"))),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), DurableStoreError> {
        let path = self.path_for(key)?;
        let temp_path = self.dir.join(format!(".{key}.{}.tmp", Uuid::new_v4()));

        let written = async {
            let mut file = tokio::fs::File::create(&temp_path).await?;
            file.write_all(value.as_bytes()).await?;
            file.flush().await?;
            file.sync_all().await?;
            tokio::fs::rename(&temp_path, &path).await
        }
        .await;

        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(DurableStoreError::Io(format!("failed to write {path:?}: {e}")));
        }

        sync_dir(&self.dir).await;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), DurableStoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DurableStoreError::Io(format!("failed to remove {path:?}: {e}"))),
        }
    }
}

/// Persist the rename itself. Best effort: not every platform can open a directory.
async fn sync_dir(dir: &Path) {
    #[cfg(unix)]
    {
        if let Ok(handle) = tokio::fs::File::open(dir).await {
            if let Err(e) = handle.sync_all().await {
                tracing::debug!("directory sync failed for {:?}: {e}", dir);
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = dir;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn set_then_get_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileDurableStore::open(temp_dir.path()).await.unwrap();
        store.set("products", "[]".to_string()).await.unwrap();

        let reopened = FileDurableStore::open(temp_dir.path()).await.unwrap();
        assert_eq!(reopened.get("products").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn absent_key_is_none_and_remove_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileDurableStore::open(temp_dir.path()).await.unwrap();

        assert_eq!(store.get("token").await.unwrap(), None);
        store.remove("token").await.unwrap();
    }

    #[tokio::test]
    async fn no_temporary_files_are_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileDurableStore::open(temp_dir.path()).await.unwrap();
        store.set("products", "[1]".to_string()).await.unwrap();
        store.set("products", "[2]".to_string()).await.unwrap();

        let names: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["products.json".to_string()]);
    }

    #[tokio::test]
    async fn path_like_keys_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileDurableStore::open(temp_dir.path()).await.unwrap();

        for key in ["", "../escape", "a/b", ".hidden"] {
            let err = store.set(key, "x".to_string()).await.unwrap_err();
            assert!(matches!(err, DurableStoreError::InvalidKey(_)), "key {key:?}");
        }
    }
}

//! Process-wide application state and its startup sequence.

use std::sync::Arc;

use anyhow::{Context, anyhow};

use shopkeep_auth::{IdentityProvider, SessionGate};
use shopkeep_infra::{
    CatalogError, CatalogRepository, DurableStore, FileDurableStore, InMemoryDurableStore,
    SqliteDurableStore, TokenSessionGate,
};

use crate::config::{AppConfig, CorruptPolicy, StoreBackend};

/// Store handle shared by the catalog repository and the session gate.
pub type SharedStore = Arc<dyn DurableStore>;

/// Catalog repository as wired by the application.
pub type AppCatalog = CatalogRepository<SharedStore>;

/// Application state shared across screens.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: SharedStore,
    pub catalog: Arc<AppCatalog>,
    pub session: Arc<dyn SessionGate>,
}

impl AppState {
    /// Open the configured store, restore the session and load the catalog.
    pub async fn bootstrap<P>(config: AppConfig, provider: P) -> anyhow::Result<Self>
    where
        P: IdentityProvider + 'static,
    {
        let store = open_store(&config).await?;
        Self::with_store(config, store, provider).await
    }

    /// Same as [`AppState::bootstrap`] with an already opened store.
    pub async fn with_store<P>(config: AppConfig, store: SharedStore, provider: P) -> anyhow::Result<Self>
    where
        P: IdentityProvider + 'static,
    {
        let session: Arc<dyn SessionGate> = Arc::new(
            TokenSessionGate::new(store.clone(), provider).with_key(config.session_key.clone()),
        );
        let authenticated = session
            .restore()
            .await
            .context("failed to restore session")?;

        let catalog = Arc::new(CatalogRepository::new(store.clone()).with_key(config.catalog_key.clone()));
        load_catalog(&catalog, config.on_corrupt).await?;

        tracing::info!(
            backend = ?config.store,
            authenticated,
            entries = catalog.snapshot().len(),
            "application state ready"
        );

        Ok(Self {
            config: Arc::new(config),
            store,
            catalog,
            session,
        })
    }
}

async fn open_store(config: &AppConfig) -> anyhow::Result<SharedStore> {
    let store: SharedStore = match config.store {
        StoreBackend::Memory => Arc::new(InMemoryDurableStore::new()),
        StoreBackend::File => {
            let dir = config.file_store_dir();
            Arc::new(
                FileDurableStore::open(&dir)
                    .await
                    .with_context(|| format!("failed to open file store at {}", dir.display()))?,
            )
        }
        StoreBackend::Sqlite => {
            let path = config.sqlite_path();
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            Arc::new(
                SqliteDurableStore::open(&path)
                    .await
                    .with_context(|| format!("failed to open sqlite store at {}", path.display()))?,
            )
        }
    };
    Ok(store)
}

async fn load_catalog(catalog: &AppCatalog, policy: CorruptPolicy) -> anyhow::Result<()> {
    match catalog.load().await {
        Ok(_) => Ok(()),
        Err(CatalogError::CorruptState(reason)) => match policy {
            CorruptPolicy::Discard => {
                tracing::warn!(%reason, "stored catalog is corrupt; discarding");
                catalog.discard_corrupt().await;
                Ok(())
            }
            CorruptPolicy::Abort => Err(anyhow!(reason)).with_context(|| {
                format!(
                    "stored catalog under key {:?} is corrupt; set SHOPKEEP_ON_CORRUPT=discard to start empty",
                    catalog.key()
                )
            }),
        },
        Err(e) => Err(e).context("failed to load catalog"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopkeep_auth::StaticIdentityProvider;

    fn provider() -> StaticIdentityProvider {
        StaticIdentityProvider::new(4)
    }

    #[tokio::test]
    async fn bootstraps_in_memory() {
        let state = AppState::bootstrap(AppConfig::in_memory(), provider()).await.unwrap();
        assert!(!state.session.is_authenticated());
        assert!(state.catalog.snapshot().is_empty());
    }

    #[tokio::test]
    async fn corrupt_catalog_aborts_by_default() {
        let store: SharedStore = Arc::new(InMemoryDurableStore::new().with_value("products", "{oops"));
        let err = AppState::with_store(AppConfig::in_memory(), store, provider())
            .await
            .err()
            .unwrap();
        assert!(format!("{err:#}").contains("corrupt"));
    }

    #[tokio::test]
    async fn corrupt_catalog_can_be_discarded() {
        let store: SharedStore = Arc::new(InMemoryDurableStore::new().with_value("products", "{oops"));
        let config = AppConfig {
            on_corrupt: CorruptPolicy::Discard,
            ..AppConfig::in_memory()
        };
        let state = AppState::with_store(config, store.clone(), provider()).await.unwrap();
        assert!(state.catalog.snapshot().is_empty());
        // Nothing written until the next mutation.
        assert_eq!(store.get("products").await.unwrap().as_deref(), Some("{oops"));
    }

    #[tokio::test]
    async fn stored_token_restores_session() {
        let store: SharedStore = Arc::new(InMemoryDurableStore::new().with_value("token", "dummy-token"));
        let state = AppState::with_store(AppConfig::in_memory(), store, provider()).await.unwrap();
        assert!(state.session.is_authenticated());
    }
}

//! Infrastructure layer: durable storage, the catalog repository, live views and sessions.

pub mod durable_store;
pub mod projections;
pub mod repository;
pub mod session;

pub use durable_store::{
    DurableStore, DurableStoreError, FileDurableStore, InMemoryDurableStore, SqliteDurableStore,
};
pub use projections::{CatalogProjection, CatalogProjectionError};
pub use repository::{
    CatalogError, CatalogRepository, DEFAULT_CATALOG_KEY, EntryIdGenerator, UuidV7Generator,
};
pub use session::{DEFAULT_SESSION_KEY, TokenSessionGate};

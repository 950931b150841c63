//! Repositories: owners of canonical state, mediating every read/write
//! against a [`DurableStore`](crate::durable_store::DurableStore).

pub mod catalog;
pub mod error;
pub mod id_generator;

pub use catalog::{CatalogRepository, DEFAULT_CATALOG_KEY, MAX_ID_ATTEMPTS};
pub use error::CatalogError;
pub use id_generator::{EntryIdGenerator, UuidV7Generator};

//! Durable Store Adapter boundary.
//!
//! A single-key/value persistence primitive. The catalog repository and the
//! session gate are written against [`DurableStore`] and never assume a backend.

pub mod file;
pub mod in_memory;
pub mod sqlite;
pub mod r#trait;

pub use file::FileDurableStore;
pub use in_memory::InMemoryDurableStore;
pub use r#trait::{DurableStore, DurableStoreError};
pub use sqlite::SqliteDurableStore;

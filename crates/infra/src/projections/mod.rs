//! Read-side views over published catalog snapshots.
//!
//! Views are never written to directly; they are recomputed from the latest
//! snapshot whenever the repository publishes or the query changes.

pub mod catalog;

pub use catalog::{CatalogProjection, CatalogProjectionError};

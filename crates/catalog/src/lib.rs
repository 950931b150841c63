//! Catalog domain module.
//!
//! This crate contains business rules for the personal catalog, implemented purely as
//! deterministic domain logic (no IO, no storage, no async).

pub mod codec;
pub mod entry;
pub mod projection;
pub mod snapshot;

pub use codec::{decode_collection, encode_collection};
pub use entry::{CatalogEntry, CatalogEntryDraft, Price};
pub use projection::filter;
pub use snapshot::CatalogSnapshot;

//! JSON codec for the persisted collection.
//!
//! The durable payload is a JSON array of entries. Decoding enforces the
//! collection invariants (non-empty, unique ids) so a bad payload is reported
//! instead of being loaded half-way.

use std::collections::HashSet;

use shopkeep_core::{DomainError, DomainResult, Entity};

use crate::entry::CatalogEntry;

/// Serialize the whole collection.
pub fn encode_collection(entries: &[CatalogEntry]) -> DomainResult<String> {
    serde_json::to_string(entries)
        .map_err(|e| DomainError::invariant(format!("catalog serialization failed: {e}")))
}

/// Deserialize a stored collection.
///
/// Prices are not re-validated here: payloads written before validation existed
/// may carry free-form prices and must still load.
pub fn decode_collection(payload: &str) -> DomainResult<Vec<CatalogEntry>> {
    let entries: Vec<CatalogEntry> = serde_json::from_str(payload)
        .map_err(|e| DomainError::invariant(format!("malformed catalog payload: {e}")))?;

    let mut seen = HashSet::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        if entry.id().is_blank() {
            return Err(DomainError::invariant(format!("entry at index {idx} has an empty id")));
        }
        if !seen.insert(entry.id()) {
            return Err(DomainError::invariant(format!(
                "duplicate entry id '{}' at index {idx}",
                entry.id()
            )));
        }
    }

    Ok(entries)
}

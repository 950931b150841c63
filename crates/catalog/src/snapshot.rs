//! Immutable, published view of the catalog collection.

use std::sync::Arc;

use crate::entry::CatalogEntry;

/// Read-only copy of the collection handed to readers after a mutation completes.
///
/// Cloning is cheap (shared slice). `version` increases by one per publish so
/// readers can tell two snapshots apart without comparing entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSnapshot {
    version: u64,
    entries: Arc<[CatalogEntry]>,
}

impl CatalogSnapshot {
    pub fn empty() -> Self {
        Self {
            version: 0,
            entries: Arc::from(Vec::new()),
        }
    }

    pub fn new(version: u64, entries: Vec<CatalogEntry>) -> Self {
        Self {
            version,
            entries: Arc::from(entries),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_vec(&self) -> Vec<CatalogEntry> {
        self.entries.to_vec()
    }
}

impl Default for CatalogSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

//! Catalog projection: the filtered view presented to the browse screen.
//!
//! Pure function of `(entries, query)`; the live, subscription-driven wrapper
//! lives in `shopkeep-infra`.

use crate::entry::CatalogEntry;

/// Case-insensitive substring match of `query` against each entry's title.
///
/// An empty query returns every entry. Order is preserved; entries are copied,
/// never mutated.
pub fn filter(entries: &[CatalogEntry], query: &str) -> Vec<CatalogEntry> {
    if query.is_empty() {
        return entries.to_vec();
    }

    let needle = query.to_lowercase();
    entries
        .iter()
        .filter(|entry| entry.title().to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

use thiserror::Error;
use tokio::sync::watch;

use shopkeep_catalog::{CatalogEntry, CatalogSnapshot, filter};

use crate::durable_store::DurableStore;
use crate::repository::CatalogRepository;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogProjectionError {
    #[error("catalog repository was dropped; no further snapshots")]
    Closed,
}

/// Filtered view of the catalog for the browse screen.
///
/// Holds only a derived copy of the published snapshot. Recomputed when the
/// query changes (`set_query`) or a new snapshot is published (`refresh`,
/// `changed`).
#[derive(Debug)]
pub struct CatalogProjection {
    updates: watch::Receiver<CatalogSnapshot>,
    query: String,
    source_version: u64,
    view: Vec<CatalogEntry>,
}

impl CatalogProjection {
    pub fn new(updates: watch::Receiver<CatalogSnapshot>) -> Self {
        let mut projection = Self {
            updates,
            query: String::new(),
            source_version: 0,
            view: Vec::new(),
        };
        projection.recompute();
        projection
    }

    pub fn for_repository<S: DurableStore>(repository: &CatalogRepository<S>) -> Self {
        Self::new(repository.subscribe())
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Change the search text and recompute against the latest snapshot.
    pub fn set_query(&mut self, query: impl Into<String>) -> &[CatalogEntry] {
        self.query = query.into();
        self.recompute();
        &self.view
    }

    /// Recompute if a newer snapshot was published. Never suspends.
    pub fn refresh(&mut self) -> bool {
        match self.updates.has_changed() {
            Ok(true) => {
                self.recompute();
                true
            }
            // A closed channel still holds the final snapshot, already seen.
            Ok(false) | Err(_) => false,
        }
    }

    /// Wait for the next publication, then recompute.
    pub async fn changed(&mut self) -> Result<&[CatalogEntry], CatalogProjectionError> {
        self.updates
            .changed()
            .await
            .map_err(|_| CatalogProjectionError::Closed)?;
        self.recompute();
        Ok(&self.view)
    }

    pub fn view(&self) -> &[CatalogEntry] {
        &self.view
    }

    /// Nothing to show ("No products added" / no search hits).
    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    /// Version of the snapshot the current view was computed from.
    pub fn source_version(&self) -> u64 {
        self.source_version
    }

    fn recompute(&mut self) {
        let snapshot = self.updates.borrow_and_update().clone();
        self.view = filter(snapshot.entries(), &self.query);
        self.source_version = snapshot.version();
        tracing::trace!(
            query = %self.query,
            version = self.source_version,
            hits = self.view.len(),
            "catalog projection recomputed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::durable_store::InMemoryDurableStore;
    use shopkeep_catalog::CatalogEntryDraft;
    use shopkeep_core::Entity;

    fn draft(title: &str) -> CatalogEntryDraft {
        CatalogEntryDraft::new("img", title, "name", "3")
    }

    fn titles(view: &[CatalogEntry]) -> Vec<&str> {
        view.iter().map(|e| e.title()).collect()
    }

    #[tokio::test]
    async fn starts_from_current_snapshot_with_empty_query() {
        let repo = CatalogRepository::new(InMemoryDurableStore::new());
        repo.create(&draft("Red Shoe")).await.unwrap();
        repo.create(&draft("Mug")).await.unwrap();

        let projection = CatalogProjection::for_repository(&repo);
        assert_eq!(titles(projection.view()), vec!["Red Shoe", "Mug"]);
        assert_eq!(projection.source_version(), repo.snapshot().version());
    }

    #[tokio::test]
    async fn query_change_recomputes() {
        let repo = CatalogRepository::new(InMemoryDurableStore::new());
        repo.create(&draft("Red Shoe")).await.unwrap();
        repo.create(&draft("Mug")).await.unwrap();

        let mut projection = CatalogProjection::for_repository(&repo);
        assert_eq!(titles(projection.set_query("RED")), vec!["Red Shoe"]);
        assert_eq!(titles(projection.set_query("")), vec!["Red Shoe", "Mug"]);
        assert!(projection.set_query("lamp").is_empty());
        assert!(projection.is_empty());
    }

    #[tokio::test]
    async fn refresh_picks_up_mutations_and_keeps_query() {
        let repo = CatalogRepository::new(InMemoryDurableStore::new());
        let mut projection = CatalogProjection::for_repository(&repo);
        projection.set_query("mug");
        assert!(!projection.refresh());

        let blue = repo.create(&draft("Blue Mug")).await.unwrap();
        repo.create(&draft("Plate")).await.unwrap();
        assert!(projection.refresh());
        assert_eq!(titles(projection.view()), vec!["Blue Mug"]);

        repo.delete(blue.id()).await.unwrap();
        assert!(projection.refresh());
        assert!(projection.is_empty());
    }

    #[tokio::test]
    async fn changed_waits_for_next_publication() {
        let repo = std::sync::Arc::new(CatalogRepository::new(InMemoryDurableStore::new()));
        repo.load().await.unwrap();
        let mut projection = CatalogProjection::for_repository(&repo);

        let writer = {
            let repo = repo.clone();
            tokio::spawn(async move { repo.create(&draft("Lamp")).await })
        };

        let view = projection.changed().await.unwrap().to_vec();
        writer.await.unwrap().unwrap();
        assert_eq!(titles(&view), vec!["Lamp"]);
    }

    #[tokio::test]
    async fn changed_reports_closed_repository() {
        let repo = CatalogRepository::new(InMemoryDurableStore::new());
        let mut projection = CatalogProjection::for_repository(&repo);
        drop(repo);
        assert_eq!(projection.changed().await.unwrap_err(), CatalogProjectionError::Closed);
    }
}

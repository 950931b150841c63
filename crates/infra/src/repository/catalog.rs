//! Catalog repository: single source of truth for the catalog collection.
//!
//! ## Command execution
//!
//! ```text
//! command (create / update / delete)
//!   ↓
//! 1. validate draft (no lock taken on rejection)
//!   ↓
//! 2. acquire write lock (FIFO; later commands queue behind earlier ones)
//!   ↓
//! 3. compute next collection from the in-memory copy
//!   ↓
//! 4. persist the whole collection (only suspension point)
//!   ↓
//! 5. commit in memory + publish snapshot (only after 4 succeeds)
//! ```
//!
//! A failed durable write therefore never leaves memory ahead of storage: the
//! next collection is dropped and the last confirmed state stays published.

use tokio::sync::{Mutex, MutexGuard, watch};

use shopkeep_catalog::{
    CatalogEntry, CatalogEntryDraft, CatalogSnapshot, decode_collection, encode_collection,
};
use shopkeep_core::{Entity, EntryId};

use crate::durable_store::DurableStore;

use super::error::CatalogError;
use super::id_generator::{EntryIdGenerator, UuidV7Generator};

/// Durable key holding the serialized collection.
pub const DEFAULT_CATALOG_KEY: &str = "products";

/// Upper bound on id regeneration after collisions.
pub const MAX_ID_ATTEMPTS: usize = 16;

#[derive(Debug, Default)]
struct CatalogState {
    entries: Vec<CatalogEntry>,
    loaded: bool,
}

/// Owns the canonical, ordered catalog collection.
///
/// Construct one per session and share it (`Arc`) with the screens that need
/// it. All mutations go through `&self` methods and are serialized internally.
pub struct CatalogRepository<S> {
    store: S,
    key: String,
    ids: Box<dyn EntryIdGenerator>,
    state: Mutex<CatalogState>,
    published: watch::Sender<CatalogSnapshot>,
}

impl<S> core::fmt::Debug for CatalogRepository<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CatalogRepository")
            .field("key", &self.key)
            .field("snapshot_version", &self.published.borrow().version())
            .finish_non_exhaustive()
    }
}

impl<S> CatalogRepository<S>
where
    S: DurableStore,
{
    pub fn new(store: S) -> Self {
        let (published, _) = watch::channel(CatalogSnapshot::empty());
        Self {
            store,
            key: DEFAULT_CATALOG_KEY.to_string(),
            ids: Box::new(UuidV7Generator),
            state: Mutex::new(CatalogState::default()),
            published,
        }
    }

    /// Use a different durable key (default `"products"`).
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_id_generator(mut self, ids: impl EntryIdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read the durable collection and replace the in-memory one.
    ///
    /// Absent key yields an empty collection. A payload that does not decode
    /// fails with [`CatalogError::CorruptState`] and leaves memory untouched.
    pub async fn load(&self) -> Result<CatalogSnapshot, CatalogError> {
        let mut state = self.state.lock().await;
        self.load_locked(&mut state).await
    }

    /// Drop whatever is in memory and start from an empty collection, without
    /// writing. Used after a `CorruptState` load when the caller accepts data loss;
    /// the corrupt payload is overwritten by the next successful mutation.
    pub async fn discard_corrupt(&self) -> CatalogSnapshot {
        let mut state = self.state.lock().await;
        tracing::warn!(key = %self.key, "discarding stored catalog; starting empty");
        state.entries.clear();
        state.loaded = true;
        self.publish(Vec::new())
    }

    /// Current published snapshot. Never suspends.
    pub fn snapshot(&self) -> CatalogSnapshot {
        self.published.borrow().clone()
    }

    /// Subscribe to snapshot publications (one per completed mutation or load).
    pub fn subscribe(&self) -> watch::Receiver<CatalogSnapshot> {
        self.published.subscribe()
    }

    /// Look up an entry in the current snapshot.
    pub fn get(&self, id: &EntryId) -> Option<CatalogEntry> {
        self.published
            .borrow()
            .entries()
            .iter()
            .find(|e| e.has_id(id))
            .cloned()
    }

    /// Append a new entry with a fresh id and persist the collection.
    pub async fn create(&self, draft: &CatalogEntryDraft) -> Result<CatalogEntry, CatalogError> {
        draft.validate()?;

        let mut state = self.lock_loaded().await?;
        let id = self.fresh_id(&state.entries)?;
        let entry = CatalogEntry::from_draft(id, draft)?;

        let mut next = state.entries.clone();
        next.push(entry.clone());
        self.commit(&mut state, next).await?;

        tracing::info!(entry_id = %entry.id(), entries = state.entries.len(), "catalog entry created");
        Ok(entry)
    }

    /// Replace an entry's mutable fields in place and persist.
    pub async fn update(
        &self,
        id: &EntryId,
        draft: &CatalogEntryDraft,
    ) -> Result<CatalogEntry, CatalogError> {
        draft.validate()?;

        let mut state = self.lock_loaded().await?;
        let position = Self::position_of(&state.entries, id)?;

        let mut next = state.entries.clone();
        next[position].apply_draft(draft)?;
        let updated = next[position].clone();
        self.commit(&mut state, next).await?;

        tracing::info!(entry_id = %id, position, "catalog entry updated");
        Ok(updated)
    }

    /// Remove an entry and persist.
    ///
    /// Strict: deleting an id that is not present (including a second delete of
    /// the same id) fails with [`CatalogError::NotFound`].
    pub async fn delete(&self, id: &EntryId) -> Result<CatalogEntry, CatalogError> {
        let mut state = self.lock_loaded().await?;
        let position = Self::position_of(&state.entries, id)?;

        let mut next = state.entries.clone();
        let removed = next.remove(position);
        self.commit(&mut state, next).await?;

        tracing::info!(entry_id = %id, entries = state.entries.len(), "catalog entry deleted");
        Ok(removed)
    }

    async fn lock_loaded(&self) -> Result<MutexGuard<'_, CatalogState>, CatalogError> {
        let mut state = self.state.lock().await;
        if !state.loaded {
            tracing::debug!(key = %self.key, "catalog not loaded yet; loading before mutation");
            self.load_locked(&mut state).await?;
        }
        Ok(state)
    }

    async fn load_locked(&self, state: &mut CatalogState) -> Result<CatalogSnapshot, CatalogError> {
        let payload = self.store.get(&self.key).await.map_err(|e| {
            tracing::error!(key = %self.key, "failed to read catalog: {e}");
            CatalogError::DurableRead(e)
        })?;

        let entries = match payload {
            None => Vec::new(),
            Some(payload) => decode_collection(&payload).map_err(|e| {
                tracing::error!(key = %self.key, "stored catalog does not decode: {e}");
                CatalogError::CorruptState(e.to_string())
            })?,
        };

        tracing::debug!(key = %self.key, entries = entries.len(), "catalog loaded");
        state.entries = entries.clone();
        state.loaded = true;
        Ok(self.publish(entries))
    }

    /// Persist `next`, then make it the in-memory collection and publish it.
    async fn commit(
        &self,
        state: &mut CatalogState,
        next: Vec<CatalogEntry>,
    ) -> Result<(), CatalogError> {
        let payload = encode_collection(&next)?;

        if let Err(e) = self.store.set(&self.key, payload).await {
            tracing::error!(key = %self.key, "durable write failed; mutation rolled back: {e}");
            return Err(CatalogError::DurableWrite(e));
        }

        state.entries = next.clone();
        self.publish(next);
        Ok(())
    }

    fn publish(&self, entries: Vec<CatalogEntry>) -> CatalogSnapshot {
        let version = self.published.borrow().version() + 1;
        let snapshot = CatalogSnapshot::new(version, entries);
        self.published.send_replace(snapshot.clone());
        snapshot
    }

    fn fresh_id(&self, entries: &[CatalogEntry]) -> Result<EntryId, CatalogError> {
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let id = self.ids.next_id();
            if !id.is_blank() && !entries.iter().any(|e| e.has_id(&id)) {
                return Ok(id);
            }
            tracing::warn!(attempt, "generated entry id collides; regenerating");
        }
        Err(CatalogError::IdExhausted {
            attempts: MAX_ID_ATTEMPTS,
        })
    }

    fn position_of(entries: &[CatalogEntry], id: &EntryId) -> Result<usize, CatalogError> {
        entries
            .iter()
            .position(|e| e.has_id(id))
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }
}

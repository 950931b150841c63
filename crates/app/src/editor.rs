//! Product manager form: add a new entry or edit an existing one.

use std::sync::Arc;

use shopkeep_catalog::{CatalogEntry, CatalogEntryDraft};
use shopkeep_core::{Entity, EntryId};
use shopkeep_infra::{CatalogError, CatalogRepository, DurableStore};

pub struct CatalogEditor<S> {
    catalog: Arc<CatalogRepository<S>>,
    form: CatalogEntryDraft,
    editing: Option<EntryId>,
}

impl<S> CatalogEditor<S>
where
    S: DurableStore,
{
    pub fn new(catalog: Arc<CatalogRepository<S>>) -> Self {
        Self {
            catalog,
            form: CatalogEntryDraft::default(),
            editing: None,
        }
    }

    pub fn heading(&self) -> &'static str {
        if self.editing.is_some() {
            "Edit Product"
        } else {
            "Add Product"
        }
    }

    pub fn form(&self) -> &CatalogEntryDraft {
        &self.form
    }

    pub fn editing(&self) -> Option<&EntryId> {
        self.editing.as_ref()
    }

    pub fn set_image(&mut self, image_locator: impl Into<String>) {
        self.form.image_locator = image_locator.into();
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.form.title = title.into();
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.form.name = name.into();
    }

    pub fn set_price(&mut self, price: impl Into<String>) {
        self.form.price = price.into();
    }

    /// Entries listed under the form, in catalog order.
    pub fn entries(&self) -> Vec<CatalogEntry> {
        self.catalog.snapshot().to_vec()
    }

    pub fn begin_edit(&mut self, entry: &CatalogEntry) {
        self.form = entry.to_draft();
        self.editing = Some(entry.id().clone());
    }

    pub fn cancel(&mut self) {
        self.form = CatalogEntryDraft::default();
        self.editing = None;
    }

    /// Create or update from the form.
    ///
    /// The form is cleared only on success so a rejected submission can be
    /// corrected in place.
    pub async fn submit(&mut self) -> Result<CatalogEntry, CatalogError> {
        let saved = match &self.editing {
            Some(id) => self.catalog.update(id, &self.form).await?,
            None => self.catalog.create(&self.form).await?,
        };
        self.cancel();
        Ok(saved)
    }

    /// Delete an entry from the list; abandons the edit if it was the one open.
    pub async fn delete(&mut self, id: &EntryId) -> Result<CatalogEntry, CatalogError> {
        let removed = self.catalog.delete(id).await?;
        if self.editing.as_ref() == Some(id) {
            self.cancel();
        }
        Ok(removed)
    }
}

//! Home screen: searchable grid of product cards.

use std::sync::Arc;

use shopkeep_catalog::CatalogEntry;
use shopkeep_core::{Entity, EntryId};
use shopkeep_infra::{CatalogError, CatalogProjection, CatalogRepository, DurableStore};

/// Shown in place of the grid when nothing matches.
pub const EMPTY_MESSAGE: &str = "No Product Found";

/// One rendered card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCard {
    pub id: EntryId,
    pub image_locator: String,
    pub title: String,
    pub name: String,
    pub price_label: String,
}

impl ProductCard {
    fn render(entry: &CatalogEntry, currency_symbol: &str) -> Self {
        Self {
            id: entry.id().clone(),
            image_locator: entry.image_locator().to_string(),
            title: entry.title().to_string(),
            name: entry.name().to_string(),
            price_label: entry.price().display(currency_symbol),
        }
    }
}

pub struct CatalogBrowser<S> {
    catalog: Arc<CatalogRepository<S>>,
    projection: CatalogProjection,
    currency_symbol: String,
}

impl<S> CatalogBrowser<S>
where
    S: DurableStore,
{
    pub fn new(catalog: Arc<CatalogRepository<S>>, currency_symbol: impl Into<String>) -> Self {
        let projection = CatalogProjection::for_repository(&catalog);
        Self {
            catalog,
            projection,
            currency_symbol: currency_symbol.into(),
        }
    }

    pub fn search_text(&self) -> &str {
        self.projection.query()
    }

    /// Update the search text; returns the number of matches.
    pub fn search(&mut self, text: impl Into<String>) -> usize {
        self.projection.set_query(text).len()
    }

    /// Pick up snapshots published since the last render (screen focus).
    pub fn refresh(&mut self) -> bool {
        self.projection.refresh()
    }

    pub fn cards(&mut self) -> Vec<ProductCard> {
        self.projection.refresh();
        self.projection
            .view()
            .iter()
            .map(|entry| ProductCard::render(entry, &self.currency_symbol))
            .collect()
    }

    pub fn empty_message(&mut self) -> Option<&'static str> {
        self.projection.refresh();
        self.projection.is_empty().then_some(EMPTY_MESSAGE)
    }

    pub async fn delete(&mut self, id: &EntryId) -> Result<CatalogEntry, CatalogError> {
        let removed = self.catalog.delete(id).await?;
        self.projection.refresh();
        Ok(removed)
    }
}

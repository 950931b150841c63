use serde::{Deserialize, Serialize};

use shopkeep_core::{DomainError, DomainResult, Entity, EntryId, ValueObject};

/// Author-entered price.
///
/// Stored verbatim so formatting such as `"09.90"` or `"1e3"` survives a round
/// trip; [`Price::parse`] is the gate that enforces a non-negative number before a
/// write is accepted. Grouping separators (`"1,000"`) are not numbers and are
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(String);

impl Price {
    /// Validate and wrap an author-entered price.
    pub fn parse(raw: impl Into<String>) -> DomainResult<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(DomainError::validation("price cannot be empty"));
        }
        match parse_amount(&raw) {
            Some(amount) if amount >= 0.0 => Ok(Self(raw)),
            Some(_) => Err(DomainError::validation("price cannot be negative")),
            None => Err(DomainError::validation(format!("price is not a number: {raw:?}"))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value, if the stored text parses.
    ///
    /// Prices loaded from older payloads are not re-validated, hence `Option`.
    pub fn amount(&self) -> Option<f64> {
        parse_amount(&self.0)
    }

    /// Render for a card, e.g. `"₹ 9.99"`.
    pub fn display(&self, currency_symbol: &str) -> String {
        if currency_symbol.is_empty() {
            self.0.clone()
        } else {
            format!("{currency_symbol} {}", self.0)
        }
    }
}

impl ValueObject for Price {}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Input for create/update commands.
///
/// Every field is required; [`CatalogEntryDraft::validate`] runs at the
/// repository boundary before anything is mutated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CatalogEntryDraft {
    pub image_locator: String,
    pub title: String,
    pub name: String,
    pub price: String,
}

impl CatalogEntryDraft {
    pub fn new(
        image_locator: impl Into<String>,
        title: impl Into<String>,
        name: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            image_locator: image_locator.into(),
            title: title.into(),
            name: name.into(),
            price: price.into(),
        }
    }

    /// Check field presence and price parseability.
    ///
    /// Reports the first offending field in form order (image, title, name, price).
    pub fn validate(&self) -> DomainResult<()> {
        self.validated_price().map(|_| ())
    }

    fn validated_price(&self) -> DomainResult<Price> {
        if self.image_locator.trim().is_empty() {
            return Err(DomainError::validation("image cannot be empty"));
        }
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("title cannot be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        Price::parse(self.price.clone())
    }
}

impl ValueObject for CatalogEntryDraft {}

/// One item in the catalog.
///
/// Persisted as `{"id","imageUri","title","name","price"}`, all strings. That layout
/// is shared with every store backend and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    id: EntryId,
    #[serde(rename = "imageUri")]
    image_locator: String,
    title: String,
    name: String,
    price: Price,
}

impl CatalogEntry {
    /// Build a new entry from a draft, validating it first.
    pub fn from_draft(id: EntryId, draft: &CatalogEntryDraft) -> DomainResult<Self> {
        if id.is_blank() {
            return Err(DomainError::invalid_id("entry id cannot be empty"));
        }
        let price = draft.validated_price()?;
        Ok(Self {
            id,
            image_locator: draft.image_locator.clone(),
            title: draft.title.clone(),
            name: draft.name.clone(),
            price,
        })
    }

    /// Replace the mutable fields; the id never changes.
    ///
    /// On validation failure the entry is left untouched.
    pub fn apply_draft(&mut self, draft: &CatalogEntryDraft) -> DomainResult<()> {
        let price = draft.validated_price()?;
        self.image_locator = draft.image_locator.clone();
        self.title = draft.title.clone();
        self.name = draft.name.clone();
        self.price = price;
        Ok(())
    }

    /// Draft pre-filled with this entry's fields (editor "begin edit").
    pub fn to_draft(&self) -> CatalogEntryDraft {
        CatalogEntryDraft {
            image_locator: self.image_locator.clone(),
            title: self.title.clone(),
            name: self.name.clone(),
            price: self.price.as_str().to_string(),
        }
    }

    pub fn image_locator(&self) -> &str {
        &self.image_locator
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> &Price {
        &self.price
    }
}

impl Entity for CatalogEntry {
    type Id = EntryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

use thiserror::Error;

use shopkeep_core::{DomainError, EntryId};

use crate::durable_store::DurableStoreError;

/// Catalog repository error.
///
/// No variant is fatal: every failure leaves the in-memory collection and the
/// published snapshot exactly as they were before the call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A draft failed field-presence or price checks. Re-prompt the user.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Update/delete referenced an id that is not in the collection.
    #[error("catalog entry not found: {0}")]
    NotFound(EntryId),

    /// The stored payload could not be decoded. The caller decides between
    /// discarding it (`discard_corrupt`) and aborting.
    #[error("stored catalog is corrupt: {0}")]
    CorruptState(String),

    #[error("failed to read catalog from durable store: {0}")]
    DurableRead(DurableStoreError),

    /// The durable write failed; the mutation was rolled back.
    #[error("failed to write catalog to durable store: {0}")]
    DurableWrite(DurableStoreError),

    #[error("could not generate a unique entry id after {attempts} attempts")]
    IdExhausted { attempts: usize },

    #[error("invariant violated: {0}")]
    Invariant(String),
}

impl From<DomainError> for CatalogError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => CatalogError::Validation(msg),
            DomainError::InvalidId(msg) => CatalogError::Validation(msg),
            DomainError::InvariantViolation(msg) => CatalogError::Invariant(msg),
        }
    }
}

impl CatalogError {
    /// The command was refused and nothing changed; the user can correct and retry.
    pub fn is_rejection(&self) -> bool {
        matches!(self, CatalogError::Validation(_) | CatalogError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_catalog_errors() {
        assert_eq!(
            CatalogError::from(DomainError::validation("title cannot be empty")),
            CatalogError::Validation("title cannot be empty".to_string())
        );
        assert_eq!(
            CatalogError::from(DomainError::invalid_id("entry id cannot be empty")),
            CatalogError::Validation("entry id cannot be empty".to_string())
        );
        assert_eq!(
            CatalogError::from(DomainError::invariant("duplicate id")),
            CatalogError::Invariant("duplicate id".to_string())
        );
    }

    #[test]
    fn only_user_errors_are_rejections() {
        assert!(CatalogError::Validation("x".to_string()).is_rejection());
        assert!(CatalogError::NotFound(EntryId::new()).is_rejection());
        assert!(!CatalogError::CorruptState("x".to_string()).is_rejection());
        assert!(!CatalogError::IdExhausted { attempts: 16 }.is_rejection());
    }
}

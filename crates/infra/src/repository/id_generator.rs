use shopkeep_core::EntryId;

/// Source of fresh entry ids.
///
/// The repository checks every generated id against the collection and asks
/// again on collision, so generators only need to be "very likely unique".
pub trait EntryIdGenerator: Send + Sync {
    fn next_id(&self) -> EntryId;
}

/// Default generator: UUIDv7 strings (time-ordered, random tail).
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidV7Generator;

impl EntryIdGenerator for UuidV7Generator {
    fn next_id(&self) -> EntryId {
        EntryId::new()
    }
}

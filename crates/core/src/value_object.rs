//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity**; they are defined entirely by their
//! attribute values. A price or an entry draft are value objects, a catalog
//! entry is an entity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one with the new values.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

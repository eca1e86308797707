//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Collections of entities are keyed by `id()`; two values with the same id
/// are the same entity regardless of their other fields.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// A cart line is an entity: its quantity and price change over time, but
/// update and remove operations always address it by the same identifier.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}

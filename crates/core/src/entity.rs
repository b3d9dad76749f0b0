//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Postings and applications are plain persisted records (not event-sourced),
/// so identity is all the stores and services need to agree on.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}

//! Entity traits: identity + tenant scoping.

use crate::id::InstitutionId;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Marks records that belong to exactly one institution.
///
/// The institution id is assigned at creation and never changes afterwards;
/// access checks compare it against the acting account's membership.
pub trait InstitutionScoped {
    fn institution_id(&self) -> InstitutionId;
}

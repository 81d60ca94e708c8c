//! Entity trait: identity + ownership by a company.

use crate::id::CompanyId;

/// Record owned by the external store and identified by a stable id.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}

/// Entity scoped to a single owning company (multi-company boundary).
pub trait CompanyOwned: Entity {
    fn company_id(&self) -> CompanyId;
}

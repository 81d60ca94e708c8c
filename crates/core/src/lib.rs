//! `etd-core` — shared building blocks for the electronic tax document modules.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;

pub use entity::{CompanyOwned, Entity};
pub use error::{DomainError, DomainResult};
pub use id::{
    BatchPickingId, CategoryId, CompanyId, InvoiceId, MoveId, PickingId, ProductId, RouteId,
    SaleLineId, UomId,
};

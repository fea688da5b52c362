//! `registrar-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! strongly-typed identifiers, the shared error taxonomy, and the trash
//! (soft-delete) sub-state carried by trashable entities.

pub mod entity;
pub mod error;
pub mod id;
pub mod trash;

pub use entity::{Entity, InstitutionScoped};
pub use error::{DomainError, DomainResult};
pub use id::{
    AccessRequestId, AccountId, ClassId, InstitutionId, OccurrenceId, OccurrenceTypeId, StudentId,
};
pub use trash::TrashState;

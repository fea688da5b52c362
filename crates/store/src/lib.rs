//! `registrar-store` — the persistence collaborator.
//!
//! An in-memory transactional record store: point lookups and single-row
//! updates by primary key, unique-constraint enforcement (account email;
//! student registration number per institution with NULLS NOT DISTINCT
//! semantics), and referential cleanup on hard delete. Each public method is
//! one lock acquisition, which gives every lifecycle transition single-row
//! compare-and-set semantics.

pub mod memory;

pub use memory::RecordStore;

//! `registrar-auth` — pure authorization boundary.
//!
//! This crate is intentionally decoupled from storage and transport: the
//! engine is a side-effect-free predicate over `(actor, action, resource)`
//! plus tenant-membership facts supplied by the caller. Policy lives in one
//! deterministic rule table (first match wins, default deny) instead of
//! overlapping per-row predicates evaluated by a storage engine.

pub mod engine;
pub mod membership;
pub mod resource;
pub mod roles;

pub use engine::{Actor, Decision, DenialReason, evaluate, require};
pub use membership::{Membership, MembershipLookup, MembershipSet};
pub use resource::{Action, ResourceKind, ResourceRef};
pub use roles::{GlobalRole, LocalRole};

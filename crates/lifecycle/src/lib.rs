//! `registrar-lifecycle` — the trash subsystem.
//!
//! Owns every soft-delete transition for trashable entities (accounts,
//! students): `Active → Trashed → (Active | Purged)`. Transitions are pure
//! functions over the entity's trash state; the manager applies them as
//! single-row compare-and-set updates against the store, after the
//! authorization engine (plus the stricter trash-specific policy) has
//! allowed them.

pub mod manager;
pub mod transition;

pub use manager::{DEFAULT_TRASH_RETENTION_DAYS, LifecycleManager, PurgeReport, TrashKind};
pub use transition::{restore, trash};

//! Soft-delete ("trash") sub-state carried by trashable entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::AccountId;

/// Trash state of an account or student.
///
/// # Invariants
/// - A timestamp exists iff the entity is trashed; the enum makes a
///   timestamp-without-trash unrepresentable.
/// - `deleted_by` records the account that performed the trash operation.
///   It is always set when the entity enters the trash and becomes `None`
///   only when that account is later purged (the reference is nulled, never
///   left dangling).
/// - `Trashed` is reachable only from `Active`; permanent purge is reachable
///   only from `Trashed` (enforced by the lifecycle manager, which rejects a
///   purge of a never-trashed record).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", tag = "state")]
pub enum TrashState {
    /// The entity is live (not soft-deleted).
    #[default]
    Active,
    /// The entity sits in the trash, awaiting restore or purge.
    Trashed {
        /// When the entity was moved to the trash.
        deleted_at: DateTime<Utc>,
        /// The account that performed the trash operation; `None` only after
        /// that account was purged.
        deleted_by: Option<AccountId>,
    },
}

impl TrashState {
    /// Build the trashed state with full attribution.
    pub fn trashed(deleted_at: DateTime<Utc>, deleted_by: AccountId) -> Self {
        TrashState::Trashed {
            deleted_at,
            deleted_by: Some(deleted_by),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, TrashState::Active)
    }

    pub fn is_trashed(&self) -> bool {
        matches!(self, TrashState::Trashed { .. })
    }

    /// Trash timestamp, if the entity is in the trash.
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        match self {
            TrashState::Active => None,
            TrashState::Trashed { deleted_at, .. } => Some(*deleted_at),
        }
    }

    /// Account that trashed the entity, if in the trash and not yet orphaned
    /// by a purge of that account.
    pub fn deleted_by(&self) -> Option<AccountId> {
        match self {
            TrashState::Active => None,
            TrashState::Trashed { deleted_by, .. } => *deleted_by,
        }
    }

    /// Whether the trash timestamp is strictly older than `cutoff`.
    ///
    /// An entity trashed exactly at the cutoff is NOT eligible; the purge
    /// boundary is exclusive.
    pub fn trashed_before(&self, cutoff: DateTime<Utc>) -> bool {
        match self {
            TrashState::Active => false,
            TrashState::Trashed { deleted_at, .. } => *deleted_at < cutoff,
        }
    }

    /// Null the attribution if it points at `purged`, keeping the timestamp
    /// (the row stays trashed under its original clock).
    pub fn clear_attribution_of(&mut self, purged: AccountId) {
        if let TrashState::Trashed { deleted_by, .. } = self
            && *deleted_by == Some(purged)
        {
            *deleted_by = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn active_state_has_no_attribution() {
        let state = TrashState::Active;
        assert!(state.is_active());
        assert_eq!(state.deleted_at(), None);
        assert_eq!(state.deleted_by(), None);
    }

    #[test]
    fn trashed_state_carries_both_fields() {
        let actor = AccountId::new();
        let now = Utc::now();
        let state = TrashState::trashed(now, actor);
        assert!(state.is_trashed());
        assert_eq!(state.deleted_at(), Some(now));
        assert_eq!(state.deleted_by(), Some(actor));
    }

    #[test]
    fn cutoff_boundary_is_exclusive() {
        let now = Utc::now();
        let cutoff = now - Duration::days(90);

        let exactly_at = TrashState::trashed(cutoff, AccountId::new());
        let just_older = TrashState::trashed(cutoff - Duration::seconds(1), AccountId::new());

        assert!(!exactly_at.trashed_before(cutoff));
        assert!(just_older.trashed_before(cutoff));
        assert!(!TrashState::Active.trashed_before(cutoff));
    }

    #[test]
    fn purging_the_deleter_nulls_attribution_but_keeps_the_row_trashed() {
        let actor = AccountId::new();
        let now = Utc::now();
        let mut state = TrashState::trashed(now, actor);

        state.clear_attribution_of(AccountId::new());
        assert_eq!(state.deleted_by(), Some(actor));

        state.clear_attribution_of(actor);
        assert_eq!(state.deleted_by(), None);
        assert!(state.is_trashed());
        assert_eq!(state.deleted_at(), Some(now));
    }
}

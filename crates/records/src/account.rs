//! Account: a system identity, scoped into institutions via memberships.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use registrar_auth::{Actor, GlobalRole};
use registrar_core::{AccountId, DomainError, DomainResult, Entity, TrashState};

/// Common surface of soft-deletable records (accounts and students).
///
/// The lifecycle manager drives every transition through this trait so the
/// trash state machine is written once.
pub trait Trashable {
    fn trash_state(&self) -> TrashState;
    fn set_trash_state(&mut self, state: TrashState);
    /// Force the active flag off. Trashing always deactivates; restoring
    /// never reactivates (reactivation is a separate, explicit admin action).
    fn force_inactive(&mut self);
}

/// A system identity.
///
/// # Invariants
/// - Email is globally unique (enforced by the store's unique index).
/// - The global role is a ceiling; operative permission inside an
///   institution comes from the membership recorded there.
/// - `is_active` is forced false whenever the account is trashed, and stays
///   false after a restore until explicitly reactivated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub display_name: String,
    pub global_role: GlobalRole,
    pub is_active: bool,
    pub trash: TrashState,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        id: AccountId,
        email: impl Into<String>,
        display_name: impl Into<String>,
        global_role: GlobalRole,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let email = email.into().trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::validation("invalid email format"));
        }
        let display_name = display_name.into().trim().to_string();
        if display_name.is_empty() {
            return Err(DomainError::validation("display name cannot be empty"));
        }
        Ok(Self {
            id,
            email,
            display_name,
            global_role,
            is_active: true,
            trash: TrashState::Active,
            created_at,
        })
    }

    /// The actor value threaded through authorization checks.
    pub fn actor(&self) -> Actor {
        Actor {
            id: self.id,
            global_role: self.global_role,
        }
    }
}

impl Entity for Account {
    type Id = AccountId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Trashable for Account {
    fn trash_state(&self) -> TrashState {
        self.trash
    }

    fn set_trash_state(&mut self, state: TrashState) {
        self.trash = state;
    }

    fn force_inactive(&mut self) {
        self.is_active = false;
    }
}

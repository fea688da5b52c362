//! Store-backed lifecycle manager for trashable entities.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use registrar_auth::{Action, ResourceRef, require};
use registrar_core::{AccountId, DomainError, DomainResult, InstitutionId, StudentId};
use registrar_records::{Account, Student};
use registrar_store::RecordStore;

use crate::transition;

/// Trashed entities older than this many days are purged by the cleanup
/// sweep.
pub const DEFAULT_TRASH_RETENTION_DAYS: i64 = 90;

/// The two trashable entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrashKind {
    Account,
    Student,
}

impl core::fmt::Display for TrashKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TrashKind::Account => write!(f, "account"),
            TrashKind::Student => write!(f, "student"),
        }
    }
}

/// Per-type counts returned by a cleanup sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PurgeReport {
    pub purged_accounts: usize,
    pub purged_students: usize,
}

/// Owns the soft-delete/restore/purge state machine over the store.
///
/// Every mutating entry point authorizes first and then applies one
/// single-row compare-and-set; no partial state (timestamp without
/// attribution, or vice versa) is ever observable.
#[derive(Debug, Clone)]
pub struct LifecycleManager {
    store: Arc<RecordStore>,
}

impl LifecycleManager {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }

    /// Move an entity to the trash on behalf of `actor_id`.
    ///
    /// Policy (the trash-specific variant, stricter than the general delete
    /// rule): students may be trashed by a tenant admin of their institution
    /// or a master; accounts only by a master.
    ///
    /// Returns whether a row was affected — `false` when the entity was
    /// already trashed (the original attribution is never overwritten).
    pub fn move_to_trash(
        &self,
        kind: TrashKind,
        id: uuid::Uuid,
        actor_id: AccountId,
        now: DateTime<Utc>,
    ) -> DomainResult<bool> {
        let actor = self.resolve_actor(actor_id)?;

        let affected = match kind {
            TrashKind::Student => {
                let student_id = StudentId::from_uuid(id);
                let student = self
                    .store
                    .get_student(student_id)
                    .ok_or(DomainError::NotFound)?;
                require(
                    &actor,
                    Action::Delete,
                    &ResourceRef::student(student.institution_id),
                    self.store.as_ref(),
                )?;
                self.store
                    .update_student(student_id, |s| transition::trash(s, now, actor_id))
                    .ok_or(DomainError::NotFound)?
            }
            TrashKind::Account => {
                // Accounts are not tenant-scoped; the stricter trash policy
                // reserves them to masters outright.
                if !actor.global_role.is_master() {
                    return Err(DomainError::unauthorized(
                        "only a master account may trash accounts",
                    ));
                }
                let account_id = AccountId::from_uuid(id);
                self.store
                    .update_account(account_id, |a| transition::trash(a, now, actor_id))
                    .ok_or(DomainError::NotFound)?
            }
        };

        tracing::info!(%kind, entity_id = %id, actor = %actor_id, affected, "move_to_trash");
        Ok(affected)
    }

    /// Restore an entity from the trash.
    ///
    /// Clears timestamp and attribution; the entity stays inactive until
    /// explicitly reactivated. `NotInTrash` if the entity exists but is not
    /// trashed.
    pub fn restore_from_trash(&self, kind: TrashKind, id: uuid::Uuid) -> DomainResult<bool> {
        let restored = match kind {
            TrashKind::Student => self
                .store
                .update_student(StudentId::from_uuid(id), transition::restore)
                .ok_or(DomainError::NotFound)?,
            TrashKind::Account => self
                .store
                .update_account(AccountId::from_uuid(id), transition::restore)
                .ok_or(DomainError::NotFound)?,
        };

        if !restored {
            return Err(DomainError::NotInTrash);
        }
        tracing::info!(%kind, entity_id = %id, "restore_from_trash");
        Ok(true)
    }

    /// Purge everything trashed strictly longer than `age_threshold_days`
    /// ago. Entities trashed exactly at the boundary are kept.
    ///
    /// Each entity type is swept as one logical transaction; the two sweeps
    /// are independent units of work. Idempotent: an immediate re-run purges
    /// nothing further.
    pub fn cleanup_old_trash(&self, age_threshold_days: i64, now: DateTime<Utc>) -> PurgeReport {
        let cutoff = now - Duration::days(age_threshold_days);

        let purged_accounts = self.store.sweep_trashed_accounts(cutoff);
        let purged_students = self.store.sweep_trashed_students(cutoff);

        let report = PurgeReport {
            purged_accounts,
            purged_students,
        };
        tracing::info!(
            age_threshold_days,
            purged_accounts,
            purged_students,
            "cleanup_old_trash"
        );
        report
    }

    /// [`Self::cleanup_old_trash`] with the default 90-day retention.
    pub fn cleanup_expired(&self, now: DateTime<Utc>) -> PurgeReport {
        self.cleanup_old_trash(DEFAULT_TRASH_RETENTION_DAYS, now)
    }

    // Read-time partitions of the trashable collections.

    pub fn active_students(&self, institution_id: InstitutionId) -> Vec<Student> {
        self.store.active_students(institution_id)
    }

    pub fn trashed_students(&self, institution_id: InstitutionId) -> Vec<Student> {
        self.store.trashed_students(institution_id)
    }

    pub fn active_accounts(&self, institution_id: InstitutionId) -> Vec<Account> {
        self.store.active_accounts(institution_id)
    }

    pub fn trashed_accounts(&self, institution_id: InstitutionId) -> Vec<Account> {
        self.store.trashed_accounts(institution_id)
    }

    fn resolve_actor(&self, actor_id: AccountId) -> DomainResult<registrar_auth::Actor> {
        let account = self
            .store
            .get_account(actor_id)
            .ok_or_else(|| DomainError::unknown_actor(actor_id.to_string()))?;
        Ok(account.actor())
    }
}

//! The service facade.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use registrar_auth::{
    Action, Decision, GlobalRole, LocalRole, Membership, ResourceRef, evaluate, require,
};
use registrar_core::{
    AccessRequestId, AccountId, ClassId, DomainError, DomainResult, InstitutionId, OccurrenceId,
    OccurrenceTypeId, StudentId,
};
use registrar_lifecycle::{LifecycleManager, PurgeReport, TrashKind};
use registrar_records::{
    AccessRequest, Account, Class, Institution, Occurrence, OccurrenceType, Severity, Student,
};
use registrar_store::RecordStore;

/// Facade over the authorization engine, record store and lifecycle manager.
///
/// The acting account id is an explicit parameter on every call; there is no
/// ambient "current user" state. Authorization is always evaluated before a
/// mutation is attempted, so a denied call has no partial side effects.
#[derive(Debug, Clone)]
pub struct Registrar {
    store: Arc<RecordStore>,
    lifecycle: LifecycleManager,
}

impl Default for Registrar {
    fn default() -> Self {
        Self::new()
    }
}

impl Registrar {
    pub fn new() -> Self {
        Self::with_store(Arc::new(RecordStore::new()))
    }

    pub fn with_store(store: Arc<RecordStore>) -> Self {
        let lifecycle = LifecycleManager::new(store.clone());
        Self { store, lifecycle }
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────
    // Authorization
    // ─────────────────────────────────────────────────────────────────────

    /// Evaluate the policy for an acting account against a resource.
    ///
    /// Pure read: no side effects beyond the actor lookup.
    pub fn authorize(
        &self,
        actor_id: AccountId,
        action: Action,
        resource: &ResourceRef,
    ) -> DomainResult<Decision> {
        let actor = self.resolve_actor(actor_id)?;
        let decision = evaluate(&actor, action, resource, self.store.as_ref())?;
        tracing::debug!(actor = %actor_id, %action, kind = %resource.kind, ?decision, "authorize");
        Ok(decision)
    }

    fn resolve_actor(&self, actor_id: AccountId) -> DomainResult<registrar_auth::Actor> {
        let account = self
            .store
            .get_account(actor_id)
            .ok_or_else(|| DomainError::unknown_actor(actor_id.to_string()))?;
        Ok(account.actor())
    }

    fn require(
        &self,
        actor_id: AccountId,
        action: Action,
        resource: &ResourceRef,
    ) -> DomainResult<()> {
        let actor = self.resolve_actor(actor_id)?;
        require(&actor, action, resource, self.store.as_ref())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Provisioning (external to the policy; no actor gate)
    // ─────────────────────────────────────────────────────────────────────

    pub fn register_institution(
        &self,
        name: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<InstitutionId> {
        let institution = Institution::new(InstitutionId::new(), name, now)?;
        let id = institution.id;
        self.store.insert_institution(institution)?;
        Ok(id)
    }

    pub fn provision_account(
        &self,
        email: &str,
        display_name: &str,
        global_role: GlobalRole,
        now: DateTime<Utc>,
    ) -> DomainResult<AccountId> {
        let account = Account::new(AccountId::new(), email, display_name, global_role, now)?;
        let id = account.id;
        self.store.insert_account(account)?;
        Ok(id)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Gated record mutations
    // ─────────────────────────────────────────────────────────────────────

    /// Grant `account_id` the `local_role` in `institution_id`.
    ///
    /// Membership rows are administrative resources: tenant admin or master.
    pub fn grant_membership(
        &self,
        actor_id: AccountId,
        account_id: AccountId,
        institution_id: InstitutionId,
        local_role: LocalRole,
    ) -> DomainResult<()> {
        self.require(
            actor_id,
            Action::Insert,
            &ResourceRef::membership(institution_id),
        )?;
        self.store.grant_membership(Membership {
            account_id,
            institution_id,
            local_role,
        })
    }

    pub fn revoke_membership(
        &self,
        actor_id: AccountId,
        account_id: AccountId,
        institution_id: InstitutionId,
    ) -> DomainResult<bool> {
        self.require(
            actor_id,
            Action::Delete,
            &ResourceRef::membership(institution_id),
        )?;
        Ok(self.store.revoke_membership(account_id, institution_id))
    }

    pub fn create_class(
        &self,
        actor_id: AccountId,
        institution_id: InstitutionId,
        name: &str,
        year: i32,
        now: DateTime<Utc>,
    ) -> DomainResult<ClassId> {
        self.require(actor_id, Action::Insert, &ResourceRef::class(institution_id))?;
        let class = Class::new(ClassId::new(), institution_id, name, year, now)?;
        let id = class.id;
        self.store.insert_class(class)?;
        Ok(id)
    }

    pub fn delete_class(&self, actor_id: AccountId, class_id: ClassId) -> DomainResult<bool> {
        let class = self.store.get_class(class_id).ok_or(DomainError::NotFound)?;
        self.require(
            actor_id,
            Action::Delete,
            &ResourceRef::class(class.institution_id),
        )?;
        Ok(self.store.remove_class(class_id))
    }

    /// Enroll a student. Registration-number conflicts (including a second
    /// unregistered student in the same institution) surface verbatim.
    pub fn create_student(
        &self,
        actor_id: AccountId,
        institution_id: InstitutionId,
        full_name: &str,
        registration_number: Option<String>,
        class_id: Option<ClassId>,
        now: DateTime<Utc>,
    ) -> DomainResult<StudentId> {
        self.require(
            actor_id,
            Action::Insert,
            &ResourceRef::student(institution_id),
        )?;
        let student = Student::new(
            StudentId::new(),
            institution_id,
            full_name,
            registration_number,
            class_id,
            now,
        )?;
        let id = student.id;
        self.store.insert_student(student)?;
        Ok(id)
    }

    pub fn create_occurrence_type(
        &self,
        actor_id: AccountId,
        institution_id: InstitutionId,
        label: &str,
        severity: Severity,
    ) -> DomainResult<OccurrenceTypeId> {
        self.require(
            actor_id,
            Action::Insert,
            &ResourceRef::occurrence_type(institution_id),
        )?;
        let occurrence_type =
            OccurrenceType::new(OccurrenceTypeId::new(), institution_id, label, severity)?;
        let id = occurrence_type.id;
        self.store.insert_occurrence_type(occurrence_type)?;
        Ok(id)
    }

    /// File a disciplinary occurrence.
    ///
    /// `teacher_id` must equal the acting account — the base policy makes
    /// self-attribution mandatory for inserts, admins included.
    pub fn file_occurrence(
        &self,
        actor_id: AccountId,
        institution_id: InstitutionId,
        student_id: StudentId,
        teacher_id: AccountId,
        class_id: Option<ClassId>,
        occurrence_type_id: OccurrenceTypeId,
        description: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<OccurrenceId> {
        self.require(
            actor_id,
            Action::Insert,
            &ResourceRef::occurrence(institution_id, Some(teacher_id)),
        )?;
        let occurrence = Occurrence::new(
            OccurrenceId::new(),
            institution_id,
            student_id,
            teacher_id,
            class_id,
            occurrence_type_id,
            description,
            now,
        )?;
        let id = occurrence.id;
        self.store.insert_occurrence(occurrence)?;
        Ok(id)
    }

    /// Amend an occurrence's description. Allowed to the filing teacher or a
    /// tenant admin.
    pub fn amend_occurrence(
        &self,
        actor_id: AccountId,
        occurrence_id: OccurrenceId,
        description: &str,
    ) -> DomainResult<()> {
        let occurrence = self
            .store
            .get_occurrence(occurrence_id)
            .ok_or(DomainError::NotFound)?;
        self.require(
            actor_id,
            Action::Update,
            &ResourceRef::occurrence(occurrence.institution_id, occurrence.teacher_id),
        )?;
        let description = description.trim().to_string();
        if description.is_empty() {
            return Err(DomainError::validation("occurrence description cannot be empty"));
        }
        self.store
            .update_occurrence(occurrence_id, |o| o.description = description)
            .ok_or(DomainError::NotFound)
    }

    /// File an access request for the acting account itself.
    pub fn file_access_request(
        &self,
        actor_id: AccountId,
        institution_id: InstitutionId,
        requested_role: LocalRole,
        now: DateTime<Utc>,
    ) -> DomainResult<AccessRequestId> {
        self.require(
            actor_id,
            Action::Insert,
            &ResourceRef::access_request(institution_id, actor_id),
        )?;
        let request = AccessRequest::new(
            AccessRequestId::new(),
            institution_id,
            actor_id,
            requested_role,
            now,
        );
        let id = request.id;
        self.store.insert_access_request(request)?;
        Ok(id)
    }

    /// Reactivate a restored account. Distinct, explicit admin action; a
    /// trashed account must be restored first.
    pub fn activate_account(
        &self,
        actor_id: AccountId,
        account_id: AccountId,
        institution_id: InstitutionId,
    ) -> DomainResult<()> {
        self.require(
            actor_id,
            Action::Update,
            &ResourceRef::account(institution_id),
        )?;
        let activated = self
            .store
            .update_account(account_id, |a| {
                if a.trash.is_trashed() {
                    false
                } else {
                    a.is_active = true;
                    true
                }
            })
            .ok_or(DomainError::NotFound)?;
        if !activated {
            return Err(DomainError::validation(
                "account is in the trash; restore it before reactivating",
            ));
        }
        Ok(())
    }

    /// Reactivate a restored student.
    pub fn activate_student(&self, actor_id: AccountId, student_id: StudentId) -> DomainResult<()> {
        let student = self
            .store
            .get_student(student_id)
            .ok_or(DomainError::NotFound)?;
        self.require(
            actor_id,
            Action::Update,
            &ResourceRef::student(student.institution_id),
        )?;
        let activated = self
            .store
            .update_student(student_id, |s| {
                if s.trash.is_trashed() {
                    false
                } else {
                    s.is_active = true;
                    true
                }
            })
            .ok_or(DomainError::NotFound)?;
        if !activated {
            return Err(DomainError::validation(
                "student is in the trash; restore it before reactivating",
            ));
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Trash lifecycle
    // ─────────────────────────────────────────────────────────────────────

    pub fn move_to_trash(
        &self,
        kind: TrashKind,
        id: Uuid,
        actor_id: AccountId,
        now: DateTime<Utc>,
    ) -> DomainResult<bool> {
        self.lifecycle.move_to_trash(kind, id, actor_id, now)
    }

    pub fn restore_from_trash(&self, kind: TrashKind, id: Uuid) -> DomainResult<bool> {
        self.lifecycle.restore_from_trash(kind, id)
    }

    pub fn cleanup_old_trash(&self, age_threshold_days: i64, now: DateTime<Utc>) -> PurgeReport {
        self.lifecycle.cleanup_old_trash(age_threshold_days, now)
    }

    pub fn list_active_students(&self, institution_id: InstitutionId) -> Vec<Student> {
        self.lifecycle.active_students(institution_id)
    }

    pub fn list_trashed_students(&self, institution_id: InstitutionId) -> Vec<Student> {
        self.lifecycle.trashed_students(institution_id)
    }

    pub fn list_active_accounts(&self, institution_id: InstitutionId) -> Vec<Account> {
        self.lifecycle.active_accounts(institution_id)
    }

    pub fn list_trashed_accounts(&self, institution_id: InstitutionId) -> Vec<Account> {
        self.lifecycle.trashed_accounts(institution_id)
    }
}

//! In-memory record store.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use registrar_auth::{LocalRole, Membership, MembershipLookup};
use registrar_core::{
    AccessRequestId, AccountId, ClassId, DomainError, DomainResult, InstitutionId, OccurrenceId,
    OccurrenceTypeId, StudentId,
};
use registrar_records::{
    AccessRequest, Account, Class, Institution, Occurrence, OccurrenceType, Student, Trashable,
};

#[derive(Debug, Default)]
struct Tables {
    institutions: HashMap<InstitutionId, Institution>,
    accounts: HashMap<AccountId, Account>,
    /// Unique index: account email (global).
    account_email_idx: HashMap<String, AccountId>,
    /// Unique index: the (account, institution) membership pair.
    memberships: HashMap<(AccountId, InstitutionId), LocalRole>,
    classes: HashMap<ClassId, Class>,
    students: HashMap<StudentId, Student>,
    /// Unique index: (institution, registration number). `None` participates
    /// as a value of its own — at most one unregistered student per
    /// institution (NULLS NOT DISTINCT).
    student_registration_idx: HashMap<(InstitutionId, Option<String>), StudentId>,
    occurrence_types: HashMap<OccurrenceTypeId, OccurrenceType>,
    occurrences: HashMap<OccurrenceId, Occurrence>,
    access_requests: HashMap<AccessRequestId, AccessRequest>,
}

/// Shared in-memory store.
///
/// Reads take the read lock (read-committed analogue); every mutation is one
/// write-lock critical section, so concurrent writers to the same row are
/// serialized and exactly one of two racing trash calls observes
/// "row affected".
#[derive(Debug, Default)]
pub struct RecordStore {
    inner: RwLock<Tables>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned lock means a panic mid-write in another thread; the data
    // itself is still consistent (every critical section is single-row), so
    // recover the guard rather than cascading the panic.
    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Institutions
    // ─────────────────────────────────────────────────────────────────────

    pub fn insert_institution(&self, institution: Institution) -> DomainResult<()> {
        let mut tables = self.write();
        if tables.institutions.contains_key(&institution.id) {
            return Err(DomainError::conflict("institution id already exists"));
        }
        tables.institutions.insert(institution.id, institution);
        Ok(())
    }

    pub fn get_institution(&self, id: InstitutionId) -> Option<Institution> {
        self.read().institutions.get(&id).cloned()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accounts
    // ─────────────────────────────────────────────────────────────────────

    pub fn insert_account(&self, account: Account) -> DomainResult<()> {
        let mut tables = self.write();
        if tables.accounts.contains_key(&account.id) {
            return Err(DomainError::conflict("account id already exists"));
        }
        if tables.account_email_idx.contains_key(&account.email) {
            return Err(DomainError::conflict(format!(
                "email already registered: {}",
                account.email
            )));
        }
        tables.account_email_idx.insert(account.email.clone(), account.id);
        tables.accounts.insert(account.id, account);
        Ok(())
    }

    pub fn get_account(&self, id: AccountId) -> Option<Account> {
        self.read().accounts.get(&id).cloned()
    }

    pub fn get_account_by_email(&self, email: &str) -> Option<Account> {
        let tables = self.read();
        let id = tables.account_email_idx.get(email)?;
        tables.accounts.get(id).cloned()
    }

    /// Single-row update under the write lock.
    ///
    /// The closure must not touch indexed columns (email); those have
    /// dedicated operations.
    pub fn update_account<R>(&self, id: AccountId, f: impl FnOnce(&mut Account) -> R) -> Option<R> {
        let mut tables = self.write();
        tables.accounts.get_mut(&id).map(f)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Memberships
    // ─────────────────────────────────────────────────────────────────────

    pub fn grant_membership(&self, membership: Membership) -> DomainResult<()> {
        let mut tables = self.write();
        if !tables.accounts.contains_key(&membership.account_id) {
            return Err(DomainError::NotFound);
        }
        if !tables.institutions.contains_key(&membership.institution_id) {
            return Err(DomainError::NotFound);
        }
        let key = (membership.account_id, membership.institution_id);
        if tables.memberships.contains_key(&key) {
            return Err(DomainError::conflict(format!(
                "membership already exists for account {} in institution {}",
                membership.account_id, membership.institution_id
            )));
        }
        tables.memberships.insert(key, membership.local_role);
        Ok(())
    }

    pub fn revoke_membership(&self, account_id: AccountId, institution_id: InstitutionId) -> bool {
        self.write()
            .memberships
            .remove(&(account_id, institution_id))
            .is_some()
    }

    pub fn memberships_of(&self, account_id: AccountId) -> Vec<Membership> {
        self.read()
            .memberships
            .iter()
            .filter(|((a, _), _)| *a == account_id)
            .map(|((account_id, institution_id), local_role)| Membership {
                account_id: *account_id,
                institution_id: *institution_id,
                local_role: *local_role,
            })
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Classes
    // ─────────────────────────────────────────────────────────────────────

    pub fn insert_class(&self, class: Class) -> DomainResult<()> {
        let mut tables = self.write();
        if !tables.institutions.contains_key(&class.institution_id) {
            return Err(DomainError::NotFound);
        }
        if tables.classes.contains_key(&class.id) {
            return Err(DomainError::conflict("class id already exists"));
        }
        tables.classes.insert(class.id, class);
        Ok(())
    }

    pub fn get_class(&self, id: ClassId) -> Option<Class> {
        self.read().classes.get(&id).cloned()
    }

    /// Delete a class; student and occurrence references become NULL.
    pub fn remove_class(&self, id: ClassId) -> bool {
        let mut tables = self.write();
        if tables.classes.remove(&id).is_none() {
            return false;
        }
        for student in tables.students.values_mut() {
            if student.class_id == Some(id) {
                student.class_id = None;
            }
        }
        for occurrence in tables.occurrences.values_mut() {
            if occurrence.class_id == Some(id) {
                occurrence.class_id = None;
            }
        }
        true
    }

    // ─────────────────────────────────────────────────────────────────────
    // Students
    // ─────────────────────────────────────────────────────────────────────

    pub fn insert_student(&self, student: Student) -> DomainResult<()> {
        let mut tables = self.write();
        if !tables.institutions.contains_key(&student.institution_id) {
            return Err(DomainError::NotFound);
        }
        if tables.students.contains_key(&student.id) {
            return Err(DomainError::conflict("student id already exists"));
        }
        let key = (student.institution_id, student.registration_number.clone());
        if tables.student_registration_idx.contains_key(&key) {
            return Err(DomainError::conflict(match &student.registration_number {
                Some(n) => format!("registration number already taken: {n}"),
                None => "institution already has an unregistered student".to_string(),
            }));
        }
        tables.student_registration_idx.insert(key, student.id);
        tables.students.insert(student.id, student);
        Ok(())
    }

    pub fn get_student(&self, id: StudentId) -> Option<Student> {
        self.read().students.get(&id).cloned()
    }

    /// Single-row update under the write lock.
    ///
    /// The closure must not touch indexed columns (institution, registration
    /// number).
    pub fn update_student<R>(&self, id: StudentId, f: impl FnOnce(&mut Student) -> R) -> Option<R> {
        let mut tables = self.write();
        tables.students.get_mut(&id).map(f)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Occurrence catalog and occurrences
    // ─────────────────────────────────────────────────────────────────────

    pub fn insert_occurrence_type(&self, occurrence_type: OccurrenceType) -> DomainResult<()> {
        let mut tables = self.write();
        if !tables.institutions.contains_key(&occurrence_type.institution_id) {
            return Err(DomainError::NotFound);
        }
        if tables.occurrence_types.contains_key(&occurrence_type.id) {
            return Err(DomainError::conflict("occurrence type id already exists"));
        }
        tables
            .occurrence_types
            .insert(occurrence_type.id, occurrence_type);
        Ok(())
    }

    pub fn get_occurrence_type(&self, id: OccurrenceTypeId) -> Option<OccurrenceType> {
        self.read().occurrence_types.get(&id).cloned()
    }

    pub fn remove_occurrence_type(&self, id: OccurrenceTypeId) -> bool {
        self.write().occurrence_types.remove(&id).is_some()
    }

    pub fn insert_occurrence(&self, occurrence: Occurrence) -> DomainResult<()> {
        let mut tables = self.write();
        let Some(student) = tables.students.get(&occurrence.student_id) else {
            return Err(DomainError::NotFound);
        };
        if student.institution_id != occurrence.institution_id {
            return Err(DomainError::validation(
                "occurrence and student belong to different institutions",
            ));
        }
        if !tables.occurrence_types.contains_key(&occurrence.occurrence_type_id) {
            return Err(DomainError::NotFound);
        }
        if tables.occurrences.contains_key(&occurrence.id) {
            return Err(DomainError::conflict("occurrence id already exists"));
        }
        tables.occurrences.insert(occurrence.id, occurrence);
        Ok(())
    }

    pub fn get_occurrence(&self, id: OccurrenceId) -> Option<Occurrence> {
        self.read().occurrences.get(&id).cloned()
    }

    pub fn update_occurrence<R>(
        &self,
        id: OccurrenceId,
        f: impl FnOnce(&mut Occurrence) -> R,
    ) -> Option<R> {
        let mut tables = self.write();
        tables.occurrences.get_mut(&id).map(f)
    }

    pub fn remove_occurrence(&self, id: OccurrenceId) -> bool {
        self.write().occurrences.remove(&id).is_some()
    }

    pub fn occurrences_for_student(&self, student_id: StudentId) -> Vec<Occurrence> {
        self.read()
            .occurrences
            .values()
            .filter(|o| o.student_id == student_id)
            .cloned()
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Access requests
    // ─────────────────────────────────────────────────────────────────────

    pub fn insert_access_request(&self, request: AccessRequest) -> DomainResult<()> {
        let mut tables = self.write();
        if !tables.institutions.contains_key(&request.institution_id) {
            return Err(DomainError::NotFound);
        }
        if tables.access_requests.contains_key(&request.id) {
            return Err(DomainError::conflict("access request id already exists"));
        }
        tables.access_requests.insert(request.id, request);
        Ok(())
    }

    pub fn get_access_request(&self, id: AccessRequestId) -> Option<AccessRequest> {
        self.read().access_requests.get(&id).cloned()
    }

    pub fn update_access_request<R>(
        &self,
        id: AccessRequestId,
        f: impl FnOnce(&mut AccessRequest) -> R,
    ) -> Option<R> {
        let mut tables = self.write();
        tables.access_requests.get_mut(&id).map(f)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Hard delete (purge) and trash sweeps
    // ─────────────────────────────────────────────────────────────────────

    /// Remove an account and null every backreference to it: `deleted_by`
    /// attributions on trashed rows, `teacher_id` on occurrences. Its
    /// memberships and email index entry go with it.
    pub fn purge_account(&self, id: AccountId) -> bool {
        let mut tables = self.write();
        Self::purge_account_locked(&mut tables, id)
    }

    /// Remove a student; occurrences filed against it are removed as well
    /// (they reference the student non-optionally).
    pub fn purge_student(&self, id: StudentId) -> bool {
        let mut tables = self.write();
        Self::purge_student_locked(&mut tables, id)
    }

    /// Purge every trashed account with `deleted_at` strictly before
    /// `cutoff`. One write-lock critical section: the sweep is a single
    /// logical transaction for the account type.
    pub fn sweep_trashed_accounts(&self, cutoff: DateTime<Utc>) -> usize {
        let mut tables = self.write();
        let expired: Vec<AccountId> = tables
            .accounts
            .values()
            .filter(|a| a.trash_state().trashed_before(cutoff))
            .map(|a| a.id)
            .collect();
        for id in &expired {
            Self::purge_account_locked(&mut tables, *id);
        }
        expired.len()
    }

    /// Purge every trashed student with `deleted_at` strictly before
    /// `cutoff`, as a single logical transaction for the student type.
    pub fn sweep_trashed_students(&self, cutoff: DateTime<Utc>) -> usize {
        let mut tables = self.write();
        let expired: Vec<StudentId> = tables
            .students
            .values()
            .filter(|s| s.trash_state().trashed_before(cutoff))
            .map(|s| s.id)
            .collect();
        for id in &expired {
            Self::purge_student_locked(&mut tables, *id);
        }
        expired.len()
    }

    fn purge_account_locked(tables: &mut Tables, id: AccountId) -> bool {
        let Some(account) = tables.accounts.remove(&id) else {
            return false;
        };
        tables.account_email_idx.remove(&account.email);
        tables.memberships.retain(|(a, _), _| *a != id);
        for occurrence in tables.occurrences.values_mut() {
            if occurrence.teacher_id == Some(id) {
                occurrence.teacher_id = None;
            }
        }
        // deleted_by attributions become NULL, not dangling. The trash
        // timestamp survives so the row still counts as trashed.
        for other in tables.accounts.values_mut() {
            let mut state = other.trash_state();
            state.clear_attribution_of(id);
            other.set_trash_state(state);
        }
        for student in tables.students.values_mut() {
            let mut state = student.trash_state();
            state.clear_attribution_of(id);
            student.set_trash_state(state);
        }
        true
    }

    fn purge_student_locked(tables: &mut Tables, id: StudentId) -> bool {
        let Some(student) = tables.students.remove(&id) else {
            return false;
        };
        tables
            .student_registration_idx
            .remove(&(student.institution_id, student.registration_number.clone()));
        tables.occurrences.retain(|_, o| o.student_id != id);
        true
    }

    // ─────────────────────────────────────────────────────────────────────
    // Active / trashed views
    // ─────────────────────────────────────────────────────────────────────

    /// Students of an institution partitioned as not-trashed.
    pub fn active_students(&self, institution_id: InstitutionId) -> Vec<Student> {
        self.read()
            .students
            .values()
            .filter(|s| s.institution_id == institution_id && s.trash.is_active())
            .cloned()
            .collect()
    }

    /// Students of an institution currently in the trash.
    pub fn trashed_students(&self, institution_id: InstitutionId) -> Vec<Student> {
        self.read()
            .students
            .values()
            .filter(|s| s.institution_id == institution_id && s.trash.is_trashed())
            .cloned()
            .collect()
    }

    /// Member accounts of an institution that are not trashed.
    pub fn active_accounts(&self, institution_id: InstitutionId) -> Vec<Account> {
        let tables = self.read();
        tables
            .memberships
            .keys()
            .filter(|(_, i)| *i == institution_id)
            .filter_map(|(a, _)| tables.accounts.get(a))
            .filter(|a| a.trash.is_active())
            .cloned()
            .collect()
    }

    /// Member accounts of an institution currently in the trash.
    pub fn trashed_accounts(&self, institution_id: InstitutionId) -> Vec<Account> {
        let tables = self.read();
        tables
            .memberships
            .keys()
            .filter(|(_, i)| *i == institution_id)
            .filter_map(|(a, _)| tables.accounts.get(a))
            .filter(|a| a.trash.is_trashed())
            .cloned()
            .collect()
    }
}

impl MembershipLookup for RecordStore {
    fn local_role(
        &self,
        account_id: AccountId,
        institution_id: InstitutionId,
    ) -> Option<LocalRole> {
        self.read()
            .memberships
            .get(&(account_id, institution_id))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use registrar_auth::GlobalRole;
    use registrar_core::TrashState;
    use registrar_records::Severity;

    fn seed_institution(store: &RecordStore) -> InstitutionId {
        let id = InstitutionId::new();
        store
            .insert_institution(Institution::new(id, "Escola Central", Utc::now()).unwrap())
            .unwrap();
        id
    }

    fn seed_account(store: &RecordStore, email: &str, role: GlobalRole) -> AccountId {
        let id = AccountId::new();
        store
            .insert_account(Account::new(id, email, "Someone", role, Utc::now()).unwrap())
            .unwrap();
        id
    }

    fn seed_student(
        store: &RecordStore,
        institution_id: InstitutionId,
        registration: Option<&str>,
    ) -> StudentId {
        let id = StudentId::new();
        store
            .insert_student(
                Student::new(
                    id,
                    institution_id,
                    "Ana Costa",
                    registration.map(str::to_string),
                    None,
                    Utc::now(),
                )
                .unwrap(),
            )
            .unwrap();
        id
    }

    #[test]
    fn duplicate_email_is_a_conflict() {
        let store = RecordStore::new();
        seed_account(&store, "a@example.com", GlobalRole::Professor);

        let err = store
            .insert_account(
                Account::new(
                    AccountId::new(),
                    "a@example.com",
                    "Other",
                    GlobalRole::Professor,
                    Utc::now(),
                )
                .unwrap(),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn registration_number_unique_per_institution() {
        let store = RecordStore::new();
        let inst = seed_institution(&store);
        seed_student(&store, inst, Some("123"));

        let err = store
            .insert_student(
                Student::new(
                    StudentId::new(),
                    inst,
                    "Outro Aluno",
                    Some("123".to_string()),
                    None,
                    Utc::now(),
                )
                .unwrap(),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        // Same number in a different institution is fine.
        let other_inst = seed_institution(&store);
        seed_student(&store, other_inst, Some("123"));
    }

    #[test]
    fn only_one_null_registration_per_institution() {
        let store = RecordStore::new();
        let inst = seed_institution(&store);
        seed_student(&store, inst, None);

        let err = store
            .insert_student(
                Student::new(StudentId::new(), inst, "Sem Matrícula", None, None, Utc::now())
                    .unwrap(),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn removing_a_class_nulls_student_and_occurrence_references() {
        let store = RecordStore::new();
        let inst = seed_institution(&store);
        let teacher = seed_account(&store, "t@example.com", GlobalRole::Professor);

        let class_id = ClassId::new();
        store
            .insert_class(Class::new(class_id, inst, "5A", 2026, Utc::now()).unwrap())
            .unwrap();

        let student_id = StudentId::new();
        store
            .insert_student(
                Student::new(
                    student_id,
                    inst,
                    "Ana Costa",
                    Some("55".to_string()),
                    Some(class_id),
                    Utc::now(),
                )
                .unwrap(),
            )
            .unwrap();

        let type_id = OccurrenceTypeId::new();
        store
            .insert_occurrence_type(
                OccurrenceType::new(type_id, inst, "Atraso", Severity::Minor).unwrap(),
            )
            .unwrap();

        let occurrence_id = OccurrenceId::new();
        store
            .insert_occurrence(
                Occurrence::new(
                    occurrence_id,
                    inst,
                    student_id,
                    teacher,
                    Some(class_id),
                    type_id,
                    "Chegou atrasado",
                    Utc::now(),
                )
                .unwrap(),
            )
            .unwrap();

        assert!(store.remove_class(class_id));
        assert_eq!(store.get_student(student_id).unwrap().class_id, None);
        assert_eq!(store.get_occurrence(occurrence_id).unwrap().class_id, None);
    }

    #[test]
    fn purging_an_account_nulls_backreferences() {
        let store = RecordStore::new();
        let inst = seed_institution(&store);
        let teacher = seed_account(&store, "t@example.com", GlobalRole::Professor);
        let student_id = seed_student(&store, inst, Some("77"));

        let type_id = OccurrenceTypeId::new();
        store
            .insert_occurrence_type(
                OccurrenceType::new(type_id, inst, "Atraso", Severity::Minor).unwrap(),
            )
            .unwrap();
        let occurrence_id = OccurrenceId::new();
        store
            .insert_occurrence(
                Occurrence::new(
                    occurrence_id,
                    inst,
                    student_id,
                    teacher,
                    None,
                    type_id,
                    "Chegou atrasado",
                    Utc::now(),
                )
                .unwrap(),
            )
            .unwrap();

        // The teacher also trashed a student before being purged.
        store
            .update_student(student_id, |s| {
                s.trash = TrashState::trashed(Utc::now(), teacher);
                s.is_active = false;
            })
            .unwrap();

        assert!(store.purge_account(teacher));
        assert_eq!(store.get_account(teacher), None);
        assert_eq!(store.get_occurrence(occurrence_id).unwrap().teacher_id, None);

        let student = store.get_student(student_id).unwrap();
        assert!(student.trash.is_trashed());
        assert_eq!(student.trash.deleted_by(), None);
    }

    #[test]
    fn purging_a_student_removes_their_occurrences_and_frees_the_registration() {
        let store = RecordStore::new();
        let inst = seed_institution(&store);
        let teacher = seed_account(&store, "t@example.com", GlobalRole::Professor);
        let student_id = seed_student(&store, inst, Some("88"));

        let type_id = OccurrenceTypeId::new();
        store
            .insert_occurrence_type(
                OccurrenceType::new(type_id, inst, "Atraso", Severity::Minor).unwrap(),
            )
            .unwrap();
        store
            .insert_occurrence(
                Occurrence::new(
                    OccurrenceId::new(),
                    inst,
                    student_id,
                    teacher,
                    None,
                    type_id,
                    "Chegou atrasado",
                    Utc::now(),
                )
                .unwrap(),
            )
            .unwrap();

        assert!(store.purge_student(student_id));
        assert_eq!(store.get_student(student_id), None);
        assert!(store.occurrences_for_student(student_id).is_empty());

        // The registration number is free again.
        seed_student(&store, inst, Some("88"));
    }

    #[test]
    fn views_partition_by_trash_state() {
        let store = RecordStore::new();
        let inst = seed_institution(&store);
        let admin = seed_account(&store, "admin@example.com", GlobalRole::Admin);
        let live = seed_student(&store, inst, Some("1"));
        let binned = seed_student(&store, inst, Some("2"));

        store
            .update_student(binned, |s| {
                s.trash = TrashState::trashed(Utc::now(), admin);
                s.is_active = false;
            })
            .unwrap();

        let active: Vec<StudentId> = store.active_students(inst).iter().map(|s| s.id).collect();
        let trashed: Vec<StudentId> = store.trashed_students(inst).iter().map(|s| s.id).collect();
        assert_eq!(active, vec![live]);
        assert_eq!(trashed, vec![binned]);
    }
}

//! Student: a trashable, tenant-scoped record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use registrar_core::{
    ClassId, DomainError, DomainResult, Entity, InstitutionId, InstitutionScoped, StudentId,
    TrashState,
};

use crate::account::Trashable;

/// A student enrolled at an institution.
///
/// # Invariants
/// - `institution_id` is immutable after creation.
/// - `registration_number` is unique per institution, and at most one student
///   per institution may have no registration number (NULL is treated as a
///   distinguishable singleton, not "don't care").
/// - `is_active` is forced false on trash and stays false after restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub institution_id: InstitutionId,
    pub class_id: Option<ClassId>,
    pub registration_number: Option<String>,
    pub full_name: String,
    pub is_active: bool,
    pub trash: TrashState,
    pub created_at: DateTime<Utc>,
}

impl Student {
    pub fn new(
        id: StudentId,
        institution_id: InstitutionId,
        full_name: impl Into<String>,
        registration_number: Option<String>,
        class_id: Option<ClassId>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let full_name = full_name.into().trim().to_string();
        if full_name.is_empty() {
            return Err(DomainError::validation("student name cannot be empty"));
        }
        let registration_number = match registration_number {
            Some(n) => {
                let n = n.trim().to_string();
                if n.is_empty() {
                    return Err(DomainError::validation(
                        "registration number cannot be blank; omit it instead",
                    ));
                }
                Some(n)
            }
            None => None,
        };
        Ok(Self {
            id,
            institution_id,
            class_id,
            registration_number,
            full_name,
            is_active: true,
            trash: TrashState::Active,
            created_at,
        })
    }
}

impl Entity for Student {
    type Id = StudentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl InstitutionScoped for Student {
    fn institution_id(&self) -> InstitutionId {
        self.institution_id
    }
}

impl Trashable for Student {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_registration_number_is_rejected() {
        let err = Student::new(
            StudentId::new(),
            InstitutionId::new(),
            "João Pereira",
            Some("   ".to_string()),
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn new_student_is_active_and_untrashed() {
        let student = Student::new(
            StudentId::new(),
            InstitutionId::new(),
            "Ana Costa",
            Some("2024-017".to_string()),
            None,
            Utc::now(),
        )
        .unwrap();
        assert!(student.is_active);
        assert!(student.trash.is_active());
    }
}

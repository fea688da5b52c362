//! Occurrence catalog and filed disciplinary occurrences.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use registrar_core::{
    AccountId, ClassId, DomainError, DomainResult, Entity, InstitutionId, InstitutionScoped,
    OccurrenceId, OccurrenceTypeId, StudentId,
};

/// Severity of an occurrence type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minor,
    Moderate,
    Severe,
}

/// Catalog entry describing a kind of disciplinary occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceType {
    pub id: OccurrenceTypeId,
    pub institution_id: InstitutionId,
    pub label: String,
    pub severity: Severity,
}

impl OccurrenceType {
    pub fn new(
        id: OccurrenceTypeId,
        institution_id: InstitutionId,
        label: impl Into<String>,
        severity: Severity,
    ) -> DomainResult<Self> {
        let label = label.into().trim().to_string();
        if label.is_empty() {
            return Err(DomainError::validation("occurrence type label cannot be empty"));
        }
        Ok(Self {
            id,
            institution_id,
            label,
            severity,
        })
    }
}

impl Entity for OccurrenceType {
    type Id = OccurrenceTypeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl InstitutionScoped for OccurrenceType {
    fn institution_id(&self) -> InstitutionId {
        self.institution_id
    }
}

/// A filed disciplinary occurrence.
///
/// `teacher_id` is the filing account and becomes None only when that account
/// is purged; `class_id` is nulled when the class is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub id: OccurrenceId,
    pub institution_id: InstitutionId,
    pub student_id: StudentId,
    pub teacher_id: Option<AccountId>,
    pub class_id: Option<ClassId>,
    pub occurrence_type_id: OccurrenceTypeId,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
}

impl Occurrence {
    pub fn new(
        id: OccurrenceId,
        institution_id: InstitutionId,
        student_id: StudentId,
        teacher_id: AccountId,
        class_id: Option<ClassId>,
        occurrence_type_id: OccurrenceTypeId,
        description: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let description = description.into().trim().to_string();
        if description.is_empty() {
            return Err(DomainError::validation("occurrence description cannot be empty"));
        }
        Ok(Self {
            id,
            institution_id,
            student_id,
            teacher_id: Some(teacher_id),
            class_id,
            occurrence_type_id,
            description,
            occurred_at,
        })
    }
}

impl Entity for Occurrence {
    type Id = OccurrenceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl InstitutionScoped for Occurrence {
    fn institution_id(&self) -> InstitutionId {
        self.institution_id
    }
}

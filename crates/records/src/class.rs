//! Class: a tenant-scoped roster unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use registrar_core::{ClassId, DomainError, DomainResult, Entity, InstitutionId, InstitutionScoped};

/// A class within an institution.
///
/// Students reference a class optionally; deleting a class nulls those
/// references rather than cascading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub id: ClassId,
    pub institution_id: InstitutionId,
    pub name: String,
    pub year: i32,
    pub created_at: DateTime<Utc>,
}

impl Class {
    pub fn new(
        id: ClassId,
        institution_id: InstitutionId,
        name: impl Into<String>,
        year: i32,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("class name cannot be empty"));
        }
        Ok(Self {
            id,
            institution_id,
            name,
            year,
            created_at,
        })
    }
}

impl Entity for Class {
    type Id = ClassId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl InstitutionScoped for Class {
    fn institution_id(&self) -> InstitutionId {
        self.institution_id
    }
}

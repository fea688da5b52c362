//! Institution: the tenant boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use registrar_core::{DomainError, DomainResult, Entity, InstitutionId};

/// An institution (school). Root of tenancy; has no parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Institution {
    pub id: InstitutionId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Institution {
    pub fn new(id: InstitutionId, name: impl Into<String>, created_at: DateTime<Utc>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("institution name cannot be empty"));
        }
        Ok(Self {
            id,
            name: name.trim().to_string(),
            created_at,
        })
    }
}

impl Entity for Institution {
    type Id = InstitutionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

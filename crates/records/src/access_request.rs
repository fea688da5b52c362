//! Access requests: a member asking for a (different) role in an institution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use registrar_auth::LocalRole;
use registrar_core::{AccessRequestId, AccountId, Entity, InstitutionId, InstitutionScoped};

/// Triage state of an access request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccessRequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// A request by `account_id` for `requested_role` in `institution_id`.
///
/// Filed by the requesting account themselves; triaged by tenant admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequest {
    pub id: AccessRequestId,
    pub institution_id: InstitutionId,
    pub account_id: AccountId,
    pub requested_role: LocalRole,
    pub status: AccessRequestStatus,
    pub created_at: DateTime<Utc>,
}

impl AccessRequest {
    pub fn new(
        id: AccessRequestId,
        institution_id: InstitutionId,
        account_id: AccountId,
        requested_role: LocalRole,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            institution_id,
            account_id,
            requested_role,
            status: AccessRequestStatus::Pending,
            created_at,
        }
    }
}

impl Entity for AccessRequest {
    type Id = AccessRequestId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl InstitutionScoped for AccessRequest {
    fn institution_id(&self) -> InstitutionId {
        self.institution_id
    }
}

//! Actions and resource references fed into the authorization engine.

use serde::{Deserialize, Serialize};

use registrar_core::{AccountId, InstitutionId};

/// Action an actor wants to perform on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Select,
    Insert,
    Update,
    Delete,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Select, Action::Insert, Action::Update, Action::Delete];
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Action::Select => write!(f, "select"),
            Action::Insert => write!(f, "insert"),
            Action::Update => write!(f, "update"),
            Action::Delete => write!(f, "delete"),
        }
    }
}

/// Kind of record being accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Account,
    Class,
    Student,
    OccurrenceType,
    Occurrence,
    Membership,
    AccessRequest,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::Account,
        ResourceKind::Class,
        ResourceKind::Student,
        ResourceKind::OccurrenceType,
        ResourceKind::Occurrence,
        ResourceKind::Membership,
        ResourceKind::AccessRequest,
    ];
}

impl core::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            ResourceKind::Account => "account",
            ResourceKind::Class => "class",
            ResourceKind::Student => "student",
            ResourceKind::OccurrenceType => "occurrence_type",
            ResourceKind::Occurrence => "occurrence",
            ResourceKind::Membership => "membership",
            ResourceKind::AccessRequest => "access_request",
        };
        f.write_str(name)
    }
}

/// Reference to the record an action targets.
///
/// Carries only what the policy needs: the resource kind, the owning
/// institution, and the actor-identifying fields used by self-attribution
/// rules. A reference without an institution id is malformed and rejected
/// with `InvalidResource` (masters excepted; they bypass tenant scoping).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub institution_id: Option<InstitutionId>,
    /// Teacher attribution on an occurrence (None for other kinds).
    pub teacher_id: Option<AccountId>,
    /// Requesting account on an access request (None for other kinds).
    pub account_id: Option<AccountId>,
}

impl ResourceRef {
    pub fn new(kind: ResourceKind, institution_id: InstitutionId) -> Self {
        Self {
            kind,
            institution_id: Some(institution_id),
            teacher_id: None,
            account_id: None,
        }
    }

    pub fn account(institution_id: InstitutionId) -> Self {
        Self::new(ResourceKind::Account, institution_id)
    }

    pub fn class(institution_id: InstitutionId) -> Self {
        Self::new(ResourceKind::Class, institution_id)
    }

    pub fn student(institution_id: InstitutionId) -> Self {
        Self::new(ResourceKind::Student, institution_id)
    }

    pub fn occurrence_type(institution_id: InstitutionId) -> Self {
        Self::new(ResourceKind::OccurrenceType, institution_id)
    }

    pub fn occurrence(institution_id: InstitutionId, teacher_id: Option<AccountId>) -> Self {
        Self {
            teacher_id,
            ..Self::new(ResourceKind::Occurrence, institution_id)
        }
    }

    pub fn membership(institution_id: InstitutionId) -> Self {
        Self::new(ResourceKind::Membership, institution_id)
    }

    pub fn access_request(institution_id: InstitutionId, account_id: AccountId) -> Self {
        Self {
            account_id: Some(account_id),
            ..Self::new(ResourceKind::AccessRequest, institution_id)
        }
    }
}

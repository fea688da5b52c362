//! Tenant membership: an account's role within one institution.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use registrar_core::{AccountId, DomainError, DomainResult, InstitutionId};

use crate::LocalRole;

/// An account's membership in an institution.
///
/// The pair `(account_id, institution_id)` is unique: an account holds exactly
/// one local role per institution (possibly different roles in different
/// institutions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub account_id: AccountId,
    pub institution_id: InstitutionId,
    pub local_role: LocalRole,
}

/// Source of membership facts for authorization decisions.
///
/// Implementations must answer by index equality lookup, not a scan; this is
/// queried on every access.
pub trait MembershipLookup {
    /// The local role `account_id` holds in `institution_id`, if any.
    fn local_role(&self, account_id: AccountId, institution_id: InstitutionId)
    -> Option<LocalRole>;
}

/// In-memory membership table.
///
/// Used directly in tests and embedded by the record store; keyed by the
/// unique `(account, institution)` pair.
#[derive(Debug, Clone, Default)]
pub struct MembershipSet {
    inner: HashMap<(AccountId, InstitutionId), LocalRole>,
}

impl MembershipSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a membership. Rejects a duplicate `(account, institution)` pair.
    pub fn grant(&mut self, membership: Membership) -> DomainResult<()> {
        let key = (membership.account_id, membership.institution_id);
        if self.inner.contains_key(&key) {
            return Err(DomainError::conflict(format!(
                "membership already exists for account {} in institution {}",
                membership.account_id, membership.institution_id
            )));
        }
        self.inner.insert(key, membership.local_role);
        Ok(())
    }

    /// Remove a membership; returns whether one existed.
    pub fn revoke(&mut self, account_id: AccountId, institution_id: InstitutionId) -> bool {
        self.inner.remove(&(account_id, institution_id)).is_some()
    }

    /// All memberships held by `account_id`.
    pub fn for_account(&self, account_id: AccountId) -> Vec<Membership> {
        self.inner
            .iter()
            .filter(|((a, _), _)| *a == account_id)
            .map(|((account_id, institution_id), local_role)| Membership {
                account_id: *account_id,
                institution_id: *institution_id,
                local_role: *local_role,
            })
            .collect()
    }

    /// All member account ids of `institution_id`.
    pub fn members_of(&self, institution_id: InstitutionId) -> Vec<AccountId> {
        self.inner
            .keys()
            .filter(|(_, i)| *i == institution_id)
            .map(|(a, _)| *a)
            .collect()
    }

    /// Drop every membership held by `account_id` (used on account purge).
    pub fn revoke_all(&mut self, account_id: AccountId) {
        self.inner.retain(|(a, _), _| *a != account_id);
    }
}

impl MembershipLookup for MembershipSet {
    fn local_role(
        &self,
        account_id: AccountId,
        institution_id: InstitutionId,
    ) -> Option<LocalRole> {
        self.inner.get(&(account_id, institution_id)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_and_lookup() {
        let mut set = MembershipSet::new();
        let account = AccountId::new();
        let institution = InstitutionId::new();

        set.grant(Membership {
            account_id: account,
            institution_id: institution,
            local_role: LocalRole::Professor,
        })
        .unwrap();

        assert_eq!(
            set.local_role(account, institution),
            Some(LocalRole::Professor)
        );
        assert_eq!(set.local_role(account, InstitutionId::new()), None);
    }

    #[test]
    fn duplicate_pair_is_a_conflict() {
        let mut set = MembershipSet::new();
        let membership = Membership {
            account_id: AccountId::new(),
            institution_id: InstitutionId::new(),
            local_role: LocalRole::Admin,
        };

        set.grant(membership).unwrap();
        let err = set.grant(membership).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn account_may_hold_different_roles_in_different_institutions() {
        let mut set = MembershipSet::new();
        let account = AccountId::new();
        let inst_a = InstitutionId::new();
        let inst_b = InstitutionId::new();

        set.grant(Membership {
            account_id: account,
            institution_id: inst_a,
            local_role: LocalRole::Admin,
        })
        .unwrap();
        set.grant(Membership {
            account_id: account,
            institution_id: inst_b,
            local_role: LocalRole::Professor,
        })
        .unwrap();

        assert_eq!(set.local_role(account, inst_a), Some(LocalRole::Admin));
        assert_eq!(set.local_role(account, inst_b), Some(LocalRole::Professor));
    }
}

//! The authorization decision engine.
//!
//! A deterministic, side-effect-free predicate over
//! `(actor, action, resource)` plus membership facts. Evaluation order:
//!
//! 1. Master global role ⇒ allow, unconditionally.
//! 2. No membership in the resource's institution ⇒ deny.
//! 3. One rule per `(action, resource kind)` pair — first match wins.
//! 4. No matching rule ⇒ deny.
//!
//! A single rule per pair keeps the policy from silently widening the way
//! overlapping permissive row predicates do.

use serde::Serialize;

use registrar_core::{AccountId, DomainError, DomainResult};

use crate::{Action, GlobalRole, LocalRole, MembershipLookup, ResourceKind, ResourceRef};

/// A resolved actor for authorization decisions.
///
/// Construction is decoupled from storage: the service layer resolves the
/// acting account id to `(id, global_role)` and threads this value through
/// every call — there is no ambient "current actor" state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: AccountId,
    pub global_role: GlobalRole,
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "decision", content = "reason")]
pub enum Decision {
    Allow,
    Deny(DenialReason),
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Why a request was denied (for logs and error messages).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// The actor holds no membership in the resource's institution.
    NotAMember,
    /// The action requires the local admin role in that institution.
    RequiresAdmin,
    /// The actor-identifying field on the resource must equal the actor
    /// (occurrence inserts and access-request filings).
    SelfAttributionRequired,
    /// Only a master account may perform this action.
    MasterOnly,
    /// No rule grants this action on this resource kind.
    NoRule,
}

impl core::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            DenialReason::NotAMember => "no membership in the resource's institution",
            DenialReason::RequiresAdmin => "requires the admin role in this institution",
            DenialReason::SelfAttributionRequired => {
                "record must be attributed to the acting account"
            }
            DenialReason::MasterOnly => "only a master account may do this",
            DenialReason::NoRule => "no rule permits this action",
        };
        f.write_str(msg)
    }
}

/// Evaluate the policy for `(actor, action, resource)`.
///
/// Pure: no IO, no side effects; cheap to re-evaluate on every access. The
/// membership lookup must be an index equality lookup.
///
/// # Errors
///
/// `InvalidResource` if a non-master actor presents a resource reference
/// without an institution id. That is a programmer error at the call site,
/// not a policy denial.
pub fn evaluate(
    actor: &Actor,
    action: Action,
    resource: &ResourceRef,
    memberships: &dyn MembershipLookup,
) -> DomainResult<Decision> {
    // Rule 1: masters bypass tenant scoping for every action.
    if actor.global_role.is_master() {
        return Ok(Decision::Allow);
    }

    let institution_id = resource.institution_id.ok_or_else(|| {
        DomainError::invalid_resource(format!(
            "{} reference is missing an institution id",
            resource.kind
        ))
    })?;

    // Rule 2: membership is the operative permission inside an institution.
    let Some(local_role) = memberships.local_role(actor.id, institution_id) else {
        return Ok(Decision::Deny(DenialReason::NotAMember));
    };

    // Rule 3: one deterministic rule per (action, kind); rule 4: default deny.
    let decision = match (action, resource.kind) {
        // Any member of the tenant may read.
        (Action::Select, _) => Decision::Allow,

        // Occurrence filing is self-attributed, admins included.
        (Action::Insert, ResourceKind::Occurrence) => {
            if resource.teacher_id == Some(actor.id) {
                Decision::Allow
            } else {
                Decision::Deny(DenialReason::SelfAttributionRequired)
            }
        }

        // The filing teacher or a tenant admin may amend an occurrence.
        (Action::Update, ResourceKind::Occurrence) => {
            if local_role.is_admin() || resource.teacher_id == Some(actor.id) {
                Decision::Allow
            } else {
                Decision::Deny(DenialReason::RequiresAdmin)
            }
        }

        (Action::Delete, ResourceKind::Occurrence) => admin_only(local_role),

        // Administrative resources: admin for any mutation.
        (
            Action::Insert | Action::Update | Action::Delete,
            ResourceKind::Class | ResourceKind::OccurrenceType | ResourceKind::Membership,
        ) => admin_only(local_role),

        // Student records are managed by tenant admins; permanent delete is
        // admin-or-master (master handled by rule 1).
        (Action::Insert | Action::Update | Action::Delete, ResourceKind::Student) => {
            admin_only(local_role)
        }

        // Access requests are filed by the requester themselves; triage is
        // an admin concern.
        (Action::Insert, ResourceKind::AccessRequest) => {
            if resource.account_id == Some(actor.id) {
                Decision::Allow
            } else {
                Decision::Deny(DenialReason::SelfAttributionRequired)
            }
        }
        (Action::Update | Action::Delete, ResourceKind::AccessRequest) => admin_only(local_role),

        // Accounts: provisioning is external (no insert rule); activation
        // and profile edits are admin actions; permanent delete is reserved
        // to masters.
        (Action::Update, ResourceKind::Account) => admin_only(local_role),
        (Action::Delete, ResourceKind::Account) => Decision::Deny(DenialReason::MasterOnly),
        (Action::Insert, ResourceKind::Account) => Decision::Deny(DenialReason::NoRule),
    };

    Ok(decision)
}

/// Evaluate and convert a denial into `DomainError::Unauthorized`.
///
/// Mutating operations call this before touching the store (fail fast, no
/// partial side effects).
pub fn require(
    actor: &Actor,
    action: Action,
    resource: &ResourceRef,
    memberships: &dyn MembershipLookup,
) -> DomainResult<()> {
    match evaluate(actor, action, resource, memberships)? {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => Err(DomainError::unauthorized(format!(
            "{} {} denied: {}",
            action, resource.kind, reason
        ))),
    }
}

fn admin_only(local_role: LocalRole) -> Decision {
    if local_role.is_admin() {
        Decision::Allow
    } else {
        Decision::Deny(DenialReason::RequiresAdmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Membership;
    use crate::MembershipSet;
    use proptest::prelude::*;
    use registrar_core::InstitutionId;

    fn professor(id: AccountId) -> Actor {
        Actor {
            id,
            global_role: GlobalRole::Professor,
        }
    }

    fn member(
        set: &mut MembershipSet,
        account_id: AccountId,
        institution_id: InstitutionId,
        local_role: LocalRole,
    ) {
        set.grant(Membership {
            account_id,
            institution_id,
            local_role,
        })
        .unwrap();
    }

    #[test]
    fn member_may_select_anything_in_their_institution() {
        let mut set = MembershipSet::new();
        let actor_id = AccountId::new();
        let inst = InstitutionId::new();
        member(&mut set, actor_id, inst, LocalRole::Professor);

        for kind in ResourceKind::ALL {
            let resource = ResourceRef::new(kind, inst);
            let decision = evaluate(&professor(actor_id), Action::Select, &resource, &set).unwrap();
            assert!(decision.is_allow(), "select on {kind} should be allowed");
        }
    }

    #[test]
    fn professor_cannot_mutate_administrative_resources() {
        let mut set = MembershipSet::new();
        let actor_id = AccountId::new();
        let inst = InstitutionId::new();
        member(&mut set, actor_id, inst, LocalRole::Professor);

        for kind in [
            ResourceKind::Class,
            ResourceKind::OccurrenceType,
            ResourceKind::Membership,
            ResourceKind::Student,
        ] {
            let resource = ResourceRef::new(kind, inst);
            let decision = evaluate(&professor(actor_id), Action::Insert, &resource, &set).unwrap();
            assert_eq!(decision, Decision::Deny(DenialReason::RequiresAdmin));
        }
    }

    #[test]
    fn occurrence_insert_requires_self_attribution() {
        let mut set = MembershipSet::new();
        let actor_id = AccountId::new();
        let other_teacher = AccountId::new();
        let inst = InstitutionId::new();
        member(&mut set, actor_id, inst, LocalRole::Professor);

        let own = ResourceRef::occurrence(inst, Some(actor_id));
        let decision = evaluate(&professor(actor_id), Action::Insert, &own, &set).unwrap();
        assert!(decision.is_allow());

        let someone_elses = ResourceRef::occurrence(inst, Some(other_teacher));
        let decision = evaluate(&professor(actor_id), Action::Insert, &someone_elses, &set).unwrap();
        assert_eq!(decision, Decision::Deny(DenialReason::SelfAttributionRequired));
    }

    #[test]
    fn admins_are_not_exempt_from_occurrence_self_attribution() {
        let mut set = MembershipSet::new();
        let admin_id = AccountId::new();
        let inst = InstitutionId::new();
        member(&mut set, admin_id, inst, LocalRole::Admin);

        let actor = Actor {
            id: admin_id,
            global_role: GlobalRole::Admin,
        };
        let on_behalf = ResourceRef::occurrence(inst, Some(AccountId::new()));
        let decision = evaluate(&actor, Action::Insert, &on_behalf, &set).unwrap();
        assert_eq!(decision, Decision::Deny(DenialReason::SelfAttributionRequired));
    }

    #[test]
    fn occurrence_update_allowed_for_filing_teacher_or_admin() {
        let mut set = MembershipSet::new();
        let teacher = AccountId::new();
        let admin = AccountId::new();
        let bystander = AccountId::new();
        let inst = InstitutionId::new();
        member(&mut set, teacher, inst, LocalRole::Professor);
        member(&mut set, admin, inst, LocalRole::Admin);
        member(&mut set, bystander, inst, LocalRole::Professor);

        let resource = ResourceRef::occurrence(inst, Some(teacher));

        let decision = evaluate(&professor(teacher), Action::Update, &resource, &set).unwrap();
        assert!(decision.is_allow());

        let decision = evaluate(&professor(admin), Action::Update, &resource, &set).unwrap();
        assert!(decision.is_allow());

        let decision = evaluate(&professor(bystander), Action::Update, &resource, &set).unwrap();
        assert_eq!(decision, Decision::Deny(DenialReason::RequiresAdmin));
    }

    #[test]
    fn account_delete_is_master_only_even_for_tenant_admins() {
        let mut set = MembershipSet::new();
        let admin = AccountId::new();
        let inst = InstitutionId::new();
        member(&mut set, admin, inst, LocalRole::Admin);

        let resource = ResourceRef::account(inst);
        let decision = evaluate(&professor(admin), Action::Delete, &resource, &set).unwrap();
        assert_eq!(decision, Decision::Deny(DenialReason::MasterOnly));

        let master = Actor {
            id: AccountId::new(),
            global_role: GlobalRole::Master,
        };
        let decision = evaluate(&master, Action::Delete, &resource, &set).unwrap();
        assert!(decision.is_allow());
    }

    #[test]
    fn access_request_must_be_filed_by_the_requester() {
        let mut set = MembershipSet::new();
        let actor_id = AccountId::new();
        let inst = InstitutionId::new();
        member(&mut set, actor_id, inst, LocalRole::Professor);

        let own = ResourceRef::access_request(inst, actor_id);
        assert!(
            evaluate(&professor(actor_id), Action::Insert, &own, &set)
                .unwrap()
                .is_allow()
        );

        let for_other = ResourceRef::access_request(inst, AccountId::new());
        assert_eq!(
            evaluate(&professor(actor_id), Action::Insert, &for_other, &set).unwrap(),
            Decision::Deny(DenialReason::SelfAttributionRequired)
        );
    }

    #[test]
    fn missing_institution_is_invalid_resource_for_non_masters() {
        let set = MembershipSet::new();
        let resource = ResourceRef {
            kind: ResourceKind::Student,
            institution_id: None,
            teacher_id: None,
            account_id: None,
        };

        let err =
            evaluate(&professor(AccountId::new()), Action::Select, &resource, &set).unwrap_err();
        assert!(matches!(err, DomainError::InvalidResource(_)));
    }

    #[test]
    fn require_maps_denial_to_unauthorized() {
        let set = MembershipSet::new();
        let resource = ResourceRef::student(InstitutionId::new());

        let err = require(&professor(AccountId::new()), Action::Delete, &resource, &set)
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: a non-master actor with no membership in the resource's
        /// institution is denied every action on every resource kind.
        #[test]
        fn no_membership_means_deny_everything(
            action_idx in 0usize..Action::ALL.len(),
            kind_idx in 0usize..ResourceKind::ALL.len(),
            is_global_admin in proptest::bool::ANY,
        ) {
            let set = MembershipSet::new();
            let actor = Actor {
                id: AccountId::new(),
                global_role: if is_global_admin {
                    GlobalRole::Admin
                } else {
                    GlobalRole::Professor
                },
            };
            let resource = ResourceRef::new(ResourceKind::ALL[kind_idx], InstitutionId::new());

            let decision =
                evaluate(&actor, Action::ALL[action_idx], &resource, &set).unwrap();
            prop_assert_eq!(decision, Decision::Deny(DenialReason::NotAMember));
        }

        /// Property: a master is allowed every action on every resource kind,
        /// in any institution, with or without membership.
        #[test]
        fn master_is_allowed_everything(
            action_idx in 0usize..Action::ALL.len(),
            kind_idx in 0usize..ResourceKind::ALL.len(),
        ) {
            let set = MembershipSet::new();
            let master = Actor {
                id: AccountId::new(),
                global_role: GlobalRole::Master,
            };
            let resource = ResourceRef::new(ResourceKind::ALL[kind_idx], InstitutionId::new());

            let decision =
                evaluate(&master, Action::ALL[action_idx], &resource, &set).unwrap();
            prop_assert!(decision.is_allow());
        }
    }
}

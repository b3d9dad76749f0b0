//! Authorization guard: a single declarative table of who may do what.
//!
//! - No IO
//! - No panics
//! - Deny by default: an operation is allowed only when one of its grants matches

use serde::Serialize;
use thiserror::Error;

use placement_core::UserId;

use crate::{Principal, Role};

/// Every operation the guard knows how to decide.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    CreateApplication,
    ReadApplicationOwn,
    ReadApplicationAsOwnerEmployer,
    ReadApplicationAny,
    TransitionApplicationStatus,
    DeleteApplication,
    CreatePosting,
    UpdatePosting,
    DeletePosting,
    UpdatePostingAdminOverride,
    ReconcileCounters,
}

impl Operation {
    pub const ALL: [Operation; 11] = [
        Operation::CreateApplication,
        Operation::ReadApplicationOwn,
        Operation::ReadApplicationAsOwnerEmployer,
        Operation::ReadApplicationAny,
        Operation::TransitionApplicationStatus,
        Operation::DeleteApplication,
        Operation::CreatePosting,
        Operation::UpdatePosting,
        Operation::DeletePosting,
        Operation::UpdatePostingAdminOverride,
        Operation::ReconcileCounters,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateApplication => "create-application",
            Operation::ReadApplicationOwn => "read-application-own",
            Operation::ReadApplicationAsOwnerEmployer => "read-application-as-owner-employer",
            Operation::ReadApplicationAny => "read-application-any",
            Operation::TransitionApplicationStatus => "transition-application-status",
            Operation::DeleteApplication => "delete-application",
            Operation::CreatePosting => "create-posting",
            Operation::UpdatePosting => "update-posting",
            Operation::DeletePosting => "delete-posting",
            Operation::UpdatePostingAdminOverride => "update-posting-admin-override",
            Operation::ReconcileCounters => "reconcile-counters",
        }
    }

    /// The single-application read variant that applies to `role`.
    pub fn read_application_for(role: Role) -> Operation {
        match role {
            Role::Applicant => Operation::ReadApplicationOwn,
            Role::Employer => Operation::ReadApplicationAsOwnerEmployer,
            Role::Administrator => Operation::ReadApplicationAny,
        }
    }

    /// Grants attached to this operation. Any one matching grant allows it.
    pub fn grants(&self) -> &'static [Grant] {
        match self {
            Operation::CreateApplication => &[Grant::HasRole(Role::Applicant)],
            Operation::ReadApplicationOwn => &[Grant::OwningApplicant],
            Operation::ReadApplicationAsOwnerEmployer => &[Grant::OwningEmployer],
            Operation::ReadApplicationAny => &[Grant::HasRole(Role::Administrator)],
            Operation::TransitionApplicationStatus => &[Grant::OwningEmployer],
            Operation::DeleteApplication => &[Grant::OwningApplicant, Grant::OwningEmployer],
            Operation::CreatePosting => &[Grant::HasRole(Role::Employer)],
            Operation::UpdatePosting | Operation::DeletePosting => {
                &[Grant::OwningEmployer, Grant::HasRole(Role::Administrator)]
            }
            Operation::UpdatePostingAdminOverride => &[Grant::HasRole(Role::Administrator)],
            Operation::ReconcileCounters => &[Grant::HasRole(Role::Administrator)],
        }
    }
}

impl core::fmt::Display for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One way of being allowed to perform an operation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Grant {
    /// Any principal with this role.
    HasRole(Role),
    /// An applicant who created the application.
    OwningApplicant,
    /// An employer who owns the posting the resource belongs to.
    OwningEmployer,
}

impl Grant {
    fn role(&self) -> Role {
        match self {
            Grant::HasRole(role) => *role,
            Grant::OwningApplicant => Role::Applicant,
            Grant::OwningEmployer => Role::Employer,
        }
    }

    fn matches(&self, principal: &Principal, facts: &OwnershipFacts) -> bool {
        if principal.role != self.role() {
            return false;
        }
        match self {
            Grant::HasRole(_) => true,
            Grant::OwningApplicant => facts.applicant_id == Some(principal.id),
            Grant::OwningEmployer => facts.posting_owner_id == Some(principal.id),
        }
    }
}

/// Ownership facts about the resource an operation targets.
///
/// Produced by the ownership resolver; absent facts never match a grant.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct OwnershipFacts {
    /// Applicant who created the targeted application.
    pub applicant_id: Option<UserId>,
    /// Employer who owns the targeted posting (or the posting an application targets).
    pub posting_owner_id: Option<UserId>,
}

impl OwnershipFacts {
    /// No resource-level facts (role-only operations such as creation).
    pub fn none() -> Self {
        Self::default()
    }

    pub fn posting(owner: UserId) -> Self {
        Self {
            applicant_id: None,
            posting_owner_id: Some(owner),
        }
    }

    pub fn application(applicant: UserId, posting_owner: Option<UserId>) -> Self {
        Self {
            applicant_id: Some(applicant),
            posting_owner_id: posting_owner,
        }
    }
}

/// Categorical reason for a denial. Never carries identifiers.
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    #[error("role not permitted for this operation")]
    RoleNotPermitted,

    #[error("principal does not own this resource")]
    NotOwner,
}

impl DenyReason {
    pub fn code(&self) -> &'static str {
        match self {
            DenyReason::RoleNotPermitted => "role_not_permitted",
            DenyReason::NotOwner => "not_owner",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self) -> Result<(), DenyReason> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(reason),
        }
    }
}

/// Decide whether `principal` may perform `operation` given `facts`.
pub fn decide(principal: &Principal, operation: Operation, facts: &OwnershipFacts) -> Decision {
    let grants = operation.grants();

    if grants.iter().any(|g| g.matches(principal, facts)) {
        return Decision::Allow;
    }

    // The role is right but ownership did not line up.
    if grants.iter().any(|g| g.role() == principal.role) {
        Decision::Deny(DenyReason::NotOwner)
    } else {
        Decision::Deny(DenyReason::RoleNotPermitted)
    }
}

/// [`decide`] as a `Result`, for use with `?`.
pub fn authorize(principal: &Principal, operation: Operation, facts: &OwnershipFacts) -> Result<(), DenyReason> {
    decide(principal, operation, facts).into_result()
}

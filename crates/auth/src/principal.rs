use serde::Serialize;

use placement_core::UserId;

use crate::Role;

/// The resolved identity and role of the caller.
///
/// Derived per request from verified session claims and dropped when the
/// request ends. Never persisted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: UserId,
    pub role: Role,
}

impl Principal {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    pub fn applicant(id: UserId) -> Self {
        Self::new(id, Role::Applicant)
    }

    pub fn employer(id: UserId) -> Self {
        Self::new(id, Role::Employer)
    }

    pub fn administrator(id: UserId) -> Self {
        Self::new(id, Role::Administrator)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }
}

//! Application status state machine.
//!
//! ```text
//! pending ──► accepted
//!    │
//!    └──────► rejected
//! ```
//!
//! `accepted` and `rejected` are terminal.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use placement_core::DomainError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 3] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ApplicationStatus::Pending)
    }

    /// Whether a transition request from `self` to `next` may be applied.
    ///
    /// Only a pending application moves; re-requesting `pending` while pending
    /// is accepted as a no-op.
    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        match (self, next) {
            (ApplicationStatus::Pending, _) => true,
            (ApplicationStatus::Accepted | ApplicationStatus::Rejected, _) => false,
        }
    }
}

impl core::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "accepted" => Ok(ApplicationStatus::Accepted),
            "rejected" => Ok(ApplicationStatus::Rejected),
            _ => Err(DomainError::invalid(
                "status",
                "must be one of: pending, accepted, rejected",
            )),
        }
    }
}

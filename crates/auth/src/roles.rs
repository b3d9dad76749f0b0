use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role carried by a principal.
///
/// The set is closed: every authorization rule is written against these three
/// variants. Older session tokens used `student` / `company` / `admin`; those
/// names are still accepted when decoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "student")]
    Applicant,
    #[serde(alias = "company")]
    Employer,
    #[serde(alias = "admin")]
    Administrator,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Applicant, Role::Employer, Role::Administrator];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Applicant => "applicant",
            Role::Employer => "employer",
            Role::Administrator => "administrator",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "applicant" | "student" => Ok(Role::Applicant),
            "employer" | "company" => Ok(Role::Employer),
            "administrator" | "admin" => Ok(Role::Administrator),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

use serde::{Deserialize, Serialize};

use placement_core::{DomainError, DomainResult};

/// Unvalidated submission content, as received from an applicant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionDraft {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub location: Option<String>,
    pub university: Option<String>,
    pub degree_program: Option<String>,
    pub year_of_study: Option<String>,
    pub availability: Option<String>,
    pub gpa: Option<String>,
    pub other: Option<String>,
    pub document_ref: Option<String>,
}

/// Validated submission content. Text is trimmed and the email lowercased;
/// optional fields default to empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionFields {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub location: String,
    pub university: String,
    pub degree_program: String,
    pub year_of_study: String,
    pub availability: String,
    pub gpa: String,
    pub other: String,
    pub document_ref: String,
}

fn required(field: &'static str, value: Option<String>) -> DomainResult<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DomainError::missing(field)),
    }
}

fn optional(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Loose shape check: something, `@`, something, `.`, something.
fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() {
        return false;
    }
    match domain.rfind('.') {
        Some(dot) => dot > 0 && dot + 1 < domain.len(),
        None => false,
    }
}

impl SubmissionDraft {
    /// Validate every required field, reporting the first one missing.
    pub fn validate(self) -> DomainResult<SubmissionFields> {
        let full_name = required("fullName", self.full_name)?;
        let email = required("email", self.email)?.to_lowercase();
        let phone_number = required("phoneNumber", self.phone_number)?;
        let location = required("location", self.location)?;
        let university = required("university", self.university)?;
        let degree_program = required("degreeProgram", self.degree_program)?;
        let year_of_study = required("yearOfStudy", self.year_of_study)?;
        let availability = required("availability", self.availability)?;

        if !looks_like_email(&email) {
            return Err(DomainError::invalid("email", "not a valid email address"));
        }

        Ok(SubmissionFields {
            full_name,
            email,
            phone_number,
            location,
            university,
            degree_program,
            year_of_study,
            availability,
            gpa: optional(self.gpa),
            other: optional(self.other),
            document_ref: optional(self.document_ref),
        })
    }
}

use chrono::{DateTime, Utc};
use serde::Serialize;

use placement_core::{ApplicationId, DomainError, DomainResult, Entity, PostingId, UserId};

use crate::{ApplicationStatus, SubmissionFields};

/// Aggregate root: Application.
///
/// `posting_id` and `applicant_id` are fixed at submission. Only `status`
/// changes afterwards, and only through [`Application::transition_to`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    id: ApplicationId,
    posting_id: PostingId,
    applicant_id: UserId,
    status: ApplicationStatus,
    #[serde(flatten)]
    submission: SubmissionFields,
    submitted_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Application {
    /// A freshly submitted application: always `pending`, stamped `now`.
    pub fn submit(
        id: ApplicationId,
        posting_id: PostingId,
        applicant_id: UserId,
        submission: SubmissionFields,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            posting_id,
            applicant_id,
            status: ApplicationStatus::Pending,
            submission,
            submitted_at: now,
            updated_at: now,
        }
    }

    /// Rebuild an application from persisted state.
    pub fn rehydrate(
        id: ApplicationId,
        posting_id: PostingId,
        applicant_id: UserId,
        status: ApplicationStatus,
        submission: SubmissionFields,
        submitted_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            posting_id,
            applicant_id,
            status,
            submission,
            submitted_at,
            updated_at,
        }
    }

    pub fn posting_id(&self) -> PostingId {
        self.posting_id
    }

    pub fn applicant_id(&self) -> UserId {
        self.applicant_id
    }

    pub fn status(&self) -> ApplicationStatus {
        self.status
    }

    pub fn submission(&self) -> &SubmissionFields {
        &self.submission
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Move to `next` if the state machine allows it. `submitted_at` is
    /// never touched.
    pub fn transition_to(&mut self, next: ApplicationStatus, now: DateTime<Utc>) -> DomainResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::invariant(format!(
                "application is {} and can no longer change status",
                self.status
            )));
        }
        if self.status != next {
            self.status = next;
            self.updated_at = now;
        }
        Ok(())
    }

    pub fn summary(&self) -> ApplicationSummary {
        ApplicationSummary {
            id: self.id,
            posting_id: self.posting_id,
            status: self.status,
            submitted_at: self.submitted_at,
        }
    }

    pub fn applicant_summary(&self) -> ApplicantSummary {
        ApplicantSummary {
            id: self.applicant_id,
            full_name: self.submission.full_name.clone(),
            email: self.submission.email.clone(),
            phone_number: self.submission.phone_number.clone(),
            university: self.submission.university.clone(),
            degree_program: self.submission.degree_program.clone(),
        }
    }
}

impl Entity for Application {
    type Id = ApplicationId;

    fn id(&self) -> ApplicationId {
        self.id
    }
}

/// What a client gets back right after submitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSummary {
    pub id: ApplicationId,
    pub posting_id: PostingId,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
}

/// Applicant details shown to the employer, taken from the submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantSummary {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub university: String,
    pub degree_program: String,
}

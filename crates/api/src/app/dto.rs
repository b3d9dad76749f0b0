//! Request DTOs and their mapping onto domain inputs.

use serde::Deserialize;

use placement_applications::SubmissionDraft;
use placement_core::{DomainError, DomainResult, PostingId};
use placement_infra::PostingFilter;
use placement_postings::{PostingDraft, PostingPatch, WorkMode};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    #[serde(alias = "internshipId")]
    pub posting_id: Option<String>,
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
    #[serde(alias = "cv")]
    pub document_ref: Option<String>,
}

impl CreateApplicationRequest {
    /// Split into the target posting and the unvalidated submission.
    pub fn into_parts(self) -> DomainResult<(PostingId, SubmissionDraft)> {
        let posting_id = self
            .posting_id
            .filter(|s| !s.trim().is_empty())
            .ok_or(DomainError::missing("postingId"))?
            .parse::<PostingId>()?;

        let draft = SubmissionDraft {
            full_name: self.full_name,
            email: self.email,
            phone_number: self.phone_number,
            location: self.location,
            university: self.university,
            degree_program: self.degree_program,
            year_of_study: self.year_of_study,
            availability: self.availability,
            gpa: self.gpa,
            other: self.other,
            document_ref: self.document_ref,
        };
        Ok((posting_id, draft))
    }
}

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub status: String,
}

/// Posting body shared by create and update. On update, absent fields are
/// left untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostingBody {
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub description: Option<String>,
    pub skills: Option<Vec<String>>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub work_mode: Option<String>,
    pub duration: Option<String>,
    pub salary: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<String>,
    pub application_deadline: Option<String>,
    pub interview_details: Option<String>,
    pub other_details: Option<String>,
    pub featured: Option<bool>,
    pub status: Option<String>,
}

impl PostingBody {
    pub fn into_draft(self) -> PostingDraft {
        PostingDraft {
            title: self.title,
            company_name: self.company_name,
            description: self.description,
            skills: self.skills,
            location: self.location,
            work_mode: self.work_mode,
            duration: self.duration,
            salary: self.salary,
            category: self.category,
            start_date: self.start_date,
            application_deadline: self.application_deadline,
            interview_details: self.interview_details,
            other_details: self.other_details,
            featured: self.featured,
            status: self.status,
        }
    }

    pub fn into_patch(self) -> PostingPatch {
        PostingPatch {
            title: self.title,
            company_name: self.company_name,
            description: self.description,
            skills: self.skills,
            location: self.location,
            work_mode: self.work_mode,
            duration: self.duration,
            salary: self.salary,
            category: self.category,
            start_date: self.start_date,
            application_deadline: self.application_deadline,
            interview_details: self.interview_details,
            other_details: self.other_details,
            featured: self.featured,
            status: self.status,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListPostingsQuery {
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub work_mode: Option<String>,
}

impl ListPostingsQuery {
    pub fn into_filter(self) -> DomainResult<PostingFilter> {
        let work_mode = match self.work_mode.filter(|s| !s.trim().is_empty()) {
            Some(raw) => Some(raw.parse::<WorkMode>()?),
            None => None,
        };
        Ok(PostingFilter {
            category: self.category.filter(|s| !s.trim().is_empty()),
            work_mode,
            ..PostingFilter::default()
        })
    }
}

pub fn parse_id<T>(raw: &str) -> DomainResult<T>
where
    T: core::str::FromStr<Err = DomainError>,
{
    raw.parse()
}

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use placement_core::{DomainError, DomainResult, Entity, PostingId, UserId};

/// Whether a posting accepts new applications.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostingStatus {
    #[default]
    Active,
    Inactive,
}

impl PostingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostingStatus::Active => "active",
            PostingStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for PostingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(PostingStatus::Active),
            "inactive" => Ok(PostingStatus::Inactive),
            _ => Err(DomainError::invalid("status", "must be one of: active, inactive")),
        }
    }
}

/// Where the work happens.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkMode {
    Remote,
    Hybrid,
    #[serde(rename = "On-site")]
    OnSite,
}

impl WorkMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkMode::Remote => "Remote",
            WorkMode::Hybrid => "Hybrid",
            WorkMode::OnSite => "On-site",
        }
    }
}

impl FromStr for WorkMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(WorkMode::Remote),
            "hybrid" => Ok(WorkMode::Hybrid),
            "on-site" | "onsite" => Ok(WorkMode::OnSite),
            _ => Err(DomainError::invalid("type", "must be one of: Remote, Hybrid, On-site")),
        }
    }
}

/// Descriptive content of a posting: everything an employer edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostingDetails {
    pub title: String,
    pub company_name: String,
    pub description: String,
    pub skills: Vec<String>,
    pub location: String,
    #[serde(rename = "type")]
    pub work_mode: WorkMode,
    pub duration: String,
    pub salary: String,
    pub category: String,
    pub start_date: Option<String>,
    pub application_deadline: Option<String>,
    pub interview_details: Option<String>,
    pub other_details: Option<String>,
    pub featured: bool,
}

/// Unvalidated posting input, as received from a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingDraft {
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub description: Option<String>,
    pub skills: Option<Vec<String>>,
    pub location: Option<String>,
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

fn required(field: &'static str, value: Option<String>) -> DomainResult<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DomainError::missing(field)),
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn clean_skills(skills: Vec<String>) -> Vec<String> {
    skills
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl PostingDraft {
    /// Validate the draft into posting details plus the initial status.
    pub fn validate(self) -> DomainResult<(PostingDetails, PostingStatus)> {
        let details = PostingDetails {
            title: required("title", self.title)?,
            company_name: required("companyName", self.company_name)?,
            description: required("description", self.description)?,
            skills: clean_skills(self.skills.unwrap_or_default()),
            location: required("location", self.location)?,
            work_mode: required("type", self.work_mode)?.parse()?,
            duration: required("duration", self.duration)?,
            salary: required("salary", self.salary)?,
            category: required("category", self.category)?,
            start_date: optional(self.start_date),
            application_deadline: optional(self.application_deadline),
            interview_details: optional(self.interview_details),
            other_details: optional(self.other_details),
            featured: self.featured.unwrap_or(false),
        };
        let status = match self.status {
            Some(s) => s.parse()?,
            None => PostingStatus::default(),
        };
        Ok((details, status))
    }
}

/// Partial update of a posting. Absent fields are left untouched.
///
/// Ownership and the applicant counter are not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingPatch {
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub description: Option<String>,
    pub skills: Option<Vec<String>>,
    pub location: Option<String>,
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

fn patch_required(field: &'static str, target: &mut String, value: Option<String>) -> DomainResult<()> {
    if let Some(v) = value {
        *target = required(field, Some(v))?;
    }
    Ok(())
}

fn patch_optional(target: &mut Option<String>, value: Option<String>) {
    if let Some(v) = value {
        *target = optional(Some(v));
    }
}

/// Aggregate root: Posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Posting {
    id: PostingId,
    owner_id: UserId,
    #[serde(flatten)]
    details: PostingDetails,
    status: PostingStatus,
    applicant_count: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Posting {
    /// Publish a new posting. The owner is fixed here for the posting's lifetime.
    pub fn publish(
        id: PostingId,
        owner_id: UserId,
        details: PostingDetails,
        status: PostingStatus,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            details,
            status,
            applicant_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a posting from persisted state.
    pub fn rehydrate(
        id: PostingId,
        owner_id: UserId,
        details: PostingDetails,
        status: PostingStatus,
        applicant_count: u64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            details,
            status,
            applicant_count,
            created_at,
            updated_at,
        }
    }

    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    pub fn details(&self) -> &PostingDetails {
        &self.details
    }

    pub fn status(&self) -> PostingStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == PostingStatus::Active
    }

    pub fn applicant_count(&self) -> u64 {
        self.applicant_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Apply an employer/administrator edit. Validation happens before any
    /// field is touched, so a failed patch leaves the posting unchanged.
    pub fn apply_patch(&mut self, patch: PostingPatch, now: DateTime<Utc>) -> DomainResult<()> {
        let mut details = self.details.clone();
        patch_required("title", &mut details.title, patch.title)?;
        patch_required("companyName", &mut details.company_name, patch.company_name)?;
        patch_required("description", &mut details.description, patch.description)?;
        patch_required("location", &mut details.location, patch.location)?;
        patch_required("duration", &mut details.duration, patch.duration)?;
        patch_required("salary", &mut details.salary, patch.salary)?;
        patch_required("category", &mut details.category, patch.category)?;
        if let Some(mode) = patch.work_mode {
            details.work_mode = mode.parse()?;
        }
        if let Some(skills) = patch.skills {
            details.skills = clean_skills(skills);
        }
        patch_optional(&mut details.start_date, patch.start_date);
        patch_optional(&mut details.application_deadline, patch.application_deadline);
        patch_optional(&mut details.interview_details, patch.interview_details);
        patch_optional(&mut details.other_details, patch.other_details);
        if let Some(featured) = patch.featured {
            details.featured = featured;
        }
        let status = match patch.status {
            Some(s) => s.parse()?,
            None => self.status,
        };

        self.details = details;
        self.status = status;
        self.updated_at = now;
        Ok(())
    }

    /// Record one more application against this posting.
    pub fn record_application_added(&mut self) {
        self.applicant_count = self.applicant_count.saturating_add(1);
    }

    /// Record one application removed. Returns `false` when the counter was
    /// already zero (a prior inconsistency); it stays at zero.
    pub fn record_application_removed(&mut self) -> bool {
        match self.applicant_count.checked_sub(1) {
            Some(n) => {
                self.applicant_count = n;
                true
            }
            None => false,
        }
    }

    /// Overwrite the counter with a recomputed value (reconciliation only).
    pub fn reset_applicant_count(&mut self, count: u64) {
        self.applicant_count = count;
    }

    pub fn summary(&self) -> PostingSummary {
        PostingSummary {
            id: self.id,
            title: self.details.title.clone(),
            company_name: self.details.company_name.clone(),
            location: self.details.location.clone(),
            work_mode: self.details.work_mode,
            duration: self.details.duration.clone(),
            salary: self.details.salary.clone(),
            category: self.details.category.clone(),
            applicant_count: self.applicant_count,
        }
    }
}

impl Entity for Posting {
    type Id = PostingId;

    fn id(&self) -> PostingId {
        self.id
    }
}

/// Compact view of a posting, joined onto application listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostingSummary {
    pub id: PostingId,
    pub title: String,
    pub company_name: String,
    pub location: String,
    #[serde(rename = "type")]
    pub work_mode: WorkMode,
    pub duration: String,
    pub salary: String,
    pub category: String,
    pub applicant_count: u64,
}

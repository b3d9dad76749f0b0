//! Persistence boundary for postings and applications.
//!
//! The store owns the two multi-record invariants:
//! - at most one application per `(posting_id, applicant_id)`
//! - a posting's `applicant_count` moves in the same atomic unit as the
//!   application insert/delete that caused it

pub mod in_memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use placement_applications::{Application, ApplicationStatus};
use placement_core::{ApplicationId, PostingId, UserId};
use placement_postings::{Posting, PostingStatus, WorkMode};

pub use in_memory::InMemoryPlacementStore;
pub use postgres::PostgresPlacementStore;

/// Store operation error.
///
/// Infrastructure errors only. Authorization and validation happen above
/// the store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Compare-and-set lost: the application is no longer in the expected status.
    #[error("application status changed concurrently (now {current})")]
    StaleStatus { current: ApplicationStatus },

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Which postings to list. Empty filter lists everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingFilter {
    pub owner_id: Option<UserId>,
    pub status: Option<PostingStatus>,
    /// Case-insensitive exact match.
    pub category: Option<String>,
    pub work_mode: Option<WorkMode>,
}

impl PostingFilter {
    pub fn active() -> Self {
        Self {
            status: Some(PostingStatus::Active),
            ..Self::default()
        }
    }

    pub fn owned_by(owner_id: UserId) -> Self {
        Self {
            owner_id: Some(owner_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, posting: &Posting) -> bool {
        let details = posting.details();
        self.owner_id.is_none_or(|owner| posting.owner_id() == owner)
            && self.status.is_none_or(|status| posting.status() == status)
            && self
                .category
                .as_deref()
                .is_none_or(|c| details.category.eq_ignore_ascii_case(c))
            && self.work_mode.is_none_or(|mode| details.work_mode == mode)
    }
}

/// What happened to the posting counter when an application was removed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CounterUpdate {
    /// Decremented; carries the new value.
    Decremented(u64),
    /// Counter was already zero and stayed there.
    Floored,
    /// The referenced posting does not exist.
    PostingMissing,
}

/// An application removed from the store, plus the counter side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedApplication {
    pub application: Application,
    pub counter: CounterUpdate,
}

/// A posting whose recorded counter disagreed with the actual application count.
#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterDrift {
    pub posting_id: PostingId,
    pub recorded: u64,
    pub actual: u64,
}

/// Storage for postings and applications.
///
/// Implementations must make `insert_application`, `delete_application`,
/// `delete_posting` and `recount_applicants` atomic with respect to each
/// other.
#[async_trait]
pub trait PlacementStore: Send + Sync {
    async fn get_posting(&self, id: PostingId) -> Result<Option<Posting>, StoreError>;

    /// Postings matching `filter`, most recent first.
    async fn list_postings(&self, filter: &PostingFilter) -> Result<Vec<Posting>, StoreError>;

    async fn insert_posting(&self, posting: &Posting) -> Result<(), StoreError>;

    /// Persist edited details and status. Owner and counter are left as stored.
    async fn update_posting(&self, posting: &Posting) -> Result<(), StoreError>;

    /// Remove a posting together with its applications. Returns how many
    /// applications were removed.
    async fn delete_posting(&self, id: PostingId) -> Result<u64, StoreError>;

    async fn get_application(&self, id: ApplicationId) -> Result<Option<Application>, StoreError>;

    async fn find_application(
        &self,
        posting_id: PostingId,
        applicant_id: UserId,
    ) -> Result<Option<Application>, StoreError>;

    /// Applications created by `applicant_id`, most recent first.
    async fn list_applications_by_applicant(&self, applicant_id: UserId) -> Result<Vec<Application>, StoreError>;

    /// Applications targeting any of `posting_ids`, most recent first.
    async fn list_applications_for_postings(&self, posting_ids: &[PostingId]) -> Result<Vec<Application>, StoreError>;

    /// Insert and increment the posting counter in one unit. Returns the new
    /// counter value.
    ///
    /// `NotFound` when the posting is missing, `Conflict` when the pair
    /// already has an application.
    async fn insert_application(&self, application: &Application) -> Result<u64, StoreError>;

    /// Compare-and-set the status. `StaleStatus` when the stored status is
    /// not `expected`.
    async fn update_application_status(
        &self,
        id: ApplicationId,
        expected: ApplicationStatus,
        next: ApplicationStatus,
        now: DateTime<Utc>,
    ) -> Result<Application, StoreError>;

    /// Remove and decrement the posting counter (floored at zero) in one unit.
    async fn delete_application(&self, id: ApplicationId) -> Result<RemovedApplication, StoreError>;

    async fn count_applications(&self, posting_id: PostingId) -> Result<u64, StoreError>;

    /// Recompute a posting's counter from its applications, repairing it if
    /// needed. Returns the drift that was repaired, if any.
    async fn recount_applicants(&self, posting_id: PostingId) -> Result<Option<CounterDrift>, StoreError>;
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use placement_postings::PostingDraft;

    fn posting(owner: UserId, category: &str, mode: &str, status: &str) -> Posting {
        let (details, status) = PostingDraft {
            title: Some("Intern".to_string()),
            company_name: Some("Acme".to_string()),
            description: Some("Work".to_string()),
            location: Some("Remote".to_string()),
            work_mode: Some(mode.to_string()),
            duration: Some("3 months".to_string()),
            salary: Some("Paid".to_string()),
            category: Some(category.to_string()),
            status: Some(status.to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        Posting::publish(PostingId::new(), owner, details, status, Utc::now())
    }

    #[test]
    fn empty_filter_matches_everything() {
        let p = posting(UserId::new(), "Engineering", "Remote", "inactive");
        assert!(PostingFilter::default().matches(&p));
    }

    #[test]
    fn filter_fields_combine() {
        let owner = UserId::new();
        let p = posting(owner, "Engineering", "Hybrid", "active");

        let filter = PostingFilter {
            category: Some("engineering".to_string()),
            work_mode: Some(WorkMode::Hybrid),
            ..PostingFilter::active()
        };
        assert!(filter.matches(&p));
        assert!(PostingFilter::owned_by(owner).matches(&p));
        assert!(!PostingFilter::owned_by(UserId::new()).matches(&p));

        let remote_only = PostingFilter {
            work_mode: Some(WorkMode::Remote),
            ..PostingFilter::default()
        };
        assert!(!remote_only.matches(&p));
    }
}

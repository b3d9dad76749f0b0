//! Ownership resolution: turns resource ids into the facts the guard needs.

use std::sync::Arc;

use thiserror::Error;
use tracing::instrument;

use placement_applications::Application;
use placement_auth::OwnershipFacts;
use placement_core::{ApplicationId, PostingId};
use placement_postings::Posting;

use crate::store::{PlacementStore, StoreError};

#[derive(Debug, Error)]
pub enum OwnershipError {
    #[error("application not found")]
    ApplicationNotFound,

    #[error("posting not found")]
    PostingNotFound,

    /// The application exists but its posting does not. Carries the
    /// application so callers can fall back to applicant-only facts.
    #[error("application references missing posting {}", .application.posting_id())]
    DanglingPosting { application: Box<Application> },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// An application together with the posting it targets.
#[derive(Debug, Clone)]
pub struct OwnedApplication {
    pub application: Application,
    pub posting: Posting,
}

impl OwnedApplication {
    pub fn facts(&self) -> OwnershipFacts {
        OwnershipFacts::application(self.application.applicant_id(), Some(self.posting.owner_id()))
    }
}

#[derive(Clone)]
pub struct OwnershipResolver {
    store: Arc<dyn PlacementStore>,
}

impl OwnershipResolver {
    pub fn new(store: Arc<dyn PlacementStore>) -> Self {
        Self { store }
    }

    /// One application lookup plus one posting lookup.
    #[instrument(skip(self), fields(application_id = %id), err)]
    pub async fn application(&self, id: ApplicationId) -> Result<OwnedApplication, OwnershipError> {
        let application = self
            .store
            .get_application(id)
            .await?
            .ok_or(OwnershipError::ApplicationNotFound)?;

        match self.store.get_posting(application.posting_id()).await? {
            Some(posting) => Ok(OwnedApplication { application, posting }),
            None => Err(OwnershipError::DanglingPosting {
                application: Box::new(application),
            }),
        }
    }

    #[instrument(skip(self), fields(posting_id = %id), err)]
    pub async fn posting(&self, id: PostingId) -> Result<Posting, OwnershipError> {
        self.store
            .get_posting(id)
            .await?
            .ok_or(OwnershipError::PostingNotFound)
    }
}

impl std::fmt::Debug for OwnershipResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnershipResolver").finish_non_exhaustive()
    }
}

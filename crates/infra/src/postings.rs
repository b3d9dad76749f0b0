//! Posting management through the same guard as applications.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use placement_auth::{Operation, OwnershipFacts, Principal, Role};
use placement_core::{Entity, PostingId};
use placement_postings::{Posting, PostingDraft, PostingPatch};

use crate::lifecycle::{LifecycleError, guard};
use crate::ownership::OwnershipResolver;
use crate::store::{PlacementStore, PostingFilter, StoreError};

#[derive(Clone)]
pub struct PostingService {
    store: Arc<dyn PlacementStore>,
    ownership: OwnershipResolver,
}

impl std::fmt::Debug for PostingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostingService").finish_non_exhaustive()
    }
}

fn not_found(err: StoreError) -> LifecycleError {
    match err {
        StoreError::NotFound => LifecycleError::NotFound("posting"),
        other => other.into(),
    }
}

impl PostingService {
    pub fn new(store: Arc<dyn PlacementStore>) -> Self {
        let ownership = OwnershipResolver::new(store.clone());
        Self { store, ownership }
    }

    /// Publish a posting owned by `principal`.
    #[instrument(skip(self, principal, draft), fields(principal_id = %principal.id), err)]
    pub async fn create(&self, principal: &Principal, draft: PostingDraft) -> Result<Posting, LifecycleError> {
        guard(principal, Operation::CreatePosting, &OwnershipFacts::none())?;
        let (details, status) = draft.validate()?;

        let posting = Posting::publish(PostingId::new(), principal.id, details, status, Utc::now());
        self.store.insert_posting(&posting).await?;

        info!(posting_id = %posting.id(), "posting created");
        Ok(posting)
    }

    #[instrument(skip(self, principal, patch), fields(principal_id = %principal.id, posting_id = %id), err)]
    pub async fn update(
        &self,
        principal: &Principal,
        id: PostingId,
        patch: PostingPatch,
    ) -> Result<Posting, LifecycleError> {
        let mut posting = self.ownership.posting(id).await?;
        let facts = OwnershipFacts::posting(posting.owner_id());

        let operation = if principal.has_role(Role::Administrator) && posting.owner_id() != principal.id {
            Operation::UpdatePostingAdminOverride
        } else {
            Operation::UpdatePosting
        };
        guard(principal, operation, &facts)?;

        posting.apply_patch(patch, Utc::now())?;
        self.store.update_posting(&posting).await.map_err(not_found)?;

        // Re-read so the returned counter is the stored one.
        let stored = self.ownership.posting(id).await?;
        info!(operation = %operation, "posting updated");
        Ok(stored)
    }

    /// Delete a posting and, atomically, its applications.
    #[instrument(skip(self, principal), fields(principal_id = %principal.id, posting_id = %id), err)]
    pub async fn delete(&self, principal: &Principal, id: PostingId) -> Result<u64, LifecycleError> {
        let posting = self.ownership.posting(id).await?;
        guard(principal, Operation::DeletePosting, &OwnershipFacts::posting(posting.owner_id()))?;

        let removed = self.store.delete_posting(id).await.map_err(not_found)?;
        info!(applications_removed = removed, "posting deleted");
        Ok(removed)
    }

    /// Anonymous read.
    pub async fn get(&self, id: PostingId) -> Result<Posting, LifecycleError> {
        Ok(self.ownership.posting(id).await?)
    }

    /// Active postings, most recent first. Anonymous.
    pub async fn list_active(&self, mut filter: PostingFilter) -> Result<Vec<Posting>, LifecycleError> {
        filter.status = Some(placement_postings::PostingStatus::Active);
        Ok(self.store.list_postings(&filter).await?)
    }
}

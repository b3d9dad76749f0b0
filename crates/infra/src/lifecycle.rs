//! Application lifecycle manager.
//!
//! Every operation runs: ownership resolution -> guard -> state machine ->
//! store. The store does the atomic parts (insert+increment,
//! delete+decrement, compare-and-set on status).

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use placement_applications::{ApplicantSummary, Application, ApplicationStatus, SubmissionDraft};
use placement_auth::{DenyReason, Operation, OwnershipFacts, Principal, authorize};
use placement_core::{ApplicationId, DomainError, Entity, PostingId};
use placement_postings::{Posting, PostingSummary};

use crate::ownership::{OwnershipError, OwnershipResolver};
use crate::store::{CounterDrift, CounterUpdate, PlacementStore, PostingFilter, StoreError};

/// Error returned by lifecycle and posting operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Input failed validation (missing/invalid field, malformed id, bad status).
    #[error(transparent)]
    Invalid(DomainError),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("access denied: {0}")]
    Denied(#[from] DenyReason),

    #[error("application is already {current} and cannot change status")]
    InvalidTransition { current: ApplicationStatus },

    #[error("posting is not accepting applications")]
    PostingClosed,

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<DomainError> for LifecycleError {
    fn from(err: DomainError) -> Self {
        LifecycleError::Invalid(err)
    }
}

impl From<StoreError> for LifecycleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => LifecycleError::NotFound("record"),
            StoreError::Conflict(msg) => LifecycleError::Conflict(msg),
            StoreError::StaleStatus { current } => LifecycleError::InvalidTransition { current },
            other => LifecycleError::Store(other),
        }
    }
}

impl From<OwnershipError> for LifecycleError {
    fn from(err: OwnershipError) -> Self {
        match err {
            OwnershipError::ApplicationNotFound => LifecycleError::NotFound("application"),
            OwnershipError::PostingNotFound | OwnershipError::DanglingPosting { .. } => {
                LifecycleError::NotFound("posting")
            }
            OwnershipError::Store(e) => e.into(),
        }
    }
}

/// Run the guard and log denials with their categorical reason.
pub(crate) fn guard(principal: &Principal, operation: Operation, facts: &OwnershipFacts) -> Result<(), LifecycleError> {
    authorize(principal, operation, facts).map_err(|reason| {
        info!(
            principal_id = %principal.id,
            role = %principal.role,
            operation = %operation,
            reason = reason.code(),
            "authorization denied"
        );
        LifecycleError::Denied(reason)
    })
}

/// An application joined with the posting it targets. `posting` is absent
/// when the reference dangles.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationWithPosting {
    #[serde(flatten)]
    pub application: Application,
    pub posting: Option<PostingSummary>,
}

/// An application as an employer sees it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerApplicationView {
    #[serde(flatten)]
    pub application: Application,
    pub applicant: ApplicantSummary,
    pub posting: PostingSummary,
}

/// Outcome of a counter reconciliation pass.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub checked: usize,
    pub repaired: Vec<CounterDrift>,
}

#[derive(Clone)]
pub struct ApplicationLifecycle {
    store: Arc<dyn PlacementStore>,
    ownership: OwnershipResolver,
}

impl std::fmt::Debug for ApplicationLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationLifecycle").finish_non_exhaustive()
    }
}

impl ApplicationLifecycle {
    pub fn new(store: Arc<dyn PlacementStore>) -> Self {
        let ownership = OwnershipResolver::new(store.clone());
        Self { store, ownership }
    }

    /// Resolve an application and its posting. A dangling posting reference
    /// is logged and yields `None` for the posting.
    async fn resolve(&self, id: ApplicationId) -> Result<(Application, Option<Posting>), LifecycleError> {
        match self.ownership.application(id).await {
            Ok(owned) => Ok((owned.application, Some(owned.posting))),
            Err(OwnershipError::DanglingPosting { application }) => {
                warn!(
                    application_id = %id,
                    posting_id = %application.posting_id(),
                    "application references a missing posting; using applicant-only ownership"
                );
                Ok((*application, None))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn facts(application: &Application, posting: Option<&Posting>) -> OwnershipFacts {
        OwnershipFacts::application(application.applicant_id(), posting.map(|p| p.owner_id()))
    }

    #[instrument(skip(self, principal, draft), fields(principal_id = %principal.id, posting_id = %posting_id), err)]
    pub async fn create(
        &self,
        principal: &Principal,
        posting_id: PostingId,
        draft: SubmissionDraft,
    ) -> Result<Application, LifecycleError> {
        guard(principal, Operation::CreateApplication, &OwnershipFacts::none())?;
        let fields = draft.validate()?;

        let posting = self
            .store
            .get_posting(posting_id)
            .await?
            .ok_or(LifecycleError::NotFound("posting"))?;
        if !posting.is_active() {
            return Err(LifecycleError::PostingClosed);
        }

        // Fast path; the store's uniqueness check is authoritative.
        if self.store.find_application(posting_id, principal.id).await?.is_some() {
            return Err(LifecycleError::Conflict(
                "applicant already applied to this posting".to_string(),
            ));
        }

        let application = Application::submit(ApplicationId::new(), posting_id, principal.id, fields, Utc::now());
        let count = self
            .store
            .insert_application(&application)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => LifecycleError::NotFound("posting"),
                other => other.into(),
            })?;

        info!(application_id = %application.id(), applicant_count = count, "application created");
        Ok(application)
    }

    #[instrument(skip(self, principal), fields(principal_id = %principal.id, application_id = %id), err)]
    pub async fn transition(
        &self,
        principal: &Principal,
        id: ApplicationId,
        requested: &str,
    ) -> Result<Application, LifecycleError> {
        let next: ApplicationStatus = requested.parse()?;
        let (application, posting) = self.resolve(id).await?;
        guard(
            principal,
            Operation::TransitionApplicationStatus,
            &Self::facts(&application, posting.as_ref()),
        )?;

        let current = application.status();
        if !current.can_transition_to(next) {
            return Err(LifecycleError::InvalidTransition { current });
        }
        if current == next {
            return Ok(application);
        }

        let updated = self
            .store
            .update_application_status(id, current, next, Utc::now())
            .await
            .map_err(|e| match e {
                StoreError::NotFound => LifecycleError::NotFound("application"),
                other => other.into(),
            })?;

        info!(from = %current, to = %next, "application status changed");
        Ok(updated)
    }

    #[instrument(skip(self, principal), fields(principal_id = %principal.id, application_id = %id), err)]
    pub async fn delete(&self, principal: &Principal, id: ApplicationId) -> Result<Application, LifecycleError> {
        let (application, posting) = self.resolve(id).await?;
        guard(
            principal,
            Operation::DeleteApplication,
            &Self::facts(&application, posting.as_ref()),
        )?;

        let removed = self.store.delete_application(id).await.map_err(|e| match e {
            StoreError::NotFound => LifecycleError::NotFound("application"),
            other => other.into(),
        })?;

        let posting_id = removed.application.posting_id();
        match removed.counter {
            CounterUpdate::Decremented(count) => {
                info!(posting_id = %posting_id, applicant_count = count, "application deleted");
            }
            CounterUpdate::Floored => {
                warn!(posting_id = %posting_id, "applicant counter already zero on delete; left at zero");
            }
            CounterUpdate::PostingMissing => {
                warn!(posting_id = %posting_id, "deleted application referenced a missing posting");
            }
        }
        Ok(removed.application)
    }

    #[instrument(skip(self, principal), fields(principal_id = %principal.id, application_id = %id), err)]
    pub async fn get(&self, principal: &Principal, id: ApplicationId) -> Result<ApplicationWithPosting, LifecycleError> {
        let (application, posting) = self.resolve(id).await?;
        guard(
            principal,
            Operation::read_application_for(principal.role),
            &Self::facts(&application, posting.as_ref()),
        )?;

        Ok(ApplicationWithPosting {
            application,
            posting: posting.map(|p| p.summary()),
        })
    }

    /// The principal's own applications, most recent first.
    #[instrument(skip(self, principal), fields(principal_id = %principal.id), err)]
    pub async fn list_for_applicant(&self, principal: &Principal) -> Result<Vec<ApplicationWithPosting>, LifecycleError> {
        // Every listed application has this principal as applicant.
        guard(
            principal,
            Operation::ReadApplicationOwn,
            &OwnershipFacts::application(principal.id, None),
        )?;

        let applications = self.store.list_applications_by_applicant(principal.id).await?;

        let mut summaries: HashMap<PostingId, Option<PostingSummary>> = HashMap::new();
        let mut out = Vec::with_capacity(applications.len());
        for application in applications {
            let posting_id = application.posting_id();
            if !summaries.contains_key(&posting_id) {
                let summary = self.store.get_posting(posting_id).await?.map(|p| p.summary());
                if summary.is_none() {
                    warn!(
                        application_id = %application.id(),
                        posting_id = %posting_id,
                        "application references a missing posting"
                    );
                }
                summaries.insert(posting_id, summary);
            }
            let posting = summaries.get(&posting_id).cloned().flatten();
            out.push(ApplicationWithPosting { application, posting });
        }
        Ok(out)
    }

    /// Applications to postings the principal owns, most recent first.
    #[instrument(skip(self, principal), fields(principal_id = %principal.id), err)]
    pub async fn list_for_employer(&self, principal: &Principal) -> Result<Vec<EmployerApplicationView>, LifecycleError> {
        // Every listed application targets a posting this principal owns.
        guard(
            principal,
            Operation::ReadApplicationAsOwnerEmployer,
            &OwnershipFacts::posting(principal.id),
        )?;

        let postings = self.store.list_postings(&PostingFilter::owned_by(principal.id)).await?;
        let summaries: HashMap<PostingId, PostingSummary> =
            postings.iter().map(|p| (p.id(), p.summary())).collect();
        let ids: Vec<PostingId> = summaries.keys().copied().collect();

        let applications = self.store.list_applications_for_postings(&ids).await?;
        Ok(applications
            .into_iter()
            .filter_map(|application| {
                let posting = summaries.get(&application.posting_id())?.clone();
                Some(EmployerApplicationView {
                    applicant: application.applicant_summary(),
                    posting,
                    application,
                })
            })
            .collect())
    }

    /// Administrator-triggered reconciliation.
    #[instrument(skip(self, principal), fields(principal_id = %principal.id), err)]
    pub async fn reconcile_counters(&self, principal: &Principal) -> Result<ReconcileReport, LifecycleError> {
        guard(principal, Operation::ReconcileCounters, &OwnershipFacts::none())?;
        self.reconcile_all().await
    }

    /// Recompute every posting's counter and repair drift. Used by the
    /// background reconciler and by [`Self::reconcile_counters`].
    pub async fn reconcile_all(&self) -> Result<ReconcileReport, LifecycleError> {
        let postings = self.store.list_postings(&PostingFilter::default()).await?;
        let mut report = ReconcileReport::default();

        for posting in postings {
            match self.store.recount_applicants(posting.id()).await {
                Ok(None) => {}
                Ok(Some(drift)) => {
                    warn!(
                        posting_id = %drift.posting_id,
                        recorded = drift.recorded,
                        actual = drift.actual,
                        "applicant counter drift repaired"
                    );
                    report.repaired.push(drift);
                }
                // Deleted since listing.
                Err(StoreError::NotFound) => continue,
                Err(e) => return Err(e.into()),
            }
            report.checked += 1;
        }

        info!(checked = report.checked, repaired = report.repaired.len(), "counter reconciliation finished");
        Ok(report)
    }
}

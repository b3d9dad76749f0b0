use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use placement_applications::{Application, ApplicationStatus};
use placement_core::{ApplicationId, Entity, PostingId, UserId};
use placement_postings::Posting;

use super::{CounterDrift, CounterUpdate, PlacementStore, PostingFilter, RemovedApplication, StoreError};

#[derive(Debug, Default)]
struct State {
    postings: HashMap<PostingId, Posting>,
    applications: HashMap<ApplicationId, Application>,
    by_pair: HashMap<(PostingId, UserId), ApplicationId>,
}

impl State {
    fn count_for(&self, posting_id: PostingId) -> u64 {
        self.applications
            .values()
            .filter(|a| a.posting_id() == posting_id)
            .count() as u64
    }
}

/// In-memory placement store.
///
/// Intended for tests/dev. Every mutation runs inside one write lock, which
/// makes insert+increment and delete+decrement single critical sections.
#[derive(Debug, Default)]
pub struct InMemoryPlacementStore {
    state: RwLock<State>,
}

impl InMemoryPlacementStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }
}

#[cfg(test)]
impl InMemoryPlacementStore {
    /// Drop a posting without touching its applications.
    pub(crate) fn forget_posting_for_test(&self, id: PostingId) {
        self.state.write().unwrap().postings.remove(&id);
    }

    /// Overwrite a counter without touching applications.
    pub(crate) fn set_applicant_count_for_test(&self, id: PostingId, count: u64) {
        if let Some(p) = self.state.write().unwrap().postings.get_mut(&id) {
            p.reset_applicant_count(count);
        }
    }
}

fn newest_first(mut apps: Vec<Application>) -> Vec<Application> {
    apps.sort_by(|a, b| {
        b.submitted_at()
            .cmp(&a.submitted_at())
            .then_with(|| b.id().cmp(&a.id()))
    });
    apps
}

#[async_trait]
impl PlacementStore for InMemoryPlacementStore {
    async fn get_posting(&self, id: PostingId) -> Result<Option<Posting>, StoreError> {
        Ok(self.read()?.postings.get(&id).cloned())
    }

    async fn list_postings(&self, filter: &PostingFilter) -> Result<Vec<Posting>, StoreError> {
        let state = self.read()?;
        let mut postings: Vec<Posting> = state
            .postings
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        postings.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        Ok(postings)
    }

    async fn insert_posting(&self, posting: &Posting) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if state.postings.contains_key(&posting.id()) {
            return Err(StoreError::Conflict(format!("posting {} already exists", posting.id())));
        }
        state.postings.insert(posting.id(), posting.clone());
        Ok(())
    }

    async fn update_posting(&self, posting: &Posting) -> Result<(), StoreError> {
        let mut state = self.write()?;
        let stored = state.postings.get_mut(&posting.id()).ok_or(StoreError::NotFound)?;

        // Owner and counter stay as stored.
        let updated = Posting::rehydrate(
            posting.id(),
            stored.owner_id(),
            posting.details().clone(),
            posting.status(),
            stored.applicant_count(),
            stored.created_at(),
            posting.updated_at(),
        );
        *stored = updated;
        Ok(())
    }

    async fn delete_posting(&self, id: PostingId) -> Result<u64, StoreError> {
        let mut state = self.write()?;
        if state.postings.remove(&id).is_none() {
            return Err(StoreError::NotFound);
        }

        let doomed: Vec<Application> = state
            .applications
            .values()
            .filter(|a| a.posting_id() == id)
            .cloned()
            .collect();
        for app in &doomed {
            state.applications.remove(&app.id());
            state.by_pair.remove(&(app.posting_id(), app.applicant_id()));
        }
        Ok(doomed.len() as u64)
    }

    async fn get_application(&self, id: ApplicationId) -> Result<Option<Application>, StoreError> {
        Ok(self.read()?.applications.get(&id).cloned())
    }

    async fn find_application(
        &self,
        posting_id: PostingId,
        applicant_id: UserId,
    ) -> Result<Option<Application>, StoreError> {
        let state = self.read()?;
        Ok(state
            .by_pair
            .get(&(posting_id, applicant_id))
            .and_then(|id| state.applications.get(id))
            .cloned())
    }

    async fn list_applications_by_applicant(&self, applicant_id: UserId) -> Result<Vec<Application>, StoreError> {
        let state = self.read()?;
        let apps = state
            .applications
            .values()
            .filter(|a| a.applicant_id() == applicant_id)
            .cloned()
            .collect();
        Ok(newest_first(apps))
    }

    async fn list_applications_for_postings(&self, posting_ids: &[PostingId]) -> Result<Vec<Application>, StoreError> {
        let state = self.read()?;
        let apps = state
            .applications
            .values()
            .filter(|a| posting_ids.contains(&a.posting_id()))
            .cloned()
            .collect();
        Ok(newest_first(apps))
    }

    async fn insert_application(&self, application: &Application) -> Result<u64, StoreError> {
        let mut state = self.write()?;
        let pair = (application.posting_id(), application.applicant_id());

        if !state.postings.contains_key(&pair.0) {
            return Err(StoreError::NotFound);
        }
        if state.by_pair.contains_key(&pair) {
            return Err(StoreError::Conflict(
                "applicant already applied to this posting".to_string(),
            ));
        }
        if state.applications.contains_key(&application.id()) {
            return Err(StoreError::Conflict(format!(
                "application {} already exists",
                application.id()
            )));
        }

        state.by_pair.insert(pair, application.id());
        state.applications.insert(application.id(), application.clone());

        let posting = state.postings.get_mut(&pair.0).ok_or(StoreError::NotFound)?;
        posting.record_application_added();
        Ok(posting.applicant_count())
    }

    async fn update_application_status(
        &self,
        id: ApplicationId,
        expected: ApplicationStatus,
        next: ApplicationStatus,
        now: DateTime<Utc>,
    ) -> Result<Application, StoreError> {
        let mut state = self.write()?;
        let app = state.applications.get_mut(&id).ok_or(StoreError::NotFound)?;

        let current = app.status();
        if current != expected {
            return Err(StoreError::StaleStatus { current });
        }
        app.transition_to(next, now)
            .map_err(|_| StoreError::StaleStatus { current })?;
        Ok(app.clone())
    }

    async fn delete_application(&self, id: ApplicationId) -> Result<RemovedApplication, StoreError> {
        let mut state = self.write()?;
        let application = state.applications.remove(&id).ok_or(StoreError::NotFound)?;
        state
            .by_pair
            .remove(&(application.posting_id(), application.applicant_id()));

        let counter = match state.postings.get_mut(&application.posting_id()) {
            None => CounterUpdate::PostingMissing,
            Some(posting) => {
                if posting.record_application_removed() {
                    CounterUpdate::Decremented(posting.applicant_count())
                } else {
                    CounterUpdate::Floored
                }
            }
        };

        Ok(RemovedApplication { application, counter })
    }

    async fn count_applications(&self, posting_id: PostingId) -> Result<u64, StoreError> {
        Ok(self.read()?.count_for(posting_id))
    }

    async fn recount_applicants(&self, posting_id: PostingId) -> Result<Option<CounterDrift>, StoreError> {
        let mut state = self.write()?;
        let actual = state.count_for(posting_id);
        let posting = state.postings.get_mut(&posting_id).ok_or(StoreError::NotFound)?;

        let recorded = posting.applicant_count();
        if recorded == actual {
            return Ok(None);
        }
        posting.reset_applicant_count(actual);
        Ok(Some(CounterDrift {
            posting_id,
            recorded,
            actual,
        }))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;
    use placement_applications::SubmissionDraft;
    use placement_postings::PostingDraft;

    pub(crate) fn posting_draft() -> PostingDraft {
        PostingDraft {
            title: Some("Backend Intern".to_string()),
            company_name: Some("Acme".to_string()),
            description: Some("Build APIs".to_string()),
            location: Some("Berlin".to_string()),
            work_mode: Some("Hybrid".to_string()),
            duration: Some("6 months".to_string()),
            salary: Some("1200 EUR".to_string()),
            category: Some("Engineering".to_string()),
            ..Default::default()
        }
    }

    pub(crate) fn submission_draft() -> SubmissionDraft {
        SubmissionDraft {
            full_name: Some("Grace Hopper".to_string()),
            email: Some("grace@example.com".to_string()),
            phone_number: Some("555-0100".to_string()),
            location: Some("Arlington".to_string()),
            university: Some("Yale".to_string()),
            degree_program: Some("Mathematics".to_string()),
            year_of_study: Some("4".to_string()),
            availability: Some("Immediately".to_string()),
            ..Default::default()
        }
    }

    pub(crate) fn posting(owner: UserId) -> Posting {
        let (details, status) = posting_draft().validate().unwrap();
        Posting::publish(PostingId::new(), owner, details, status, Utc::now())
    }

    pub(crate) fn application(posting_id: PostingId, applicant: UserId) -> Application {
        Application::submit(
            ApplicationId::new(),
            posting_id,
            applicant,
            submission_draft().validate().unwrap(),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn insert_increments_counter_and_rejects_duplicate_pair() {
        let store = InMemoryPlacementStore::new();
        let p = posting(UserId::new());
        store.insert_posting(&p).await.unwrap();
        let applicant = UserId::new();

        assert_eq!(store.insert_application(&application(p.id(), applicant)).await.unwrap(), 1);

        let err = store
            .insert_application(&application(p.id(), applicant))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let stored = store.get_posting(p.id()).await.unwrap().unwrap();
        assert_eq!(stored.applicant_count(), 1);
        assert_eq!(store.count_applications(p.id()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn insert_against_missing_posting_is_not_found() {
        let store = InMemoryPlacementStore::new();
        let err = store
            .insert_application(&application(PostingId::new(), UserId::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn status_compare_and_set_detects_stale_writes() {
        let store = InMemoryPlacementStore::new();
        let p = posting(UserId::new());
        store.insert_posting(&p).await.unwrap();
        let app = application(p.id(), UserId::new());
        store.insert_application(&app).await.unwrap();

        let accepted = store
            .update_application_status(app.id(), ApplicationStatus::Pending, ApplicationStatus::Accepted, Utc::now())
            .await
            .unwrap();
        assert_eq!(accepted.status(), ApplicationStatus::Accepted);

        let err = store
            .update_application_status(app.id(), ApplicationStatus::Pending, ApplicationStatus::Rejected, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::StaleStatus {
                current: ApplicationStatus::Accepted
            }
        ));
    }

    #[tokio::test]
    async fn delete_floors_counter_at_zero() {
        let store = InMemoryPlacementStore::new();
        let p = posting(UserId::new());
        store.insert_posting(&p).await.unwrap();
        let app = application(p.id(), UserId::new());
        store.insert_application(&app).await.unwrap();

        // Simulate prior drift.
        store.set_applicant_count_for_test(p.id(), 0);

        let removed = store.delete_application(app.id()).await.unwrap();
        assert_eq!(removed.counter, CounterUpdate::Floored);
        assert_eq!(store.get_posting(p.id()).await.unwrap().unwrap().applicant_count(), 0);

        let err = store.delete_application(app.id()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn deleting_a_posting_cascades() {
        let store = InMemoryPlacementStore::new();
        let p = posting(UserId::new());
        store.insert_posting(&p).await.unwrap();
        let app = application(p.id(), UserId::new());
        store.insert_application(&app).await.unwrap();

        assert_eq!(store.delete_posting(p.id()).await.unwrap(), 1);
        assert!(store.get_application(app.id()).await.unwrap().is_none());
        assert!(store
            .find_application(p.id(), app.applicant_id())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn recount_repairs_drift() {
        let store = InMemoryPlacementStore::new();
        let p = posting(UserId::new());
        store.insert_posting(&p).await.unwrap();
        store.insert_application(&application(p.id(), UserId::new())).await.unwrap();
        store.insert_application(&application(p.id(), UserId::new())).await.unwrap();

        assert_eq!(store.recount_applicants(p.id()).await.unwrap(), None);

        store.set_applicant_count_for_test(p.id(), 7);

        let drift = store.recount_applicants(p.id()).await.unwrap().unwrap();
        assert_eq!((drift.recorded, drift.actual), (7, 2));
        assert_eq!(store.get_posting(p.id()).await.unwrap().unwrap().applicant_count(), 2);
    }

    #[tokio::test]
    async fn update_posting_keeps_owner_and_counter() {
        let store = InMemoryPlacementStore::new();
        let owner = UserId::new();
        let p = posting(owner);
        store.insert_posting(&p).await.unwrap();
        store.insert_application(&application(p.id(), UserId::new())).await.unwrap();

        // A stale copy still carries applicant_count == 0.
        let mut edited = p.clone();
        edited
            .apply_patch(
                placement_postings::PostingPatch {
                    title: Some("Senior Intern".to_string()),
                    ..Default::default()
                },
                Utc::now(),
            )
            .unwrap();
        store.update_posting(&edited).await.unwrap();

        let stored = store.get_posting(p.id()).await.unwrap().unwrap();
        assert_eq!(stored.details().title, "Senior Intern");
        assert_eq!(stored.owner_id(), owner);
        assert_eq!(stored.applicant_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_inserts_for_one_pair_admit_exactly_one() {
        let store = Arc::new(InMemoryPlacementStore::new());
        let p = posting(UserId::new());
        store.insert_posting(&p).await.unwrap();
        let applicant = UserId::new();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            let app = application(p.id(), applicant);
            handles.push(tokio::spawn(async move { store.insert_application(&app).await }));
        }

        let mut ok = 0;
        for h in handles {
            if h.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(store.get_posting(p.id()).await.unwrap().unwrap().applicant_count(), 1);
    }
}

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{Value, json};

use placement_api::app::{self, AppServices};
use placement_auth::{Hs256CredentialStore, Role, SessionClaims};
use placement_core::UserId;
use placement_infra::InMemoryPlacementStore;

const SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory store, ephemeral port.
        let credentials = Arc::new(Hs256CredentialStore::with_default_ttl(SECRET.as_bytes()));
        let services = AppServices::new(Arc::new(InMemoryPlacementStore::new()));
        let app = app::build_app(credentials, services);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn create_posting(&self, token: &str) -> String {
        let res = self
            .client
            .post(self.url("/postings"))
            .bearer_auth(token)
            .json(&posting_body())
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = res.json().await.unwrap();
        body["id"].as_str().unwrap().to_string()
    }

    async fn apply(&self, token: &str, posting_id: &str) -> reqwest::Response {
        self.client
            .post(self.url("/applications"))
            .bearer_auth(token)
            .json(&submission_body(posting_id))
            .send()
            .await
            .unwrap()
    }

    async fn applicant_count(&self, posting_id: &str) -> u64 {
        let res = self
            .client
            .get(self.url(&format!("/postings/{posting_id}")))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        body["applicantCount"].as_u64().unwrap()
    }

    async fn set_status(&self, token: &str, application_id: &str, status: &str) -> reqwest::Response {
        self.client
            .patch(self.url(&format!("/applications/{application_id}/status")))
            .bearer_auth(token)
            .json(&json!({ "status": status }))
            .send()
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(sub: UserId, role: Role, expires_in: ChronoDuration) -> String {
    let now = Utc::now();
    let claims = SessionClaims::new(sub, role, now - ChronoDuration::hours(2), now + expires_in);

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn token(role: Role) -> (UserId, String) {
    let id = UserId::new();
    (id, mint_jwt(id, role, ChronoDuration::minutes(10)))
}

fn posting_body() -> Value {
    json!({
        "title": "Backend Intern",
        "companyName": "Acme",
        "description": "Build services",
        "skills": ["rust", "sql"],
        "location": "Berlin",
        "type": "Remote",
        "duration": "3 months",
        "salary": "1500 EUR",
        "category": "Engineering",
    })
}

fn submission_body(posting_id: &str) -> Value {
    json!({
        "postingId": posting_id,
        "fullName": "Grace Hopper",
        "email": "Grace@Example.com",
        "phoneNumber": "+49 30 1234",
        "location": "Berlin",
        "university": "TU Berlin",
        "degreeProgram": "Computer Science",
        "yearOfStudy": "3",
        "availability": "Immediately",
    })
}

#[tokio::test]
async fn health_is_public_and_protected_routes_need_a_credential() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv.client.get(srv.url("/whoami")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthenticated");
    assert_eq!(body["message"], "missing credential");
}

#[tokio::test]
async fn every_credential_carrier_resolves_the_same_principal() {
    let srv = TestServer::spawn().await;
    let (id, jwt) = token(Role::Employer);

    let requests = [
        srv.client.get(srv.url("/whoami")).header("x-auth-token", &jwt),
        srv.client.get(srv.url("/whoami")).bearer_auth(&jwt),
        srv.client.get(srv.url(&format!("/whoami?token={jwt}"))),
    ];

    for req in requests {
        let res = req.send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["id"], id.to_string());
        assert_eq!(body["role"], "employer");
    }
}

#[tokio::test]
async fn legacy_role_names_are_accepted() {
    let srv = TestServer::spawn().await;
    let now = Utc::now().timestamp();
    let claims = json!({
        "sub": UserId::new().to_string(),
        "role": "student",
        "iat": now - 60,
        "exp": now + 600,
    });
    let jwt = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    let res = srv.client.get(srv.url("/whoami")).bearer_auth(jwt).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["role"], "applicant");
}

#[tokio::test]
async fn expired_or_foreign_tokens_are_rejected_before_any_lookup() {
    let srv = TestServer::spawn().await;
    let expired = mint_jwt(UserId::new(), Role::Applicant, -ChronoDuration::hours(1));

    // Even a malformed id yields 401, not 400: authentication runs first.
    let res = srv
        .client
        .get(srv.url("/applications/not-a-uuid"))
        .bearer_auth(&expired)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "invalid credential");

    let foreign = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &SessionClaims::new(
            UserId::new(),
            Role::Administrator,
            Utc::now(),
            Utc::now() + ChronoDuration::minutes(5),
        ),
        &EncodingKey::from_secret(b"someone-elses-secret"),
    )
    .unwrap();
    let res = srv.client.get(srv.url("/whoami")).bearer_auth(foreign).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn applying_increments_once_and_duplicates_conflict() {
    let srv = TestServer::spawn().await;
    let (_, employer) = token(Role::Employer);
    let (applicant_id, applicant) = token(Role::Applicant);

    let posting_id = srv.create_posting(&employer).await;
    assert_eq!(srv.applicant_count(&posting_id).await, 0);

    let res = srv.apply(&applicant, &posting_id).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let summary: Value = res.json().await.unwrap();
    assert_eq!(summary["status"], "pending");
    assert_eq!(summary["postingId"], posting_id);
    assert_eq!(srv.applicant_count(&posting_id).await, 1);

    let res = srv.apply(&applicant, &posting_id).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(srv.applicant_count(&posting_id).await, 1);

    let res = srv
        .client
        .get(srv.url("/applications/mine"))
        .bearer_auth(&applicant)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["applicantId"], applicant_id.to_string());
    assert_eq!(items[0]["email"], "grace@example.com");
    assert_eq!(items[0]["posting"]["title"], "Backend Intern");
}

#[tokio::test]
async fn legacy_apply_path_creates_the_same_application() {
    let srv = TestServer::spawn().await;
    let (_, employer) = token(Role::Employer);
    let (_, applicant) = token(Role::Applicant);
    let posting_id = srv.create_posting(&employer).await;

    let res = srv
        .client
        .post(srv.url("/applications/apply"))
        .bearer_auth(&applicant)
        .json(&submission_body(&posting_id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let summary: Value = res.json().await.unwrap();
    assert_eq!(summary["postingId"], posting_id);
    assert_eq!(srv.applicant_count(&posting_id).await, 1);

    let res = srv.apply(&applicant, &posting_id).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = srv
        .client
        .post(srv.url("/applications/apply"))
        .json(&submission_body(&posting_id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn only_applicants_may_apply_and_input_is_validated() {
    let srv = TestServer::spawn().await;
    let (_, employer) = token(Role::Employer);
    let (_, applicant) = token(Role::Applicant);
    let posting_id = srv.create_posting(&employer).await;

    let res = srv.apply(&employer, &posting_id).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "role_not_permitted");

    let mut missing_email = submission_body(&posting_id);
    missing_email.as_object_mut().unwrap().remove("email");
    let res = srv
        .client
        .post(srv.url("/applications"))
        .bearer_auth(&applicant)
        .json(&missing_email)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");

    let res = srv.apply(&applicant, "not-a-uuid").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");

    let res = srv.apply(&applicant, &UserId::new().to_string()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(srv.applicant_count(&posting_id).await, 0);
}

#[tokio::test]
async fn terminal_status_cannot_be_changed() {
    let srv = TestServer::spawn().await;
    let (_, employer) = token(Role::Employer);
    let (_, applicant) = token(Role::Applicant);
    let posting_id = srv.create_posting(&employer).await;

    let summary: Value = srv.apply(&applicant, &posting_id).await.json().await.unwrap();
    let application_id = summary["id"].as_str().unwrap().to_string();

    let res = srv.set_status(&applicant, &application_id, "accepted").await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv.set_status(&employer, &application_id, "accepted").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "accepted");

    let res = srv.set_status(&employer, &application_id, "rejected").await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_transition");

    let res = srv
        .client
        .get(srv.url(&format!("/applications/{application_id}")))
        .bearer_auth(&applicant)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "accepted");
}

#[tokio::test]
async fn unknown_status_is_a_validation_error() {
    let srv = TestServer::spawn().await;
    let (_, employer) = token(Role::Employer);
    let (_, applicant) = token(Role::Applicant);
    let posting_id = srv.create_posting(&employer).await;
    let summary: Value = srv.apply(&applicant, &posting_id).await.json().await.unwrap();

    let res = srv
        .set_status(&employer, summary["id"].as_str().unwrap(), "shortlisted")
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn applicant_deletes_own_application_once() {
    let srv = TestServer::spawn().await;
    let (_, employer) = token(Role::Employer);
    let (_, applicant) = token(Role::Applicant);
    let posting_id = srv.create_posting(&employer).await;

    let summary: Value = srv.apply(&applicant, &posting_id).await.json().await.unwrap();
    let url = srv.url(&format!("/applications/{}", summary["id"].as_str().unwrap()));
    assert_eq!(srv.applicant_count(&posting_id).await, 1);

    let res = srv.client.delete(&url).bearer_auth(&applicant).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["deleted"], true);
    assert_eq!(srv.applicant_count(&posting_id).await, 0);

    let res = srv.client.delete(&url).bearer_auth(&applicant).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(srv.applicant_count(&posting_id).await, 0);
}

#[tokio::test]
async fn other_employers_cannot_see_foreign_applications() {
    let srv = TestServer::spawn().await;
    let (_, owner) = token(Role::Employer);
    let (_, stranger) = token(Role::Employer);
    let (_, applicant) = token(Role::Applicant);
    let posting_id = srv.create_posting(&owner).await;

    let summary: Value = srv.apply(&applicant, &posting_id).await.json().await.unwrap();
    let url = srv.url(&format!("/applications/{}", summary["id"].as_str().unwrap()));

    let res = srv.client.get(&url).bearer_auth(&stranger).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_owner");
    assert!(!body.to_string().contains(&posting_id));

    let res = srv.client.get(&url).bearer_auth(&owner).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let list = |t: &str| {
        srv.client
            .get(srv.url("/applications/employer"))
            .bearer_auth(t.to_string())
            .send()
    };
    let body: Value = list(&stranger).await.unwrap().json().await.unwrap();
    assert!(body["items"].as_array().unwrap().is_empty());

    let body: Value = list(&owner).await.unwrap().json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["applicant"]["fullName"], "Grace Hopper");
    assert_eq!(items[0]["posting"]["id"], posting_id);
}

#[tokio::test]
async fn posting_listing_is_public_and_filterable() {
    let srv = TestServer::spawn().await;
    let (_, employer) = token(Role::Employer);
    let posting_id = srv.create_posting(&employer).await;

    let res = srv.client.get(srv.url("/postings?type=Remote")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["items"][0]["id"], posting_id);

    let body: Value = srv
        .client
        .get(srv.url("/postings?category=design"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(body["items"].as_array().unwrap().is_empty());

    let res = srv.client.get(srv.url("/postings/not-a-uuid")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_a_posting_removes_its_applications() {
    let srv = TestServer::spawn().await;
    let (_, employer) = token(Role::Employer);
    let (_, applicant) = token(Role::Applicant);
    let posting_id = srv.create_posting(&employer).await;
    let summary: Value = srv.apply(&applicant, &posting_id).await.json().await.unwrap();

    let res = srv
        .client
        .delete(srv.url(&format!("/postings/{posting_id}")))
        .bearer_auth(&employer)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["applicationsRemoved"], 1);

    let res = srv
        .client
        .get(srv.url(&format!("/applications/{}", summary["id"].as_str().unwrap())))
        .bearer_auth(&applicant)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reconciliation_is_administrator_only() {
    let srv = TestServer::spawn().await;
    let (_, employer) = token(Role::Employer);
    let (_, admin) = token(Role::Administrator);
    srv.create_posting(&employer).await;

    let res = srv
        .client
        .post(srv.url("/admin/reconcile-counters"))
        .bearer_auth(&employer)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv
        .client
        .post(srv.url("/admin/reconcile-counters"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["checked"], 1);
    assert!(body["repaired"].as_array().unwrap().is_empty());
}

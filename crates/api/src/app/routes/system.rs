use axum::{Json, extract::Extension, http::StatusCode};

use placement_auth::Principal;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(principal): Extension<Principal>) -> Json<Principal> {
    Json(principal)
}

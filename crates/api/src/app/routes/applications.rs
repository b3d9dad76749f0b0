use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};

use placement_auth::Principal;
use placement_core::{ApplicationId, Entity};

use crate::app::dto::{self, CreateApplicationRequest, TransitionRequest};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_application))
        .route("/apply", post(create_application))
        .route("/mine", get(list_mine))
        .route("/student", get(list_mine))
        .route("/employer", get(list_for_employer))
        .route("/company", get(list_for_employer))
        .route("/:id", get(get_application).delete(delete_application))
        .route("/:id/status", patch(transition_application).put(transition_application))
}

pub async fn create_application(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    body: Result<Json<CreateApplicationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let (posting_id, draft) = body.into_parts()?;
    let application = services.lifecycle.create(&principal, posting_id, draft).await?;
    Ok((StatusCode::CREATED, Json(application.summary())))
}

pub async fn list_mine(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    let items = services.lifecycle.list_for_applicant(&principal).await?;
    Ok(Json(serde_json::json!({ "items": items })))
}

pub async fn list_for_employer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    let items = services.lifecycle.list_for_employer(&principal).await?;
    Ok(Json(serde_json::json!({ "items": items })))
}

pub async fn get_application(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: ApplicationId = dto::parse_id(&id)?;
    Ok(Json(services.lifecycle.get(&principal, id).await?))
}

pub async fn transition_application(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    body: Result<Json<TransitionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id: ApplicationId = dto::parse_id(&id)?;
    let Json(body) = body?;
    Ok(Json(services.lifecycle.transition(&principal, id, &body.status).await?))
}

pub async fn delete_application(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: ApplicationId = dto::parse_id(&id)?;
    let removed = services.lifecycle.delete(&principal, id).await?;
    Ok(Json(serde_json::json!({
        "id": removed.id().to_string(),
        "deleted": true,
    })))
}

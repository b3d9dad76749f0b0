use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};

use placement_auth::Principal;
use placement_core::PostingId;

use crate::app::dto::{self, ListPostingsQuery, PostingBody};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn public_router() -> Router {
    Router::new()
        .route("/", get(list_postings))
        .route("/:id", get(get_posting))
}

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_posting))
        .route("/:id", put(update_posting).patch(update_posting).delete(delete_posting))
}

pub async fn list_postings(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ListPostingsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let items = services.postings.list_active(query.into_filter()?).await?;
    Ok(Json(serde_json::json!({ "items": items })))
}

pub async fn get_posting(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: PostingId = dto::parse_id(&id)?;
    Ok(Json(services.postings.get(id).await?))
}

pub async fn create_posting(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    body: Result<Json<PostingBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let posting = services.postings.create(&principal, body.into_draft()).await?;
    Ok((StatusCode::CREATED, Json(posting)))
}

pub async fn update_posting(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    body: Result<Json<PostingBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id: PostingId = dto::parse_id(&id)?;
    let Json(body) = body?;
    Ok(Json(services.postings.update(&principal, id, body.into_patch()).await?))
}

pub async fn delete_posting(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: PostingId = dto::parse_id(&id)?;
    let removed = services.postings.delete(&principal, id).await?;
    Ok(Json(serde_json::json!({
        "id": id.to_string(),
        "deleted": true,
        "applicationsRemoved": removed,
    })))
}

//! Administrator maintenance endpoints.

use std::sync::Arc;

use axum::{Json, Router, extract::Extension, response::IntoResponse, routing::post};

use placement_auth::Principal;

use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/reconcile-counters", post(reconcile_counters))
}

/// Recount every posting's applicants and repair drifted counters.
pub async fn reconcile_counters(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(services.lifecycle.reconcile_counters(&principal).await?))
}

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use placement_core::DomainError;
use placement_infra::LifecycleError;

/// Error surfaced by a handler.
#[derive(Debug)]
pub enum ApiError {
    Lifecycle(LifecycleError),
    /// Request body could not be decoded.
    Body(String),
}

impl From<LifecycleError> for ApiError {
    fn from(err: LifecycleError) -> Self {
        ApiError::Lifecycle(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Lifecycle(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        ApiError::Body(err.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::Lifecycle(e) => lifecycle_error_to_response(e),
            ApiError::Body(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_body", msg),
        }
    }
}

pub fn lifecycle_error_to_response(err: LifecycleError) -> axum::response::Response {
    match err {
        LifecycleError::Invalid(DomainError::InvalidId(msg)) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        LifecycleError::Invalid(e) => json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string()),
        LifecycleError::NotFound(what) => json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found")),
        LifecycleError::Denied(reason) => json_error(StatusCode::FORBIDDEN, reason.code(), reason.to_string()),
        e @ LifecycleError::InvalidTransition { .. } => {
            json_error(StatusCode::FORBIDDEN, "invalid_transition", e.to_string())
        }
        e @ LifecycleError::PostingClosed => json_error(StatusCode::BAD_REQUEST, "posting_inactive", e.to_string()),
        LifecycleError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        LifecycleError::Store(e) => {
            tracing::error!(error = %e, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

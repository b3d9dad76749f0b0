use axum::{Router, routing::get};

pub mod admin;
pub mod applications;
pub mod postings;
pub mod system;

/// Routes open to anonymous callers.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .nest("/postings", postings::public_router())
}

/// Routes that require a resolved principal.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/postings", postings::router())
        .nest("/applications", applications::router())
        .nest("/admin", admin::router())
}

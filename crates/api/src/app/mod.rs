//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and the services handlers share
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and their mapping onto domain inputs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use placement_auth::{CredentialStore, IdentityResolver};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(credentials: Arc<dyn CredentialStore>, services: AppServices) -> Router {
    let identity = middleware::IdentityState {
        resolver: Arc::new(IdentityResolver::new(credentials)),
    };

    // Protected routes: a principal must resolve before any handler runs.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        identity,
        middleware::identity_middleware,
    ));

    routes::public_router()
        .merge(protected)
        .layer(ServiceBuilder::new().layer(Extension(Arc::new(services))))
}

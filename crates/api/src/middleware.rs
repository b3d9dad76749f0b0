use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use placement_auth::resolver::{AUTH_TOKEN_HEADER, TOKEN_QUERY_PARAM};
use placement_auth::{CredentialCarriers, IdentityResolver};

use crate::app::errors::json_error;

#[derive(Clone)]
pub struct IdentityState {
    pub resolver: Arc<IdentityResolver>,
}

fn header<'a>(headers: &'a HeaderMap, name: impl axum::http::header::AsHeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Resolve the caller from any accepted carrier and attach the `Principal`
/// to the request. Runs before every handler behind it, so authentication
/// failures never reach a lookup.
pub async fn identity_middleware(
    State(state): State<IdentityState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let query = Query::<HashMap<String, String>>::try_from_uri(req.uri())
        .map(|Query(q)| q)
        .unwrap_or_default();

    let resolved = {
        let headers = req.headers();
        let carriers = CredentialCarriers {
            auth_token_header: header(headers, AUTH_TOKEN_HEADER),
            authorization: header(headers, AUTHORIZATION),
            query_token: query.get(TOKEN_QUERY_PARAM).map(String::as_str),
        };
        state.resolver.resolve(&carriers, Utc::now())
    };

    match resolved {
        Ok(principal) => {
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!(reason = %e, path = %req.uri().path(), "unauthenticated request");
            json_error(StatusCode::UNAUTHORIZED, "unauthenticated", e.to_string())
        }
    }
}

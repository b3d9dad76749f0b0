//! Identity resolution: bearer credential -> principal.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{CredentialStore, Principal};

/// Custom header carrier, checked first.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Query parameter carrier, checked last.
pub const TOKEN_QUERY_PARAM: &str = "token";

const BEARER_PREFIX: &str = "Bearer ";

/// Raw values of every accepted credential carrier, as found on the request.
#[derive(Debug, Default, Clone, Copy)]
pub struct CredentialCarriers<'a> {
    /// Value of the `x-auth-token` header.
    pub auth_token_header: Option<&'a str>,
    /// Value of the standard `Authorization` header.
    pub authorization: Option<&'a str>,
    /// Value of the `token` query parameter.
    pub query_token: Option<&'a str>,
}

impl<'a> CredentialCarriers<'a> {
    /// Pick the credential from the first non-empty carrier, in priority order:
    /// custom header, `Authorization: Bearer`, query parameter.
    pub fn credential(&self) -> Option<&'a str> {
        let bearer = self
            .authorization
            .map(|h| h.strip_prefix(BEARER_PREFIX).unwrap_or(h));

        [self.auth_token_header, bearer, self.query_token]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|v| !v.is_empty())
    }
}

/// Why no principal could be resolved.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum NoPrincipal {
    #[error("missing credential")]
    MissingCredential,

    #[error("invalid credential")]
    InvalidCredential,
}

/// Resolves the caller's principal from the request's credential carriers.
#[derive(Clone)]
pub struct IdentityResolver {
    credentials: Arc<dyn CredentialStore>,
}

impl IdentityResolver {
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        Self { credentials }
    }

    pub fn resolve(&self, carriers: &CredentialCarriers<'_>, now: DateTime<Utc>) -> Result<Principal, NoPrincipal> {
        let raw = carriers.credential().ok_or(NoPrincipal::MissingCredential)?;
        self.resolve_credential(raw, now)
    }

    pub fn resolve_credential(&self, raw: &str, now: DateTime<Utc>) -> Result<Principal, NoPrincipal> {
        match self.credentials.verify(raw, now) {
            Ok(claims) => Ok(claims.principal()),
            Err(e) => {
                tracing::debug!(error = %e, "credential verification failed");
                Err(NoPrincipal::InvalidCredential)
            }
        }
    }
}

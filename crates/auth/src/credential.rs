//! Credential store: signs and verifies session tokens.
//!
//! The signing secret is injected at construction. Nothing else in the
//! workspace ever sees it.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use placement_core::UserId;

use crate::claims::{SessionClaims, TokenValidationError, validate_claims};
use crate::Role;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("malformed token")]
    Malformed,

    #[error("invalid token signature")]
    BadSignature,

    #[error(transparent)]
    Claims(#[from] TokenValidationError),

    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Issues and verifies signed session tokens.
///
/// Verification is deterministic with respect to `now` so callers (and tests)
/// control the clock.
pub trait CredentialStore: Send + Sync {
    fn issue(&self, subject: UserId, role: Role, now: DateTime<Utc>) -> Result<String, CredentialError>;

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, CredentialError>;
}

/// HMAC-SHA256 signed JWT credential store.
#[derive(Clone)]
pub struct Hs256CredentialStore {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl core::fmt::Debug for Hs256CredentialStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256CredentialStore")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl Hs256CredentialStore {
    /// Session lifetime used when none is configured (one day).
    pub const DEFAULT_TTL_SECS: i64 = 86_400;

    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time checks run in `validate_claims` against the caller's clock.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn with_default_ttl(secret: &[u8]) -> Self {
        Self::new(secret, Duration::seconds(Self::DEFAULT_TTL_SECS))
    }
}

impl CredentialStore for Hs256CredentialStore {
    fn issue(&self, subject: UserId, role: Role, now: DateTime<Utc>) -> Result<String, CredentialError> {
        let claims = SessionClaims::new(subject, role, now, now + self.ttl);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| CredentialError::Signing(e.to_string()))
    }

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, CredentialError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => CredentialError::BadSignature,
                ErrorKind::ExpiredSignature => CredentialError::Claims(TokenValidationError::Expired),
                _ => CredentialError::Malformed,
            }
        })?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use placement_core::UserId;

use crate::{Principal, Role};

/// Session token claims (transport-agnostic).
///
/// `iat` / `exp` are seconds since the Unix epoch, the registered JWT claim
/// encoding, so tokens stay readable by any standard JWT library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject / principal identifier.
    pub sub: UserId,

    /// Role granted to the subject for the lifetime of the session.
    pub role: Role,

    /// Issued-at timestamp.
    pub iat: i64,

    /// Expiration timestamp.
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(sub: UserId, role: Role, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub,
            role,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    pub fn principal(&self) -> Principal {
        Principal::new(self.sub, self.role)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Allowed clock skew between the issuer and this process, in seconds.
pub const CLOCK_SKEW_LEEWAY_SECS: i64 = 5;

/// Deterministically validate session claims against `now`.
///
/// Signature verification happens before this, in the credential store.
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    let now = now.timestamp();
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now + CLOCK_SKEW_LEEWAY_SECS < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

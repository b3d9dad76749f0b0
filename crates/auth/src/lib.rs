//! `placement-auth`: principal resolution and authorization (zero-trust).
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod authorize;
pub mod claims;
pub mod credential;
pub mod principal;
pub mod resolver;
pub mod roles;

pub use authorize::{Decision, DenyReason, Grant, Operation, OwnershipFacts, authorize, decide};
pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use credential::{CredentialError, CredentialStore, Hs256CredentialStore};
pub use principal::Principal;
pub use resolver::{CredentialCarriers, IdentityResolver, NoPrincipal};
pub use roles::Role;

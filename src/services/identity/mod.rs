//! Identity provider seam.
//!
//! The provider owns credentials and token signing. This crate only:
//! - verifies bearer tokens into [`Claims`]
//! - creates provider accounts during registration
//!
//! Every verification failure collapses into [`IdentityError::Unauthenticated`]; the
//! cause survives only as a message.
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub mod factory;
pub mod firebase;
pub mod jwks;

pub use factory::build_identity_provider;
pub use firebase::FirebaseIdentity;

/// Verified identity for the lifetime of one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub uid: String,
    pub email: Option<String>,
    pub email_verified: bool,
    pub name: Option<String>,
    pub issued_at: i64,
    pub expires_at: i64,
}

#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedIdentity {
    pub uid: String,
    pub email: String,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("{0}")]
    Unauthenticated(String),
    #[error("email already exists")]
    EmailExists,
    #[error("{0}")]
    Rejected(String),
    #[error("identity provider unavailable: {0}")]
    Upstream(String),
}

impl IdentityError {
    pub fn unauthenticated(reason: impl Into<String>) -> Self {
        Self::Unauthenticated(reason.into())
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify an opaque bearer token. No retries.
    async fn verify_token(&self, token: &str) -> Result<Claims, IdentityError>;

    /// Create a provider account; the returned `uid` keys the local profile.
    async fn create_account(&self, new: &NewIdentity) -> Result<CreatedIdentity, IdentityError>;
}

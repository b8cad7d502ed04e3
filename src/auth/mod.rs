//! Identity capability: credential/token verification and user lifecycle
//! against an external identity system.
//!
//! The portal core only ever talks to [`AuthProvider`]; which concrete
//! provider backs it is picked by configuration. The `custom` provider keeps
//! identities in process memory and signs its own HS256 session tokens; the
//! `auth0` and `google` variants require external services and are not bundled
//! in this build.
//!
//! A provider error is a hard failure for the calling operation, with one
//! exception: [`AuthProvider::send_invitation`] is best-effort and callers
//! swallow its errors.

use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod custom;
pub mod token;

pub use custom::CustomProvider;

/// Minimal identity returned by credential or token verification. Role,
/// company and active flag deliberately live in the data store, not here:
/// the token proves who the caller is, never what they may do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("token expired")]
    TokenExpired,
    #[error("invalid token: {0}")]
    TokenInvalid(String),
    #[error("identity already exists")]
    AlreadyExists,
    #[error("identity not found")]
    NotFound,
    #[error("operation not supported by this provider")]
    Unsupported,
    #[error("crypto error: {0}")]
    Crypto(String),
}

/// Pluggable identity provider.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Verify email/password credentials.
    async fn authenticate(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    /// Create a new identity.
    async fn register(&self, email: &str, password: &str, name: &str)
        -> Result<Identity, AuthError>;

    /// Remove an identity. Callers that mirror identities into the data store
    /// must call this first and abort on failure so no record outlives its
    /// identity deletion attempt.
    async fn delete_identity(&self, user_id: &str) -> Result<(), AuthError>;

    /// Issue a signed session token for an identity.
    fn issue_token(&self, identity: &Identity) -> Result<String, AuthError>;

    /// Verify a bearer token and return the identity it proves.
    fn validate_token(&self, token: &str) -> Result<Identity, AuthError>;

    /// Exchange a refresh token for a fresh session token.
    fn refresh_token(&self, refresh_token: &str) -> Result<String, AuthError>;

    /// Best-effort invitation email. Errors are logged by callers, never
    /// propagated to the client.
    async fn send_invitation(
        &self,
        email: &str,
        company_id: &str,
        invited_by: &str,
    ) -> Result<(), AuthError>;

    /// Best-effort password reset email.
    async fn reset_password(&self, email: &str) -> Result<(), AuthError>;

    async fn change_password(
        &self,
        user_id: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;
}

/// Identity provider configuration, resolved from CLI/env.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub provider: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

/// Build the configured identity provider.
///
/// # Errors
/// Returns an error for providers that need external services not bundled in
/// this build, or for unknown provider names.
pub fn new_provider(settings: AuthSettings) -> Result<Arc<dyn AuthProvider>> {
    match settings.provider.as_str() {
        "custom" => Ok(Arc::new(CustomProvider::new(
            settings.jwt_secret,
            settings.token_ttl_hours,
        ))),
        "auth0" | "google" => {
            bail!(
                "auth provider '{}' requires an external identity service and is not bundled in this build",
                settings.provider
            )
        }
        other => bail!("unknown auth provider: {other}"),
    }
}

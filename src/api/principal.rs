//! Request authentication and authorization guards.
//!
//! A bearer token only proves identity. [`require_auth`] validates the token,
//! then re-reads the user from the data store so role, tenant and active flag
//! are authoritative per request: a deactivated user or changed role takes
//! effect on their very next call, with no token revocation machinery.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use tracing::debug;

use crate::api::{error::ApiError, AppState};
use crate::auth::AuthError;
use crate::models::{Role, User};
use crate::store::StoreError;

/// An authenticated caller with authoritative store-backed attributes.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user: User,
}

impl Principal {
    #[must_use]
    pub fn role(&self) -> Role {
        self.user.role
    }

    /// Require exactly `role`.
    pub fn require_role(&self, role: Role) -> Result<(), ApiError> {
        if self.user.role == role {
            Ok(())
        } else {
            Err(ApiError::forbidden("insufficient role"))
        }
    }

    pub fn require_any_role(&self, roles: &[Role]) -> Result<(), ApiError> {
        if roles.contains(&self.user.role) {
            Ok(())
        } else {
            Err(ApiError::forbidden("insufficient role"))
        }
    }

    /// Require tenant membership; returns the caller's company id.
    pub fn require_company(&self) -> Result<&str, ApiError> {
        self.user
            .company_id
            .as_deref()
            .ok_or_else(|| ApiError::forbidden("no company associated with this account"))
    }

    /// Tenant boundary check for an entity loaded by id. Call after the fetch
    /// so cross-tenant access reads as forbidden, not missing.
    pub fn require_same_company(&self, entity_company_id: &str) -> Result<(), ApiError> {
        if self.user.company_id.as_deref() == Some(entity_company_id) {
            Ok(())
        } else {
            Err(ApiError::forbidden("resource belongs to another company"))
        }
    }
}

/// Extract the token from `Authorization: Bearer <token>`. Any other shape
/// of the header is rejected.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthenticated("missing authorization header"))?
        .to_str()
        .map_err(|_| ApiError::unauthenticated("malformed authorization header"))?;

    header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthenticated("expected bearer token"))
}

/// Authenticate a request: token signature and expiry via the identity
/// provider, then the authoritative user record from the store.
pub async fn require_auth(headers: &HeaderMap, state: &AppState) -> Result<Principal, ApiError> {
    let token = bearer_token(headers)?;

    let identity = state.auth.validate_token(token).map_err(|e| match e {
        AuthError::TokenExpired => ApiError::unauthenticated("token expired"),
        _ => ApiError::unauthenticated("invalid token"),
    })?;

    let user = match state.store.get_user(&identity.id).await {
        Ok(user) => user,
        // A valid token for a user the store no longer knows is a stale
        // session, not a server fault.
        Err(StoreError::NotFound) => {
            debug!(user_id = identity.id, "token for unknown user");
            return Err(ApiError::unauthenticated("unknown user"));
        }
        Err(e) => return Err(e.into()),
    };

    if !user.is_active {
        return Err(ApiError::forbidden("account is deactivated"));
    }

    Ok(Principal { user })
}

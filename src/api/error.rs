//! HTTP error mapping.
//!
//! Handlers return [`ApiError`]; the [`IntoResponse`] impl turns it into the
//! standard envelope with the matching status code. Internal failures log the
//! cause and hand the client a generic message, never the underlying error.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::api::response::ApiResponse;
use crate::auth::AuthError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidState(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound("resource not found".into()),
            StoreError::Backend(e) => Self::Internal(e),
        }
    }
}

/// Fallback mapping for provider errors surfaced outside the login path.
/// Credential and token failures are authentication problems; the rest are
/// internal.
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthenticated("invalid credentials".into()),
            AuthError::TokenExpired => Self::Unauthenticated("token expired".into()),
            AuthError::TokenInvalid(_) => Self::Unauthenticated("invalid token".into()),
            AuthError::Unsupported => {
                Self::Unauthenticated("operation not supported by the identity provider".into())
            }
            other => Self::Internal(anyhow::Error::new(other)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::InvalidState(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Self::Internal(err) => {
                error!("internal error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ApiResponse::error(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_maps_to_404() {
        let err: ApiError = StoreError::NotFound.into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn auth_errors_map_to_unauthenticated() {
        for auth_err in [
            AuthError::InvalidCredentials,
            AuthError::TokenExpired,
            AuthError::TokenInvalid("bad".into()),
        ] {
            let err: ApiError = auth_err.into();
            assert!(matches!(err, ApiError::Unauthenticated(_)));
        }
    }

    #[test]
    fn internal_response_hides_the_cause() {
        let response =
            ApiError::Internal(anyhow::anyhow!("connection refused to 10.0.0.1")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

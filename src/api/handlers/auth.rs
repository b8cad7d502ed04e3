//! Session endpoints: registration, login, token verification and the
//! password lifecycle.

use axum::{
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::api::{
    error::ApiError,
    handlers::types::{
        ChangePasswordRequest, LoginRequest, RefreshRequest, RegisterRequest, ResetPasswordRequest,
        SessionResponse, TokenResponse,
    },
    principal::require_auth,
    response::ApiResponse,
    AppState,
};
use crate::auth::AuthError;
use crate::models::{Role, User, UserInvitationStatus};
use crate::store::StoreError;

/// Create an account. The registrant starts as an `admin` with no company:
/// they either create one or get demoted to `user` when they accept an
/// invitation into an existing tenant.
pub async fn register(
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if state.store.get_user_by_email(&req.email).await.is_ok() {
        return Err(ApiError::conflict("email is already registered"));
    }

    let identity = state
        .auth
        .register(&req.email, &req.password, &req.name)
        .await
        .map_err(|e| match e {
            AuthError::AlreadyExists => ApiError::conflict("email is already registered"),
            other => other.into(),
        })?;

    let now = Utc::now();
    let user = User {
        id: identity.id.clone(),
        email: identity.email.clone(),
        name: identity.name.clone(),
        picture: None,
        company_id: None,
        role: Role::Admin,
        is_active: true,
        created_at: now,
        updated_at: now,
        last_login_at: Some(now),
        invitation_status: UserInvitationStatus::Active,
        invited_at: None,
        activated_at: Some(now),
    };
    state.store.create_user(&user).await?;

    let token = state.auth.issue_token(&identity)?;

    info!(user_id = user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(SessionResponse { token, user })),
    ))
}

pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let identity = state
        .auth
        .authenticate(&req.email, &req.password)
        .await
        .map_err(|e| match e {
            AuthError::InvalidCredentials => ApiError::unauthenticated("invalid credentials"),
            other => other.into(),
        })?;

    let mut user = match state.store.get_user(&identity.id).await {
        Ok(user) => user,
        Err(StoreError::NotFound) => return Err(ApiError::unauthenticated("unknown user")),
        Err(e) => return Err(e.into()),
    };

    if !user.is_active {
        return Err(ApiError::forbidden("account is deactivated"));
    }

    user.last_login_at = Some(Utc::now());
    user.updated_at = Utc::now();
    state.store.update_user(&user).await?;

    let token = state.auth.issue_token(&identity)?;

    Ok(Json(ApiResponse::data(SessionResponse { token, user })))
}

/// Return the authoritative user record behind the presented token.
pub async fn verify(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &state).await?;
    Ok(Json(ApiResponse::data(principal.user)))
}

/// Sessions are stateless bearer tokens; logout just confirms the client
/// should discard theirs.
pub async fn logout(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    require_auth(&headers, &state).await?;
    Ok(Json(ApiResponse::message("logged out")))
}

pub async fn refresh(
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<RefreshRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let token = state.auth.refresh_token(&req.refresh_token)?;
    Ok(Json(ApiResponse::data(TokenResponse { token })))
}

/// Always answers with the same message so the endpoint cannot be used to
/// probe which emails exist.
pub async fn reset_password(
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    match state.auth.reset_password(&req.email).await {
        Ok(()) | Err(AuthError::NotFound) => {}
        Err(e) => return Err(e.into()),
    }
    Ok(Json(ApiResponse::message(
        "if the account exists, a reset email has been sent",
    )))
}

pub async fn change_password(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &state).await?;

    state
        .auth
        .change_password(&principal.user.id, &req.old_password, &req.new_password)
        .await
        .map_err(|e| match e {
            AuthError::InvalidCredentials => {
                ApiError::invalid_state("current password is incorrect")
            }
            other => other.into(),
        })?;

    Ok(Json(ApiResponse::message("password changed")))
}

//! User endpoints, scoped to the caller's tenant.

use axum::{extract::Path, http::HeaderMap, response::IntoResponse, Extension, Json};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::api::{
    error::ApiError,
    handlers::types::UpdateUserRequest,
    principal::{require_auth, Principal},
    response::ApiResponse,
    AppState,
};
use crate::auth::AuthError;
use crate::models::{Role, User};

pub async fn list(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &state).await?;
    let company_id = principal.require_company()?;

    let users = state.store.get_users_by_company(company_id).await?;

    Ok(Json(ApiResponse::data(users)))
}

pub async fn get(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &state).await?;

    let target = state.store.get_user(&id).await?;
    ensure_visible(&principal, &target)?;

    Ok(Json(ApiResponse::data(target)))
}

/// Update a user. Members may edit their own profile fields; `role` and
/// `is_active` are admin-only, and admins only reach users of their own
/// tenant.
pub async fn update(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &state).await?;

    let mut target = state.store.get_user(&id).await?;
    ensure_visible(&principal, &target)?;

    let is_self = principal.user.id == target.id;
    if !is_self {
        principal.require_role(Role::Admin)?;
    }

    if req.role.is_some() || req.is_active.is_some() {
        principal.require_role(Role::Admin)?;
    }

    if let Some(name) = req.name {
        target.name = name;
    }
    if let Some(picture) = req.picture {
        target.picture = Some(picture);
    }
    if let Some(role) = req.role {
        target.role = role;
    }
    if let Some(is_active) = req.is_active {
        target.is_active = is_active;
    }
    target.updated_at = Utc::now();
    state.store.update_user(&target).await?;

    Ok(Json(ApiResponse::data(target)))
}

/// Delete a user: admin only, same tenant, and never the tenant's last
/// active admin. The identity is removed first so no user record can outlive
/// a failed identity deletion.
pub async fn delete(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &state).await?;
    principal.require_role(Role::Admin)?;
    let company_id = principal.require_company()?.to_string();

    let target = state.store.get_user(&id).await?;
    if target.company_id.as_deref() != Some(company_id.as_str()) {
        return Err(ApiError::forbidden("resource belongs to another company"));
    }

    if target.role == Role::Admin {
        // Deactivated admins cannot act; only active ones keep the tenant
        // administrable.
        let admins = state
            .store
            .get_users_by_company(&company_id)
            .await?
            .iter()
            .filter(|u| u.role == Role::Admin && u.is_active)
            .count();
        if admins <= 1 {
            return Err(ApiError::invalid_state(
                "cannot delete the last admin of a company",
            ));
        }
    }

    match state.auth.delete_identity(&target.id).await {
        // A missing identity is already the end state we want.
        Ok(()) | Err(AuthError::NotFound) => {}
        Err(e) => return Err(e.into()),
    }
    state.store.delete_user(&target.id).await?;

    info!(user_id = target.id, "user deleted");

    Ok(Json(ApiResponse::message("user deleted")))
}

/// A user record is visible to its owner and to members of the same tenant.
fn ensure_visible(principal: &Principal, target: &User) -> Result<(), ApiError> {
    if principal.user.id == target.id {
        return Ok(());
    }
    match target.company_id.as_deref() {
        Some(company_id) => principal.require_same_company(company_id),
        None => Err(ApiError::forbidden("resource belongs to another account")),
    }
}

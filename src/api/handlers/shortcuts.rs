//! Browser shortcut endpoints.

use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use std::sync::Arc;
use url::Url;

use crate::api::{
    error::ApiError,
    handlers::{
        new_id,
        types::{CreateShortcutRequest, UpdateShortcutRequest},
    },
    principal::require_auth,
    response::ApiResponse,
    AppState,
};
use crate::models::{BrowserShortcut, Role, ShortcutCategory};

fn validate_url(url: &str) -> Result<(), ApiError> {
    let parsed =
        Url::parse(url).map_err(|_| ApiError::invalid_state("shortcut url is not a valid URL"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ApiError::invalid_state("shortcut url must be http or https"));
    }
    Ok(())
}

/// Company shortcuts, ordered. Any member may read them.
pub async fn list(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &state).await?;
    let company_id = principal.require_company()?;

    let shortcuts = state.store.get_shortcuts_by_company(company_id).await?;

    Ok(Json(ApiResponse::data(shortcuts)))
}

pub async fn create(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<CreateShortcutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &state).await?;
    principal.require_role(Role::Admin)?;
    let company_id = principal.require_company()?.to_string();

    validate_url(&req.url)?;

    let order = match req.order {
        Some(order) => order,
        // Append after the current tail.
        None => state
            .store
            .get_shortcuts_by_company(&company_id)
            .await?
            .last()
            .map_or(1, |s| s.order + 1),
    };

    let shortcut = BrowserShortcut {
        id: new_id(),
        company_id,
        name: req.name,
        url: req.url,
        icon: req.icon,
        description: req.description,
        order,
        is_active: true,
        is_suggested: false,
        category: ShortcutCategory::Custom,
        source: None,
    };
    state.store.upsert_shortcut(&shortcut).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::data(shortcut))))
}

pub async fn update(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateShortcutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &state).await?;
    principal.require_role(Role::Admin)?;

    let mut shortcut = state.store.get_shortcut(&id).await?;
    principal.require_same_company(&shortcut.company_id)?;

    if let Some(url) = req.url {
        validate_url(&url)?;
        shortcut.url = url;
    }
    if let Some(name) = req.name {
        shortcut.name = name;
    }
    if let Some(icon) = req.icon {
        shortcut.icon = Some(icon);
    }
    if let Some(description) = req.description {
        shortcut.description = Some(description);
    }
    if let Some(order) = req.order {
        shortcut.order = order;
    }
    if let Some(is_active) = req.is_active {
        shortcut.is_active = is_active;
    }
    state.store.upsert_shortcut(&shortcut).await?;

    Ok(Json(ApiResponse::data(shortcut)))
}

pub async fn delete(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &state).await?;
    principal.require_role(Role::Admin)?;

    let shortcut = state.store.get_shortcut(&id).await?;
    principal.require_same_company(&shortcut.company_id)?;

    state.store.delete_shortcut(&shortcut.id).await?;

    Ok(Json(ApiResponse::message("shortcut deleted")))
}

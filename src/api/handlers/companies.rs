//! Company (tenant) endpoints. Everything except creation and the admin
//! listing operates on the caller's own company.

use axum::{
    extract::Query,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::{
    error::ApiError,
    handlers::{
        new_id,
        types::{CompanyStats, CreateCompanyRequest, PageParams, UpdateCompanyRequest},
    },
    principal::require_auth,
    response::ApiResponse,
    AppState,
};
use crate::models::{Company, CompanyStatus, Role};
use crate::store::StoreError;

const TRIAL_DAYS: i64 = 30;
const DEFAULT_PAGE_SIZE: usize = 50;
const MAX_PAGE_SIZE: usize = 100;

/// Create a tenant. The creator becomes its admin and is attached to it;
/// a caller who already belongs to a company cannot create another.
pub async fn create(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<CreateCompanyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &state).await?;

    if principal.user.company_id.is_some() {
        return Err(ApiError::conflict("account already belongs to a company"));
    }
    if req.name.trim().is_empty() || req.domain.trim().is_empty() {
        return Err(ApiError::invalid_state("name and domain are required"));
    }

    ensure_domain_free(&state, &req.domain, None).await?;

    let now = Utc::now();
    let company = Company {
        id: new_id(),
        name: req.name,
        domain: req.domain,
        color_theme: req.color_theme.unwrap_or_default(),
        logo_url: req.logo_url,
        admin_user_id: principal.user.id.clone(),
        subscription_id: None,
        status: CompanyStatus::Trial,
        trial_ends_at: Some(now + Duration::days(TRIAL_DAYS)),
        created_at: now,
        updated_at: now,
        onboarded: false,
        website_security_configured: false,
        malware_security_configured: false,
        data_controls_configured: false,
        reporting_configured: false,
        browser_customized: false,
        subscription_active: false,
        users_invited: false,
        download_ready: false,
    };
    state.store.create_company(&company).await?;

    let mut creator = principal.user;
    creator.company_id = Some(company.id.clone());
    creator.role = Role::Admin;
    creator.updated_at = now;
    state.store.update_user(&creator).await?;

    info!(company_id = company.id, "company created");

    Ok((StatusCode::CREATED, Json(ApiResponse::data(company))))
}

/// The caller's own company.
pub async fn me(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &state).await?;
    let company_id = principal.require_company()?;

    let company = state.store.get_company(company_id).await?;

    Ok(Json(ApiResponse::data(company)))
}

pub async fn update(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<UpdateCompanyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &state).await?;
    principal.require_role(Role::Admin)?;
    let company_id = principal.require_company()?;

    let mut company = state.store.get_company(company_id).await?;

    if let Some(domain) = req.domain {
        if domain.trim().is_empty() {
            return Err(ApiError::invalid_state("domain cannot be empty"));
        }
        if domain != company.domain {
            ensure_domain_free(&state, &domain, Some(&company.id)).await?;
            company.domain = domain;
        }
    }
    if let Some(name) = req.name {
        if name.trim().is_empty() {
            return Err(ApiError::invalid_state("name cannot be empty"));
        }
        company.name = name;
    }
    if let Some(color_theme) = req.color_theme {
        if color_theme.trim().is_empty() {
            return Err(ApiError::invalid_state("color theme cannot be empty"));
        }
        company.color_theme = color_theme;
    }
    if let Some(logo_url) = req.logo_url {
        company.logo_url = Some(logo_url);
    }
    company.updated_at = Utc::now();
    state.store.update_company(&company).await?;

    Ok(Json(ApiResponse::data(company)))
}

/// Delete the caller's tenant. Users and invitations are left in place;
/// orphaned users keep their accounts but lose tenant features until they
/// join another company.
pub async fn delete(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &state).await?;
    principal.require_role(Role::Admin)?;
    let company_id = principal.require_company()?.to_string();

    let company = state.store.get_company(&company_id).await?;
    state.store.delete_company(&company.id).await?;

    match state.store.count_users_by_company(&company.id).await {
        Ok(0) => {}
        Ok(orphans) => warn!(company_id = company.id, orphans, "company deleted with members"),
        Err(e) => warn!("orphan count after company delete failed: {e}"),
    }

    info!(company_id = company.id, "company deleted");

    Ok(Json(ApiResponse::message("company deleted")))
}

/// Compact stats for the caller's company dashboard header.
pub async fn stats(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &state).await?;
    let company_id = principal.require_company()?;

    let company = state.store.get_company(company_id).await?;

    let stats = CompanyStats {
        total_users: state.store.count_users_by_company(&company.id).await?,
        status: company.status,
        trial_ends_at: company.trial_ends_at,
        onboarded: company.onboarded,
    };

    Ok(Json(ApiResponse::data(stats)))
}

/// Paginated company listing, admin only.
pub async fn list(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &state).await?;
    principal.require_role(Role::Admin)?;

    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
    let page = params.page.unwrap_or(1).max(1);
    // Saturate so an absurd page number yields an empty page, not a panic.
    let offset = page.saturating_sub(1).saturating_mul(limit);
    let companies = state.store.list_companies(limit, offset).await?;

    Ok(Json(ApiResponse::data(companies)))
}

/// Domain uniqueness gate shared by create and update.
async fn ensure_domain_free(
    state: &AppState,
    domain: &str,
    allow_id: Option<&str>,
) -> Result<(), ApiError> {
    match state.store.get_company_by_domain(domain).await {
        Ok(existing) if Some(existing.id.as_str()) != allow_id => {
            Err(ApiError::conflict("domain is already registered"))
        }
        Ok(_) | Err(StoreError::NotFound) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

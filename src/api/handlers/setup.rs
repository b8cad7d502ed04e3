//! Setup wizard endpoints: wizard position, feature configuration, derived
//! progress and the artifacts it unlocks.

use axum::{http::HeaderMap, response::IntoResponse, Extension, Json};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::{
    error::ApiError,
    handlers::types::{
        ConfigurationRequest, DownloadInfo, SetupProgressResponse, SetupStats, SetupStepRequest,
    },
    principal::require_auth,
    response::ApiResponse,
    AppState,
};
use crate::models::{InvitationStatus, Role};
use crate::onboarding;
use crate::store::StoreError;

/// Seats granted while no subscription exists yet.
const TRIAL_MAX_USERS: u32 = 20;

/// Wizard position plus the derived overall progress. A company that has
/// never touched the wizard gets a synthesized initial record rather than a
/// 404.
pub async fn progress(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &state).await?;
    let company_id = principal.require_company()?;

    let company = state.store.get_company(company_id).await?;
    let setup = match state.store.get_setup_progress(company_id).await {
        Ok(setup) => setup,
        Err(StoreError::NotFound) => onboarding::default_progress(company_id),
        Err(e) => return Err(e.into()),
    };

    Ok(Json(ApiResponse::data(SetupProgressResponse {
        setup,
        overall_progress: onboarding::aggregate_progress(&company),
    })))
}

/// Persist the client's wizard position verbatim.
pub async fn update_step(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<SetupStepRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &state).await?;
    principal.require_role(Role::Admin)?;
    let company_id = principal.require_company()?;

    if req.progress > 100 {
        return Err(ApiError::invalid_state("progress must be between 0 and 100"));
    }

    let mut setup = match state.store.get_setup_progress(company_id).await {
        Ok(setup) => setup,
        Err(StoreError::NotFound) => onboarding::default_progress(company_id),
        Err(e) => return Err(e.into()),
    };

    setup.step = req.step;
    setup.progress = req.progress;
    if let Some(domain_provided) = req.domain_provided {
        setup.domain_provided = domain_provided;
    }
    if let Some(customization_completed) = req.customization_completed {
        setup.customization_completed = customization_completed;
    }
    if let Some(invitations_sent) = req.invitations_sent {
        setup.invitations_sent = invitations_sent;
    }
    if let Some(subscription_started) = req.subscription_started {
        setup.subscription_started = subscription_started;
    }
    setup.last_updated = Utc::now();
    state.store.put_setup_progress(&setup).await?;

    Ok(Json(ApiResponse::data(setup)))
}

/// Seat usage and derived progress for the setup dashboard. Seat limit comes
/// from the subscription when one exists, otherwise the trial default.
pub async fn stats(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &state).await?;
    let company_id = principal.require_company()?;

    let company = state.store.get_company(company_id).await?;

    let max_users = match state.store.get_subscription_by_company(company_id).await {
        Ok(subscription) => subscription.max_users,
        Err(StoreError::NotFound) => TRIAL_MAX_USERS,
        Err(e) => return Err(e.into()),
    };

    let total_users = state.store.count_users_by_company(company_id).await?;
    let invited_users = state.store.count_invited_users_by_company(company_id).await?;
    let taken = u32::try_from(total_users + invited_users).unwrap_or(u32::MAX);

    let stats = SetupStats {
        total_users,
        active_users: state.store.count_active_users_by_company(company_id).await?,
        invited_users,
        max_users,
        remaining_seats: max_users.saturating_sub(taken),
        setup_progress: onboarding::aggregate_progress(&company),
        configuration: onboarding::configuration_status(&company),
    };

    Ok(Json(ApiResponse::data(stats)))
}

/// Apply feature flag changes. Unknown keys are skipped so older and newer
/// frontends can talk to the same backend; the response echoes the full flag
/// map after the update.
pub async fn configuration(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<ConfigurationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &state).await?;
    principal.require_role(Role::Admin)?;
    let company_id = principal.require_company()?;

    let mut company = state.store.get_company(company_id).await?;

    for (key, configured) in &req {
        match onboarding::Feature::parse(key) {
            Some(feature) => feature.apply(&mut company, *configured),
            None => debug!(key, "ignoring unknown feature key"),
        }
    }
    company.updated_at = Utc::now();
    state.store.update_company(&company).await?;

    Ok(Json(ApiResponse::data(onboarding::configuration_status(
        &company,
    ))))
}

/// Upsert the four starter shortcuts for the tenant. Deterministic ids make
/// this idempotent: running it twice still leaves exactly four records.
pub async fn generate_shortcuts(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &state).await?;
    principal.require_role(Role::Admin)?;
    let company_id = principal.require_company()?;

    let company = state.store.get_company(company_id).await?;
    if company.domain.is_empty() {
        return Err(ApiError::invalid_state(
            "configure a company domain before generating shortcuts",
        ));
    }

    let shortcuts = onboarding::suggested_shortcuts(&company.id, &company.name, &company.domain);
    for shortcut in &shortcuts {
        state.store.upsert_shortcut(shortcut).await?;
    }

    info!(company_id = company.id, "starter shortcuts generated");

    Ok(Json(ApiResponse::data(shortcuts)))
}

/// Re-send every live invitation for the tenant. Delivery stays best-effort:
/// failures are logged and the invitation keeps its state for the next
/// nudge.
pub async fn nudge_users(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &state).await?;
    principal.require_role(Role::Admin)?;
    let company_id = principal.require_company()?.to_string();

    let invitations = state
        .store
        .get_pending_invitations_by_company(&company_id)
        .await?;

    let mut nudged = 0usize;
    for mut invitation in invitations {
        match state
            .auth
            .send_invitation(&invitation.email, &company_id, &principal.user.id)
            .await
        {
            Ok(()) => {
                invitation.status = InvitationStatus::Sent;
                invitation.sent_count += 1;
                invitation.last_sent_at = Some(Utc::now());
                if invitation.sent_at.is_none() {
                    invitation.sent_at = invitation.last_sent_at;
                }
                state.store.update_invitation(&invitation).await?;
                nudged += 1;
            }
            Err(e) => warn!(email = invitation.email, "nudge send failed: {e}"),
        }
    }

    Ok(Json(ApiResponse::message(format!(
        "{nudged} invitation(s) re-sent"
    ))))
}

/// Browser package details, available only once the tenant's download has
/// been marked ready.
pub async fn download_info(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &state).await?;
    let company_id = principal.require_company()?;

    let company = state.store.get_company(company_id).await?;
    if !company.download_ready {
        return Err(ApiError::invalid_state(
            "download is not ready for this company",
        ));
    }

    let info = DownloadInfo {
        download_url: format!("https://downloads.portiere.io/{}/browser-latest", company.id),
        version: "latest".to_string(),
        platforms: vec!["macos".into(), "windows".into(), "linux".into()],
    };

    Ok(Json(ApiResponse::data(info)))
}

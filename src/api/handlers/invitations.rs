//! Invitation lifecycle: create and send, list, revoke, accept.

use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::{
    error::ApiError,
    handlers::{new_id, types::InviteUsersRequest},
    principal::require_auth,
    response::ApiResponse,
    AppState,
};
use crate::models::{Invitation, InvitationStatus, Role, UserInvitationStatus};
use crate::store::StoreError;

const INVITATION_TTL_DAYS: i64 = 7;

/// 32 bytes of OS randomness, URL-safe. Possession of the token authorizes
/// acceptance, so nothing weaker will do.
fn new_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    Base64UrlUnpadded::encode_string(&bytes)
}

/// Invite a batch of emails into the caller's company. Emails that already
/// have an account or a live invitation are skipped, not errors: inviting is
/// idempotent per address. Delivery is best-effort; a failed send leaves the
/// invitation `pending` for a later nudge.
pub async fn create(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<InviteUsersRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &state).await?;
    principal.require_role(Role::Admin)?;
    let company_id = principal.require_company()?.to_string();

    if req.emails.is_empty() {
        return Err(ApiError::invalid_state("no emails to invite"));
    }

    let already_invited: Vec<String> = state
        .store
        .get_pending_invitations_by_company(&company_id)
        .await?
        .into_iter()
        .map(|i| i.email)
        .collect();

    let now = Utc::now();
    let mut created = Vec::new();
    let mut skipped = 0usize;

    for email in req.emails {
        let email = email.trim().to_lowercase();
        if email.is_empty()
            || already_invited.contains(&email)
            || state.store.get_user_by_email(&email).await.is_ok()
        {
            skipped += 1;
            continue;
        }

        let mut invitation = Invitation {
            id: new_id(),
            email,
            company_id: company_id.clone(),
            invited_by: principal.user.id.clone(),
            token: new_token(),
            status: InvitationStatus::Pending,
            expires_at: now + Duration::days(INVITATION_TTL_DAYS),
            created_at: now,
            accepted_at: None,
            sent_at: None,
            sent_count: 0,
            last_sent_at: None,
        };
        state.store.create_invitation(&invitation).await?;

        match state
            .auth
            .send_invitation(&invitation.email, &company_id, &principal.user.id)
            .await
        {
            Ok(()) => {
                invitation.status = InvitationStatus::Sent;
                invitation.sent_at = Some(Utc::now());
                invitation.sent_count = 1;
                invitation.last_sent_at = invitation.sent_at;
                state.store.update_invitation(&invitation).await?;
            }
            Err(e) => warn!(email = invitation.email, "invitation send failed: {e}"),
        }

        created.push(invitation);
    }

    if !created.is_empty() {
        let mut company = state.store.get_company(&company_id).await?;
        if !company.users_invited {
            company.users_invited = true;
            company.updated_at = Utc::now();
            state.store.update_company(&company).await?;
        }
    }

    info!(
        company_id,
        created = created.len(),
        skipped,
        "invitations created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data_with_message(
            created,
            format!("{skipped} address(es) skipped"),
        )),
    ))
}

/// Live (pending or sent) invitations for the caller's company.
pub async fn list(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &state).await?;
    principal.require_role(Role::Admin)?;
    let company_id = principal.require_company()?;

    let invitations = state
        .store
        .get_pending_invitations_by_company(company_id)
        .await?;

    Ok(Json(ApiResponse::data(invitations)))
}

pub async fn delete(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &state).await?;
    principal.require_role(Role::Admin)?;

    let invitation = state.store.get_invitation(&id).await?;
    principal.require_same_company(&invitation.company_id)?;

    state.store.delete_invitation(&invitation.id).await?;

    Ok(Json(ApiResponse::message("invitation revoked")))
}

/// Accept an invitation on behalf of the authenticated caller. The caller's
/// email must match the invited address; a matching token alone is not
/// enough to join as somebody else.
pub async fn accept(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &state).await?;

    let mut invitation = match state.store.get_invitation_by_token(&token).await {
        Ok(invitation) => invitation,
        Err(StoreError::NotFound) => return Err(ApiError::not_found("invitation not found")),
        Err(e) => return Err(e.into()),
    };

    if invitation.status == InvitationStatus::Accepted {
        return Err(ApiError::invalid_state("invitation was already accepted"));
    }
    // The sweep may not have run yet; check expiry here too.
    if invitation.status == InvitationStatus::Expired || invitation.expires_at < Utc::now() {
        return Err(ApiError::invalid_state("invitation has expired"));
    }
    if principal.user.email != invitation.email {
        return Err(ApiError::forbidden(
            "invitation was issued to a different email",
        ));
    }

    let now = Utc::now();
    invitation.status = InvitationStatus::Accepted;
    invitation.accepted_at = Some(now);
    state.store.update_invitation(&invitation).await?;

    let mut user = principal.user;
    user.company_id = Some(invitation.company_id.clone());
    user.role = Role::User;
    user.invitation_status = UserInvitationStatus::Active;
    user.activated_at = Some(now);
    user.updated_at = now;
    state.store.update_user(&user).await?;

    info!(
        user_id = user.id,
        company_id = invitation.company_id,
        "invitation accepted"
    );

    Ok(Json(ApiResponse::data(user)))
}

//! Domain entities shared by the HTTP surface and the persistence capability.
//!
//! Ids are opaque strings (UUIDs for most entities, deterministic
//! `shortcut_<company>_<suffix>` ids for generated shortcuts). Wire names are
//! snake_case and match what the portal frontend already consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a user within their company. Exactly one role is authoritative at
/// a time; the first user to create a company becomes its `admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    Guest,
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
            Self::Guest => "guest",
        }
    }
}

/// Company lifecycle status. A company transitions `trial -> active` only
/// through an external subscription event, never inside this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanyStatus {
    Trial,
    Active,
    Suspended,
    Cancelled,
}

/// Invitation lifecycle: `pending -> sent -> accepted`, or expired by the
/// sweep. Once `accepted` the record is immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Sent,
    Accepted,
    Expired,
}

/// Per-user invitation bookkeeping, distinct from [`InvitationStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserInvitationStatus {
    Invited,
    Pending,
    Active,
}

/// Client-driven wizard position persisted verbatim in
/// [`CompanySetupProgress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetupStep {
    Domain,
    Customization,
    Invitations,
    Subscription,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShortcutCategory {
    Company,
    Suggested,
    Custom,
}

/// A company (tenant). `domain` is unique across all companies and used for
/// tenant lookup. The eight `*_configured`-style booleans are the feature
/// configuration flags driven by the onboarding state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub domain: String,
    pub color_theme: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    pub admin_user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    pub status: CompanyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub onboarded: bool,
    pub website_security_configured: bool,
    pub malware_security_configured: bool,
    pub data_controls_configured: bool,
    pub reporting_configured: bool,
    pub browser_customized: bool,
    pub subscription_active: bool,
    pub users_invited: bool,
    pub download_ready: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
    pub invitation_status: UserInvitationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invited_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activated_at: Option<DateTime<Utc>>,
}

/// A time-limited invitation binding an email to a company. The `token` is a
/// bearer credential: possession authorizes acceptance, so it is generated
/// from OS randomness and never logged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    pub id: String,
    pub email: String,
    pub company_id: String,
    pub invited_by: String,
    pub token: String,
    pub status: InvitationStatus,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
    pub sent_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sent_at: Option<DateTime<Utc>>,
}

/// A browser shortcut scoped to a company, ordered by `order` ascending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserShortcut {
    pub id: String,
    pub company_id: String,
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub order: i32,
    pub is_active: bool,
    pub is_suggested: bool,
    pub category: ShortcutCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Subscription mirror of the external billing system. `max_users` is the
/// only field the onboarding state machine reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub company_id: String,
    pub billing_id: String,
    pub plan: String,
    pub status: String,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial_start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub max_users: u32,
    pub active_users: u32,
    pub invited_users: u32,
    pub is_trial_active: bool,
    pub trial_days_remaining: u32,
}

/// The setup wizard's own position, persisted verbatim on step updates.
/// `progress` is caller-supplied (0-100) and deliberately independent of the
/// aggregate progress derived from company flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanySetupProgress {
    pub company_id: String,
    pub step: SetupStep,
    pub progress: u8,
    pub domain_provided: bool,
    pub customization_completed: bool,
    pub invitations_sent: bool,
    pub subscription_started: bool,
    pub last_updated: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_wire_names_are_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"guest\"").unwrap(),
            Role::Guest
        );
    }

    #[test]
    fn setup_step_round_trips() {
        for step in [
            SetupStep::Domain,
            SetupStep::Customization,
            SetupStep::Invitations,
            SetupStep::Subscription,
            SetupStep::Complete,
        ] {
            let wire = serde_json::to_string(&step).unwrap();
            assert_eq!(serde_json::from_str::<SetupStep>(&wire).unwrap(), step);
        }
    }

    #[test]
    fn optional_fields_are_omitted() {
        let user = User {
            id: "u1".into(),
            email: "a@x.com".into(),
            name: "A".into(),
            picture: None,
            company_id: None,
            role: Role::Admin,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
            invitation_status: UserInvitationStatus::Active,
            invited_at: None,
            activated_at: None,
        };
        let wire = serde_json::to_value(&user).unwrap();
        assert!(wire.get("company_id").is_none());
        assert!(wire.get("picture").is_none());
        assert_eq!(wire["invitation_status"], "active");
    }
}

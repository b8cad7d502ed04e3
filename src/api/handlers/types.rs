//! Request and response bodies for the v1 API.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{CompanySetupProgress, CompanyStatus, Role, SetupStep, User};

// Auth

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

// Companies

#[derive(Debug, Deserialize)]
pub struct CreateCompanyRequest {
    pub name: String,
    pub domain: String,
    #[serde(default)]
    pub color_theme: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateCompanyRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub color_theme: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Compact dashboard stats for `/companies/stats`.
#[derive(Debug, Serialize)]
pub struct CompanyStats {
    pub total_users: usize,
    pub status: CompanyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub onboarded: bool,
}

// Users

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

// Invitations

#[derive(Debug, Deserialize)]
pub struct InviteUsersRequest {
    pub emails: Vec<String>,
}

// Shortcuts

#[derive(Debug, Deserialize)]
pub struct CreateShortcutRequest {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateShortcutRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order: Option<i32>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

// Setup

#[derive(Debug, Deserialize)]
pub struct SetupStepRequest {
    pub step: SetupStep,
    pub progress: u8,
    #[serde(default)]
    pub domain_provided: Option<bool>,
    #[serde(default)]
    pub customization_completed: Option<bool>,
    #[serde(default)]
    pub invitations_sent: Option<bool>,
    #[serde(default)]
    pub subscription_started: Option<bool>,
}

/// Body of the configuration update: feature key to desired value. Unknown
/// keys are ignored.
pub type ConfigurationRequest = HashMap<String, bool>;

#[derive(Debug, Serialize)]
pub struct SetupProgressResponse {
    pub setup: CompanySetupProgress,
    /// Derived from company milestones, independent of the stored wizard
    /// `progress`.
    pub overall_progress: u8,
}

/// Full payload for `/setup/stats`: seat usage, derived progress and the
/// complete feature flag map.
#[derive(Debug, Serialize)]
pub struct SetupStats {
    pub total_users: usize,
    pub active_users: usize,
    pub invited_users: usize,
    pub max_users: u32,
    pub remaining_seats: u32,
    pub setup_progress: u8,
    pub configuration: BTreeMap<&'static str, bool>,
}

#[derive(Debug, Serialize)]
pub struct DownloadInfo {
    pub download_url: String,
    pub version: String,
    pub platforms: Vec<String>,
}

//! Tenant onboarding state machine.
//!
//! A company's onboarding state is eight feature flags on the [`Company`]
//! record plus a separately stored wizard position. Aggregate progress is
//! never stored: it is derived on demand from five milestones worth 20 points
//! each, so it cannot drift from the flags that define it.

use std::collections::BTreeMap;

use chrono::Utc;

use crate::models::{BrowserShortcut, Company, CompanySetupProgress, SetupStep, ShortcutCategory};

/// Configurable onboarding feature. Wire names are the keys accepted by the
/// configuration-status endpoint; unknown keys parse to `None` and are
/// silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    WebsiteSecurity,
    MalwareSecurity,
    DataControls,
    Reporting,
    BrowserCustomization,
    Subscription,
    UsersInvited,
    DownloadReady,
}

impl Feature {
    pub const ALL: [Feature; 8] = [
        Feature::WebsiteSecurity,
        Feature::MalwareSecurity,
        Feature::DataControls,
        Feature::Reporting,
        Feature::BrowserCustomization,
        Feature::Subscription,
        Feature::UsersInvited,
        Feature::DownloadReady,
    ];

    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "website_security" => Some(Self::WebsiteSecurity),
            "malware_security" => Some(Self::MalwareSecurity),
            "data_controls" => Some(Self::DataControls),
            "reporting" => Some(Self::Reporting),
            "browser_customization" => Some(Self::BrowserCustomization),
            "subscription" => Some(Self::Subscription),
            "users_invited" => Some(Self::UsersInvited),
            "download_ready" => Some(Self::DownloadReady),
            _ => None,
        }
    }

    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::WebsiteSecurity => "website_security",
            Self::MalwareSecurity => "malware_security",
            Self::DataControls => "data_controls",
            Self::Reporting => "reporting",
            Self::BrowserCustomization => "browser_customization",
            Self::Subscription => "subscription",
            Self::UsersInvited => "users_invited",
            Self::DownloadReady => "download_ready",
        }
    }

    #[must_use]
    pub fn get(&self, company: &Company) -> bool {
        match self {
            Self::WebsiteSecurity => company.website_security_configured,
            Self::MalwareSecurity => company.malware_security_configured,
            Self::DataControls => company.data_controls_configured,
            Self::Reporting => company.reporting_configured,
            Self::BrowserCustomization => company.browser_customized,
            Self::Subscription => company.subscription_active,
            Self::UsersInvited => company.users_invited,
            Self::DownloadReady => company.download_ready,
        }
    }

    pub fn apply(&self, company: &mut Company, configured: bool) {
        match self {
            Self::WebsiteSecurity => company.website_security_configured = configured,
            Self::MalwareSecurity => company.malware_security_configured = configured,
            Self::DataControls => company.data_controls_configured = configured,
            Self::Reporting => company.reporting_configured = configured,
            Self::BrowserCustomization => company.browser_customized = configured,
            Self::Subscription => company.subscription_active = configured,
            Self::UsersInvited => company.users_invited = configured,
            Self::DownloadReady => company.download_ready = configured,
        }
    }
}

/// Current value of every feature flag, keyed by wire name.
#[must_use]
pub fn configuration_status(company: &Company) -> BTreeMap<&'static str, bool> {
    Feature::ALL.iter().map(|f| (f.key(), f.get(company))).collect()
}

/// Derived setup progress: 20 points per completed milestone, always a
/// multiple of 20 in `0..=100`.
#[must_use]
pub fn aggregate_progress(company: &Company) -> u8 {
    let milestones = [
        !company.domain.is_empty(),
        !company.color_theme.is_empty(),
        company.users_invited,
        company.subscription_active,
        company.download_ready,
    ];
    milestones.iter().filter(|done| **done).count() as u8 * 20
}

/// Wizard position for a company that has never touched the wizard.
#[must_use]
pub fn default_progress(company_id: &str) -> CompanySetupProgress {
    CompanySetupProgress {
        company_id: company_id.to_string(),
        step: SetupStep::Domain,
        progress: 0,
        domain_provided: false,
        customization_completed: false,
        invitations_sent: false,
        subscription_started: false,
        last_updated: Utc::now(),
    }
}

/// The four starter shortcuts for a tenant. Ids are deterministic per
/// company, so regeneration upserts the same four records instead of
/// accumulating duplicates.
#[must_use]
pub fn suggested_shortcuts(
    company_id: &str,
    company_name: &str,
    domain: &str,
) -> Vec<BrowserShortcut> {
    let entries = [
        (
            "company",
            company_name.to_string(),
            format!("https://{domain}"),
            Some(format!("{company_name} website")),
            ShortcutCategory::Company,
        ),
        (
            "gmail",
            "Gmail".to_string(),
            "https://mail.google.com".to_string(),
            Some("Email".to_string()),
            ShortcutCategory::Suggested,
        ),
        (
            "calendar",
            "Google Calendar".to_string(),
            "https://calendar.google.com".to_string(),
            Some("Calendar".to_string()),
            ShortcutCategory::Suggested,
        ),
        (
            "drive",
            "Google Drive".to_string(),
            "https://drive.google.com".to_string(),
            Some("File storage".to_string()),
            ShortcutCategory::Suggested,
        ),
    ];

    entries
        .into_iter()
        .enumerate()
        .map(|(i, (suffix, name, url, description, category))| BrowserShortcut {
            id: format!("shortcut_{company_id}_{suffix}"),
            company_id: company_id.to_string(),
            name,
            url,
            icon: None,
            description,
            order: i as i32 + 1,
            is_active: true,
            is_suggested: true,
            category,
            source: Some("generated".to_string()),
        })
        .collect()
}

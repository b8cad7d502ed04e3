//! Persistence capability behind the [`DataStore`] trait.
//!
//! Handlers never touch a concrete backend; they depend on this trait and the
//! factory picks the implementation from configuration. The bundled backend
//! is [`MemoryStore`]; hosted backends (Firestore, Postgres, MySQL) need
//! drivers not compiled into this build and fail at construction.

use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{
    BrowserShortcut, Company, CompanySetupProgress, Invitation, Subscription, User,
};

mod memory;

pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Pluggable persistence backend.
///
/// Uniqueness of `Company.domain` and `User.email` is enforced by the
/// handlers via the `get_*_by_*` lookups, not by the store; `create_*` never
/// checks. `update_*` and `delete_*` return [`StoreError::NotFound`] when the
/// id is unknown.
#[async_trait]
pub trait DataStore: Send + Sync {
    // Companies
    async fn create_company(&self, company: &Company) -> Result<(), StoreError>;
    async fn get_company(&self, id: &str) -> Result<Company, StoreError>;
    async fn get_company_by_domain(&self, domain: &str) -> Result<Company, StoreError>;
    async fn update_company(&self, company: &Company) -> Result<(), StoreError>;
    async fn delete_company(&self, id: &str) -> Result<(), StoreError>;
    async fn list_companies(&self, limit: usize, offset: usize)
        -> Result<Vec<Company>, StoreError>;

    // Users
    async fn create_user(&self, user: &User) -> Result<(), StoreError>;
    async fn get_user(&self, id: &str) -> Result<User, StoreError>;
    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError>;
    async fn update_user(&self, user: &User) -> Result<(), StoreError>;
    async fn delete_user(&self, id: &str) -> Result<(), StoreError>;
    async fn get_users_by_company(&self, company_id: &str) -> Result<Vec<User>, StoreError>;
    async fn count_users_by_company(&self, company_id: &str) -> Result<usize, StoreError>;
    async fn count_active_users_by_company(&self, company_id: &str) -> Result<usize, StoreError>;
    async fn count_invited_users_by_company(&self, company_id: &str) -> Result<usize, StoreError>;

    // Invitations
    async fn create_invitation(&self, invitation: &Invitation) -> Result<(), StoreError>;
    async fn get_invitation(&self, id: &str) -> Result<Invitation, StoreError>;
    async fn get_invitation_by_token(&self, token: &str) -> Result<Invitation, StoreError>;
    async fn update_invitation(&self, invitation: &Invitation) -> Result<(), StoreError>;
    async fn delete_invitation(&self, id: &str) -> Result<(), StoreError>;
    async fn get_pending_invitations_by_company(
        &self,
        company_id: &str,
    ) -> Result<Vec<Invitation>, StoreError>;
    async fn count_pending_invitations_by_company(
        &self,
        company_id: &str,
    ) -> Result<usize, StoreError>;
    /// Delete every invitation whose `expires_at` is before `now`,
    /// regardless of status. Returns how many were removed.
    async fn delete_expired_invitations(&self, now: DateTime<Utc>) -> Result<usize, StoreError>;

    // Browser shortcuts
    async fn upsert_shortcut(&self, shortcut: &BrowserShortcut) -> Result<(), StoreError>;
    async fn get_shortcut(&self, id: &str) -> Result<BrowserShortcut, StoreError>;
    /// Shortcuts for a company, ordered by `order` ascending.
    async fn get_shortcuts_by_company(
        &self,
        company_id: &str,
    ) -> Result<Vec<BrowserShortcut>, StoreError>;
    async fn delete_shortcut(&self, id: &str) -> Result<(), StoreError>;

    // Subscriptions
    async fn get_subscription_by_company(
        &self,
        company_id: &str,
    ) -> Result<Subscription, StoreError>;
    async fn upsert_subscription(&self, subscription: &Subscription) -> Result<(), StoreError>;

    // Setup progress
    async fn get_setup_progress(&self, company_id: &str)
        -> Result<CompanySetupProgress, StoreError>;
    async fn put_setup_progress(&self, progress: &CompanySetupProgress) -> Result<(), StoreError>;
}

/// Build the configured persistence backend.
///
/// # Errors
/// Returns an error for backends whose drivers are not compiled into this
/// build, or for unknown backend names.
pub fn new_store(provider: &str) -> Result<Arc<dyn DataStore>> {
    match provider {
        "memory" => Ok(Arc::new(MemoryStore::new())),
        "firestore" | "postgres" | "mysql" => {
            bail!("store provider '{provider}' requires a driver not compiled into this build")
        }
        other => bail!("unknown store provider: {other}"),
    }
}

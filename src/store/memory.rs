//! In-process [`DataStore`] backed by `tokio::sync::RwLock` maps.
//!
//! Every operation takes the lock for the one collection it touches, so
//! concurrent requests serialize per collection and read-modify-write cycles
//! inside a single call cannot interleave. Nothing survives a restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::models::{
    BrowserShortcut, Company, CompanySetupProgress, Invitation, InvitationStatus, Subscription,
    User,
};
use crate::store::{DataStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    companies: RwLock<HashMap<String, Company>>,
    users: RwLock<HashMap<String, User>>,
    invitations: RwLock<HashMap<String, Invitation>>,
    shortcuts: RwLock<HashMap<String, BrowserShortcut>>,
    // Keyed by company id, one subscription per tenant.
    subscriptions: RwLock<HashMap<String, Subscription>>,
    setup_progress: RwLock<HashMap<String, CompanySetupProgress>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn is_pending(status: InvitationStatus) -> bool {
    matches!(status, InvitationStatus::Pending | InvitationStatus::Sent)
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn create_company(&self, company: &Company) -> Result<(), StoreError> {
        self.companies
            .write()
            .await
            .insert(company.id.clone(), company.clone());
        Ok(())
    }

    async fn get_company(&self, id: &str) -> Result<Company, StoreError> {
        self.companies
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_company_by_domain(&self, domain: &str) -> Result<Company, StoreError> {
        self.companies
            .read()
            .await
            .values()
            .find(|c| c.domain == domain)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update_company(&self, company: &Company) -> Result<(), StoreError> {
        let mut companies = self.companies.write().await;
        if !companies.contains_key(&company.id) {
            return Err(StoreError::NotFound);
        }
        companies.insert(company.id.clone(), company.clone());
        Ok(())
    }

    async fn delete_company(&self, id: &str) -> Result<(), StoreError> {
        self.companies
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn list_companies(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Company>, StoreError> {
        let companies = self.companies.read().await;
        let mut all: Vec<Company> = companies.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all.into_iter().skip(offset).take(limit).collect())
    }

    async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        self.users
            .write()
            .await
            .insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn get_user(&self, id: &str) -> Result<User, StoreError> {
        self.users
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update_user(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(StoreError::NotFound);
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn delete_user(&self, id: &str) -> Result<(), StoreError> {
        self.users
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn get_users_by_company(&self, company_id: &str) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().await;
        let mut matched: Vec<User> = users
            .values()
            .filter(|u| u.company_id.as_deref() == Some(company_id))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matched)
    }

    async fn count_users_by_company(&self, company_id: &str) -> Result<usize, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .filter(|u| u.company_id.as_deref() == Some(company_id))
            .count())
    }

    async fn count_active_users_by_company(&self, company_id: &str) -> Result<usize, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .filter(|u| u.company_id.as_deref() == Some(company_id) && u.is_active)
            .count())
    }

    async fn count_invited_users_by_company(&self, company_id: &str) -> Result<usize, StoreError> {
        Ok(self
            .invitations
            .read()
            .await
            .values()
            .filter(|i| i.company_id == company_id && is_pending(i.status))
            .count())
    }

    async fn create_invitation(&self, invitation: &Invitation) -> Result<(), StoreError> {
        self.invitations
            .write()
            .await
            .insert(invitation.id.clone(), invitation.clone());
        Ok(())
    }

    async fn get_invitation(&self, id: &str) -> Result<Invitation, StoreError> {
        self.invitations
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_invitation_by_token(&self, token: &str) -> Result<Invitation, StoreError> {
        self.invitations
            .read()
            .await
            .values()
            .find(|i| i.token == token)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update_invitation(&self, invitation: &Invitation) -> Result<(), StoreError> {
        let mut invitations = self.invitations.write().await;
        if !invitations.contains_key(&invitation.id) {
            return Err(StoreError::NotFound);
        }
        invitations.insert(invitation.id.clone(), invitation.clone());
        Ok(())
    }

    async fn delete_invitation(&self, id: &str) -> Result<(), StoreError> {
        self.invitations
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn get_pending_invitations_by_company(
        &self,
        company_id: &str,
    ) -> Result<Vec<Invitation>, StoreError> {
        let invitations = self.invitations.read().await;
        let mut matched: Vec<Invitation> = invitations
            .values()
            .filter(|i| i.company_id == company_id && is_pending(i.status))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matched)
    }

    async fn count_pending_invitations_by_company(
        &self,
        company_id: &str,
    ) -> Result<usize, StoreError> {
        Ok(self
            .invitations
            .read()
            .await
            .values()
            .filter(|i| i.company_id == company_id && is_pending(i.status))
            .count())
    }

    async fn delete_expired_invitations(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut invitations = self.invitations.write().await;
        let before = invitations.len();
        invitations.retain(|_, i| i.expires_at >= now);
        Ok(before - invitations.len())
    }

    async fn upsert_shortcut(&self, shortcut: &BrowserShortcut) -> Result<(), StoreError> {
        self.shortcuts
            .write()
            .await
            .insert(shortcut.id.clone(), shortcut.clone());
        Ok(())
    }

    async fn get_shortcut(&self, id: &str) -> Result<BrowserShortcut, StoreError> {
        self.shortcuts
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_shortcuts_by_company(
        &self,
        company_id: &str,
    ) -> Result<Vec<BrowserShortcut>, StoreError> {
        let shortcuts = self.shortcuts.read().await;
        let mut matched: Vec<BrowserShortcut> = shortcuts
            .values()
            .filter(|s| s.company_id == company_id)
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        Ok(matched)
    }

    async fn delete_shortcut(&self, id: &str) -> Result<(), StoreError> {
        self.shortcuts
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn get_subscription_by_company(
        &self,
        company_id: &str,
    ) -> Result<Subscription, StoreError> {
        self.subscriptions
            .read()
            .await
            .get(company_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn upsert_subscription(&self, subscription: &Subscription) -> Result<(), StoreError> {
        self.subscriptions
            .write()
            .await
            .insert(subscription.company_id.clone(), subscription.clone());
        Ok(())
    }

    async fn get_setup_progress(
        &self,
        company_id: &str,
    ) -> Result<CompanySetupProgress, StoreError> {
        self.setup_progress
            .read()
            .await
            .get(company_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn put_setup_progress(&self, progress: &CompanySetupProgress) -> Result<(), StoreError> {
        self.setup_progress
            .write()
            .await
            .insert(progress.company_id.clone(), progress.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CompanyStatus, Role, SetupStep, ShortcutCategory, UserInvitationStatus};
    use chrono::Duration;

    fn company(id: &str, domain: &str) -> Company {
        let now = Utc::now();
        Company {
            id: id.into(),
            name: format!("{id} inc"),
            domain: domain.into(),
            color_theme: String::new(),
            logo_url: None,
            admin_user_id: "admin".into(),
            subscription_id: None,
            status: CompanyStatus::Trial,
            trial_ends_at: None,
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
        }
    }

    fn user(id: &str, email: &str, company_id: Option<&str>, active: bool) -> User {
        let now = Utc::now();
        User {
            id: id.into(),
            email: email.into(),
            name: id.into(),
            picture: None,
            company_id: company_id.map(String::from),
            role: Role::User,
            is_active: active,
            created_at: now,
            updated_at: now,
            last_login_at: None,
            invitation_status: UserInvitationStatus::Active,
            invited_at: None,
            activated_at: None,
        }
    }

    fn invitation(id: &str, company_id: &str, status: InvitationStatus, ttl: Duration) -> Invitation {
        let now = Utc::now();
        Invitation {
            id: id.into(),
            email: format!("{id}@example.com"),
            company_id: company_id.into(),
            invited_by: "admin".into(),
            token: format!("token-{id}"),
            status,
            expires_at: now + ttl,
            created_at: now,
            accepted_at: None,
            sent_at: None,
            sent_count: 0,
            last_sent_at: None,
        }
    }

    #[tokio::test]
    async fn company_crud_and_domain_lookup() {
        let store = MemoryStore::new();
        store.create_company(&company("c1", "acme.com")).await.unwrap();

        assert_eq!(store.get_company("c1").await.unwrap().domain, "acme.com");
        assert_eq!(
            store.get_company_by_domain("acme.com").await.unwrap().id,
            "c1"
        );
        assert!(matches!(
            store.get_company_by_domain("other.com").await,
            Err(StoreError::NotFound)
        ));

        store.delete_company("c1").await.unwrap();
        assert!(matches!(
            store.get_company("c1").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.update_company(&company("ghost", "ghost.com")).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.update_user(&user("ghost", "g@x.com", None, true)).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn user_counts_are_company_scoped() {
        let store = MemoryStore::new();
        store.create_user(&user("u1", "a@x.com", Some("c1"), true)).await.unwrap();
        store.create_user(&user("u2", "b@x.com", Some("c1"), false)).await.unwrap();
        store.create_user(&user("u3", "c@x.com", Some("c2"), true)).await.unwrap();
        store.create_user(&user("u4", "d@x.com", None, true)).await.unwrap();

        assert_eq!(store.count_users_by_company("c1").await.unwrap(), 2);
        assert_eq!(store.count_active_users_by_company("c1").await.unwrap(), 1);
        assert_eq!(store.get_users_by_company("c2").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn expired_sweep_removes_past_expiry_regardless_of_status() {
        let store = MemoryStore::new();
        let stale = Duration::hours(-1);
        store
            .create_invitation(&invitation("i1", "c1", InvitationStatus::Pending, stale))
            .await
            .unwrap();
        store
            .create_invitation(&invitation("i2", "c1", InvitationStatus::Sent, stale))
            .await
            .unwrap();
        store
            .create_invitation(&invitation("i3", "c1", InvitationStatus::Accepted, stale))
            .await
            .unwrap();
        store
            .create_invitation(&invitation("i4", "c1", InvitationStatus::Pending, Duration::hours(1)))
            .await
            .unwrap();

        let removed = store.delete_expired_invitations(Utc::now()).await.unwrap();
        assert_eq!(removed, 3);
        assert!(matches!(
            store.get_invitation("i3").await,
            Err(StoreError::NotFound)
        ));
        assert!(store.get_invitation("i4").await.is_ok());
    }

    #[tokio::test]
    async fn pending_invitations_include_sent() {
        let store = MemoryStore::new();
        let ttl = Duration::days(7);
        store
            .create_invitation(&invitation("i1", "c1", InvitationStatus::Pending, ttl))
            .await
            .unwrap();
        store
            .create_invitation(&invitation("i2", "c1", InvitationStatus::Sent, ttl))
            .await
            .unwrap();
        store
            .create_invitation(&invitation("i3", "c1", InvitationStatus::Accepted, ttl))
            .await
            .unwrap();

        assert_eq!(
            store.count_pending_invitations_by_company("c1").await.unwrap(),
            2
        );
        assert_eq!(store.count_invited_users_by_company("c1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn shortcuts_come_back_ordered() {
        let store = MemoryStore::new();
        for (id, order) in [("s3", 3), ("s1", 1), ("s2", 2)] {
            store
                .upsert_shortcut(&BrowserShortcut {
                    id: id.into(),
                    company_id: "c1".into(),
                    name: id.into(),
                    url: "https://example.com".into(),
                    icon: None,
                    description: None,
                    order,
                    is_active: true,
                    is_suggested: false,
                    category: ShortcutCategory::Custom,
                    source: None,
                })
                .await
                .unwrap();
        }

        let ids: Vec<String> = store
            .get_shortcuts_by_company("c1")
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, ["s1", "s2", "s3"]);
    }

    #[tokio::test]
    async fn setup_progress_round_trips() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.get_setup_progress("c1").await,
            Err(StoreError::NotFound)
        ));

        let progress = CompanySetupProgress {
            company_id: "c1".into(),
            step: SetupStep::Customization,
            progress: 40,
            domain_provided: true,
            customization_completed: false,
            invitations_sent: false,
            subscription_started: false,
            last_updated: Utc::now(),
        };
        store.put_setup_progress(&progress).await.unwrap();
        let stored = store.get_setup_progress("c1").await.unwrap();
        assert_eq!(stored.step, SetupStep::Customization);
        assert_eq!(stored.progress, 40);
    }
}

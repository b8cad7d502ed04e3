//! Self-contained identity provider: in-process identity map, Argon2id
//! password hashes, self-signed HS256 session tokens.
//!
//! Suitable for development and single-node deployments; identities do not
//! survive a restart.

use std::collections::HashMap;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::{token, AuthError, AuthProvider, Identity};

struct IdentityRecord {
    identity: Identity,
    password_hash: String,
}

pub struct CustomProvider {
    jwt_secret: String,
    token_ttl_hours: i64,
    // Keyed by user id; email lookups scan. Fine at this scale.
    identities: RwLock<HashMap<String, IdentityRecord>>,
}

impl CustomProvider {
    #[must_use]
    pub fn new(jwt_secret: String, token_ttl_hours: i64) -> Self {
        Self {
            jwt_secret,
            token_ttl_hours,
            identities: RwLock::new(HashMap::new()),
        }
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Crypto(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::Crypto(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[async_trait]
impl AuthProvider for CustomProvider {
    async fn authenticate(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let identities = self.identities.read().await;
        let record = identities
            .values()
            .find(|r| r.identity.email == email)
            .ok_or(AuthError::InvalidCredentials)?;

        if verify_password(password, &record.password_hash)? {
            Ok(record.identity.clone())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Identity, AuthError> {
        let mut identities = self.identities.write().await;

        if identities.values().any(|r| r.identity.email == email) {
            return Err(AuthError::AlreadyExists);
        }

        let identity = Identity {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            name: name.to_string(),
        };
        identities.insert(
            identity.id.clone(),
            IdentityRecord {
                identity: identity.clone(),
                password_hash: hash_password(password)?,
            },
        );

        Ok(identity)
    }

    async fn delete_identity(&self, user_id: &str) -> Result<(), AuthError> {
        self.identities
            .write()
            .await
            .remove(user_id)
            .map(|_| ())
            .ok_or(AuthError::NotFound)
    }

    fn issue_token(&self, identity: &Identity) -> Result<String, AuthError> {
        token::issue(identity, &self.jwt_secret, self.token_ttl_hours)
    }

    fn validate_token(&self, token: &str) -> Result<Identity, AuthError> {
        token::validate(token, &self.jwt_secret)
    }

    fn refresh_token(&self, _refresh_token: &str) -> Result<String, AuthError> {
        // Session tokens are short-lived and re-issued at login; there is no
        // refresh token store to validate against.
        Err(AuthError::Unsupported)
    }

    async fn send_invitation(
        &self,
        email: &str,
        company_id: &str,
        invited_by: &str,
    ) -> Result<(), AuthError> {
        // No mail transport in this provider; record the intent.
        tracing::info!(email, company_id, invited_by, "invitation email queued");
        Ok(())
    }

    async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        let identities = self.identities.read().await;
        if !identities.values().any(|r| r.identity.email == email) {
            return Err(AuthError::NotFound);
        }
        tracing::info!(email, "password reset email queued");
        Ok(())
    }

    async fn change_password(
        &self,
        user_id: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let mut identities = self.identities.write().await;
        let record = identities.get_mut(user_id).ok_or(AuthError::NotFound)?;

        if !verify_password(old_password, &record.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }
        record.password_hash = hash_password(new_password)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> CustomProvider {
        CustomProvider::new("test-secret".into(), 24)
    }

    #[tokio::test]
    async fn register_then_authenticate() {
        let p = provider();
        let id = p.register("ada@example.com", "hunter2", "Ada").await.unwrap();
        let authed = p.authenticate("ada@example.com", "hunter2").await.unwrap();
        assert_eq!(authed.id, id.id);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let p = provider();
        p.register("ada@example.com", "hunter2", "Ada").await.unwrap();
        assert!(matches!(
            p.register("ada@example.com", "other", "Ada II").await,
            Err(AuthError::AlreadyExists)
        ));
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let p = provider();
        p.register("ada@example.com", "hunter2", "Ada").await.unwrap();
        assert!(matches!(
            p.authenticate("ada@example.com", "wrong").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            p.authenticate("nobody@example.com", "hunter2").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn issued_token_round_trips() {
        let p = provider();
        let id = p.register("ada@example.com", "hunter2", "Ada").await.unwrap();
        let token = p.issue_token(&id).unwrap();
        let verified = p.validate_token(&token).unwrap();
        assert_eq!(verified.id, id.id);
        assert_eq!(verified.email, "ada@example.com");
    }

    #[tokio::test]
    async fn change_password_requires_old_password() {
        let p = provider();
        let id = p.register("ada@example.com", "hunter2", "Ada").await.unwrap();

        assert!(matches!(
            p.change_password(&id.id, "wrong", "newpass").await,
            Err(AuthError::InvalidCredentials)
        ));

        p.change_password(&id.id, "hunter2", "newpass").await.unwrap();
        assert!(p.authenticate("ada@example.com", "newpass").await.is_ok());
        assert!(matches!(
            p.authenticate("ada@example.com", "hunter2").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn delete_identity_removes_credentials() {
        let p = provider();
        let id = p.register("ada@example.com", "hunter2", "Ada").await.unwrap();
        p.delete_identity(&id.id).await.unwrap();
        assert!(matches!(
            p.delete_identity(&id.id).await,
            Err(AuthError::NotFound)
        ));
        assert!(matches!(
            p.authenticate("ada@example.com", "hunter2").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn refresh_is_unsupported() {
        assert!(matches!(
            provider().refresh_token("anything"),
            Err(AuthError::Unsupported)
        ));
    }
}

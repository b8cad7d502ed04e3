//! HS256 session tokens for the custom provider.
//!
//! Claims carry identity only (`sub`, `email`, `name`). Authorization data is
//! looked up fresh from the data store on every request, so nothing here needs
//! revocation when a role changes or a user is deactivated.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthError, Identity};

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

/// Sign a session token for `identity`, valid for `ttl_hours` from now.
pub fn issue(identity: &Identity, secret: &str, ttl_hours: i64) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = SessionClaims {
        sub: identity.id.clone(),
        email: identity.email.clone(),
        name: identity.name.clone(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(ttl_hours)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Crypto(e.to_string()))
}

/// Verify signature and expiry, returning the identity the token proves.
pub fn validate(token: &str, secret: &str) -> Result<Identity, AuthError> {
    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::TokenInvalid(e.to_string()),
    })?;

    Ok(Identity {
        id: data.claims.sub,
        email: data.claims.email,
        name: data.claims.name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    fn identity() -> Identity {
        Identity {
            id: "user_1".into(),
            email: "ada@example.com".into(),
            name: "Ada".into(),
        }
    }

    #[test]
    fn issue_then_validate_round_trips_identity() {
        let token = issue(&identity(), SECRET, 24).unwrap();
        let verified = validate(&token, SECRET).unwrap();
        assert_eq!(verified.id, "user_1");
        assert_eq!(verified.email, "ada@example.com");
        assert_eq!(verified.name, "Ada");
    }

    #[test]
    fn expired_token_is_rejected_as_expired() {
        // Issue a token already past its expiry (beyond the default leeway).
        let token = issue(&identity(), SECRET, -2).unwrap();
        assert!(matches!(
            validate(&token, SECRET),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn wrong_secret_is_rejected_as_invalid() {
        let token = issue(&identity(), SECRET, 24).unwrap();
        assert!(matches!(
            validate(&token, "some-other-secret"),
            Err(AuthError::TokenInvalid(_))
        ));
    }

    #[test]
    fn garbage_is_rejected_as_invalid() {
        assert!(matches!(
            validate("not-a-jwt", SECRET),
            Err(AuthError::TokenInvalid(_))
        ));
    }
}

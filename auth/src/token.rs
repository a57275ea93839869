//! Stateless bearer tokens.

use crate::error::AuthError;
use chrono::{Duration, Utc};
use gatherly_core::UserId;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject: the user id.
    sub: Uuid,
    /// Issued-at, seconds since the epoch.
    iat: i64,
    /// Expiry, seconds since the epoch.
    exp: i64,
}

/// Issues and verifies HS256 access tokens.
///
/// Tokens are stateless: there is no revocation list, so the ttl is the
/// only bound on a stolen token's lifetime.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    /// Build a service over a shared secret and token lifetime.
    #[must_use]
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Issue a signed token for the given user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::TokenInvalid`] if signing fails.
    pub fn issue(&self, user_id: UserId) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.0,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| AuthError::TokenInvalid)
    }

    /// Verify a token's signature and expiry, returning its subject.
    ///
    /// # Errors
    ///
    /// - [`AuthError::TokenExpired`] if the expiry is in the past.
    /// - [`AuthError::TokenInvalid`] for any other verification failure.
    pub fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation).map_err(
            |err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid,
            },
        )?;
        Ok(UserId::from_uuid(data.claims.sub))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn issue_then_verify_round_trips() {
        let service = TokenService::new("test-secret", Duration::hours(1));
        let user_id = UserId::new();
        let token = service.issue(user_id).unwrap();
        assert_eq!(service.verify(&token).unwrap(), user_id);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let issuer = TokenService::new("secret-a", Duration::hours(1));
        let verifier = TokenService::new("secret-b", Duration::hours(1));
        let token = issuer.issue(UserId::new()).unwrap();
        assert!(matches!(
            verifier.verify(&token),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        // Well past the verifier's clock-skew leeway.
        let service = TokenService::new("test-secret", Duration::seconds(-3600));
        let token = service.issue(UserId::new()).unwrap();
        assert!(matches!(
            service.verify(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        let service = TokenService::new("test-secret", Duration::hours(1));
        assert!(matches!(
            service.verify("not.a.token"),
            Err(AuthError::TokenInvalid)
        ));
    }
}

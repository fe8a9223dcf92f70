//! HS256 token issuance and verification built on `jsonwebtoken`.
//!
//! Two token families exist: access tokens (login sessions, carry user idx +
//! role) and email tokens (password recovery, carry a verified email). They
//! use distinct claim shapes, so one cannot be decoded as the other.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use calenduck_core::UserIdx;

use crate::{AccessClaims, EmailClaims, Role, TokenValidationError};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to encode token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("invalid token")]
    Decode(#[source] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Window(#[from] TokenValidationError),
}

/// Verifier seam used by the HTTP auth middleware.
pub trait AccessTokenValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<AccessClaims, TokenError>;
}

/// HS256 issuer/validator around a shared secret.
pub struct Hs256Tokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    email_ttl: Duration,
}

impl Hs256Tokens {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            access_ttl: Duration::hours(1),
            email_ttl: Duration::minutes(10),
        }
    }

    /// Issue an access token for a logged-in user.
    pub fn issue_access(
        &self,
        sub: UserIdx,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        self.encode(&AccessClaims {
            sub,
            role,
            issued_at: now,
            expires_at: now + self.access_ttl,
        })
    }

    /// Issue an email-scoped token for the password-reset leg.
    pub fn issue_email(&self, email: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        self.encode(&EmailClaims {
            email: email.to_string(),
            issued_at: now,
            expires_at: now + self.email_ttl,
        })
    }

    pub fn validate_access(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<AccessClaims, TokenError> {
        let claims: AccessClaims = self.decode(token)?;
        claims.validate(now)?;
        Ok(claims)
    }

    pub fn validate_email(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<EmailClaims, TokenError> {
        let claims: EmailClaims = self.decode(token)?;
        claims.validate(now)?;
        Ok(claims)
    }

    fn encode<C: Serialize>(&self, claims: &C) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(TokenError::Encode)
    }

    fn decode<C: DeserializeOwned>(&self, token: &str) -> Result<C, TokenError> {
        // Expiry is checked against the claim window in `claims`, not by the
        // decoder: the claims use RFC3339 timestamps rather than numeric `exp`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims = Default::default();

        jsonwebtoken::decode::<C>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(TokenError::Decode)
    }
}

impl AccessTokenValidator for Hs256Tokens {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<AccessClaims, TokenError> {
        self.validate_access(token, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> Hs256Tokens {
        Hs256Tokens::new(b"test-secret")
    }

    #[test]
    fn access_token_round_trip() {
        let t = tokens();
        let now = Utc::now();
        let jwt = t.issue_access(UserIdx::new(7), Role::admin(), now).unwrap();

        let claims = t.validate_access(&jwt, now).unwrap();
        assert_eq!(claims.sub, UserIdx::new(7));
        assert!(claims.role.is_admin());
    }

    #[test]
    fn access_token_expires() {
        let t = tokens();
        let now = Utc::now();
        let jwt = t.issue_access(UserIdx::new(7), Role::user(), now).unwrap();

        let later = now + Duration::hours(2);
        let err = t.validate_access(&jwt, later).unwrap_err();
        assert!(matches!(
            err,
            TokenError::Window(TokenValidationError::Expired)
        ));
    }

    #[test]
    fn wrong_secret_rejected() {
        let now = Utc::now();
        let jwt = tokens()
            .issue_access(UserIdx::new(1), Role::user(), now)
            .unwrap();

        let other = Hs256Tokens::new(b"other-secret");
        assert!(matches!(
            other.validate_access(&jwt, now),
            Err(TokenError::Decode(_))
        ));
    }

    #[test]
    fn email_token_is_not_an_access_token() {
        let t = tokens();
        let now = Utc::now();
        let jwt = t.issue_email("duck@example.com", now).unwrap();

        assert!(t.validate_access(&jwt, now).is_err());

        let claims = t.validate_email(&jwt, now).unwrap();
        assert_eq!(claims.email, "duck@example.com");
    }
}

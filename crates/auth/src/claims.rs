use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use calenduck_core::UserIdx;

use crate::Role;

/// Claims carried by an access token (transport-agnostic).
///
/// This is the minimal set of claims the service expects once a token has
/// been decoded/verified by the transport/security layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: the authenticated user's row idx.
    pub sub: UserIdx,

    /// Role granted to the user (e.g. "user", "admin").
    pub role: Role,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

/// Claims carried by an email-scoped token.
///
/// Issued by the password-recovery flow and accepted only by the
/// password-reset endpoint; it proves control of the email address, nothing
/// more.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailClaims {
    /// The verified email address.
    pub email: String,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate a token's time window.
///
/// Note: this validates the claims only. Signature verification/decoding is
/// handled by [`crate::token`].
pub fn validate_window(
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), TokenValidationError> {
    if expires_at <= issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

impl AccessClaims {
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
        validate_window(self.issued_at, self.expires_at, now)
    }
}

impl EmailClaims {
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
        validate_window(self.issued_at, self.expires_at, now)
    }
}

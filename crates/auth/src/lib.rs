//! `calenduck-auth` — authentication boundary (token issuance/verification).
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod roles;
pub mod token;

pub use claims::{AccessClaims, EmailClaims, TokenValidationError, validate_window};
pub use roles::Role;
pub use token::{AccessTokenValidator, Hs256Tokens, TokenError};

//! API-side authorization guard for admin endpoints.
//!
//! Role checks happen at the handler boundary, keeping stores auth-agnostic.

use axum::http::StatusCode;

use crate::app::errors;
use crate::context::AuthContext;

/// Check that the request was made with the admin role.
///
/// This is intended to be called at the top of every admin handler.
pub fn require_admin(ctx: &AuthContext) -> Result<(), axum::response::Response> {
    if ctx.is_admin() {
        return Ok(());
    }

    Err(errors::json_error(
        StatusCode::FORBIDDEN,
        "forbidden",
        "admin role required",
    ))
}

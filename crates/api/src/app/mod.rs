//! HTTP API application wiring (Axum router + store wiring).
//!
//! If you're new to Rust, this folder is structured like:
//! - `services.rs`: store wiring (Postgres/MongoDB/Redis, or in-memory)
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses
//! - `config.rs`: environment configuration

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use calenduck_auth::AccessTokenValidator;

use crate::middleware;

pub mod config;
pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Arc<services::AppServices>) -> Router {
    let jwt: Arc<dyn AccessTokenValidator> = services.tokens.clone();
    let auth_state = middleware::AuthState { jwt };

    // Protected routes: require a valid access token.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::users::public_router())
        .merge(protected)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}

use axum::{
    Router,
    routing::{delete, get},
};

pub mod asks;
pub mod interests;
pub mod notifications;
pub mod system;
pub mod users;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/users", delete(users::delete_account))
        .nest("/asks", asks::router())
        .nest("/interests", interests::router())
        .nest("/notifications", notifications::router())
}

//! Notification endpoints.
//!
//! Listing a page marks the whole unread set as read afterwards, so each
//! unread notification is shown at most once.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::get,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::AuthContext;
use crate::validation::{FieldKind, FieldRule, FieldRules, validate_fields};

const PAGE_RULES: &[FieldRule] = &[FieldRule::query("page", FieldKind::Number)];

pub fn router() -> Router {
    Router::new()
        .route(
            "/",
            get(list_notifications)
                .layer(from_fn_with_state(FieldRules(PAGE_RULES), validate_fields)),
        )
        .route("/counts", get(unread_count))
}

pub async fn list_notifications(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<dto::PageQuery>,
) -> axum::response::Response {
    let page = query.page.max(1);

    let list = match services
        .notifications
        .unread_page(ctx.user_idx(), page, services.page_size)
        .await
    {
        Ok(list) => list,
        Err(e) => return errors::store_error_to_response(e),
    };

    if list.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }

    if let Err(e) = services.notifications.mark_all_read(ctx.user_idx()).await {
        return errors::store_error_to_response(e);
    }

    (StatusCode::OK, Json(serde_json::json!({ "list": list }))).into_response()
}

pub async fn unread_count(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> axum::response::Response {
    match services.notifications.count_unread(ctx.user_idx()).await {
        Ok(count) => (
            StatusCode::OK,
            Json(serde_json::json!({ "notif_count": count })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

//! Inquiry ("ask") endpoints, including the admin-only category management
//! and reply flow.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{delete, get, post},
};

use calenduck_core::{AskIdx, CategoryIdx};
use calenduck_store::{NewAsk, NewNotification, NotificationData};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::AuthContext;
use crate::validation::{FieldKind, FieldRule, FieldRules, validate_fields};

const CREATE_ASK_RULES: &[FieldRule] = &[
    FieldRule::body("category_idx", FieldKind::Number),
    FieldRule::body("title", FieldKind::Text),
    FieldRule::body("contents", FieldKind::Text),
];

const CATEGORY_NAME_RULES: &[FieldRule] = &[FieldRule::body("name", FieldKind::Text)];

const IDX_PATH_RULES: &[FieldRule] = &[FieldRule::path("idx", FieldKind::Number)];

const REPLY_RULES: &[FieldRule] = &[
    FieldRule::path("idx", FieldKind::Number),
    FieldRule::body("reply", FieldKind::Text),
];

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_asks))
        .route(
            "/",
            post(create_ask).layer(from_fn_with_state(
                FieldRules(CREATE_ASK_RULES),
                validate_fields,
            )),
        )
        .route("/category", get(list_categories))
        .route(
            "/category",
            post(create_category).layer(from_fn_with_state(
                FieldRules(CATEGORY_NAME_RULES),
                validate_fields,
            )),
        )
        .route(
            "/category/:idx",
            delete(delete_category).layer(from_fn_with_state(
                FieldRules(IDX_PATH_RULES),
                validate_fields,
            )),
        )
        .route(
            "/:idx/reply",
            post(reply_to_ask).layer(from_fn_with_state(FieldRules(REPLY_RULES), validate_fields)),
        )
}

pub async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let categories = match services.asks.list_categories().await {
        Ok(categories) => categories,
        Err(e) => return errors::store_error_to_response(e),
    };

    if categories.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }

    let list = categories
        .iter()
        .map(dto::category_to_json)
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "list": list }))).into_response()
}

pub async fn list_asks(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> axum::response::Response {
    let asks = match services.asks.list_asks_for_user(ctx.user_idx()).await {
        Ok(asks) => asks,
        Err(e) => return errors::store_error_to_response(e),
    };

    if asks.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }

    let list = asks.iter().map(dto::ask_to_json).collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "list": list }))).into_response()
}

pub async fn create_ask(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<dto::CreateAskRequest>,
) -> axum::response::Response {
    let category_idx = CategoryIdx::new(body.category_idx);

    match services.asks.category_exists(category_idx).await {
        Ok(true) => {}
        Ok(false) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "unknown ask category");
        }
        Err(e) => return errors::store_error_to_response(e),
    }

    let ask = NewAsk {
        user_idx: ctx.user_idx(),
        category_idx,
        title: body.title,
        contents: body.contents,
    };

    match services.asks.create_ask(ask).await {
        Ok(idx) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "idx": idx.as_i32() })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<dto::CreateNameRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_admin(&ctx) {
        return resp;
    }

    match services.asks.create_category(&body.name).await {
        Ok(idx) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "idx": idx.as_i32() })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(idx): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_admin(&ctx) {
        return resp;
    }

    let idx: CategoryIdx = match errors::parse_idx(&idx) {
        Ok(idx) => idx,
        Err(resp) => return resp,
    };

    match services.asks.delete_category(idx).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Record the admin's reply and notify the asking user.
pub async fn reply_to_ask(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(idx): Path<String>,
    Json(body): Json<dto::ReplyRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_admin(&ctx) {
        return resp;
    }

    let idx: AskIdx = match errors::parse_idx(&idx) {
        Ok(idx) => idx,
        Err(resp) => return resp,
    };

    let ask = match services.asks.get_ask(idx).await {
        Ok(Some(ask)) => ask,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "unknown ask"),
        Err(e) => return errors::store_error_to_response(e),
    };

    if let Err(e) = services.asks.set_reply(idx, &body.reply).await {
        return errors::store_error_to_response(e);
    }

    let notification = NewNotification {
        user_idx: ask.user_idx,
        data: NotificationData {
            title: ask.title,
            contents: ask.contents,
            reply: Some(body.reply),
            interest: Some(ask.category_name),
        },
    };

    if let Err(e) = services.notifications.push(notification).await {
        return errors::store_error_to_response(e);
    }

    StatusCode::CREATED.into_response()
}

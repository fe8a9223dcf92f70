//! Interest-tag endpoints: the shared catalogue, per-user subscriptions, and
//! the admin-only catalogue management.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{delete, get, post},
};

use calenduck_core::InterestIdx;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::AuthContext;
use crate::validation::{FieldKind, FieldRule, FieldRules, validate_fields};

const NAME_RULES: &[FieldRule] = &[FieldRule::body("name", FieldKind::Text)];

const IDX_PATH_RULES: &[FieldRule] = &[FieldRule::path("idx", FieldKind::Number)];

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_my_interests))
        .route(
            "/",
            post(create_interest)
                .layer(from_fn_with_state(FieldRules(NAME_RULES), validate_fields)),
        )
        .route("/all", get(list_all_interests))
        .route(
            "/:idx",
            post(add_interest)
                .delete(remove_interest)
                .layer(from_fn_with_state(
                    FieldRules(IDX_PATH_RULES),
                    validate_fields,
                )),
        )
        .route(
            "/admin/:idx",
            delete(delete_interest).layer(from_fn_with_state(
                FieldRules(IDX_PATH_RULES),
                validate_fields,
            )),
        )
}

pub async fn list_all_interests(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let interests = match services.interests.list_all().await {
        Ok(interests) => interests,
        Err(e) => return errors::store_error_to_response(e),
    };

    if interests.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }

    let list = interests
        .iter()
        .map(dto::interest_to_json)
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "list": list }))).into_response()
}

pub async fn list_my_interests(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> axum::response::Response {
    let interests = match services.interests.list_for_user(ctx.user_idx()).await {
        Ok(interests) => interests,
        Err(e) => return errors::store_error_to_response(e),
    };

    if interests.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }

    let list = interests
        .iter()
        .map(dto::interest_to_json)
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "list": list }))).into_response()
}

pub async fn add_interest(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(idx): Path<String>,
) -> axum::response::Response {
    let idx: InterestIdx = match errors::parse_idx(&idx) {
        Ok(idx) => idx,
        Err(resp) => return resp,
    };

    match services.interests.add_for_user(ctx.user_idx(), idx).await {
        Ok(()) => StatusCode::CREATED.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn remove_interest(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(idx): Path<String>,
) -> axum::response::Response {
    let idx: InterestIdx = match errors::parse_idx(&idx) {
        Ok(idx) => idx,
        Err(resp) => return resp,
    };

    match services
        .interests
        .remove_for_user(ctx.user_idx(), idx)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_interest(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<dto::CreateNameRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_admin(&ctx) {
        return resp;
    }

    match services.interests.create(&body.name).await {
        Ok(idx) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "idx": idx.as_i32() })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_interest(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(idx): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_admin(&ctx) {
        return resp;
    }

    let idx: InterestIdx = match errors::parse_idx(&idx) {
        Ok(idx) => idx,
        Err(resp) => return resp,
    };

    match services.interests.delete(idx).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

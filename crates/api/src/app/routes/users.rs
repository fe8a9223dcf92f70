//! Account endpoints: signup, login, deletion, and the two recovery flows.
//!
//! Recovery is email-code based: a code previously stored for the address
//! must be presented before anything is revealed. Password reset then runs
//! on a short-lived email-scoped token, never an access token.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::{HeaderMap, StatusCode},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post, put},
};
use chrono::Utc;

use calenduck_core::fields;
use calenduck_store::NewAccount;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::AuthContext;
use crate::middleware;
use crate::validation::{FieldKind, FieldRule, FieldRules, validate_fields};

const SIGNUP_RULES: &[FieldRule] = &[
    FieldRule::body("id", FieldKind::LoginId),
    FieldRule::body("pw", FieldKind::Password),
    FieldRule::body("name", FieldKind::PersonName),
    FieldRule::body("email", FieldKind::Email),
];

const LOGIN_RULES: &[FieldRule] = &[
    FieldRule::body("id", FieldKind::LoginId),
    FieldRule::body("pw", FieldKind::Password),
];

const CHECK_ID_RULES: &[FieldRule] = &[FieldRule::query("id", FieldKind::LoginId)];

const FIND_ID_RULES: &[FieldRule] = &[
    FieldRule::body("name", FieldKind::PersonName),
    FieldRule::body("email", FieldKind::Email),
    FieldRule::body("verification_code", FieldKind::Text),
];

const FIND_PW_RULES: &[FieldRule] = &[
    FieldRule::body("name", FieldKind::PersonName),
    FieldRule::body("id", FieldKind::LoginId),
    FieldRule::body("email", FieldKind::Email),
    FieldRule::body("verification_code", FieldKind::Text),
];

const RESET_PW_RULES: &[FieldRule] = &[FieldRule::body("pw", FieldKind::Password)];

/// Routes that work without an access token.
pub fn public_router() -> Router {
    Router::new()
        .route(
            "/users",
            post(signup).layer(from_fn_with_state(FieldRules(SIGNUP_RULES), validate_fields)),
        )
        .route(
            "/users/check-id",
            get(check_id).layer(from_fn_with_state(
                FieldRules(CHECK_ID_RULES),
                validate_fields,
            )),
        )
        .route(
            "/users/login",
            post(login).layer(from_fn_with_state(FieldRules(LOGIN_RULES), validate_fields)),
        )
        .route(
            "/users/id/find",
            post(find_login_id).layer(from_fn_with_state(
                FieldRules(FIND_ID_RULES),
                validate_fields,
            )),
        )
        .route(
            "/users/pw/find",
            post(find_password).layer(from_fn_with_state(
                FieldRules(FIND_PW_RULES),
                validate_fields,
            )),
        )
        .route(
            "/users/pw",
            put(reset_password).layer(from_fn_with_state(
                FieldRules(RESET_PW_RULES),
                validate_fields,
            )),
        )
}

pub async fn signup(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::SignupRequest>,
) -> axum::response::Response {
    let pw_hash = match hash_password(&body.pw) {
        Ok(hash) => hash,
        Err(resp) => return resp,
    };

    let account = NewAccount {
        login_id: body.id,
        pw_hash,
        name: body.name,
        email: fields::normalize_email(&body.email),
    };

    match services.accounts.create(account).await {
        Ok(idx) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "idx": idx.as_i32() })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn check_id(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::CheckIdQuery>,
) -> axum::response::Response {
    match services.accounts.login_id_taken(&query.id).await {
        Ok(true) => errors::json_error(StatusCode::CONFLICT, "conflict", "login id already in use"),
        Ok(false) => StatusCode::OK.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    let credential = match services.accounts.credential_by_login_id(&body.id).await {
        Ok(Some(credential)) => credential,
        Ok(None) => return invalid_credentials(),
        Err(e) => return errors::store_error_to_response(e),
    };

    match bcrypt::verify(&body.pw, &credential.pw_hash) {
        Ok(true) => {}
        Ok(false) => return invalid_credentials(),
        Err(e) => {
            tracing::error!(error = %e, "bcrypt verify failed");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "hash_error",
                "failed to verify password",
            );
        }
    }

    let token = match services.tokens.issue_access(
        credential.user_idx,
        credential.role.clone(),
        Utc::now(),
    ) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "failed to issue access token");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "token_error",
                "failed to issue token",
            );
        }
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({ "access_token": token })),
    )
        .into_response()
}

pub async fn delete_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> axum::response::Response {
    match services.accounts.delete(ctx.user_idx()).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn find_login_id(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::FindIdRequest>,
) -> axum::response::Response {
    let email = fields::normalize_email(&body.email);

    match code_matches(&services, &email, &body.verification_code).await {
        Ok(true) => {}
        Ok(false) => return invalid_verification_code(),
        Err(resp) => return resp,
    }

    match services.accounts.find_login_id(&body.name, &email).await {
        Ok(Some(id)) => (StatusCode::OK, Json(serde_json::json!({ "id": id }))).into_response(),
        Ok(None) => {
            errors::json_error(StatusCode::UNAUTHORIZED, "unauthorized", "no matching account")
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn find_password(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::FindPwRequest>,
) -> axum::response::Response {
    let email = fields::normalize_email(&body.email);

    match code_matches(&services, &email, &body.verification_code).await {
        Ok(true) => {}
        Ok(false) => return invalid_verification_code(),
        Err(resp) => return resp,
    }

    let account_email = match services
        .accounts
        .recovery_email(&body.name, &body.id, &email)
        .await
    {
        Ok(Some(account_email)) => account_email,
        Ok(None) => {
            return errors::json_error(
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "no matching account",
            );
        }
        Err(e) => return errors::store_error_to_response(e),
    };

    match services.tokens.issue_email(&account_email, Utc::now()) {
        Ok(token) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "email_token": token })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to issue email token");
            errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "token_error",
                "failed to issue token",
            )
        }
    }
}

pub async fn reset_password(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Json(body): Json<dto::ResetPasswordRequest>,
) -> axum::response::Response {
    let token = match middleware::extract_bearer(&headers) {
        Ok(token) => token,
        Err(status) => return errors::json_error(status, "unauthorized", "email token required"),
    };

    let claims = match services.tokens.validate_email(token, Utc::now()) {
        Ok(claims) => claims,
        Err(_) => {
            return errors::json_error(
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "invalid email token",
            );
        }
    };

    let pw_hash = match hash_password(&body.pw) {
        Ok(hash) => hash,
        Err(resp) => return resp,
    };

    match services
        .accounts
        .update_password_by_email(&claims.email, &pw_hash)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn code_matches(
    services: &AppServices,
    email: &str,
    code: &str,
) -> Result<bool, axum::response::Response> {
    match services.verification.fetch_code(email).await {
        Ok(Some(stored)) => Ok(stored == code),
        Ok(None) => Ok(false),
        Err(e) => Err(errors::store_error_to_response(e)),
    }
}

fn hash_password(pw: &str) -> Result<String, axum::response::Response> {
    bcrypt::hash(pw, bcrypt::DEFAULT_COST).map_err(|e| {
        tracing::error!(error = %e, "bcrypt hash failed");
        errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "hash_error",
            "failed to hash password",
        )
    })
}

fn invalid_credentials() -> axum::response::Response {
    errors::json_error(StatusCode::UNAUTHORIZED, "unauthorized", "invalid credentials")
}

fn invalid_verification_code() -> axum::response::Response {
    errors::json_error(
        StatusCode::UNAUTHORIZED,
        "unauthorized",
        "missing or mismatched verification code",
    )
}

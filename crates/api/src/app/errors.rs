use std::str::FromStr;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use calenduck_core::DomainError;
use calenduck_store::StoreError;

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        StoreError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        StoreError::Connection(msg) | StoreError::Query(msg) | StoreError::Serialization(msg) => {
            tracing::error!(error = %msg, "store failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "internal storage failure",
            )
        }
    }
}

/// Parse a path segment into a typed row idx (positive i32).
pub fn parse_idx<T>(s: &str) -> Result<T, axum::response::Response>
where
    T: FromStr<Err = DomainError>,
{
    s.parse()
        .map_err(|e: DomainError| json_error(StatusCode::BAD_REQUEST, "invalid_id", e.to_string()))
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

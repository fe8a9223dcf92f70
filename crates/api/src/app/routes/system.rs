use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(
    Extension(ctx): Extension<crate::context::AuthContext>,
) -> impl IntoResponse {
    Json(serde_json::json!({
        "user_idx": ctx.user_idx().as_i32(),
        "role": ctx.role().as_str(),
    }))
}

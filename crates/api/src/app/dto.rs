use serde::Deserialize;
use serde_json::{Value, json};

use calenduck_store::{Ask, AskCategory, Interest};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub id: String,
    pub pw: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub id: String,
    pub pw: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckIdQuery {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct FindIdRequest {
    pub name: String,
    pub email: String,
    pub verification_code: String,
}

#[derive(Debug, Deserialize)]
pub struct FindPwRequest {
    pub name: String,
    pub id: String,
    pub email: String,
    pub verification_code: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub pw: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateAskRequest {
    pub category_idx: i32,
    pub title: String,
    pub contents: String,
}

#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    pub reply: String,
}

/// Shared by admin category and interest creation.
#[derive(Debug, Deserialize)]
pub struct CreateNameRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: u32,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn category_to_json(category: &AskCategory) -> Value {
    json!({
        "idx": category.idx.as_i32(),
        "name": category.name,
    })
}

pub fn interest_to_json(interest: &Interest) -> Value {
    json!({
        "idx": interest.idx.as_i32(),
        "name": interest.name,
    })
}

pub fn ask_to_json(ask: &Ask) -> Value {
    json!({
        "idx": ask.idx.as_i32(),
        "category_idx": ask.category_idx.as_i32(),
        "category_name": ask.category_name,
        "title": ask.title,
        "contents": ask.contents,
        "reply": ask.reply,
        "created_at": ask.created_at,
    })
}

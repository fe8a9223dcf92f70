//! Declarative request-field validation.
//!
//! Each route attaches a rule list naming the fields that must appear in
//! the JSON body, the path, or the query string, and the format each field
//! must satisfy. The middleware rejects the request with 400 before the
//! handler runs, so handlers can assume well-formed input.

use std::collections::HashMap;

use axum::{
    extract::{Query, RawPathParams, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use serde_json::Value;

use calenduck_core::{DomainError, DomainResult, fields};

use crate::app::errors;

/// Bodies are small JSON documents; anything bigger is rejected outright.
const BODY_LIMIT: usize = 16 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLocation {
    Body,
    Path,
    Query,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// An integer (JSON number, or a string of digits in path/query).
    Number,
    /// Non-blank free text.
    Text,
    LoginId,
    Password,
    Email,
    PersonName,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub location: FieldLocation,
    pub kind: FieldKind,
}

impl FieldRule {
    pub const fn body(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            location: FieldLocation::Body,
            kind,
        }
    }

    pub const fn path(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            location: FieldLocation::Path,
            kind,
        }
    }

    pub const fn query(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            location: FieldLocation::Query,
            kind,
        }
    }
}

/// State handed to [`validate_fields`] via `from_fn_with_state`.
#[derive(Debug, Clone, Copy)]
pub struct FieldRules(pub &'static [FieldRule]);

pub async fn validate_fields(
    State(rules): State<FieldRules>,
    params: RawPathParams,
    Query(query): Query<HashMap<String, String>>,
    req: Request,
    next: Next,
) -> Response {
    let needs_body = rules
        .0
        .iter()
        .any(|rule| rule.location == FieldLocation::Body);

    // Buffer the body so it can be validated here and still reach the handler.
    let (parts, body) = req.into_parts();
    let bytes = match axum::body::to_bytes(body, BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return errors::json_error(
                StatusCode::PAYLOAD_TOO_LARGE,
                "body_too_large",
                "request body too large",
            );
        }
    };

    let json: Option<Value> = if needs_body {
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(_) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_body",
                    "request body must be a JSON object",
                );
            }
        }
    } else {
        None
    };

    for rule in rules.0 {
        let checked = match rule.location {
            FieldLocation::Body => json
                .as_ref()
                .and_then(|value| value.get(rule.name))
                .map(|value| check_json(rule.kind, value)),
            FieldLocation::Path => params
                .iter()
                .find(|(name, _)| *name == rule.name)
                .map(|(_, value)| check_str(rule.kind, value)),
            FieldLocation::Query => query
                .get(rule.name)
                .map(|value| check_str(rule.kind, value)),
        };

        match checked {
            Some(Ok(())) => {}
            Some(Err(err)) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_field",
                    format!("{}: {}", rule.name, err),
                );
            }
            None => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_field",
                    format!("missing field: {}", rule.name),
                );
            }
        }
    }

    let req = Request::from_parts(parts, axum::body::Body::from(bytes));
    next.run(req).await
}

fn check_str(kind: FieldKind, value: &str) -> DomainResult<()> {
    match kind {
        FieldKind::Number => value
            .parse::<i64>()
            .map(|_| ())
            .map_err(|_| DomainError::validation("must be an integer")),
        FieldKind::Text => {
            if value.trim().is_empty() {
                Err(DomainError::validation("must not be blank"))
            } else {
                Ok(())
            }
        }
        FieldKind::LoginId => fields::ensure_login_id(value),
        FieldKind::Password => fields::ensure_password(value),
        FieldKind::Email => fields::ensure_email(value),
        FieldKind::PersonName => fields::ensure_person_name(value),
    }
}

fn check_json(kind: FieldKind, value: &Value) -> DomainResult<()> {
    match kind {
        FieldKind::Number => {
            if value.is_i64() || value.is_u64() {
                Ok(())
            } else {
                Err(DomainError::validation("must be an integer"))
            }
        }
        _ => match value.as_str() {
            Some(s) => check_str(kind, s),
            None => Err(DomainError::validation("must be a string")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn number_fields_accept_integers_only() {
        assert!(check_json(FieldKind::Number, &json!(3)).is_ok());
        assert!(check_json(FieldKind::Number, &json!(3.5)).is_err());
        assert!(check_json(FieldKind::Number, &json!("3")).is_err());

        assert!(check_str(FieldKind::Number, "42").is_ok());
        assert!(check_str(FieldKind::Number, "forty-two").is_err());
    }

    #[test]
    fn text_fields_reject_blank_strings() {
        assert!(check_json(FieldKind::Text, &json!("hello")).is_ok());
        assert!(check_json(FieldKind::Text, &json!("   ")).is_err());
        assert!(check_json(FieldKind::Text, &json!(7)).is_err());
    }

    #[test]
    fn format_kinds_delegate_to_field_rules() {
        assert!(check_json(FieldKind::LoginId, &json!("duck1234")).is_ok());
        assert!(check_json(FieldKind::LoginId, &json!("no")).is_err());

        assert!(check_json(FieldKind::Email, &json!("duck@example.com")).is_ok());
        assert!(check_json(FieldKind::Email, &json!("not-an-email")).is_err());
    }

    #[test]
    fn failures_name_the_broken_rule() {
        let err = check_str(FieldKind::LoginId, "no").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(err.to_string().contains("login id"));

        let err = check_str(FieldKind::Password, "password").unwrap_err();
        assert!(err.to_string().contains("special character"));
    }
}

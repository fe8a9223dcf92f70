use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier carried in access tokens.
///
/// Roles are intentionally opaque strings at this layer; the only role with
/// built-in meaning is `"admin"`, which gates the admin route tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn admin() -> Self {
        Self(Cow::Borrowed("admin"))
    }

    pub fn user() -> Self {
        Self(Cow::Borrowed("user"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_admin(&self) -> bool {
        self.as_str() == "admin"
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

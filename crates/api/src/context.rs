use calenduck_auth::Role;
use calenduck_core::UserIdx;

/// Authenticated identity for a request.
///
/// Inserted by the auth middleware and present for all protected routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    user_idx: UserIdx,
    role: Role,
}

impl AuthContext {
    pub fn new(user_idx: UserIdx, role: Role) -> Self {
        Self { user_idx, role }
    }

    pub fn user_idx(&self) -> UserIdx {
        self.user_idx
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

//! User accounts and login credentials.
//!
//! Passwords enter this layer pre-hashed; verification happens at the HTTP
//! layer so stores only ever see opaque hash strings.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;

use calenduck_auth::Role;
use calenduck_core::UserIdx;

use crate::error::StoreError;

/// Fields required to open an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub login_id: String,
    pub pw_hash: String,
    pub name: String,
    /// Already normalized (trimmed, lowercased).
    pub email: String,
}

/// What the login handler needs to verify a password attempt.
#[derive(Debug, Clone)]
pub struct Credential {
    pub user_idx: UserIdx,
    pub role: Role,
    pub pw_hash: String,
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Create the login row and user row together; conflicts on a duplicate
    /// login id or email.
    async fn create(&self, account: NewAccount) -> Result<UserIdx, StoreError>;

    async fn login_id_taken(&self, login_id: &str) -> Result<bool, StoreError>;

    async fn credential_by_login_id(
        &self,
        login_id: &str,
    ) -> Result<Option<Credential>, StoreError>;

    /// Recover a forgotten login id from name + email.
    async fn find_login_id(&self, name: &str, email: &str) -> Result<Option<String>, StoreError>;

    /// Confirm that (name, login id, email) all belong to one account and
    /// return its stored email.
    async fn recovery_email(
        &self,
        name: &str,
        login_id: &str,
        email: &str,
    ) -> Result<Option<String>, StoreError>;

    async fn update_password_by_email(
        &self,
        email: &str,
        pw_hash: &str,
    ) -> Result<(), StoreError>;

    /// Delete the account (login credentials and user row).
    async fn delete(&self, user: UserIdx) -> Result<(), StoreError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory implementation (dev/test)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct AccountRow {
    login_id: String,
    pw_hash: String,
    name: String,
    email: String,
    role: Role,
}

pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<UserIdx, AccountRow>>,
    next_idx: AtomicI32,
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            next_idx: AtomicI32::new(1),
        }
    }

    /// Test helper: create an account with an explicit role.
    pub fn insert_with_role(&self, account: NewAccount, role: Role) -> UserIdx {
        let idx = UserIdx::new(self.next_idx.fetch_add(1, Ordering::SeqCst));
        self.accounts.write().unwrap().insert(
            idx,
            AccountRow {
                login_id: account.login_id,
                pw_hash: account.pw_hash,
                name: account.name,
                email: account.email,
                role,
            },
        );
        idx
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn create(&self, account: NewAccount) -> Result<UserIdx, StoreError> {
        {
            let accounts = self.accounts.read().unwrap();
            if accounts.values().any(|a| a.login_id == account.login_id) {
                return Err(StoreError::conflict("login id already taken"));
            }
            if accounts.values().any(|a| a.email == account.email) {
                return Err(StoreError::conflict("email already registered"));
            }
        }
        Ok(self.insert_with_role(account, Role::user()))
    }

    async fn login_id_taken(&self, login_id: &str) -> Result<bool, StoreError> {
        let accounts = self.accounts.read().unwrap();
        Ok(accounts.values().any(|a| a.login_id == login_id))
    }

    async fn credential_by_login_id(
        &self,
        login_id: &str,
    ) -> Result<Option<Credential>, StoreError> {
        let accounts = self.accounts.read().unwrap();
        Ok(accounts.iter().find_map(|(idx, a)| {
            (a.login_id == login_id).then(|| Credential {
                user_idx: *idx,
                role: a.role.clone(),
                pw_hash: a.pw_hash.clone(),
            })
        }))
    }

    async fn find_login_id(&self, name: &str, email: &str) -> Result<Option<String>, StoreError> {
        let accounts = self.accounts.read().unwrap();
        Ok(accounts
            .values()
            .find(|a| a.name == name && a.email == email)
            .map(|a| a.login_id.clone()))
    }

    async fn recovery_email(
        &self,
        name: &str,
        login_id: &str,
        email: &str,
    ) -> Result<Option<String>, StoreError> {
        let accounts = self.accounts.read().unwrap();
        Ok(accounts
            .values()
            .find(|a| a.name == name && a.login_id == login_id && a.email == email)
            .map(|a| a.email.clone()))
    }

    async fn update_password_by_email(
        &self,
        email: &str,
        pw_hash: &str,
    ) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write().unwrap();
        let row = accounts
            .values_mut()
            .find(|a| a.email == email)
            .ok_or(StoreError::NotFound)?;
        row.pw_hash = pw_hash.to_string();
        Ok(())
    }

    async fn delete(&self, user: UserIdx) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write().unwrap();
        accounts.remove(&user).ok_or(StoreError::NotFound)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn duck() -> NewAccount {
        NewAccount {
            login_id: "duck123".into(),
            pw_hash: "$2b$fakehash".into(),
            name: "Duck".into(),
            email: "duck@example.com".into(),
        }
    }

    #[tokio::test]
    async fn create_then_lookup_credential() {
        let store = InMemoryAccountStore::new();
        let idx = store.create(duck()).await.unwrap();

        let cred = store
            .credential_by_login_id("duck123")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cred.user_idx, idx);
        assert_eq!(cred.pw_hash, "$2b$fakehash");
        assert!(!cred.role.is_admin());
    }

    #[tokio::test]
    async fn duplicate_login_id_conflicts() {
        let store = InMemoryAccountStore::new();
        store.create(duck()).await.unwrap();

        let mut again = duck();
        again.email = "other@example.com".into();
        assert!(matches!(
            store.create(again).await,
            Err(StoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = InMemoryAccountStore::new();
        store.create(duck()).await.unwrap();

        let mut again = duck();
        again.login_id = "goose456".into();
        assert!(matches!(
            store.create(again).await,
            Err(StoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn default_store_mints_positive_indexes() {
        let store = InMemoryAccountStore::default();
        let idx = store.create(duck()).await.unwrap();
        assert_eq!(idx.as_i32(), 1);
    }

    #[tokio::test]
    async fn recovery_requires_all_three_fields_to_match() {
        let store = InMemoryAccountStore::new();
        store.create(duck()).await.unwrap();

        assert_eq!(
            store
                .find_login_id("Duck", "duck@example.com")
                .await
                .unwrap()
                .as_deref(),
            Some("duck123")
        );
        assert!(
            store
                .recovery_email("Duck", "duck123", "duck@example.com")
                .await
                .unwrap()
                .is_some()
        );
        assert!(
            store
                .recovery_email("Goose", "duck123", "duck@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn password_update_and_delete() {
        let store = InMemoryAccountStore::new();
        let idx = store.create(duck()).await.unwrap();

        store
            .update_password_by_email("duck@example.com", "$2b$newhash")
            .await
            .unwrap();
        let cred = store
            .credential_by_login_id("duck123")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cred.pw_hash, "$2b$newhash");

        store.delete(idx).await.unwrap();
        assert!(
            store
                .credential_by_login_id("duck123")
                .await
                .unwrap()
                .is_none()
        );
        assert!(matches!(
            store.delete(idx).await,
            Err(StoreError::NotFound)
        ));
    }
}

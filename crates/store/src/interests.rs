//! Interest tags and user↔interest links.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use serde::Serialize;

use calenduck_core::{InterestIdx, UserIdx};

use crate::error::StoreError;

/// A followable interest tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interest {
    pub idx: InterestIdx,
    pub name: String,
}

#[async_trait]
pub trait InterestStore: Send + Sync {
    /// All interests, ordered by idx.
    async fn list_all(&self) -> Result<Vec<Interest>, StoreError>;

    /// Create an interest; conflicts on a duplicate name.
    async fn create(&self, name: &str) -> Result<InterestIdx, StoreError>;

    /// Remove an interest together with every user link to it.
    async fn delete(&self, idx: InterestIdx) -> Result<(), StoreError>;

    async fn exists(&self, idx: InterestIdx) -> Result<bool, StoreError>;

    /// The user's followed interests, ordered by name.
    async fn list_for_user(&self, user: UserIdx) -> Result<Vec<Interest>, StoreError>;

    /// Link an interest to a user; conflicts when already linked.
    async fn add_for_user(&self, user: UserIdx, idx: InterestIdx) -> Result<(), StoreError>;

    /// Unlink. Idempotent: unlinking an absent pair succeeds.
    async fn remove_for_user(&self, user: UserIdx, idx: InterestIdx) -> Result<(), StoreError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory implementation (dev/test)
// ─────────────────────────────────────────────────────────────────────────────

pub struct InMemoryInterestStore {
    interests: RwLock<HashMap<InterestIdx, String>>,
    links: RwLock<HashSet<(UserIdx, InterestIdx)>>,
    next_idx: AtomicI32,
}

impl Default for InMemoryInterestStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryInterestStore {
    pub fn new() -> Self {
        Self {
            interests: RwLock::new(HashMap::new()),
            links: RwLock::new(HashSet::new()),
            next_idx: AtomicI32::new(1),
        }
    }
}

#[async_trait]
impl InterestStore for InMemoryInterestStore {
    async fn list_all(&self) -> Result<Vec<Interest>, StoreError> {
        let interests = self.interests.read().unwrap();
        let mut list: Vec<Interest> = interests
            .iter()
            .map(|(idx, name)| Interest {
                idx: *idx,
                name: name.clone(),
            })
            .collect();
        list.sort_by_key(|i| i.idx);
        Ok(list)
    }

    async fn create(&self, name: &str) -> Result<InterestIdx, StoreError> {
        let mut interests = self.interests.write().unwrap();
        if interests.values().any(|n| n == name) {
            return Err(StoreError::conflict(format!(
                "interest already exists: {name}"
            )));
        }
        let idx = InterestIdx::new(self.next_idx.fetch_add(1, Ordering::SeqCst));
        interests.insert(idx, name.to_string());
        Ok(idx)
    }

    async fn delete(&self, idx: InterestIdx) -> Result<(), StoreError> {
        let mut interests = self.interests.write().unwrap();
        if interests.remove(&idx).is_none() {
            return Err(StoreError::NotFound);
        }
        self.links.write().unwrap().retain(|(_, i)| *i != idx);
        Ok(())
    }

    async fn exists(&self, idx: InterestIdx) -> Result<bool, StoreError> {
        Ok(self.interests.read().unwrap().contains_key(&idx))
    }

    async fn list_for_user(&self, user: UserIdx) -> Result<Vec<Interest>, StoreError> {
        let interests = self.interests.read().unwrap();
        let links = self.links.read().unwrap();
        let mut list: Vec<Interest> = links
            .iter()
            .filter(|(u, _)| *u == user)
            .filter_map(|(_, idx)| {
                interests.get(idx).map(|name| Interest {
                    idx: *idx,
                    name: name.clone(),
                })
            })
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }

    async fn add_for_user(&self, user: UserIdx, idx: InterestIdx) -> Result<(), StoreError> {
        if !self.interests.read().unwrap().contains_key(&idx) {
            return Err(StoreError::NotFound);
        }
        let mut links = self.links.write().unwrap();
        if !links.insert((user, idx)) {
            return Err(StoreError::conflict(format!(
                "interest {idx} already linked"
            )));
        }
        Ok(())
    }

    async fn remove_for_user(&self, user: UserIdx, idx: InterestIdx) -> Result<(), StoreError> {
        self.links.write().unwrap().remove(&(user, idx));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn links_are_per_user_and_sorted_by_name() {
        let store = InMemoryInterestStore::new();
        let cooking = store.create("cooking").await.unwrap();
        let astronomy = store.create("astronomy").await.unwrap();
        let user = UserIdx::new(1);

        store.add_for_user(user, cooking).await.unwrap();
        store.add_for_user(user, astronomy).await.unwrap();
        store
            .add_for_user(UserIdx::new(2), cooking)
            .await
            .unwrap();

        let mine = store.list_for_user(user).await.unwrap();
        assert_eq!(
            mine.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
            vec!["astronomy", "cooking"]
        );
    }

    #[tokio::test]
    async fn duplicate_link_conflicts() {
        let store = InMemoryInterestStore::new();
        let idx = store.create("hiking").await.unwrap();
        let user = UserIdx::new(1);

        store.add_for_user(user, idx).await.unwrap();
        assert!(matches!(
            store.add_for_user(user, idx).await,
            Err(StoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn linking_unknown_interest_is_not_found() {
        let store = InMemoryInterestStore::new();
        assert!(matches!(
            store.add_for_user(UserIdx::new(1), InterestIdx::new(42)).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn unlink_is_idempotent() {
        let store = InMemoryInterestStore::new();
        let idx = store.create("running").await.unwrap();
        let user = UserIdx::new(1);

        store.add_for_user(user, idx).await.unwrap();
        store.remove_for_user(user, idx).await.unwrap();
        store.remove_for_user(user, idx).await.unwrap();
        assert!(store.list_for_user(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_name_conflicts() {
        let store = InMemoryInterestStore::new();
        store.create("tea").await.unwrap();
        assert!(matches!(
            store.create("tea").await,
            Err(StoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn delete_removes_links_too() {
        let store = InMemoryInterestStore::new();
        let idx = store.create("chess").await.unwrap();
        let user = UserIdx::new(1);
        store.add_for_user(user, idx).await.unwrap();

        store.delete(idx).await.unwrap();
        assert!(!store.exists(idx).await.unwrap());
        assert!(store.list_for_user(user).await.unwrap().is_empty());
    }
}

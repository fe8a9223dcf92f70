//! Asks (user inquiries) and their categories.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use calenduck_core::{AskIdx, CategoryIdx, UserIdx};

use crate::error::StoreError;

/// A selectable inquiry category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AskCategory {
    pub idx: CategoryIdx,
    pub name: String,
}

/// A stored inquiry, joined with its category name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ask {
    pub idx: AskIdx,
    pub user_idx: UserIdx,
    pub category_idx: CategoryIdx,
    pub category_name: String,
    pub title: String,
    pub contents: String,
    pub reply: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields required to file a new inquiry.
#[derive(Debug, Clone)]
pub struct NewAsk {
    pub user_idx: UserIdx,
    pub category_idx: CategoryIdx,
    pub title: String,
    pub contents: String,
}

#[async_trait]
pub trait AskStore: Send + Sync {
    /// Non-deleted categories, ordered by idx.
    async fn list_categories(&self) -> Result<Vec<AskCategory>, StoreError>;

    async fn create_category(&self, name: &str) -> Result<CategoryIdx, StoreError>;

    /// Soft-delete: the category stops being listed but existing asks keep
    /// referencing it.
    async fn delete_category(&self, idx: CategoryIdx) -> Result<(), StoreError>;

    async fn category_exists(&self, idx: CategoryIdx) -> Result<bool, StoreError>;

    async fn create_ask(&self, ask: NewAsk) -> Result<AskIdx, StoreError>;

    /// The caller's inquiries, newest first.
    async fn list_asks_for_user(&self, user: UserIdx) -> Result<Vec<Ask>, StoreError>;

    async fn get_ask(&self, idx: AskIdx) -> Result<Option<Ask>, StoreError>;

    async fn set_reply(&self, idx: AskIdx, reply: &str) -> Result<(), StoreError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory implementation (dev/test)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct CategoryRow {
    name: String,
    is_deleted: bool,
}

pub struct InMemoryAskStore {
    categories: RwLock<HashMap<CategoryIdx, CategoryRow>>,
    asks: RwLock<HashMap<AskIdx, Ask>>,
    next_category: AtomicI32,
    next_ask: AtomicI32,
}

impl Default for InMemoryAskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAskStore {
    pub fn new() -> Self {
        Self {
            categories: RwLock::new(HashMap::new()),
            asks: RwLock::new(HashMap::new()),
            next_category: AtomicI32::new(1),
            next_ask: AtomicI32::new(1),
        }
    }
}

#[async_trait]
impl AskStore for InMemoryAskStore {
    async fn list_categories(&self) -> Result<Vec<AskCategory>, StoreError> {
        let categories = self.categories.read().unwrap();
        let mut list: Vec<AskCategory> = categories
            .iter()
            .filter(|(_, row)| !row.is_deleted)
            .map(|(idx, row)| AskCategory {
                idx: *idx,
                name: row.name.clone(),
            })
            .collect();
        list.sort_by_key(|c| c.idx);
        Ok(list)
    }

    async fn create_category(&self, name: &str) -> Result<CategoryIdx, StoreError> {
        let idx = CategoryIdx::new(self.next_category.fetch_add(1, Ordering::SeqCst));
        self.categories.write().unwrap().insert(
            idx,
            CategoryRow {
                name: name.to_string(),
                is_deleted: false,
            },
        );
        Ok(idx)
    }

    async fn delete_category(&self, idx: CategoryIdx) -> Result<(), StoreError> {
        let mut categories = self.categories.write().unwrap();
        match categories.get_mut(&idx) {
            Some(row) if !row.is_deleted => {
                row.is_deleted = true;
                Ok(())
            }
            _ => Err(StoreError::NotFound),
        }
    }

    async fn category_exists(&self, idx: CategoryIdx) -> Result<bool, StoreError> {
        let categories = self.categories.read().unwrap();
        Ok(categories.get(&idx).is_some_and(|row| !row.is_deleted))
    }

    async fn create_ask(&self, ask: NewAsk) -> Result<AskIdx, StoreError> {
        let category_name = {
            let categories = self.categories.read().unwrap();
            categories
                .get(&ask.category_idx)
                .map(|row| row.name.clone())
                .ok_or(StoreError::NotFound)?
        };

        let idx = AskIdx::new(self.next_ask.fetch_add(1, Ordering::SeqCst));
        self.asks.write().unwrap().insert(
            idx,
            Ask {
                idx,
                user_idx: ask.user_idx,
                category_idx: ask.category_idx,
                category_name,
                title: ask.title,
                contents: ask.contents,
                reply: None,
                created_at: Utc::now(),
            },
        );
        Ok(idx)
    }

    async fn list_asks_for_user(&self, user: UserIdx) -> Result<Vec<Ask>, StoreError> {
        let asks = self.asks.read().unwrap();
        let mut list: Vec<Ask> = asks
            .values()
            .filter(|a| a.user_idx == user)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.idx.cmp(&a.idx)));
        Ok(list)
    }

    async fn get_ask(&self, idx: AskIdx) -> Result<Option<Ask>, StoreError> {
        Ok(self.asks.read().unwrap().get(&idx).cloned())
    }

    async fn set_reply(&self, idx: AskIdx, reply: &str) -> Result<(), StoreError> {
        let mut asks = self.asks.write().unwrap();
        let ask = asks.get_mut(&idx).ok_or(StoreError::NotFound)?;
        ask.reply = Some(reply.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deleted_categories_are_hidden_but_asks_survive() {
        let store = InMemoryAskStore::new();
        let cat = store.create_category("calendar").await.unwrap();

        let ask = store
            .create_ask(NewAsk {
                user_idx: UserIdx::new(1),
                category_idx: cat,
                title: "broken sync".into(),
                contents: "events do not show up".into(),
            })
            .await
            .unwrap();

        store.delete_category(cat).await.unwrap();

        assert!(store.list_categories().await.unwrap().is_empty());
        assert!(!store.category_exists(cat).await.unwrap());
        assert!(store.get_ask(ask).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_category_twice_is_not_found() {
        let store = InMemoryAskStore::new();
        let cat = store.create_category("billing").await.unwrap();
        store.delete_category(cat).await.unwrap();
        assert!(matches!(
            store.delete_category(cat).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn asks_are_listed_per_user_newest_first() {
        let store = InMemoryAskStore::new();
        let cat = store.create_category("general").await.unwrap();

        for (user, title) in [(1, "first"), (1, "second"), (2, "other user")] {
            store
                .create_ask(NewAsk {
                    user_idx: UserIdx::new(user),
                    category_idx: cat,
                    title: title.into(),
                    contents: "contents".into(),
                })
                .await
                .unwrap();
        }

        let mine = store.list_asks_for_user(UserIdx::new(1)).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].title, "second");
        assert_eq!(mine[1].title, "first");
    }

    #[tokio::test]
    async fn reply_is_recorded() {
        let store = InMemoryAskStore::new();
        let cat = store.create_category("general").await.unwrap();
        let ask = store
            .create_ask(NewAsk {
                user_idx: UserIdx::new(1),
                category_idx: cat,
                title: "t".into(),
                contents: "c".into(),
            })
            .await
            .unwrap();

        store.set_reply(ask, "we fixed it").await.unwrap();
        let stored = store.get_ask(ask).await.unwrap().unwrap();
        assert_eq!(stored.reply.as_deref(), Some("we fixed it"));

        assert!(matches!(
            store.set_reply(AskIdx::new(999), "nope").await,
            Err(StoreError::NotFound)
        ));
    }
}

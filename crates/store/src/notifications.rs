//! Notifications, stored as documents.
//!
//! The persistent backend is a MongoDB collection; each document carries the
//! recipient's user idx, a read flag, and a free-form `data` payload shaped by
//! whatever produced the notification (currently: an admin replying to an ask).

use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::Collection;
use mongodb::bson::{self, doc};
use serde::{Deserialize, Serialize};

use calenduck_core::UserIdx;

use crate::error::StoreError;

/// Payload of a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    pub title: String,
    pub contents: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    /// Interest/category name the notification relates to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest: Option<String>,
}

/// A notification to insert.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_idx: UserIdx,
    pub data: NotificationData,
}

/// What the list endpoint returns per notification.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationView {
    pub date: DateTime<Utc>,
    pub title: String,
    pub contents: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest: Option<String>,
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn push(&self, notification: NewNotification) -> Result<(), StoreError>;

    /// One page of the user's unread notifications, newest first.
    /// `page` is 1-based.
    async fn unread_page(
        &self,
        user: UserIdx,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<NotificationView>, StoreError>;

    /// Flip every unread notification of the user to read.
    async fn mark_all_read(&self, user: UserIdx) -> Result<(), StoreError>;

    async fn count_unread(&self, user: UserIdx) -> Result<u64, StoreError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// MongoDB implementation
// ─────────────────────────────────────────────────────────────────────────────

/// Document layout in the `notifications` collection.
#[derive(Debug, Serialize, Deserialize)]
struct NotificationDocument {
    user_idx: i32,
    is_read: bool,
    created_at: bson::DateTime,
    data: NotificationData,
}

pub struct MongoNotificationStore {
    collection: Collection<NotificationDocument>,
}

impl MongoNotificationStore {
    pub fn new(database: &mongodb::Database) -> Self {
        Self {
            collection: database.collection("notifications"),
        }
    }

    /// Connect to the given MongoDB URL and use the `calenduck` database.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = mongodb::Client::with_uri_str(url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        tracing::info!("connected to mongodb");
        Ok(Self::new(&client.database("calenduck")))
    }

    fn unread_filter(user: UserIdx) -> bson::Document {
        doc! { "user_idx": user.as_i32(), "is_read": false }
    }
}

#[async_trait]
impl NotificationStore for MongoNotificationStore {
    async fn push(&self, notification: NewNotification) -> Result<(), StoreError> {
        let document = NotificationDocument {
            user_idx: notification.user_idx.as_i32(),
            is_read: false,
            created_at: bson::DateTime::from_millis(Utc::now().timestamp_millis()),
            data: notification.data,
        };
        self.collection.insert_one(document).await?;
        Ok(())
    }

    async fn unread_page(
        &self,
        user: UserIdx,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<NotificationView>, StoreError> {
        let skip = u64::from(page.saturating_sub(1)) * u64::from(page_size);

        let mut cursor = self
            .collection
            .find(Self::unread_filter(user))
            .sort(doc! { "created_at": -1 })
            .skip(skip)
            .limit(i64::from(page_size))
            .await?;

        let mut list = Vec::new();
        while let Some(document) = cursor.try_next().await? {
            let millis = document.created_at.timestamp_millis();
            let date = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
                StoreError::Serialization(format!("bad notification timestamp: {millis}"))
            })?;
            list.push(NotificationView {
                date,
                title: document.data.title,
                contents: document.data.contents,
                reply: document.data.reply,
                interest: document.data.interest,
            });
        }
        Ok(list)
    }

    async fn mark_all_read(&self, user: UserIdx) -> Result<(), StoreError> {
        self.collection
            .update_many(
                Self::unread_filter(user),
                doc! { "$set": { "is_read": true } },
            )
            .await?;
        Ok(())
    }

    async fn count_unread(&self, user: UserIdx) -> Result<u64, StoreError> {
        Ok(self
            .collection
            .count_documents(Self::unread_filter(user))
            .await?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory implementation (dev/test)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct StoredNotification {
    user_idx: UserIdx,
    is_read: bool,
    created_at: DateTime<Utc>,
    data: NotificationData,
}

pub struct InMemoryNotificationStore {
    // Insertion order is the tiebreaker for identical timestamps.
    inner: RwLock<Vec<StoredNotification>>,
    clock: Mutex<DateTime<Utc>>,
}

impl Default for InMemoryNotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Vec::new()),
            clock: Mutex::new(Utc::now()),
        }
    }

    // Strictly monotone timestamps so "newest first" is deterministic in tests.
    fn next_timestamp(&self) -> DateTime<Utc> {
        let mut clock = self.clock.lock().unwrap();
        let now = Utc::now().max(*clock + chrono::Duration::milliseconds(1));
        *clock = now;
        now
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn push(&self, notification: NewNotification) -> Result<(), StoreError> {
        let created_at = self.next_timestamp();
        self.inner.write().unwrap().push(StoredNotification {
            user_idx: notification.user_idx,
            is_read: false,
            created_at,
            data: notification.data,
        });
        Ok(())
    }

    async fn unread_page(
        &self,
        user: UserIdx,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<NotificationView>, StoreError> {
        let inner = self.inner.read().unwrap();
        let mut unread: Vec<&StoredNotification> = inner
            .iter()
            .filter(|n| n.user_idx == user && !n.is_read)
            .collect();
        unread.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let skip = page.saturating_sub(1) as usize * page_size as usize;
        Ok(unread
            .into_iter()
            .skip(skip)
            .take(page_size as usize)
            .map(|n| NotificationView {
                date: n.created_at,
                title: n.data.title.clone(),
                contents: n.data.contents.clone(),
                reply: n.data.reply.clone(),
                interest: n.data.interest.clone(),
            })
            .collect())
    }

    async fn mark_all_read(&self, user: UserIdx) -> Result<(), StoreError> {
        for n in self.inner.write().unwrap().iter_mut() {
            if n.user_idx == user {
                n.is_read = true;
            }
        }
        Ok(())
    }

    async fn count_unread(&self, user: UserIdx) -> Result<u64, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .iter()
            .filter(|n| n.user_idx == user && !n.is_read)
            .count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(title: &str) -> NotificationData {
        NotificationData {
            title: title.to_string(),
            contents: "contents".to_string(),
            reply: None,
            interest: None,
        }
    }

    async fn push_n(store: &InMemoryNotificationStore, user: UserIdx, titles: &[&str]) {
        for title in titles {
            store
                .push(NewNotification {
                    user_idx: user,
                    data: note(title),
                })
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn pages_are_newest_first() {
        let store = InMemoryNotificationStore::new();
        let user = UserIdx::new(1);
        push_n(&store, user, &["a", "b", "c"]).await;

        let page = store.unread_page(user, 1, 2).await.unwrap();
        assert_eq!(
            page.iter().map(|n| n.title.as_str()).collect::<Vec<_>>(),
            vec!["c", "b"]
        );

        let page2 = store.unread_page(user, 2, 2).await.unwrap();
        assert_eq!(page2.len(), 1);
        assert_eq!(page2[0].title, "a");
    }

    #[tokio::test]
    async fn mark_all_read_clears_counts() {
        let store = InMemoryNotificationStore::new();
        let user = UserIdx::new(1);
        let other = UserIdx::new(2);
        push_n(&store, user, &["a", "b"]).await;
        push_n(&store, other, &["x"]).await;

        assert_eq!(store.count_unread(user).await.unwrap(), 2);

        store.mark_all_read(user).await.unwrap();
        assert_eq!(store.count_unread(user).await.unwrap(), 0);
        assert!(store.unread_page(user, 1, 10).await.unwrap().is_empty());

        // Other users are untouched.
        assert_eq!(store.count_unread(other).await.unwrap(), 1);
    }
}

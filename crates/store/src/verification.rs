//! Short-lived email verification codes.
//!
//! The account-recovery flows compare a caller-supplied code against the one
//! stored for the email address; codes expire on their own. Redis is the
//! persistent backend (key = email, value = code, TTL).

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::AsyncCommands;

use crate::error::StoreError;

#[async_trait]
pub trait VerificationStore: Send + Sync {
    /// Store a code for the email, replacing any existing one.
    async fn store_code(&self, email: &str, code: &str, ttl: Duration)
    -> Result<(), StoreError>;

    /// The current (unexpired) code for the email, if any.
    async fn fetch_code(&self, email: &str) -> Result<Option<String>, StoreError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Redis implementation
// ─────────────────────────────────────────────────────────────────────────────

pub struct RedisVerificationStore {
    client: redis::Client,
}

impl RedisVerificationStore {
    pub fn new(redis_url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(Self { client })
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, StoreError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))
    }
}

#[async_trait]
impl VerificationStore for RedisVerificationStore {
    async fn store_code(
        &self,
        email: &str,
        code: &str,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let () = conn.set_ex(email, code, ttl.as_secs()).await?;
        Ok(())
    }

    async fn fetch_code(&self, email: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection().await?;
        Ok(conn.get(email).await?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory implementation (dev/test)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryVerificationStore {
    codes: RwLock<HashMap<String, (String, Instant)>>,
}

impl InMemoryVerificationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VerificationStore for InMemoryVerificationStore {
    async fn store_code(
        &self,
        email: &str,
        code: &str,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        self.codes
            .write()
            .unwrap()
            .insert(email.to_string(), (code.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn fetch_code(&self, email: &str) -> Result<Option<String>, StoreError> {
        let codes = self.codes.read().unwrap();
        Ok(codes.get(email).and_then(|(code, expires_at)| {
            (Instant::now() < *expires_at).then(|| code.clone())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stored_code_is_returned_until_expiry() {
        let store = InMemoryVerificationStore::new();
        store
            .store_code("duck@example.com", "123456", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(
            store.fetch_code("duck@example.com").await.unwrap().as_deref(),
            Some("123456")
        );
        assert!(store.fetch_code("other@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_code_is_gone() {
        let store = InMemoryVerificationStore::new();
        store
            .store_code("duck@example.com", "123456", Duration::from_secs(0))
            .await
            .unwrap();

        assert!(store.fetch_code("duck@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn newer_code_replaces_older() {
        let store = InMemoryVerificationStore::new();
        store
            .store_code("duck@example.com", "111111", Duration::from_secs(60))
            .await
            .unwrap();
        store
            .store_code("duck@example.com", "222222", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(
            store.fetch_code("duck@example.com").await.unwrap().as_deref(),
            Some("222222")
        );
    }
}

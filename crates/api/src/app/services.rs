//! Store wiring behind the HTTP handlers.
//!
//! Handlers only ever see the trait objects here, so the same router serves
//! the in-memory dev/test setup and the Postgres/MongoDB/Redis deployment.

use std::sync::Arc;

use anyhow::Context;

use calenduck_auth::Hs256Tokens;
use calenduck_store::{
    AccountStore, AskStore, InMemoryAccountStore, InMemoryAskStore, InMemoryInterestStore,
    InMemoryNotificationStore, InMemoryVerificationStore, InterestStore, MongoNotificationStore,
    NotificationStore, PgStore, RedisVerificationStore, VerificationStore,
};

use crate::app::config::ApiConfig;

pub struct AppServices {
    pub asks: Arc<dyn AskStore>,
    pub interests: Arc<dyn InterestStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub notifications: Arc<dyn NotificationStore>,
    pub verification: Arc<dyn VerificationStore>,
    pub tokens: Arc<Hs256Tokens>,
    pub page_size: u32,
}

impl AppServices {
    /// Everything in memory. Used by `main` when no backing stores are
    /// configured, and by the black-box tests.
    pub fn in_memory(jwt_secret: &str, page_size: u32) -> Self {
        Self {
            asks: Arc::new(InMemoryAskStore::new()),
            interests: Arc::new(InMemoryInterestStore::new()),
            accounts: Arc::new(InMemoryAccountStore::new()),
            notifications: Arc::new(InMemoryNotificationStore::new()),
            verification: Arc::new(InMemoryVerificationStore::new()),
            tokens: Arc::new(Hs256Tokens::new(jwt_secret.as_bytes())),
            page_size,
        }
    }

    /// Postgres for accounts/asks/interests, MongoDB for notifications,
    /// Redis for verification codes.
    pub async fn connect(config: &ApiConfig) -> anyhow::Result<Self> {
        let database_url = config
            .database_url
            .as_deref()
            .context("DATABASE_URL must be set when USE_PERSISTENT_STORES is enabled")?;

        let pg = Arc::new(PgStore::connect(database_url).await?);
        let notifications = MongoNotificationStore::connect(&config.mongodb_url).await?;
        let verification = RedisVerificationStore::new(&config.redis_url)?;

        Ok(Self {
            asks: pg.clone(),
            interests: pg.clone(),
            accounts: pg,
            notifications: Arc::new(notifications),
            verification: Arc::new(verification),
            tokens: Arc::new(Hs256Tokens::new(config.jwt_secret.as_bytes())),
            page_size: config.page_size,
        })
    }
}

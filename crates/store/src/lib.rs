//! `calenduck-store` — storage boundary for the backend.
//!
//! Each entity family gets an async trait plus an in-memory implementation
//! (dev/test). Persistent implementations live alongside: Postgres for the
//! relational entities, MongoDB for notifications, Redis for verification
//! codes.

pub mod accounts;
pub mod asks;
pub mod error;
pub mod interests;
pub mod notifications;
pub mod postgres;
pub mod verification;

pub use accounts::{AccountStore, Credential, InMemoryAccountStore, NewAccount};
pub use asks::{Ask, AskCategory, AskStore, InMemoryAskStore, NewAsk};
pub use error::StoreError;
pub use interests::{InMemoryInterestStore, Interest, InterestStore};
pub use notifications::{
    InMemoryNotificationStore, MongoNotificationStore, NewNotification, NotificationData,
    NotificationStore, NotificationView,
};
pub use postgres::PgStore;
pub use verification::{InMemoryVerificationStore, RedisVerificationStore, VerificationStore};

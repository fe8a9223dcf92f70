//! `calenduck-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no storage or HTTP concerns).

pub mod error;
pub mod fields;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{AskIdx, CategoryIdx, InterestIdx, UserIdx};

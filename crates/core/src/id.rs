//! Strongly-typed row identifiers used across the domain.
//!
//! All entities live in relational tables keyed by a serial `idx` column, so
//! identifiers are thin newtypes over `i32` rather than UUIDs.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a user account row.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserIdx(i32);

/// Identifier of an interest row.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterestIdx(i32);

/// Identifier of an ask (inquiry) category row.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryIdx(i32);

/// Identifier of an ask (inquiry) row.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AskIdx(i32);

macro_rules! impl_idx_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub fn new(idx: i32) -> Self {
                Self(idx)
            }

            pub fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i32> for $t {
            fn from(value: i32) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i32 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let idx = i32::from_str(s)
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                if idx < 1 {
                    return Err(DomainError::invalid_id(format!(
                        "{}: must be positive, got {}",
                        $name, idx
                    )));
                }
                Ok(Self(idx))
            }
        }
    };
}

impl_idx_newtype!(UserIdx, "UserIdx");
impl_idx_newtype!(InterestIdx, "InterestIdx");
impl_idx_newtype!(CategoryIdx, "CategoryIdx");
impl_idx_newtype!(AskIdx, "AskIdx");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_positive_idx() {
        let idx: InterestIdx = "42".parse().unwrap();
        assert_eq!(idx.as_i32(), 42);
    }

    #[test]
    fn parse_rejects_zero_and_negative() {
        assert!("0".parse::<UserIdx>().is_err());
        assert!("-3".parse::<UserIdx>().is_err());
    }

    #[test]
    fn parse_rejects_non_numeric() {
        let err = "abc".parse::<AskIdx>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(_)));
    }
}

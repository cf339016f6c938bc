//! Type-safe pool identifier.
//!
//! [`PoolId`] is a newtype wrapper around a URL-safe slug (e.g. `monsoon`)
//! so that pool keys cannot be confused with participant addresses or other
//! strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::error::LotteryError;

/// Stable unique key of a lottery pool.
///
/// Assigned once when the pool is seeded and immutable thereafter. Used as
/// the dictionary key in [`super::PoolRegistry`], event discriminator, and
/// WebSocket subscription target.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ToSchema)]
#[serde(transparent)]
pub struct PoolId(String);

impl PoolId {
    /// Creates a `PoolId` after validating the slug.
    ///
    /// # Errors
    ///
    /// Returns [`LotteryError::InvalidRequest`] if the slug is empty or
    /// contains anything other than lowercase ASCII letters, digits and `-`.
    pub fn new(slug: impl Into<String>) -> Result<Self, LotteryError> {
        let slug = slug.into();
        let valid = !slug.is_empty()
            && slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid {
            return Err(LotteryError::InvalidRequest(format!(
                "invalid pool id: {slug:?}"
            )));
        }
        Ok(Self(slug))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PoolId {
    type Err = LotteryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for PoolId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn accepts_slugs() {
        for slug in ["monsoon", "third-wave-2", "a"] {
            assert!(PoolId::new(slug).is_ok(), "{slug} should be valid");
        }
    }

    #[test]
    fn rejects_invalid_slugs() {
        for slug in ["", "Monsoon", "with space", "emoji☕", "under_score"] {
            assert!(PoolId::new(slug).is_err(), "{slug:?} should be invalid");
        }
    }

    #[test]
    fn display_is_the_slug() {
        let Ok(id) = PoolId::new("baarbara") else {
            panic!("valid id");
        };
        assert_eq!(format!("{id}"), "baarbara");
        assert_eq!(id.as_str(), "baarbara");
    }

    #[test]
    fn serde_round_trip() {
        let Ok(id) = PoolId::new("salawara") else {
            panic!("valid id");
        };
        let Ok(json) = serde_json::to_string(&id) else {
            panic!("serialization failed");
        };
        assert_eq!(json, "\"salawara\"");
        let Ok(back) = serde_json::from_str::<PoolId>(&json) else {
            panic!("deserialization failed");
        };
        assert_eq!(back, id);
    }

    #[test]
    fn deserialize_validates() {
        assert!(serde_json::from_str::<PoolId>("\"NOT OK\"").is_err());
    }

    #[test]
    fn hash_works_in_hashmap() {
        use std::collections::HashMap;
        let Ok(id) = PoolId::new("monsoon") else {
            panic!("valid id");
        };
        let mut map = HashMap::new();
        map.insert(id.clone(), "test");
        assert_eq!(map.get(&id), Some(&"test"));
    }
}

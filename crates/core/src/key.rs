//! Document keys
//!
//! A record's identity in both stores is the string `"<TYPE>:<ID>"`. The two
//! stores must never disagree on which key maps to which logical record, so
//! the key is a real type rather than ad-hoc string formatting at call sites.

use crate::error::{Error, Result};
use serde::de::{self, Deserialize, Deserializer};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Composite key identifying a record in the document store and the search index
///
/// Serializes as the exact wire string `"<TYPE>:<ID>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    type_name: String,
    id: i64,
}

impl DocumentKey {
    /// Build a key from a type name and a store-assigned id
    pub fn new(type_name: impl Into<String>, id: i64) -> Self {
        DocumentKey {
            type_name: type_name.into(),
            id,
        }
    }

    /// The model type name component
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The numeric id component
    pub fn id(&self) -> i64 {
        self.id
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.type_name, self.id)
    }
}

impl FromStr for DocumentKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        // The id is everything after the last colon; type names keep any
        // colons of their own.
        let (type_name, id) = s
            .rsplit_once(':')
            .ok_or_else(|| Error::InvalidKey(s.to_string()))?;
        if type_name.is_empty() {
            return Err(Error::InvalidKey(s.to_string()));
        }
        let id = id
            .parse::<i64>()
            .map_err(|_| Error::InvalidKey(s.to_string()))?;
        Ok(DocumentKey::new(type_name, id))
    }
}

impl Serialize for DocumentKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DocumentKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

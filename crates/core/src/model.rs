//! Model capability trait
//!
//! The engine never reflects over arbitrary structs. A type that wants to be
//! stored implements [`Model`]: explicit accessors for the four fields the
//! engine owns (`id`, `type_name`, `created_at`, `updated_at`) plus serde for
//! everything else. The engine mutates those fields in place during create
//! and update; all other fields are opaque application data.

use crate::key::DocumentKey;
use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Capability set required of any record handled by the engine
///
/// The `Default` bound supplies the zero-value prototype used for schema
/// derivation; `Serialize + DeserializeOwned` carry the record across both
/// store boundaries.
///
/// # Contract
///
/// - `id` is assigned by the document store on create; `0` means "not yet
///   created".
/// - `type_name` is stamped with [`Model::NAME`] on create and never mutated
///   afterwards.
/// - Timestamps are RFC-3339 strings stamped by the engine.
pub trait Model: Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static {
    /// Registered type name; the `_type` term of every query and the prefix
    /// of every document key.
    const NAME: &'static str;

    /// Store-assigned numeric id
    fn id(&self) -> i64;
    /// Set the store-assigned id
    fn set_id(&mut self, id: i64);

    /// Type name carried by the record itself
    fn type_name(&self) -> &str;
    /// Stamp the type name (done once, on create)
    fn set_type_name(&mut self, type_name: &str);

    /// Creation timestamp, RFC-3339
    fn created_at(&self) -> &str;
    /// Stamp the creation timestamp
    fn set_created_at(&mut self, stamp: &str);

    /// Last-update timestamp, RFC-3339
    fn updated_at(&self) -> &str;
    /// Stamp the last-update timestamp
    fn set_updated_at(&mut self, stamp: &str);

    /// Derive the document key shared by both stores
    fn key(&self) -> DocumentKey {
        DocumentKey::new(self.type_name(), self.id())
    }

    /// True once the record carries a full identity (id and type name)
    fn is_identified(&self) -> bool {
        self.id() != 0 && !self.type_name().is_empty()
    }
}

/// Current time as an RFC-3339 string, the format stamped into records
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

//! Store abstractions
//!
//! The engine talks to two external collaborators through these traits: the
//! authoritative document store and the secondary search index. The traits
//! are the whole contract — any backend that can store a document by key and
//! apply a type schema can sit behind the engine.
//!
//! Thread safety: all methods must be safe to call concurrently from
//! multiple threads (requires Send + Sync).

use crate::error::Result;
use crate::key::DocumentKey;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row of a document-store view listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewRow {
    /// The document key
    pub key: DocumentKey,
    /// The stored document
    pub doc: Value,
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// The document key the hit resolves to
    pub key: DocumentKey,
    /// The stored source document
    pub source: Value,
}

/// Response to a search request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Total matching documents, before pagination
    pub total: u64,
    /// The returned page of hits
    pub hits: Vec<SearchHit>,
    /// Aggregation results, when the query carried an `aggs` clause
    pub aggregations: Option<Value>,
}

impl SearchResponse {
    /// A response with no matches
    pub fn empty() -> Self {
        SearchResponse {
            total: 0,
            hits: Vec::new(),
            aggregations: None,
        }
    }
}

/// Settings applied when the search index is created on first connect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSettings {
    /// Shard count
    #[serde(default = "default_shards")]
    pub number_of_shards: u32,
    /// Replica count
    #[serde(default = "default_replicas")]
    pub number_of_replicas: u32,
    /// Refresh interval, e.g. `"1s"`
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: String,
    /// Whether to verify the index on startup
    #[serde(default)]
    pub check_on_startup: bool,
}

fn default_shards() -> u32 {
    5
}

fn default_replicas() -> u32 {
    1
}

fn default_refresh_interval() -> String {
    "1s".to_string()
}

impl Default for IndexSettings {
    fn default() -> Self {
        IndexSettings {
            number_of_shards: default_shards(),
            number_of_replicas: default_replicas(),
            refresh_interval: default_refresh_interval(),
            check_on_startup: false,
        }
    }
}

/// The authoritative, key-addressed record store
pub trait DocumentStore: Send + Sync {
    /// Assign the next id for a type (counter increment)
    ///
    /// This is the only source of record ids in the system.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable.
    fn next_id(&self, type_name: &str) -> Result<i64>;

    /// Store a document under its key, replacing any previous value
    fn put(&self, key: &DocumentKey, doc: &Value) -> Result<()>;

    /// Fetch a document by key; `None` if absent
    fn get(&self, key: &DocumentKey) -> Result<Option<Value>>;

    /// Delete a document by key; deleting an absent key is a no-op
    fn delete(&self, key: &DocumentKey) -> Result<()>;

    /// List the whole collection for a type via its named view
    fn view(&self, type_name: &str) -> Result<Vec<ViewRow>>;
}

/// The secondary, queryable index mirroring the document store
pub trait SearchIndex: Send + Sync {
    /// Create the index on first connect if it does not exist
    ///
    /// Returns whether the index exists (or its creation was acknowledged)
    /// afterwards.
    fn ensure_index(&self, settings: &IndexSettings) -> Result<bool>;

    /// Index a document under its key
    fn index(&self, key: &DocumentKey, doc: &Value) -> Result<()>;

    /// Update the document stored under a key
    fn update(&self, key: &DocumentKey, doc: &Value) -> Result<()>;

    /// Delete the document stored under a key
    fn delete(&self, key: &DocumentKey) -> Result<()>;

    /// Execute a raw query body
    fn search(&self, body: &Value) -> Result<SearchResponse>;

    /// Fetch the current mapping for a type; `None` if absent
    fn mapping(&self, type_name: &str) -> Result<Option<Value>>;

    /// Push a schema for a type with conflict-tolerant semantics
    ///
    /// Returns whether the change was acknowledged.
    fn put_mapping(&self, type_name: &str, schema: &Value) -> Result<bool>;

    /// Delete the mapping for a type
    fn delete_mapping(&self, type_name: &str) -> Result<()>;
}

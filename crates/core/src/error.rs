//! Error types for the tandem engine
//!
//! This module defines all error kinds used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! The taxonomy separates four classes of failure:
//! - transport/serialization failures talking to either store,
//! - usage errors detectable at the call site before any I/O,
//! - consistency errors where the two stores disagree after a partial write,
//! - invariant violations (duplicate document keys) that must abort.

use crate::key::DocumentKey;
use std::fmt;
use std::io;
use thiserror::Error;

/// Result type alias for tandem operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the tandem engine
#[derive(Debug, Error)]
pub enum Error {
    /// Either store is unreachable or returned a malformed response
    #[error("transport error: {0}")]
    Transport(String),

    /// Serialization/deserialization of a document or query body failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A filter or aggregation fragment supplied to the builder did not parse
    #[error("invalid query fragment: {0}")]
    InvalidFragment(String),

    /// A document key string did not match the `<TYPE>:<ID>` shape
    #[error("invalid document key: {0}")]
    InvalidKey(String),

    /// A builder or executor operation was invoked on an unbound or consumed session
    #[error("query session is not bound to a model; bind a model before building")]
    SessionUnbound,

    /// An update was attempted on a model that carries no id or type name
    #[error("model carries no identity; it must be created before it can be updated")]
    ModelUnidentified,

    /// A query was opened for a model type never registered with the engine
    #[error("model type {0} is not registered")]
    UnregisteredModel(String),

    /// No record exists for the given key
    #[error("no record found for key {0}")]
    NotFound(DocumentKey),

    /// More than one record matched an exact-id lookup. The key space is
    /// supposed to be unique, so this is an invariant violation.
    #[error("found {matches} records for key {key}; document keys must be unique")]
    DuplicateKey {
        /// The key that matched more than once
        key: DocumentKey,
        /// Number of records returned for the exact-id lookup
        matches: usize,
    },

    /// The search index write failed after the document store write
    /// succeeded. The primary write is not rolled back; the stores stay
    /// divergent until a reindex repairs them.
    #[error("stores diverged for key {key}: {cause}")]
    Diverged {
        /// Key of the record the stores now disagree on
        key: DocumentKey,
        /// Underlying secondary-write failure
        cause: String,
    },

    /// The search index did not acknowledge a mapping change
    #[error("mapping change not acknowledged: {0}")]
    MappingRejected(String),

    /// A reindex phase failed; the pipeline aborted without rollback
    #[error("reindex failed during {phase}: {source}")]
    Reindex {
        /// The phase that failed
        phase: ReindexPhase,
        /// The underlying failure
        #[source]
        source: Box<Error>,
    },

    /// Configuration file was malformed
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error (config file access)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// True for programmer-usage errors detectable before any I/O.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Error::SessionUnbound | Error::ModelUnidentified | Error::UnregisteredModel(_)
        )
    }

    /// True for invariant violations that must abort rather than be retried.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::DuplicateKey { .. })
    }

    /// True when the two stores are known to disagree after a partial write.
    pub fn is_divergence(&self) -> bool {
        matches!(self, Error::Diverged { .. })
    }

    /// Wrap an error as a reindex failure tagged with the failing phase.
    pub fn reindex(phase: ReindexPhase, source: Error) -> Self {
        Error::Reindex {
            phase,
            source: Box::new(source),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Phases of the reindex pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReindexPhase {
    /// Phase 1: drop the existing mapping for the type
    DropMapping,
    /// Phase 2: derive a fresh schema and push it as the new mapping
    PutMapping,
    /// Phase 3: load the entire collection from the document store
    LoadCollection,
    /// Phase 4: re-insert every loaded record into the search index
    BulkInsert,
}

impl fmt::Display for ReindexPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReindexPhase::DropMapping => "drop mapping",
            ReindexPhase::PutMapping => "put mapping",
            ReindexPhase::LoadCollection => "load collection",
            ReindexPhase::BulkInsert => "bulk insert",
        };
        f.write_str(name)
    }
}

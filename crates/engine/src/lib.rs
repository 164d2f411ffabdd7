//! Dual-store engine for tandem
//!
//! This crate owns the write path and the administrative surface:
//! - [`Coordinator`]: create/update/destroy mirrored into both stores with
//!   primary-then-secondary ordering and partial-failure reporting
//! - [`MappingPipeline`]: per-type schema management and the four-phase
//!   reindex rebuild
//! - [`Context`]: the startup-constructed service object tying stores,
//!   registry, and executor together
//! - [`MemoryDocumentStore`] / [`MemorySearchIndex`]: embedded backends
//!
//! Commonly used types from the core and query crates are re-exported so
//! the root crate exposes one coherent API.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod context;
pub mod coordinator;
pub mod mapping;
pub mod memory;
pub mod registry;

pub use config::{Config, CONFIG_FILE_NAME};
pub use context::Context;
pub use coordinator::{BatchOutcome, Coordinator};
pub use mapping::MappingPipeline;
pub use memory::{MemoryDocumentStore, MemorySearchIndex};
pub use registry::{ModelDescriptor, ModelRegistry};

// Re-export the core and query surface
pub use tandem_core::{
    derive_schema, timestamp_now, DocumentKey, DocumentStore, Error, IndexSettings, Model,
    QueryDocument, ReindexPhase, Result, SearchHit, SearchIndex, SearchResponse, ViewRow,
    UNBOUNDED_LIMIT,
};
pub use tandem_query::{Executor, QueryOutput, QuerySession};

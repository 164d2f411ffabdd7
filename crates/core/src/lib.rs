//! Core types and traits for tandem
//!
//! This crate defines the foundational pieces shared by the query and engine
//! layers:
//! - DocumentKey: the `"<TYPE>:<ID>"` identity shared by both stores
//! - Model: capability trait for stored records (id/type/timestamp access)
//! - QueryDocument: the structured search query and its exact wire shape
//! - schema: mapping derivation from a model's zero value
//! - DocumentStore / SearchIndex: the external-collaborator seams
//! - Error: the error taxonomy (transport, usage, consistency, invariant)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod key;
pub mod model;
pub mod query;
pub mod schema;
pub mod store;

pub use error::{Error, ReindexPhase, Result};
pub use key::DocumentKey;
pub use model::{timestamp_now, Model};
pub use query::{QueryDocument, UNBOUNDED_LIMIT};
pub use schema::derive_schema;
pub use store::{
    DocumentStore, IndexSettings, SearchHit, SearchIndex, SearchResponse, ViewRow,
};

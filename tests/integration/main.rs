//! Integration tests
//!
//! End-to-end scenarios across the query builder, the dual-write
//! coordinator, and the mapping/reindex pipeline, all over the in-memory
//! store backends.

#[path = "../common/mod.rs"]
mod common;

mod queries;
mod reindex;
mod writes;

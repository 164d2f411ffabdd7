//! Tandem - dual-store document engine
//!
//! Tandem keeps an authoritative document store and a secondary search
//! index consistent, and exposes a single query-building API that targets
//! the index while writes are mirrored into both stores.
//!
//! # Quick Start
//!
//! ```ignore
//! use tandem::{Context, Model};
//!
//! // Create an engine over in-memory stores
//! let ctx = Context::ephemeral()?;
//! ctx.register::<Widget>()?;
//!
//! // Write through the dual-write coordinator
//! let created = ctx.create(Widget { name: "a".into(), ..Default::default() })?;
//!
//! // Read through a single-use query session
//! let mut session = ctx.query::<Widget>()?;
//! session.filter(r#"{"term":{"name":"a"}}"#)?.sort("name", true)?;
//! let found = ctx.fetch(&mut session)?;
//! ```
//!
//! # Architecture
//!
//! Reads flow through a [`QuerySession`] and the [`Executor`]; writes flow
//! through the dual-write coordinator (document store first, then the
//! search index); the mapping pipeline rebuilds the index from the
//! document store when a type's schema changes. The [`Context`] struct
//! ties them together behind one handle.
//!
//! Store connectivity is a trait seam ([`DocumentStore`], [`SearchIndex`]);
//! the bundled in-memory backends serve tests and embedded use.

// Re-export the public API from tandem-engine
pub use tandem_engine::*;

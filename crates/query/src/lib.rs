//! Query building and execution for tandem
//!
//! This crate owns the read path: [`QuerySession`] turns an incremental
//! sequence of builder calls into the canonical query document, and
//! [`Executor`] runs that document against the search index and shapes the
//! response into typed records or aggregation results.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod executor;
pub mod session;

pub use executor::{Executor, QueryOutput};
pub use session::QuerySession;

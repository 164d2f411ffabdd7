//! Search executor
//!
//! Runs a session's query document against the search index and shapes the
//! response back into typed records. Execution consumes the session's built
//! state: a session is one logical query.

use serde_json::Value;
use std::sync::Arc;
use tandem_core::{Error, Model, Result, SearchIndex};
use tracing::debug;

use crate::session::QuerySession;

/// Output of one executed query
///
/// Aggregation queries and hit queries are mutually exclusive by contract:
/// a query with an `aggs` clause is treated as aggregation-only.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput<M> {
    /// The matched records, deserialized onto the bound model type
    Records(Vec<M>),
    /// Aggregation results, as returned by the index
    Aggregations(Value),
}

impl<M> QueryOutput<M> {
    /// The records, or an empty list for an aggregation result
    pub fn into_records(self) -> Vec<M> {
        match self {
            QueryOutput::Records(records) => records,
            QueryOutput::Aggregations(_) => Vec::new(),
        }
    }

    /// True when no records and no aggregations came back
    pub fn is_empty(&self) -> bool {
        match self {
            QueryOutput::Records(records) => records.is_empty(),
            QueryOutput::Aggregations(_) => false,
        }
    }
}

/// Executes query documents against a search index
#[derive(Clone)]
pub struct Executor {
    index: Arc<dyn SearchIndex>,
}

impl Executor {
    /// Build an executor over a search index handle
    pub fn new(index: Arc<dyn SearchIndex>) -> Self {
        Executor { index }
    }

    /// Execute a session's query and shape the response
    ///
    /// Consumes the session's document; further builder calls on the session
    /// fail with a usage error until it is reset. A zero-hit response yields
    /// empty records before aggregations are considered, matching the wire
    /// protocol's short-circuit.
    pub fn execute<M: Model>(&self, session: &mut QuerySession<M>) -> Result<QueryOutput<M>> {
        let doc = session.take_document()?;
        let body = doc.to_body()?;
        debug!(type_name = doc.type_name(), "executing search query");

        let response = self.index.search(&body)?;
        if response.total == 0 {
            return Ok(QueryOutput::Records(Vec::new()));
        }

        if let Some(aggregations) = response.aggregations {
            return Ok(QueryOutput::Aggregations(aggregations));
        }

        let mut records = Vec::with_capacity(response.hits.len());
        for hit in response.hits {
            let record: M = serde_json::from_value(hit.source).map_err(|e| {
                Error::Serialization(format!(
                    "hit for key {} does not deserialize onto {}: {}",
                    hit.key,
                    M::NAME,
                    e
                ))
            })?;
            records.push(record);
        }
        Ok(QueryOutput::Records(records))
    }

    /// Execute and return the reported total-hit count
    ///
    /// Forces `size = 1` as a minimal-cost probe. This mutates the session's
    /// page size in place and leaves the document there: a counted session
    /// must be reset before it is reused for `execute`.
    pub fn count<M: Model>(&self, session: &mut QuerySession<M>) -> Result<u64> {
        let doc = session.document_mut()?;
        doc.set_size(1);
        let body = doc.to_body()?;
        debug!(type_name = doc.type_name(), "executing count probe");

        let response = self.index.search(&body)?;
        Ok(response.total)
    }
}

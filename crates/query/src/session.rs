//! Query sessions
//!
//! A [`QuerySession`] is the single-use builder state for one logical query:
//! bound to one model type at construction, mutated by chained builder calls,
//! consumed exactly once by execution. Sessions never share structure — each
//! gets its own clone of the query template — and are not meant for
//! concurrent mutation; concurrent callers each obtain their own session.

use serde_json::Value;
use std::marker::PhantomData;
use tandem_core::{Error, Model, QueryDocument, Result};

/// Single-use builder for one structured search query
///
/// The document is `None` once the session has been consumed by execution
/// (or was never bound); every operation on such a session fails with a
/// usage error before any I/O. [`QuerySession::reset`] re-binds a fresh
/// template.
#[derive(Debug)]
pub struct QuerySession<M: Model> {
    doc: Option<QueryDocument>,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> QuerySession<M> {
    /// Bind a new session to the model type
    ///
    /// Clones the canonical query template and sets the `_type` filter term
    /// to [`Model::NAME`]. This is the only way to obtain a usable session.
    pub fn bind() -> Self {
        QuerySession {
            doc: Some(QueryDocument::for_type(M::NAME)),
            _model: PhantomData,
        }
    }

    fn doc_mut(&mut self) -> Result<&mut QueryDocument> {
        self.doc.as_mut().ok_or(Error::SessionUnbound)
    }

    /// Parse a filter fragment and replace the filter clause wholesale
    ///
    /// Last write wins; there is no merging. A fragment that fails to parse
    /// leaves the session unchanged and returns [`Error::InvalidFragment`].
    pub fn filter(&mut self, fragment: &str) -> Result<&mut Self> {
        let value = parse_fragment(fragment)?;
        self.filter_value(value)
    }

    /// Replace the filter clause with an already-structured fragment
    pub fn filter_value(&mut self, fragment: Value) -> Result<&mut Self> {
        if !fragment.is_object() {
            return Err(Error::InvalidFragment(
                "filter fragment must be a JSON object".to_string(),
            ));
        }
        self.doc_mut()?.set_filter(fragment);
        Ok(self)
    }

    /// Set the pagination offset
    pub fn offset(&mut self, n: u64) -> Result<&mut Self> {
        self.doc_mut()?.set_from(n);
        Ok(self)
    }

    /// Set the page size
    ///
    /// No bounds are enforced here; the search index applies its own. Pass
    /// [`tandem_core::UNBOUNDED_LIMIT`] to fetch everything in practice.
    pub fn limit(&mut self, n: u64) -> Result<&mut Self> {
        self.doc_mut()?.set_size(n);
        Ok(self)
    }

    /// Append a sort clause; multiple calls compose a multi-key sort in
    /// call order
    pub fn sort(&mut self, field: &str, ascending: bool) -> Result<&mut Self> {
        self.doc_mut()?.push_sort(field, ascending);
        Ok(self)
    }

    /// Parse an aggregation fragment and replace the `aggs` clause wholesale
    pub fn aggregate(&mut self, fragment: &str) -> Result<&mut Self> {
        let value = parse_fragment(fragment)?;
        self.aggregate_value(value)
    }

    /// Replace the `aggs` clause with an already-structured fragment
    pub fn aggregate_value(&mut self, fragment: Value) -> Result<&mut Self> {
        if !fragment.is_object() {
            return Err(Error::InvalidFragment(
                "aggregation fragment must be a JSON object".to_string(),
            ));
        }
        self.doc_mut()?.set_aggs(fragment);
        Ok(self)
    }

    /// Discard any built state and re-bind a fresh template
    pub fn reset(&mut self) {
        self.doc = Some(QueryDocument::for_type(M::NAME));
    }

    /// The current query document, if the session is live
    pub fn document(&self) -> Option<&QueryDocument> {
        self.doc.as_ref()
    }

    /// Mutable access to the live document (used by the executor's count
    /// probe, which mutates the page size in place)
    pub fn document_mut(&mut self) -> Result<&mut QueryDocument> {
        self.doc_mut()
    }

    /// Take the document out, consuming the session's built state
    pub fn take_document(&mut self) -> Result<QueryDocument> {
        self.doc.take().ok_or(Error::SessionUnbound)
    }
}

impl<M: Model> Default for QuerySession<M> {
    fn default() -> Self {
        Self::bind()
    }
}

fn parse_fragment(fragment: &str) -> Result<Value> {
    serde_json::from_str(fragment).map_err(|e| Error::InvalidFragment(e.to_string()))
}

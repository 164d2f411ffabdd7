//! Dual-write coordinator
//!
//! Single-record mutations write to the document store first, then mirror
//! into the search index. The ordering is the only consistency mechanism:
//! there is no transaction spanning the stores. When the secondary write
//! fails after the primary succeeded, the stores are divergent — the error
//! reports it, nothing is rolled back, and a reindex is the repair path.
//!
//! Batch operations iterate sequentially and always return the work
//! completed before the first failure, so callers can reconcile.

use serde_json::json;
use std::sync::Arc;
use tandem_core::{
    timestamp_now, DocumentKey, DocumentStore, Error, Model, Result, SearchIndex,
    UNBOUNDED_LIMIT,
};
use tandem_query::{Executor, QuerySession};
use tracing::{debug, warn};

/// Outcome of a batch mutation: the records completed before any failure,
/// plus the failure itself if one occurred
#[derive(Debug)]
pub struct BatchOutcome<M> {
    /// Records the batch completed, in order
    pub completed: Vec<M>,
    /// The first failure, if the batch was interrupted
    pub error: Option<Error>,
}

impl<M> BatchOutcome<M> {
    fn ok(completed: Vec<M>) -> Self {
        BatchOutcome {
            completed,
            error: None,
        }
    }

    fn interrupted(completed: Vec<M>, error: Error) -> Self {
        BatchOutcome {
            completed,
            error: Some(error),
        }
    }

    /// True when every element of the batch completed
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Convert into a plain result, keeping the completed records only on
    /// full success
    pub fn into_result(self) -> Result<Vec<M>> {
        match self.error {
            None => Ok(self.completed),
            Some(error) => Err(error),
        }
    }
}

/// Coordinates create/update/destroy across the two stores
#[derive(Clone)]
pub struct Coordinator {
    documents: Arc<dyn DocumentStore>,
    search: Arc<dyn SearchIndex>,
    executor: Executor,
}

impl Coordinator {
    /// Build a coordinator over the two store handles
    pub fn new(documents: Arc<dyn DocumentStore>, search: Arc<dyn SearchIndex>) -> Self {
        let executor = Executor::new(search.clone());
        Coordinator {
            documents,
            search,
            executor,
        }
    }

    /// Create a record in both stores and return it fully identified
    ///
    /// Stamps both timestamps and the type name, takes the authoritative id
    /// from the document store, writes the primary copy, then mirrors into
    /// the search index. A primary failure writes nothing anywhere; a
    /// secondary failure leaves the primary write in place and reports
    /// [`Error::Diverged`].
    pub fn create<M: Model>(&self, mut model: M) -> Result<M> {
        let stamp = timestamp_now();
        model.set_created_at(&stamp);
        model.set_updated_at(&stamp);
        model.set_type_name(M::NAME);

        let id = self.documents.next_id(M::NAME)?;
        model.set_id(id);
        let key = model.key();
        let doc = serde_json::to_value(&model)?;

        self.documents.put(&key, &doc)?;
        if let Err(cause) = self.search.index(&key, &doc) {
            warn!(key = %key, error = %cause, "search index write failed after primary create");
            return Err(Error::Diverged {
                key,
                cause: cause.to_string(),
            });
        }

        debug!(key = %key, "record created in both stores");
        Ok(model)
    }

    /// Create each record in order
    ///
    /// Stops at the first failure and returns the records created so far
    /// alongside the error. Earlier successes are not rolled back.
    pub fn create_each<M: Model>(&self, models: Vec<M>) -> BatchOutcome<M> {
        let mut completed = Vec::with_capacity(models.len());
        for model in models {
            match self.create(model) {
                Ok(created) => completed.push(created),
                Err(error) => return BatchOutcome::interrupted(completed, error),
            }
        }
        BatchOutcome::ok(completed)
    }

    /// Update an already-created record in both stores
    ///
    /// Re-reads by exact-id filter first: zero matches is [`Error::NotFound`];
    /// more than one match means the unique key space is broken and aborts
    /// with the fatal [`Error::DuplicateKey`]. On success the record carries
    /// a fresh `updated_at`.
    pub fn update<M: Model>(&self, model: &mut M) -> Result<()> {
        if !model.is_identified() {
            return Err(Error::ModelUnidentified);
        }
        let key = model.key();

        let matches = self.find_by_key::<M>(&key)?;
        if matches.is_empty() {
            return Err(Error::NotFound(key));
        }
        if matches.len() > 1 {
            return Err(Error::DuplicateKey {
                key,
                matches: matches.len(),
            });
        }

        model.set_updated_at(&timestamp_now());
        let doc = serde_json::to_value(&*model)?;

        self.documents.put(&key, &doc)?;
        if let Err(cause) = self.search.update(&key, &doc) {
            warn!(key = %key, error = %cause, "search index write failed after primary update");
            return Err(Error::Diverged {
                key,
                cause: cause.to_string(),
            });
        }

        debug!(key = %key, "record updated in both stores");
        Ok(())
    }

    /// Delete every record matching a filter fragment from both stores
    ///
    /// Finds with an effectively unbounded page size, then deletes each
    /// match from the document store first, then from the search index.
    /// Stops at the first failure, returning the records deleted so far.
    /// A filter matching nothing deletes nothing and is not an error.
    pub fn destroy<M: Model>(&self, filter: &str) -> BatchOutcome<M> {
        let mut session = QuerySession::<M>::bind();
        if let Err(error) = session.filter(filter) {
            return BatchOutcome::interrupted(Vec::new(), error);
        }
        if let Err(error) = session.limit(UNBOUNDED_LIMIT) {
            return BatchOutcome::interrupted(Vec::new(), error);
        }

        let matched = match self.executor.execute(&mut session) {
            Ok(output) => output.into_records(),
            Err(error) => return BatchOutcome::interrupted(Vec::new(), error),
        };

        let mut deleted = Vec::with_capacity(matched.len());
        for record in matched {
            let key = record.key();
            if let Err(error) = self.documents.delete(&key) {
                return BatchOutcome::interrupted(deleted, error);
            }
            if let Err(cause) = self.search.delete(&key) {
                warn!(key = %key, error = %cause, "search index delete failed after primary delete");
                return BatchOutcome::interrupted(
                    deleted,
                    Error::Diverged {
                        key,
                        cause: cause.to_string(),
                    },
                );
            }
            debug!(key = %key, "record destroyed in both stores");
            deleted.push(record);
        }
        BatchOutcome::ok(deleted)
    }

    fn find_by_key<M: Model>(&self, key: &DocumentKey) -> Result<Vec<M>> {
        let mut session = QuerySession::<M>::bind();
        session.filter_value(json!({
            "query": { "bool": { "must": [ { "term": { "_id": key.to_string() } } ] } }
        }))?;
        Ok(self.executor.execute(&mut session)?.into_records())
    }
}

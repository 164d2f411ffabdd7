//! Engine context
//!
//! One [`Context`] is constructed at startup and passed to (or cloned by)
//! everything that needs store access — the explicit service object that
//! replaces the original design's process-wide connection and cache globals.
//! It owns the registry and exposes the whole public operation surface as a
//! facade over the coordinator, the mapping pipeline, and the executor.

use std::sync::Arc;
use tandem_core::{
    DocumentStore, Error, Model, Result, SearchIndex, ViewRow,
};
use tandem_query::{Executor, QueryOutput, QuerySession};
use tracing::warn;

use crate::config::Config;
use crate::coordinator::{BatchOutcome, Coordinator};
use crate::mapping::MappingPipeline;
use crate::memory::{MemoryDocumentStore, MemorySearchIndex};
use crate::registry::ModelRegistry;

/// Handle to the dual-store engine
///
/// Cheap to clone; all state is shared. Query sessions obtained from a
/// context are independent and single-use — concurrent callers each take
/// their own.
#[derive(Clone)]
pub struct Context {
    documents: Arc<dyn DocumentStore>,
    search: Arc<dyn SearchIndex>,
    registry: Arc<ModelRegistry>,
    coordinator: Coordinator,
    pipeline: MappingPipeline,
    executor: Executor,
}

impl Context {
    /// Build a context over the two store handles, bootstrapping the index
    ///
    /// Runs the index bootstrap once with the configured settings. A
    /// bootstrap that is not acknowledged is logged and tolerated; the
    /// first write will surface the real failure.
    pub fn new(
        config: &Config,
        documents: Arc<dyn DocumentStore>,
        search: Arc<dyn SearchIndex>,
    ) -> Result<Self> {
        match search.ensure_index(&config.index) {
            Ok(true) => {}
            Ok(false) => warn!("search index bootstrap was not acknowledged"),
            Err(e) => return Err(e),
        }
        Ok(Context {
            coordinator: Coordinator::new(documents.clone(), search.clone()),
            pipeline: MappingPipeline::new(documents.clone(), search.clone()),
            executor: Executor::new(search.clone()),
            registry: Arc::new(ModelRegistry::new()),
            documents,
            search,
        })
    }

    /// Build a context over fresh in-memory stores with default config
    pub fn ephemeral() -> Result<Self> {
        Context::new(
            &Config::default(),
            Arc::new(MemoryDocumentStore::new()),
            Arc::new(MemorySearchIndex::new()),
        )
    }

    /// Register a model type and ensure its mapping exists in the index
    pub fn register<M: Model>(&self) -> Result<()> {
        let descriptor = self.registry.register::<M>()?;
        self.pipeline.ensure_mapping(M::NAME, &descriptor.schema)
    }

    /// The model registry
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// The document store handle
    pub fn documents(&self) -> &Arc<dyn DocumentStore> {
        &self.documents
    }

    /// The search index handle
    pub fn search(&self) -> &Arc<dyn SearchIndex> {
        &self.search
    }

    // ------------------------------------------------------------------
    // Read path
    // ------------------------------------------------------------------

    /// Open a fresh query session bound to a registered model type
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnregisteredModel`] if the type was never
    /// registered: an unregistered type has no mapping and its queries
    /// would silently see an unmirrored index.
    pub fn query<M: Model>(&self) -> Result<QuerySession<M>> {
        if !self.registry.contains(M::NAME) {
            return Err(Error::UnregisteredModel(M::NAME.to_string()));
        }
        Ok(QuerySession::bind())
    }

    /// Execute a session's query
    pub fn execute<M: Model>(&self, session: &mut QuerySession<M>) -> Result<QueryOutput<M>> {
        self.executor.execute(session)
    }

    /// Execute and return the matched records only
    pub fn fetch<M: Model>(&self, session: &mut QuerySession<M>) -> Result<Vec<M>> {
        Ok(self.executor.execute(session)?.into_records())
    }

    /// Execute a count probe, returning the reported total
    pub fn count<M: Model>(&self, session: &mut QuerySession<M>) -> Result<u64> {
        self.executor.count(session)
    }

    // ------------------------------------------------------------------
    // Write path
    // ------------------------------------------------------------------

    /// Create a record in both stores
    pub fn create<M: Model>(&self, model: M) -> Result<M> {
        self.coordinator.create(model)
    }

    /// Create each record in order, reporting partial work on failure
    pub fn create_each<M: Model>(&self, models: Vec<M>) -> BatchOutcome<M> {
        self.coordinator.create_each(models)
    }

    /// Update an already-created record in both stores
    pub fn update<M: Model>(&self, model: &mut M) -> Result<()> {
        self.coordinator.update(model)
    }

    /// Delete every record matching a filter, reporting partial work on
    /// failure
    pub fn destroy<M: Model>(&self, filter: &str) -> BatchOutcome<M> {
        self.coordinator.destroy(filter)
    }

    // ------------------------------------------------------------------
    // Administration
    // ------------------------------------------------------------------

    /// Load the whole collection for a type from the document store
    pub fn fetch_collection<M: Model>(&self) -> Result<Vec<M>> {
        self.pipeline.fetch_collection::<M>()
    }

    /// Load the raw view rows for a type, undeserialized
    pub fn fetch_raw_collection<M: Model>(&self) -> Result<Vec<ViewRow>> {
        self.pipeline.fetch_raw_collection::<M>()
    }

    /// Push a type's mapping unless one already exists
    pub fn ensure_mapping<M: Model>(&self) -> Result<()> {
        let schema = match self.registry.descriptor(M::NAME) {
            Some(descriptor) => descriptor.schema,
            None => tandem_core::derive_schema::<M>()?,
        };
        self.pipeline.ensure_mapping(M::NAME, &schema)
    }

    /// Delete a type's mapping; absent mapping is a no-op
    pub fn drop_mapping<M: Model>(&self) -> Result<()> {
        self.pipeline.drop_mapping(M::NAME)
    }

    /// Rebuild the search index for a type from the document store
    pub fn reindex<M: Model>(&self) -> Result<()> {
        self.pipeline.reindex::<M>()
    }
}

//! Mapping and reindex pipeline
//!
//! Manages the search index's per-type schema and rebuilds the index for a
//! type from the document store's authoritative collection. The reindex is
//! four phases run in order with no rollback:
//!
//! 1. drop the existing mapping,
//! 2. derive a fresh schema and push it,
//! 3. load the entire collection from the document store,
//! 4. re-insert every record under its stable key.
//!
//! A failure aborts the pipeline with an error naming the phase. Between
//! phase 1 and the end of phase 4, searches against the type are incomplete
//! or structurally invalid; reads in that window are unreliable.
//!
//! Phase 3 materializes the whole collection in memory before phase 4
//! begins. Memory use is proportional to collection size; there is no
//! streaming or batching.

use serde_json::Value;
use std::sync::Arc;
use tandem_core::{
    derive_schema, DocumentStore, Error, Model, ReindexPhase, Result, SearchIndex, ViewRow,
};
use tracing::info;

/// Manages type-to-schema bindings and full index rebuilds
#[derive(Clone)]
pub struct MappingPipeline {
    documents: Arc<dyn DocumentStore>,
    search: Arc<dyn SearchIndex>,
}

impl MappingPipeline {
    /// Build a pipeline over the two store handles
    pub fn new(documents: Arc<dyn DocumentStore>, search: Arc<dyn SearchIndex>) -> Self {
        MappingPipeline { documents, search }
    }

    /// Push a schema for a type unless a mapping already exists
    ///
    /// An existing non-empty mapping makes this a no-op. Otherwise the
    /// schema is pushed with conflict-tolerant semantics and the store must
    /// acknowledge the change.
    pub fn ensure_mapping(&self, type_name: &str, schema: &Value) -> Result<()> {
        if let Some(current) = self.search.mapping(type_name)? {
            if !mapping_is_empty(&current) {
                return Ok(());
            }
        }
        let acknowledged = self.search.put_mapping(type_name, schema)?;
        if !acknowledged {
            return Err(Error::MappingRejected(format!(
                "put mapping for type {type_name} was not acknowledged"
            )));
        }
        Ok(())
    }

    /// Delete the mapping for a type; absent mapping is a no-op
    pub fn drop_mapping(&self, type_name: &str) -> Result<()> {
        match self.search.mapping(type_name)? {
            None => Ok(()),
            Some(current) if mapping_is_empty(&current) => Ok(()),
            Some(_) => self.search.delete_mapping(type_name),
        }
    }

    /// Load the whole collection for a model type from the document store
    pub fn fetch_collection<M: Model>(&self) -> Result<Vec<M>> {
        let rows = self.documents.view(M::NAME)?;
        let mut collection = Vec::with_capacity(rows.len());
        for row in rows {
            let record: M = serde_json::from_value(row.doc).map_err(|e| {
                Error::Serialization(format!(
                    "view row for key {} does not deserialize onto {}: {}",
                    row.key,
                    M::NAME,
                    e
                ))
            })?;
            collection.push(record);
        }
        Ok(collection)
    }

    /// Load the raw view rows for a model type, undeserialized
    pub fn fetch_raw_collection<M: Model>(&self) -> Result<Vec<ViewRow>> {
        self.documents.view(M::NAME)
    }

    /// Rebuild the search index for a type from the document store
    ///
    /// Use this after changing a model's mapping: the old mapping is torn
    /// down, a fresh one derived and pushed, and every record re-inserted.
    /// A failure after phase 2 leaves the index with a new mapping but stale
    /// or missing documents; retry the reindex to repair.
    pub fn reindex<M: Model>(&self) -> Result<()> {
        info!(type_name = M::NAME, "reindex: dropping existing mapping");
        self.drop_mapping(M::NAME)
            .map_err(|e| Error::reindex(ReindexPhase::DropMapping, e))?;

        info!(type_name = M::NAME, "reindex: pushing fresh mapping");
        let schema =
            derive_schema::<M>().map_err(|e| Error::reindex(ReindexPhase::PutMapping, e))?;
        let acknowledged = self
            .search
            .put_mapping(M::NAME, &schema)
            .map_err(|e| Error::reindex(ReindexPhase::PutMapping, e))?;
        if !acknowledged {
            return Err(Error::reindex(
                ReindexPhase::PutMapping,
                Error::MappingRejected(format!(
                    "put mapping for type {} was not acknowledged",
                    M::NAME
                )),
            ));
        }

        let collection = self
            .fetch_collection::<M>()
            .map_err(|e| Error::reindex(ReindexPhase::LoadCollection, e))?;
        info!(
            type_name = M::NAME,
            count = collection.len(),
            "reindex: bulk inserting collection"
        );

        for record in &collection {
            let key = record.key();
            let doc = serde_json::to_value(record)
                .map_err(|e| Error::reindex(ReindexPhase::BulkInsert, e.into()))?;
            self.search
                .index(&key, &doc)
                .map_err(|e| Error::reindex(ReindexPhase::BulkInsert, e))?;
        }
        Ok(())
    }
}

fn mapping_is_empty(mapping: &Value) -> bool {
    match mapping {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

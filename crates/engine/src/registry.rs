//! Model registry
//!
//! Maps registered type names to their descriptors (derived mapping schema).
//! Populated at startup, read-only during normal query and write operations.
//! This replaces the process-wide global cache of the original design with
//! explicit state owned by the [`crate::context::Context`].

use parking_lot::RwLock;
use std::collections::HashMap;
use tandem_core::{derive_schema, Model, Result};

/// Descriptor for a registered model type
#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    /// The registered type name
    pub type_name: String,
    /// Mapping schema derived from the model's zero value
    pub schema: serde_json::Value,
}

/// Startup-populated map from type name to descriptor
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: RwLock<HashMap<String, ModelDescriptor>>,
}

impl ModelRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model type, deriving its schema from the zero value
    ///
    /// Re-registering a type replaces its descriptor. Returns the new
    /// descriptor.
    pub fn register<M: Model>(&self) -> Result<ModelDescriptor> {
        let descriptor = ModelDescriptor {
            type_name: M::NAME.to_string(),
            schema: derive_schema::<M>()?,
        };
        self.models
            .write()
            .insert(M::NAME.to_string(), descriptor.clone());
        Ok(descriptor)
    }

    /// Look up the descriptor for a type name
    pub fn descriptor(&self, type_name: &str) -> Option<ModelDescriptor> {
        self.models.read().get(type_name).cloned()
    }

    /// Whether a type name is registered
    pub fn contains(&self, type_name: &str) -> bool {
        self.models.read().contains_key(type_name)
    }

    /// All registered type names
    pub fn type_names(&self) -> Vec<String> {
        self.models.read().keys().cloned().collect()
    }
}

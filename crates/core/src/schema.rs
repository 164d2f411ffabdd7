//! Mapping schema derivation
//!
//! The search index needs a per-type schema (mapping) before documents of
//! that type are indexed. The schema is derived from the model's zero value:
//! serialize `M::default()` and map each field's JSON type to an index field
//! type. Nested objects become nested `properties`.

use crate::error::{Error, Result};
use crate::model::Model;
use serde_json::{json, Map, Value};

/// Derive the mapping schema for a model type from its zero value
///
/// The result is the body pushed to the search index:
/// `{"<type>": {"properties": {"<field>": {"type": ...}, ...}}}`.
pub fn derive_schema<M: Model>() -> Result<Value> {
    let zero = serde_json::to_value(M::default())?;
    let Value::Object(fields) = zero else {
        return Err(Error::Serialization(format!(
            "model {} does not serialize to an object",
            M::NAME
        )));
    };
    Ok(json!({ M::NAME: { "properties": properties_for(&fields) } }))
}

fn properties_for(fields: &Map<String, Value>) -> Value {
    let mut properties = Map::new();
    for (name, value) in fields {
        properties.insert(name.clone(), field_type(value));
    }
    Value::Object(properties)
}

fn field_type(value: &Value) -> Value {
    match value {
        Value::String(_) | Value::Null => json!({ "type": "string" }),
        Value::Bool(_) => json!({ "type": "boolean" }),
        Value::Number(n) if n.is_f64() => json!({ "type": "double" }),
        Value::Number(_) => json!({ "type": "long" }),
        Value::Object(nested) => json!({ "properties": properties_for(nested) }),
        // Element type of a zero-value array is unknowable; index as string.
        Value::Array(items) => items
            .first()
            .map(field_type)
            .unwrap_or_else(|| json!({ "type": "string" })),
    }
}

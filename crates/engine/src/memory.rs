//! In-memory store backends
//!
//! DashMap-backed implementations of the two store traits, suitable for
//! tests and embedded use. The search backend evaluates the engine's own
//! wire shape: the `_type` term, `term` filters on document fields and the
//! `_id`/`_type` metadata fields, `bool` combinations, sort clauses,
//! `from`/`size` pagination with the index defaults (0 and 10), and the
//! `value_count` and `terms` aggregations.

use dashmap::DashMap;
use parking_lot::RwLock;
use serde_json::{json, Map, Value};
use std::cmp::Ordering;
use tandem_core::{
    DocumentKey, DocumentStore, Error, IndexSettings, Result, SearchHit, SearchIndex,
    SearchResponse, ViewRow,
};

/// Page size applied when a query carries no `size`
const DEFAULT_PAGE_SIZE: u64 = 10;

// ============================================================================
// MemoryDocumentStore
// ============================================================================

/// In-memory document store: per-type id counters plus a key-to-document map
///
/// Ids are assigned by incrementing the type's counter, mirroring a
/// counter-document increment in a real store.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    docs: DashMap<String, Value>,
    counters: DashMap<String, i64>,
}

impl MemoryDocumentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents held, across all types
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Whether the store holds no documents
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn next_id(&self, type_name: &str) -> Result<i64> {
        let mut counter = self.counters.entry(type_name.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    fn put(&self, key: &DocumentKey, doc: &Value) -> Result<()> {
        self.docs.insert(key.to_string(), doc.clone());
        Ok(())
    }

    fn get(&self, key: &DocumentKey) -> Result<Option<Value>> {
        Ok(self.docs.get(&key.to_string()).map(|v| v.clone()))
    }

    fn delete(&self, key: &DocumentKey) -> Result<()> {
        self.docs.remove(&key.to_string());
        Ok(())
    }

    fn view(&self, type_name: &str) -> Result<Vec<ViewRow>> {
        let prefix = format!("{type_name}:");
        let mut rows = Vec::new();
        for entry in self.docs.iter() {
            if let Some(id_part) = entry.key().strip_prefix(&prefix) {
                // keys of other types sharing the prefix would carry extra
                // colons and fail the id parse
                if let Ok(id) = id_part.parse::<i64>() {
                    rows.push(ViewRow {
                        key: DocumentKey::new(type_name, id),
                        doc: entry.value().clone(),
                    });
                }
            }
        }
        rows.sort_by_key(|row| row.key.id());
        Ok(rows)
    }
}

// ============================================================================
// MemorySearchIndex
// ============================================================================

/// In-memory search index evaluating the engine's query wire shape
#[derive(Debug, Default)]
pub struct MemorySearchIndex {
    docs: DashMap<String, Value>,
    mappings: DashMap<String, Value>,
    settings: RwLock<Option<IndexSettings>>,
}

impl MemorySearchIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// The settings the index was bootstrapped with, if any
    pub fn settings(&self) -> Option<IndexSettings> {
        self.settings.read().clone()
    }

    /// The document stored under a key, if any
    pub fn stored(&self, key: &DocumentKey) -> Option<Value> {
        self.docs.get(&key.to_string()).map(|v| v.clone())
    }

    /// Number of documents indexed, across all types
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Whether the index holds no documents
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl SearchIndex for MemorySearchIndex {
    fn ensure_index(&self, settings: &IndexSettings) -> Result<bool> {
        let mut slot = self.settings.write();
        if slot.is_none() {
            *slot = Some(settings.clone());
        }
        Ok(true)
    }

    fn index(&self, key: &DocumentKey, doc: &Value) -> Result<()> {
        self.docs.insert(key.to_string(), doc.clone());
        Ok(())
    }

    fn update(&self, key: &DocumentKey, doc: &Value) -> Result<()> {
        // upsert; the coordinator confirms existence before mirroring
        self.docs.insert(key.to_string(), doc.clone());
        Ok(())
    }

    fn delete(&self, key: &DocumentKey) -> Result<()> {
        self.docs.remove(&key.to_string());
        Ok(())
    }

    fn search(&self, body: &Value) -> Result<SearchResponse> {
        let type_name = body
            .pointer("/query/filtered/query/bool/must/0/term/_type/value")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::InvalidFragment("query body carries no type filter term".to_string())
            })?;
        let filter = body
            .pointer("/query/filtered/filter")
            .cloned()
            .unwrap_or_else(|| json!({}));

        let prefix = format!("{type_name}:");
        let mut matched: Vec<(DocumentKey, Value)> = Vec::new();
        for entry in self.docs.iter() {
            if !entry.key().starts_with(&prefix) {
                continue;
            }
            let key: DocumentKey = entry.key().parse()?;
            if key.type_name() != type_name {
                continue;
            }
            if eval_filter(&filter, &key, entry.value())? {
                matched.push((key, entry.value().clone()));
            }
        }
        matched.sort_by_key(|(key, _)| key.id());

        if let Some(clauses) = body.get("sort").and_then(Value::as_array) {
            let clauses = parse_sort_clauses(clauses)?;
            matched.sort_by(|(_, a), (_, b)| compare_by_clauses(&clauses, a, b));
        }

        let total = matched.len() as u64;
        let aggregations = match body.get("aggs") {
            Some(aggs) => Some(run_aggregations(aggs, &matched)?),
            None => None,
        };

        let from = body.get("from").and_then(Value::as_u64).unwrap_or(0) as usize;
        let size = body
            .get("size")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_PAGE_SIZE) as usize;
        let hits = matched
            .into_iter()
            .skip(from)
            .take(size)
            .map(|(key, source)| SearchHit { key, source })
            .collect();

        Ok(SearchResponse {
            total,
            hits,
            aggregations,
        })
    }

    fn mapping(&self, type_name: &str) -> Result<Option<Value>> {
        Ok(self.mappings.get(type_name).map(|v| v.clone()))
    }

    fn put_mapping(&self, type_name: &str, schema: &Value) -> Result<bool> {
        self.mappings.insert(type_name.to_string(), schema.clone());
        Ok(true)
    }

    fn delete_mapping(&self, type_name: &str) -> Result<()> {
        self.mappings.remove(type_name);
        Ok(())
    }
}

// ============================================================================
// Filter evaluation
// ============================================================================

fn eval_filter(filter: &Value, key: &DocumentKey, doc: &Value) -> Result<bool> {
    let Value::Object(map) = filter else {
        return Err(Error::InvalidFragment(
            "filter clause must be a JSON object".to_string(),
        ));
    };
    if map.is_empty() {
        return Ok(true);
    }
    for (name, clause) in map {
        let matches = match name.as_str() {
            "query" => eval_filter(clause, key, doc)?,
            "bool" => eval_bool(clause, key, doc)?,
            "term" => eval_term(clause, key, doc)?,
            "match_all" => true,
            other => {
                return Err(Error::InvalidFragment(format!(
                    "unsupported filter clause: {other}"
                )))
            }
        };
        if !matches {
            return Ok(false);
        }
    }
    Ok(true)
}

fn eval_bool(clause: &Value, key: &DocumentKey, doc: &Value) -> Result<bool> {
    let Value::Object(map) = clause else {
        return Err(Error::InvalidFragment(
            "bool clause must be a JSON object".to_string(),
        ));
    };
    if let Some(must) = map.get("must").and_then(Value::as_array) {
        for inner in must {
            if !eval_filter(inner, key, doc)? {
                return Ok(false);
            }
        }
    }
    if let Some(must_not) = map.get("must_not").and_then(Value::as_array) {
        for inner in must_not {
            if eval_filter(inner, key, doc)? {
                return Ok(false);
            }
        }
    }
    if let Some(should) = map.get("should").and_then(Value::as_array) {
        if !should.is_empty() {
            let mut any = false;
            for inner in should {
                if eval_filter(inner, key, doc)? {
                    any = true;
                    break;
                }
            }
            if !any {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

fn eval_term(clause: &Value, key: &DocumentKey, doc: &Value) -> Result<bool> {
    let Value::Object(map) = clause else {
        return Err(Error::InvalidFragment(
            "term clause must be a JSON object".to_string(),
        ));
    };
    for (field, expected) in map {
        // `{"field": {"value": v}}` and `{"field": v}` are both accepted
        let expected = expected.get("value").unwrap_or(expected);
        let matches = match field.as_str() {
            "_id" => expected.as_str() == Some(key.to_string().as_str()),
            "_type" => expected.as_str() == Some(key.type_name()),
            _ => doc.get(field) == Some(expected),
        };
        if !matches {
            return Ok(false);
        }
    }
    Ok(true)
}

// ============================================================================
// Sorting
// ============================================================================

struct SortClause {
    field: String,
    ascending: bool,
}

fn parse_sort_clauses(clauses: &[Value]) -> Result<Vec<SortClause>> {
    let mut parsed = Vec::with_capacity(clauses.len());
    for clause in clauses {
        let Value::Object(map) = clause else {
            return Err(Error::InvalidFragment(
                "sort clause must be a JSON object".to_string(),
            ));
        };
        for (field, spec) in map {
            let order = spec
                .get("order")
                .and_then(Value::as_str)
                .unwrap_or("asc");
            parsed.push(SortClause {
                field: field.clone(),
                ascending: order != "desc",
            });
        }
    }
    Ok(parsed)
}

fn compare_by_clauses(clauses: &[SortClause], a: &Value, b: &Value) -> Ordering {
    for clause in clauses {
        let left = a.get(&clause.field).unwrap_or(&Value::Null);
        let right = b.get(&clause.field).unwrap_or(&Value::Null);
        let ordering = compare_values(left, right);
        let ordering = if clause.ascending {
            ordering
        } else {
            ordering.reverse()
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

// ============================================================================
// Aggregations
// ============================================================================

fn run_aggregations(aggs: &Value, matched: &[(DocumentKey, Value)]) -> Result<Value> {
    let Value::Object(map) = aggs else {
        return Err(Error::InvalidFragment(
            "aggs clause must be a JSON object".to_string(),
        ));
    };
    let mut results = Map::new();
    for (name, spec) in map {
        results.insert(name.clone(), run_aggregation(spec, matched)?);
    }
    Ok(Value::Object(results))
}

fn run_aggregation(spec: &Value, matched: &[(DocumentKey, Value)]) -> Result<Value> {
    if let Some(field) = spec.pointer("/value_count/field").and_then(Value::as_str) {
        let count = matched
            .iter()
            .filter(|(_, doc)| doc.get(field).map(|v| !v.is_null()).unwrap_or(false))
            .count();
        return Ok(json!({ "value": count }));
    }
    if let Some(field) = spec.pointer("/terms/field").and_then(Value::as_str) {
        let mut buckets: Vec<(String, usize)> = Vec::new();
        for (_, doc) in matched {
            let Some(value) = doc.get(field) else { continue };
            if value.is_null() {
                continue;
            }
            let bucket_key = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            match buckets.iter_mut().find(|(k, _)| *k == bucket_key) {
                Some((_, count)) => *count += 1,
                None => buckets.push((bucket_key, 1)),
            }
        }
        buckets.sort_by(|(ka, ca), (kb, cb)| cb.cmp(ca).then_with(|| ka.cmp(kb)));
        let buckets: Vec<Value> = buckets
            .into_iter()
            .map(|(k, count)| json!({ "key": k, "doc_count": count }))
            .collect();
        return Ok(json!({ "buckets": buckets }));
    }
    Err(Error::InvalidFragment(
        "unsupported aggregation; expected value_count or terms".to_string(),
    ))
}

//! Query document
//!
//! The search index speaks one query shape:
//!
//! ```json
//! {"query":{"filtered":{
//!     "query":{"bool":{"must":[{"term":{"_type":{"value":"<type>"}}}]}},
//!     "filter":{...}}},
//!  "sort":[{"<field>":{"order":"asc"}}],
//!  "from":0,"size":10,"aggs":{...}}
//! ```
//!
//! [`QueryDocument`] is that shape as an explicit struct. Sessions clone the
//! template structurally (`derive(Clone)`) instead of round-tripping through
//! serialization, and the type-filter term is set at construction and never
//! altered afterwards.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Page size used by the destroy-all-matching path to mean "unbounded"
pub const UNBOUNDED_LIMIT: u64 = 999_999_999;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TermValue {
    value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TypeTermField {
    #[serde(rename = "_type")]
    doc_type: TermValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TypeTerm {
    term: TypeTermField,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct BoolClause {
    must: Vec<TypeTerm>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct BoolWrapper {
    #[serde(rename = "bool")]
    clause: BoolClause,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FilteredClause {
    query: BoolWrapper,
    filter: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct QueryClause {
    filtered: FilteredClause,
}

/// One structured search query, owned by a single session
///
/// The authoritative `_type` term is present from construction on; a document
/// without it cannot be built through this API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDocument {
    query: QueryClause,
    sort: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    aggs: Option<Value>,
}

impl QueryDocument {
    /// Clone the canonical template and bind it to a model type
    pub fn for_type(type_name: &str) -> Self {
        QueryDocument {
            query: QueryClause {
                filtered: FilteredClause {
                    query: BoolWrapper {
                        clause: BoolClause {
                            must: vec![TypeTerm {
                                term: TypeTermField {
                                    doc_type: TermValue {
                                        value: type_name.to_string(),
                                    },
                                },
                            }],
                        },
                    },
                    filter: json!({}),
                },
            },
            sort: Vec::new(),
            from: None,
            size: None,
            aggs: None,
        }
    }

    /// Type name carried by the `_type` term
    pub fn type_name(&self) -> &str {
        &self.query.filtered.query.clause.must[0].term.doc_type.value
    }

    /// Replace the caller-supplied filter wholesale (last write wins)
    pub fn set_filter(&mut self, filter: Value) {
        self.query.filtered.filter = filter;
    }

    /// Current filter clause
    pub fn filter(&self) -> &Value {
        &self.query.filtered.filter
    }

    /// Set the pagination offset
    pub fn set_from(&mut self, from: u64) {
        self.from = Some(from);
    }

    /// Current pagination offset, if set
    pub fn from(&self) -> Option<u64> {
        self.from
    }

    /// Set the page size
    pub fn set_size(&mut self, size: u64) {
        self.size = Some(size);
    }

    /// Current page size, if set
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// Append a sort clause; clauses compose in call order
    pub fn push_sort(&mut self, field: &str, ascending: bool) {
        let order = if ascending { "asc" } else { "desc" };
        self.sort.push(json!({ field: { "order": order } }));
    }

    /// Sort clauses in append order
    pub fn sort(&self) -> &[Value] {
        &self.sort
    }

    /// Replace the aggregation clause wholesale
    pub fn set_aggs(&mut self, aggs: Value) {
        self.aggs = Some(aggs);
    }

    /// Current aggregation clause, if set
    pub fn aggs(&self) -> Option<&Value> {
        self.aggs.as_ref()
    }

    /// True when an aggregation clause is present
    pub fn has_aggs(&self) -> bool {
        self.aggs.is_some()
    }

    /// Serialize to the JSON body sent to the search index
    pub fn to_body(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

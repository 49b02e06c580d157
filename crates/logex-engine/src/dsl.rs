//! Rendering of a [`Query`] as a search request body.
//!
//! Content clauses become `bool.must` entries. Index clauses are not rendered;
//! they select the indices in the request path instead.

use serde_json::{Map, Value, json};

use crate::query::{Clause, Query};

/// Builds a single-key JSON object.
fn keyed(key: &str, value: Value) -> Value {
    let mut map = Map::with_capacity(1);
    map.insert(key.to_string(), value);
    Value::Object(map)
}

/// Renders one clause.
#[must_use]
pub fn clause_body(clause: &Clause) -> Value {
    match clause {
        Clause::Term { field, value } => {
            json!({ "term": keyed(field.document_path(), json!(value)) })
        }
        Clause::Range { field, gte, lte } => json!({
            "range": keyed(
                field.document_path(),
                json!({ "gte": gte.to_rfc3339(), "lte": lte.to_rfc3339() }),
            )
        }),
        Clause::MatchAll { field, value } => json!({
            "match": keyed(
                field.document_path(),
                json!({ "query": value, "operator": "and" }),
            )
        }),
    }
}

/// Renders the full request body for a query.
#[must_use]
pub fn search_body(query: &Query) -> Value {
    let must: Vec<Value> = query.filter_clauses().map(clause_body).collect();
    let sort = query.sort();

    json!({
        "query": { "bool": { "must": must } },
        "sort": [keyed(sort.field.document_path(), json!({ "order": sort.order.as_str() }))],
        "size": query.size_limit(),
        "track_total_hits": true,
    })
}

//! Core types shared by both execution backends.
//!
//! This module provides:
//! - [`Partition`]: The three logical log partitions (`app`, `infra`, `audit`)
//! - [`Field`]: Queryable record dimensions and their spellings
//! - [`LogRecord`]: One opaque log document returned to callers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StoreError;

/// Logical log partition a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    /// Application container logs
    App,
    /// Infrastructure (node and platform) logs
    Infra,
    /// Audit logs
    Audit,
}

impl Partition {
    /// All partitions in their canonical search order.
    pub const ALL: [Self; 3] = [Self::App, Self::Infra, Self::Audit];

    /// Returns the string representation of this partition.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::App => "app",
            Self::Infra => "infra",
            Self::Audit => "audit",
        }
    }

    /// Parses a partition name, ignoring case.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl FromStr for Partition {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| StoreError::UnknownIndex(s.to_string()))
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A queryable dimension of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Kubernetes namespace
    Namespace,
    /// Pod name
    Pod,
    /// Container name
    Container,
    /// Logical partition
    Index,
    /// Flattened `key=value` pod labels
    FlatLabels,
    /// Record timestamp
    Timestamp,
    /// Severity level
    Level,
}

impl Field {
    /// Returns the clause label of this field.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Namespace => "namespace",
            Self::Pod => "pod",
            Self::Container => "container",
            Self::Index => "index",
            Self::FlatLabels => "flat_labels",
            Self::Timestamp => "timestamp",
            Self::Level => "level",
        }
    }

    /// Returns the dotted path of this field inside a search document.
    #[must_use]
    pub const fn document_path(&self) -> &'static str {
        match self {
            Self::Namespace => "kubernetes.namespace_name",
            Self::Pod => "kubernetes.pod_name",
            Self::Container => "kubernetes.container_name",
            Self::Index => "_index",
            Self::FlatLabels => "kubernetes.flat_labels",
            Self::Timestamp => "@timestamp",
            Self::Level => "level",
        }
    }

    /// Returns the `label: value` prefixes recognised in pre-rendered text records.
    #[must_use]
    pub const fn text_labels(&self) -> &'static [&'static str] {
        match self {
            Self::Namespace => &["namespace", "namespace_name"],
            Self::Pod => &["pod", "pod_name"],
            Self::Container => &["container", "container_name"],
            Self::Index => &["index"],
            Self::FlatLabels => &["flat_labels", "label"],
            Self::Timestamp => &["timestamp", "@timestamp"],
            Self::Level => &["level"],
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One log document, preserved exactly as stored.
///
/// A record is either a structured JSON document (as returned by the search
/// backend) or a pre-rendered text line. The engine never rewrites it; the
/// only interpretation happens in [`LogRecord::field_values`], which the
/// reference engine uses for clause matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogRecord(Value);

impl LogRecord {
    /// Wraps a structured document.
    #[must_use]
    pub const fn new(document: Value) -> Self {
        Self(document)
    }

    /// Wraps a pre-rendered text line.
    #[must_use]
    pub fn text(line: impl Into<String>) -> Self {
        Self(Value::String(line.into()))
    }

    /// Interprets a raw string: JSON objects become documents, anything else
    /// is kept as a text line.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(doc @ Value::Object(_)) => Self(doc),
            _ => Self::text(raw),
        }
    }

    /// Returns the underlying JSON value.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the record, returning the underlying JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Returns true if this record is a pre-rendered text line.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self.0, Value::String(_))
    }

    /// Extracts every value this record holds for a field.
    ///
    /// Documents are read by [`Field::document_path`], falling back to a
    /// top-level key named after [`Field::label`]. Text lines are scanned for
    /// `label: value` tokens; a value ends at the next comma or whitespace.
    #[must_use]
    pub fn field_values(&self, field: Field) -> Vec<String> {
        match &self.0 {
            Value::String(line) => text_values(line, field),
            doc => lookup_path(doc, field.document_path())
                .or_else(|| doc.get(field.label()))
                .map(scalar_strings)
                .unwrap_or_default(),
        }
    }
}

impl From<&str> for LogRecord {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for LogRecord {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<Value> for LogRecord {
    fn from(document: Value) -> Self {
        Self(document)
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(line) => f.write_str(line),
            doc => write!(f, "{doc}"),
        }
    }
}

fn lookup_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(doc, |node, key| node.get(key))
}

fn scalar_strings(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items.iter().flat_map(scalar_strings).collect(),
        Value::Object(_) => Vec::new(),
        other => vec![other.to_string()],
    }
}

fn text_values(line: &str, field: Field) -> Vec<String> {
    let mut values = Vec::new();
    for label in field.text_labels() {
        let needle = format!("{label}: ");
        let mut offset = 0;
        while let Some(pos) = line[offset..].find(&needle) {
            let start = offset + pos;
            let value_start = start + needle.len();
            offset = value_start;

            // Reject matches inside a longer label, e.g. `pod` within `sub_pod`.
            let bounded = line[..start]
                .chars()
                .next_back()
                .is_none_or(|c| !(c.is_alphanumeric() || c == '_' || c == '@'));
            if !bounded {
                continue;
            }

            let value: String = line[value_start..]
                .chars()
                .take_while(|c| !(c.is_whitespace() || *c == ','))
                .collect();
            if !value.is_empty() {
                values.push(value);
            }
        }
    }
    values
}

//! JSON-lines seed loader for the reference engine.
//!
//! Each non-blank line is one batch:
//!
//! ```text
//! {"index":"infra","timestamp":"2021-03-17T14:22:40+05:30","records":["pod: web-0"]}
//! ```
//!
//! `timestamp` is optional and defaults to the load time. Records may be text
//! lines or JSON documents.

use std::path::Path;

use chrono::{DateTime, Utc};
use logex_engine::{LogRecord, Partition, ReferenceEngine};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::error::SeedError;

#[derive(Debug, Deserialize)]
struct SeedBatch {
    index: String,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    records: Vec<Value>,
}

/// Loads seed batches from a string.
///
/// Returns the number of batches stored.
///
/// # Errors
///
/// Returns a [`SeedError`] naming the first bad line. Batches before it stay
/// loaded.
pub fn load_str(engine: &ReferenceEngine, contents: &str) -> Result<usize, SeedError> {
    let mut batches = 0;

    for (i, raw) in contents.lines().enumerate() {
        let line = i + 1;
        if raw.trim().is_empty() {
            continue;
        }

        let batch: SeedBatch =
            serde_json::from_str(raw).map_err(|source| SeedError::Parse { line, source })?;
        let partition: Partition = batch
            .index
            .parse()
            .map_err(|source| SeedError::Index { line, source })?;
        let records = batch.records.into_iter().map(LogRecord::from);

        match batch.timestamp {
            Some(value) => {
                let timestamp = DateTime::parse_from_rfc3339(&value)
                    .map_err(|_| SeedError::Timestamp { line, value: value.clone() })?;
                engine.put_at(timestamp, partition, records);
            }
            None => engine.put_at(Utc::now(), partition, records),
        }
        batches += 1;
    }

    Ok(batches)
}

/// Loads seed batches from a file.
///
/// # Errors
///
/// Returns a [`SeedError`] if the file cannot be read or a line is invalid.
pub fn load_file(engine: &ReferenceEngine, path: &Path) -> Result<usize, SeedError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| SeedError::Read(path.to_path_buf(), e))?;
    let batches = load_str(engine, &contents)?;
    info!(path = %path.display(), batches, records = engine.len(), "loaded seed file");
    Ok(batches)
}

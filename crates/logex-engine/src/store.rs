//! In-memory reference engine.
//!
//! This module provides:
//! - [`ReferenceEngine`]: Thread-safe, time-indexed log store that executes
//!   queries with the same semantics as the search backend
//! - Implementation of [`Executor`] for generic usage

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::RwLock;
use tracing::debug;

use crate::error::TransportError;
use crate::query::{Clause, Query};
use crate::traits::Executor;
use crate::types::{LogRecord, Partition};

/// Record batches of one partition, keyed by timestamp.
type Batches = BTreeMap<DateTime<Utc>, Vec<LogRecord>>;

#[derive(Debug, Default)]
struct Partitions {
    app: Batches,
    infra: Batches,
    audit: Batches,
}

impl Partitions {
    const fn get(&self, partition: Partition) -> &Batches {
        match partition {
            Partition::App => &self.app,
            Partition::Infra => &self.infra,
            Partition::Audit => &self.audit,
        }
    }

    const fn get_mut(&mut self, partition: Partition) -> &mut Batches {
        match partition {
            Partition::App => &mut self.app,
            Partition::Infra => &mut self.infra,
            Partition::Audit => &mut self.audit,
        }
    }
}

/// Thread-safe in-memory log store that answers compiled queries.
///
/// The whole store sits behind a single lock, so every `put`, `put_at` and
/// `clear` is atomic with respect to concurrent queries. There is no aging or
/// eviction.
#[derive(Debug, Default)]
pub struct ReferenceEngine {
    partitions: RwLock<Partitions>,
}

impl ReferenceEngine {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a batch of records in a partition, timestamped now.
    pub fn put<I>(&self, partition: Partition, data: I)
    where
        I: IntoIterator,
        I::Item: Into<LogRecord>,
    {
        self.put_at(Utc::now(), partition, data);
    }

    /// Stores a batch of records in a partition at an explicit timestamp.
    ///
    /// A batch already stored at the same timestamp in the same partition is
    /// replaced.
    pub fn put_at<Tz, I>(&self, timestamp: DateTime<Tz>, partition: Partition, data: I)
    where
        Tz: TimeZone,
        I: IntoIterator,
        I::Item: Into<LogRecord>,
    {
        let timestamp = timestamp.with_timezone(&Utc);
        let batch: Vec<LogRecord> = data.into_iter().map(Into::into).collect();
        let size = batch.len();

        let replaced = self
            .partitions
            .write()
            .get_mut(partition)
            .insert(timestamp, batch)
            .is_some();

        debug!(%partition, %timestamp, size, replaced, "stored reference batch");
    }

    /// Removes every stored record.
    pub fn clear(&self) {
        *self.partitions.write() = Partitions::default();
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        let partitions = self.partitions.read();
        Partition::ALL
            .into_iter()
            .flat_map(|p| partitions.get(p).values())
            .map(Vec::len)
            .sum()
    }

    /// Returns true if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs a query against the stored records.
    ///
    /// Returns records newest first. Ties keep partition order and then
    /// insertion order within the batch.
    #[must_use]
    pub fn search(&self, query: &Query) -> Vec<LogRecord> {
        let Some((from, to)) = time_window(query) else {
            return Vec::new();
        };

        let partitions = self.partitions.read();
        let mut hits: Vec<(DateTime<Utc>, &LogRecord)> = Vec::new();

        for partition in query.partitions() {
            for (timestamp, batch) in partitions.get(partition).range(from..=to) {
                hits.extend(
                    batch
                        .iter()
                        .filter(|record| query.admits(*timestamp, record))
                        .map(|record| (*timestamp, record)),
                );
            }
        }

        hits.sort_by(|a, b| b.0.cmp(&a.0));
        hits.into_iter()
            .take(query.size_limit())
            .map(|(_, record)| record.clone())
            .collect()
    }
}

/// Intersects every range clause into one inclusive window.
///
/// Returns `None` when the window is empty.
fn time_window(query: &Query) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let mut from = DateTime::<Utc>::MIN_UTC;
    let mut to = DateTime::<Utc>::MAX_UTC;

    for clause in query.clauses() {
        if let Clause::Range { gte, lte, .. } = clause {
            from = from.max(gte.with_timezone(&Utc));
            to = to.min(lte.with_timezone(&Utc));
        }
    }

    (from <= to).then_some((from, to))
}

/// Shared reference engine handle.
pub type SharedReferenceEngine = Arc<ReferenceEngine>;

/// Creates a new shared reference engine.
#[must_use]
pub fn shared_engine() -> SharedReferenceEngine {
    Arc::new(ReferenceEngine::new())
}

// ============================================================================
// Trait Implementations
// ============================================================================

impl Executor for ReferenceEngine {
    async fn execute(&self, query: &Query) -> Result<Vec<LogRecord>, TransportError> {
        Ok(self.search(query))
    }

    async fn can_reach_backend(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "reference"
    }
}

impl<E: Executor> Executor for Arc<E> {
    fn execute(
        &self,
        query: &Query,
    ) -> impl Future<Output = Result<Vec<LogRecord>, TransportError>> + Send {
        E::execute(self, query)
    }

    fn can_reach_backend(&self) -> impl Future<Output = bool> + Send {
        E::can_reach_backend(self)
    }

    fn name(&self) -> &'static str {
        E::name(self)
    }
}

//! Traits for query execution backends.
//!
//! This module provides the [`Executor`] trait, implemented by the live
//! search backend and by the in-memory reference engine. Both must produce
//! the same observable result set for the same [`Query`].

use std::future::Future;

use crate::error::TransportError;
use crate::query::Query;
use crate::types::LogRecord;

/// A backend able to run compiled queries.
///
/// Implementors return matching records newest first, capped at
/// [`Query::size_limit`]. An empty result is not an error; classification
/// happens later.
pub trait Executor: Send + Sync {
    /// Executes a query.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the backend cannot be reached or
    /// answers with something that is not a hit list.
    fn execute(
        &self,
        query: &Query,
    ) -> impl Future<Output = Result<Vec<LogRecord>, TransportError>> + Send;

    /// Returns true if the backend is reachable.
    fn can_reach_backend(&self) -> impl Future<Output = bool> + Send;

    /// Returns a short name for logging.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::compile;
    use crate::params::FilterParameters;
    use std::sync::Mutex;

    /// A fixed-response executor for exercising the trait.
    struct FixedExecutor {
        records: Vec<LogRecord>,
        seen: Mutex<Vec<Query>>,
    }

    impl Executor for FixedExecutor {
        async fn execute(&self, query: &Query) -> Result<Vec<LogRecord>, TransportError> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(query.clone());
            }
            Ok(self
                .records
                .iter()
                .take(query.size_limit())
                .cloned()
                .collect())
        }

        async fn can_reach_backend(&self) -> bool {
            true
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn trait_execute_respects_size_limit() {
        let executor = FixedExecutor {
            records: vec![LogRecord::text("a"), LogRecord::text("b")],
            seen: Mutex::new(Vec::new()),
        };

        let query = compile(&FilterParameters::new().with_max_results("1"));
        let records = executor.execute(&query).await.unwrap();

        assert_eq!(records, vec![LogRecord::text("a")]);
        assert_eq!(executor.seen.lock().unwrap().len(), 1);
        assert!(executor.can_reach_backend().await);
        assert_eq!(executor.name(), "fixed");
    }
}

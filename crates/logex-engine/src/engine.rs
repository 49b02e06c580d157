//! Request pipeline: validate, compile, execute, classify.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::compile::compile;
use crate::error::TransportError;
use crate::outcome::{Outcome, classify};
use crate::params::FilterParameters;
use crate::query::Query;
use crate::search::SearchBackend;
use crate::store::SharedReferenceEngine;
use crate::traits::Executor;
use crate::types::LogRecord;
use crate::validate::validate;

/// Runs filter requests against an executor.
///
/// Each request is handled strictly in sequence. The engine holds no mutable
/// state of its own and can be shared across tasks.
#[derive(Debug, Clone)]
pub struct QueryEngine<E> {
    executor: E,
    timeout: Option<Duration>,
}

impl<E: Executor> QueryEngine<E> {
    /// Creates an engine without a deadline.
    #[must_use]
    pub const fn new(executor: E) -> Self {
        Self {
            executor,
            timeout: None,
        }
    }

    /// Sets a deadline applied to every execution.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the underlying executor.
    pub const fn executor(&self) -> &E {
        &self.executor
    }

    /// Filters logs.
    pub async fn filter_logs(&self, params: &FilterParameters) -> Outcome {
        self.filter_logs_with(params, &CancellationToken::new()).await
    }

    /// Filters logs, aborting when `cancel` fires.
    ///
    /// Cancellation and deadline expiry both surface as an internal timeout.
    pub async fn filter_logs_with(
        &self,
        params: &FilterParameters,
        cancel: &CancellationToken,
    ) -> Outcome {
        if let Err(err) = validate(params) {
            debug!(rule = err.rule(), "rejected log filter");
            return classify(Vec::new(), None, Some(err));
        }

        let query = compile(params);
        match self.run(&query, cancel).await {
            Ok(records) => {
                debug!(executor = self.executor.name(), records = records.len(), "log query executed");
                classify(records, None, None)
            }
            Err(err) => classify(Vec::new(), Some(err), None),
        }
    }

    async fn run(
        &self,
        query: &Query,
        cancel: &CancellationToken,
    ) -> Result<Vec<LogRecord>, TransportError> {
        let execution = self.executor.execute(query);
        let bounded = async {
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, execution)
                    .await
                    .unwrap_or(Err(TransportError::Timeout)),
                None => execution.await,
            }
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(TransportError::Timeout),
            result = bounded => result,
        }
    }

    /// Returns true if the executor's backend is reachable.
    pub async fn can_reach_backend(&self) -> bool {
        self.executor.can_reach_backend().await
    }
}

/// Executor chosen at runtime.
#[derive(Debug, Clone)]
pub enum AnyExecutor {
    /// Live search cluster.
    Search(SearchBackend),
    /// In-memory reference engine.
    Reference(SharedReferenceEngine),
}

impl From<SearchBackend> for AnyExecutor {
    fn from(backend: SearchBackend) -> Self {
        Self::Search(backend)
    }
}

impl From<SharedReferenceEngine> for AnyExecutor {
    fn from(engine: SharedReferenceEngine) -> Self {
        Self::Reference(engine)
    }
}

impl Executor for AnyExecutor {
    async fn execute(&self, query: &Query) -> Result<Vec<LogRecord>, TransportError> {
        match self {
            Self::Search(backend) => backend.execute(query).await,
            Self::Reference(engine) => engine.execute(query).await,
        }
    }

    async fn can_reach_backend(&self) -> bool {
        match self {
            Self::Search(backend) => backend.can_reach_backend().await,
            Self::Reference(engine) => engine.can_reach_backend().await,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Search(backend) => backend.name(),
            Self::Reference(engine) => engine.name(),
        }
    }
}

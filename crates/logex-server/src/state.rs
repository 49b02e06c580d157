//! Shared state for the log API.

use logex_engine::{AnyExecutor, QueryEngine};
use tokio_util::sync::CancellationToken;

use crate::metrics::RequestMetrics;

/// State shared by every request handler.
#[derive(Debug)]
pub struct AppState {
    engine: QueryEngine<AnyExecutor>,
    shutdown: CancellationToken,
    metrics: RequestMetrics,
}

impl AppState {
    /// Create state around a query engine.
    #[must_use]
    pub fn new(engine: QueryEngine<AnyExecutor>) -> Self {
        Self {
            engine,
            shutdown: CancellationToken::new(),
            metrics: RequestMetrics::new(),
        }
    }

    /// Get the query engine.
    #[must_use]
    pub const fn engine(&self) -> &QueryEngine<AnyExecutor> {
        &self.engine
    }

    /// Get the request metrics.
    #[must_use]
    pub const fn metrics(&self) -> &RequestMetrics {
        &self.metrics
    }

    /// Token cancelled when the server shuts down.
    ///
    /// In-flight queries observe it and abort.
    #[must_use]
    pub const fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }
}

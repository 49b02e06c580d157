//! Log API server implementation.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use logex_engine::{AnyExecutor, Executor, QueryEngine, SearchBackend, shared_engine};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::{BackendKind, ServerConfig};
use crate::error::{ServerError, ServerResult};
use crate::routes::create_router;
use crate::seed;
use crate::state::AppState;

/// HTTP server for filtered log queries.
#[derive(Debug, Clone)]
pub struct LogServer {
    state: Arc<AppState>,
}

impl LogServer {
    /// Create a server around an existing engine.
    #[must_use]
    pub fn new(engine: QueryEngine<AnyExecutor>) -> Self {
        Self {
            state: Arc::new(AppState::new(engine)),
        }
    }

    /// Build the executor described by the configuration and wrap it.
    ///
    /// The reference backend is warmed from the seed file when one is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the search client
    /// cannot be built, or the seed file fails to load.
    pub fn from_config(config: &ServerConfig) -> ServerResult<Self> {
        config.validate()?;

        let executor = match config.backend {
            BackendKind::Search => AnyExecutor::from(SearchBackend::new(&config.search)?),
            BackendKind::Reference => {
                let store = shared_engine();
                if let Some(path) = &config.seed {
                    seed::load_file(&store, path)?;
                }
                AnyExecutor::from(store)
            }
        };

        info!(backend = executor.name(), "query executor ready");
        let engine = QueryEngine::new(executor).with_timeout(config.query_timeout);
        Ok(Self::new(engine))
    }

    /// Get the shared state.
    #[must_use]
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Start the server with graceful shutdown support.
    ///
    /// When `shutdown` completes, in-flight queries are cancelled and the
    /// server drains remaining connections.
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the address fails or the server stops
    /// unexpectedly.
    pub async fn serve_with_shutdown<F>(&self, addr: SocketAddr, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindFailed(addr, e))?;

        info!(addr = %addr, "log API listening");

        let token = self.state.shutdown_token().clone();
        let signal = async move {
            shutdown.await;
            token.cancel();
        };

        axum::serve(listener, self.router())
            .with_graceful_shutdown(signal)
            .await
            .map_err(ServerError::Serve)?;

        info!("log API shut down");
        Ok(())
    }

    /// Create the router without starting the server.
    pub fn router(&self) -> axum::Router {
        create_router(self.state())
    }
}

//! # logex-server
//!
//! HTTP API for filtered Kubernetes log queries, built on axum.
//!
//! Requests are translated into [`logex_engine::FilterParameters`] and answered
//! by a [`logex_engine::QueryEngine`] backed by either a search cluster or the
//! in-memory reference engine.
//!
//! ## Example
//!
//! ```rust,no_run
//! use logex_server::{BackendKind, LogServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::new(BackendKind::Reference);
//!     let server = LogServer::from_config(&config)?;
//!     server
//!         .serve_with_shutdown(config.bind_addr, async {
//!             let _ = tokio::signal::ctrl_c().await;
//!         })
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## API Endpoints
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/logs/` | GET | All logs, optionally narrowed by query parameters |
//! | `/logs/filter` | GET | Filter on any combination of query parameters |
//! | `/logs/indexfilter/{index}` | GET | Logs of one index |
//! | `/logs/podnamefilter/{podname}` | GET | Logs of one pod |
//! | `/logs/timefilter/{starttime}/{finishtime}` | GET | Logs in a time range |
//! | `/logs/multifilter/{podname}/{namespace}/{starttime}/{finishtime}` | GET | Pod, namespace and time range together |
//! | `/metrics` | GET | Prometheus request metrics |
//! | `/health` | GET | Liveness check |
//! | `/ready` | GET | Search backend reachability |

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod routes;
pub mod seed;
pub mod server;
pub mod state;

// Re-export main types
pub use config::{Args, BackendKind, LogFormat, MAX_LOGS_LIMIT, ServerConfig};
pub use error::{ApiError, SeedError, ServerError, ServerResult};
pub use metrics::RequestMetrics;
pub use routes::create_router;
pub use server::LogServer;
pub use state::AppState;

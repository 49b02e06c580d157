//! # logex-engine
//!
//! Filtered log query engine for Kubernetes logs.
//!
//! This crate provides:
//!
//! - [`FilterParameters`]: Loosely-typed filter input from the controller
//! - [`validate`]: Structural checks run before anything else
//! - [`compile`]: Translation into a backend-agnostic [`Query`]
//! - [`SearchBackend`]: Execution against a search cluster over HTTP
//! - [`ReferenceEngine`]: In-memory executor with identical semantics
//! - [`classify`]: Mapping of results into an [`Outcome`]
//! - [`QueryEngine`]: The full pipeline with deadline and cancellation
//!
//! ## Example
//!
//! ```rust
//! use logex_engine::{FilterParameters, Outcome, Partition, QueryEngine, shared_engine};
//!
//! # tokio_test_block(async {
//! let store = shared_engine();
//! store.put(Partition::Infra, ["pod: web-0, namespace: shop"]);
//!
//! let engine = QueryEngine::new(store);
//! let params = FilterParameters::new().with_pod_name("web-0");
//! assert!(matches!(engine.filter_logs(&params).await, Outcome::Ok(_)));
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod compile;
pub mod config;
pub mod dsl;
pub mod engine;
pub mod error;
pub mod outcome;
pub mod params;
pub mod query;
pub mod search;
pub mod store;
pub mod traits;
pub mod types;
pub mod validate;

// Re-export main types
pub use compile::{Dimension, compile};
pub use config::{IndexPatterns, SearchConfig, TlsIdentity};
pub use dsl::search_body;
pub use engine::{AnyExecutor, QueryEngine};
pub use error::{ConfigError, Result, StoreError, TransportError, ValidationError};
pub use outcome::{INTERNAL_MESSAGE, InternalKind, NOT_FOUND_MESSAGE, Outcome, classify};
pub use params::{DEFAULT_MAX_RESULTS, FilterParameters};
pub use query::{Clause, Combinator, Query, SortOrder, SortSpec};
pub use search::SearchBackend;
pub use store::{ReferenceEngine, SharedReferenceEngine, shared_engine};
pub use traits::Executor;
pub use types::{Field, LogRecord, Partition};
pub use validate::validate;

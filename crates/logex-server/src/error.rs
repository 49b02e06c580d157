//! Error types for the log API server.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use logex_engine::{ConfigError, InternalKind, StoreError, ValidationError};
use serde::Serialize;
use thiserror::Error;

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors raised while starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified address.
    #[error("failed to bind to {0}: {1}")]
    BindFailed(SocketAddr, std::io::Error),

    /// Command-line or environment configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The search backend could not be configured.
    #[error(transparent)]
    Backend(#[from] ConfigError),

    /// The seed file could not be loaded.
    #[error(transparent)]
    Seed(#[from] SeedError),

    /// The HTTP server failed while running.
    #[error("server error: {0}")]
    Serve(std::io::Error),
}

/// Errors raised while loading a seed file into the reference engine.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The file could not be read.
    #[error("failed to read seed file {0}: {1}")]
    Read(PathBuf, #[source] std::io::Error),

    /// A line is not a valid batch.
    #[error("seed line {line}: {source}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// Decoding failure.
        #[source]
        source: serde_json::Error,
    },

    /// A batch names an unknown index.
    #[error("seed line {line}: {source}")]
    Index {
        /// 1-based line number.
        line: usize,
        /// Lookup failure.
        #[source]
        source: StoreError,
    },

    /// A batch timestamp is not RFC3339.
    #[error("seed line {line}: invalid timestamp '{value}'")]
    Timestamp {
        /// 1-based line number.
        line: usize,
        /// Offending value.
        value: String,
    },
}

/// Failure returned to API clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The filter was rejected.
    #[error(transparent)]
    InvalidInput(#[from] ValidationError),

    /// Nothing matched the filter.
    #[error("{}", logex_engine::NOT_FOUND_MESSAGE)]
    NotFound,

    /// Query execution failed.
    #[error("{}", logex_engine::INTERNAL_MESSAGE)]
    Internal(InternalKind),

    /// The search backend is unreachable.
    #[error("failed to connect to search backend")]
    NotReady,
}

impl ApiError {
    /// Returns the HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotReady => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    const fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFound => "not_found",
            Self::Internal(_) => "internal_error",
            Self::NotReady => "not_ready",
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.error_type(),
            message: self.to_string(),
        };

        let json = serde_json::to_string(&body).unwrap_or_else(|_| {
            r#"{"error":"internal_error","message":"failed to serialize error"}"#.to_string()
        });

        (self.status(), [("content-type", "application/json")], json).into_response()
    }
}

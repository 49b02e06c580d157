//! Classification of execution results.

use serde::Serialize;
use tracing::error;

use crate::error::{TransportError, ValidationError};
use crate::types::LogRecord;

/// Message reported when a query matches nothing.
pub const NOT_FOUND_MESSAGE: &str = "no logs found";

/// Message reported for every execution failure.
pub const INTERNAL_MESSAGE: &str = "failed to execute query";

/// Broad cause of an internal failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InternalKind {
    /// Connection, TLS or status failure.
    Transport,
    /// Deadline expired or the request was cancelled.
    Timeout,
    /// The response could not be decoded into hits.
    Decode,
}

impl InternalKind {
    /// Returns the kind matching a transport error.
    #[must_use]
    pub const fn of(err: &TransportError) -> Self {
        match err {
            TransportError::Request(_) | TransportError::Status { .. } => Self::Transport,
            TransportError::Timeout => Self::Timeout,
            TransportError::Decode(_) | TransportError::MalformedResponse(_) => Self::Decode,
        }
    }

    /// Returns the string representation of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Timeout => "timeout",
            Self::Decode => "decode",
        }
    }
}

/// Final result of a filter request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Matching records, newest first.
    Ok(Vec<LogRecord>),
    /// Nothing matched.
    NotFound,
    /// The filter was rejected before execution.
    InvalidInput(ValidationError),
    /// Execution failed.
    Internal(InternalKind),
}

impl Outcome {
    /// Returns true for [`Outcome::Ok`].
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Returns a short machine-readable kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Ok(_) => "ok",
            Self::NotFound => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal",
        }
    }

    /// Returns the caller-facing message, if this is a failure.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Ok(_) => None,
            Self::NotFound => Some(NOT_FOUND_MESSAGE.to_string()),
            Self::InvalidInput(err) => Some(err.to_string()),
            Self::Internal(_) => Some(INTERNAL_MESSAGE.to_string()),
        }
    }
}

/// Maps an execution result to an [`Outcome`].
///
/// A validation error always wins, then a transport error, then emptiness.
/// Transport causes are logged here and never surface to callers.
#[must_use]
pub fn classify(
    records: Vec<LogRecord>,
    transport: Option<TransportError>,
    validation: Option<ValidationError>,
) -> Outcome {
    if let Some(err) = validation {
        return Outcome::InvalidInput(err);
    }

    if let Some(err) = transport {
        let kind = InternalKind::of(&err);
        error!(error = %err, kind = kind.as_str(), "log query failed");
        return Outcome::Internal(kind);
    }

    if records.is_empty() {
        Outcome::NotFound
    } else {
        Outcome::Ok(records)
    }
}

//! Error types for the query engine.
//!
//! Errors are split by the stage that produces them:
//! - [`ValidationError`]: rejected filter input, reported to callers verbatim
//! - [`TransportError`]: execution failures, logged in full but reported generically
//! - [`ConfigError`]: invalid backend configuration at construction time
//! - [`StoreError`]: reference engine loader failures

use thiserror::Error;

/// A filter parameter failed structural validation.
///
/// Messages are stable and parameter-specific so the controller layer can
/// surface them directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// `starttime` or `finishtime` is not an RFC3339 timestamp.
    #[error(
        "incorrect time format: please enter time in the following format \
         YYYY-MM-DDTHH:MM:SS[.fraction][TIMEZONE ex:+00:00]"
    )]
    InvalidTimestamp,

    /// `maxlogs` is negative or not an integer.
    #[error("invalid \"maxlogs\" value, an integer between 0 to 1000 is required")]
    InvalidLimit,
}

impl ValidationError {
    /// Returns the name of the rule that failed.
    #[must_use]
    pub const fn rule(&self) -> &'static str {
        match self {
            Self::InvalidTimestamp => "invalid_timestamp",
            Self::InvalidLimit => "invalid_limit",
        }
    }
}

/// Failure while executing a compiled query.
///
/// The underlying cause is kept for server-side logging only.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or the connection failed.
    #[error("search request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("search backend returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The request did not finish before its deadline or was cancelled.
    #[error("search request timed out")]
    Timeout,

    /// The response body was not valid JSON.
    #[error("failed to decode search response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The response had no extractable hit list.
    #[error("malformed search response: {0}")]
    MalformedResponse(String),
}

impl TransportError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Request(err)
        }
    }
}

/// Invalid search backend configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The backend address is not an absolute http(s) URL.
    #[error("invalid backend address '{0}': {1}")]
    InvalidAddress(String, String),

    /// A TLS identity file could not be read.
    #[error("failed to read {0}: {1}")]
    ReadIdentity(String, #[source] std::io::Error),

    /// The TLS identity could not be parsed.
    #[error("invalid client certificate or key: {0}")]
    InvalidIdentity(#[source] reqwest::Error),

    /// The HTTP client could not be built.
    #[error("failed to build search client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Errors raised while loading the reference engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The index name is not one of `app`, `infra` or `audit`.
    #[error("unknown index: {0}")]
    UnknownIndex(String),
}

/// Result type alias for validation.
pub type Result<T> = std::result::Result<T, ValidationError>;

//! Filter parameters for one log query.

use serde::{Deserialize, Serialize};

/// Default number of records returned when `max_results` is not given.
pub const DEFAULT_MAX_RESULTS: usize = 1000;

/// The optional filters of one query request.
///
/// Every field is optional and an empty string means "not specified". Use the
/// accessor methods rather than the raw fields to get that normalisation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParameters {
    /// Kubernetes namespace
    #[serde(default)]
    pub namespace: Option<String>,
    /// Pod name
    #[serde(default)]
    pub pod_name: Option<String>,
    /// Container name
    #[serde(default)]
    pub container_name: Option<String>,
    /// Partition routing hint (`app`, `infra` or `audit`)
    #[serde(default)]
    pub index: Option<String>,
    /// Label tokens, all of which must match
    #[serde(default)]
    pub labels: Vec<String>,
    /// Inclusive lower time bound (RFC3339)
    #[serde(default)]
    pub start_time: Option<String>,
    /// Inclusive upper time bound (RFC3339)
    #[serde(default)]
    pub finish_time: Option<String>,
    /// Severity level
    #[serde(default)]
    pub level: Option<String>,
    /// Result cap as a decimal integer
    #[serde(default)]
    pub max_results: Option<String>,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

impl FilterParameters {
    /// Creates an empty filter that matches all logs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the namespace filter.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Sets the pod name filter.
    #[must_use]
    pub fn with_pod_name(mut self, pod_name: impl Into<String>) -> Self {
        self.pod_name = Some(pod_name.into());
        self
    }

    /// Sets the container name filter.
    #[must_use]
    pub fn with_container_name(mut self, container_name: impl Into<String>) -> Self {
        self.container_name = Some(container_name.into());
        self
    }

    /// Sets the partition routing hint.
    #[must_use]
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Adds a label token.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    /// Sets both time bounds.
    #[must_use]
    pub fn with_time_range(mut self, start: impl Into<String>, finish: impl Into<String>) -> Self {
        self.start_time = Some(start.into());
        self.finish_time = Some(finish.into());
        self
    }

    /// Sets the severity level filter.
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    /// Sets the result cap.
    #[must_use]
    pub fn with_max_results(mut self, max_results: impl Into<String>) -> Self {
        self.max_results = Some(max_results.into());
        self
    }

    /// Returns the namespace, if specified.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        non_empty(self.namespace.as_ref())
    }

    /// Returns the pod name, if specified.
    #[must_use]
    pub fn pod_name(&self) -> Option<&str> {
        non_empty(self.pod_name.as_ref())
    }

    /// Returns the container name, if specified.
    #[must_use]
    pub fn container_name(&self) -> Option<&str> {
        non_empty(self.container_name.as_ref())
    }

    /// Returns the partition routing hint, if specified.
    #[must_use]
    pub fn index(&self) -> Option<&str> {
        non_empty(self.index.as_ref())
    }

    /// Returns the non-empty label tokens.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels
            .iter()
            .map(String::as_str)
            .filter(|l| !l.trim().is_empty())
    }

    /// Returns both time bounds when, and only when, both are specified.
    #[must_use]
    pub fn time_bounds(&self) -> Option<(&str, &str)> {
        non_empty(self.start_time.as_ref()).zip(non_empty(self.finish_time.as_ref()))
    }

    /// Returns the severity level, if specified.
    #[must_use]
    pub fn level(&self) -> Option<&str> {
        non_empty(self.level.as_ref())
    }

    /// Returns the raw result cap, if specified.
    #[must_use]
    pub fn max_results(&self) -> Option<&str> {
        non_empty(self.max_results.as_ref())
    }
}

//! Prometheus request metrics for the log API.
//!
//! Every request is counted per path and per response status, and its
//! duration is observed in a per-path histogram. The registry is exposed in
//! text format on `/metrics`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{Histogram, linear_buckets};
use prometheus_client::registry::Registry;
use tracing::error;

use crate::state::AppState;

/// Content type of the text exposition.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Label set keyed by request path.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct PathLabels {
    /// Raw request path.
    pub path: String,
}

/// Label set keyed by response status code.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct StatusLabels {
    /// Numeric status code.
    pub status: String,
}

type DurationFamily = Family<PathLabels, Histogram, fn() -> Histogram>;

// 1ms upward in 3ms steps
fn duration_histogram() -> Histogram {
    Histogram::new(linear_buckets(0.001, 0.003, 10))
}

/// Request metrics and the registry they are exported from.
#[derive(Clone)]
pub struct RequestMetrics {
    registry: Arc<Registry>,
    requests: Family<PathLabels, Counter>,
    statuses: Family<StatusLabels, Counter>,
    durations: DurationFamily,
}

impl std::fmt::Debug for RequestMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestMetrics").finish_non_exhaustive()
    }
}

impl Default for RequestMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestMetrics {
    /// Create the metric families and register them.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let requests = Family::<PathLabels, Counter>::default();
        registry.register(
            "custom_metric_http_requests",
            "Number of get requests",
            requests.clone(),
        );

        let statuses = Family::<StatusLabels, Counter>::default();
        registry.register(
            "custom_metric_response_status",
            "Status of HTTP response",
            statuses.clone(),
        );

        let durations: DurationFamily = Family::new_with_constructor(duration_histogram);
        registry.register(
            "custom_metric_http_response_time_seconds",
            "Duration of HTTP requests",
            durations.clone(),
        );

        Self {
            registry: Arc::new(registry),
            requests,
            statuses,
            durations,
        }
    }

    /// Record one finished request.
    pub fn record(&self, path: &str, status: StatusCode, elapsed: Duration) {
        let path = PathLabels {
            path: path.to_string(),
        };
        self.requests.get_or_create(&path).inc();
        self.durations
            .get_or_create(&path)
            .observe(elapsed.as_secs_f64());
        self.statuses
            .get_or_create(&StatusLabels {
                status: status.as_u16().to_string(),
            })
            .inc();
    }

    /// Number of requests recorded for a path.
    #[must_use]
    pub fn requests_for(&self, path: &str) -> u64 {
        self.requests
            .get_or_create(&PathLabels {
                path: path.to_string(),
            })
            .get()
    }

    /// Encode every metric in Prometheus text format.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        if encode(&mut buffer, &self.registry).is_err() {
            error!("failed to encode prometheus metrics");
            return String::new();
        }
        buffer
    }
}

/// Middleware recording path, status and duration of every request.
pub async fn track_requests(
    State(metrics): State<RequestMetrics>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;
    metrics.record(&path, response.status(), started.elapsed());
    response
}

/// Handle GET /metrics - Prometheus text exposition.
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, CONTENT_TYPE)],
        state.metrics().encode(),
    )
}

//! Route configuration for the log API.

use std::sync::Arc;

use axum::middleware;
use axum::routing::{Router, get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{
    filter_by_index, filter_by_multiple, filter_by_pod_name, filter_by_time, filter_logs,
    get_all_logs, health_check, readiness_check,
};
use crate::metrics::{metrics_handler, track_requests};
use crate::state::AppState;

/// Create the log API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let metrics = state.metrics().clone();

    let log_routes = Router::new()
        .route("/logs", get(get_all_logs))
        .route("/logs/", get(get_all_logs))
        .route("/logs/filter", get(filter_logs))
        .route("/logs/indexfilter/{index}", get(filter_by_index))
        .route("/logs/podnamefilter/{podname}", get(filter_by_pod_name))
        .route("/logs/timefilter/{starttime}/{finishtime}", get(filter_by_time))
        .route(
            "/logs/multifilter/{podname}/{namespace}/{starttime}/{finishtime}",
            get(filter_by_multiple),
        );

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_handler))
        .merge(log_routes)
        .with_state(state)
        .layer(middleware::from_fn_with_state(metrics, track_requests))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

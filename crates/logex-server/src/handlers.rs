//! HTTP request handlers for the log API.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use logex_engine::{FilterParameters, LogRecord, Outcome, ValidationError, validate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::MAX_LOGS_LIMIT;
use crate::error::ApiError;
use crate::state::AppState;

/// Query-string filters shared by every log route.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogsQuery {
    /// Kubernetes namespace.
    pub namespace: Option<String>,
    /// Pod name.
    pub podname: Option<String>,
    /// Container name.
    pub containername: Option<String>,
    /// Index (`app`, `infra` or `audit`).
    pub index: Option<String>,
    /// Inclusive lower time bound.
    pub starttime: Option<String>,
    /// Inclusive upper time bound.
    pub finishtime: Option<String>,
    /// Severity level.
    pub level: Option<String>,
    /// Result cap.
    pub maxlogs: Option<String>,
    /// Comma-separated label list.
    #[serde(alias = "flat_labels")]
    pub labels: Option<String>,
}

impl From<LogsQuery> for FilterParameters {
    fn from(query: LogsQuery) -> Self {
        let labels = query
            .labels
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            namespace: query.namespace,
            pod_name: query.podname,
            container_name: query.containername,
            index: query.index,
            labels,
            start_time: query.starttime,
            finish_time: query.finishtime,
            level: query.level,
            max_results: query.maxlogs,
        }
    }
}

/// Successful log response.
#[derive(Debug, Serialize)]
pub struct LogsResponse {
    /// Matching records, newest first.
    pub logs: Vec<LogRecord>,
}

/// Plain status response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Status message.
    pub message: &'static str,
}

/// Rejects filters the API does not accept.
///
/// Runs the engine's checks first so the time range keeps precedence, then
/// bounds `maxlogs` to the API limit.
fn check_filter(params: &FilterParameters) -> Result<(), ApiError> {
    validate(params)?;

    if let Some(raw) = params.max_results() {
        let within = raw
            .trim()
            .parse::<u64>()
            .is_ok_and(|n| n <= MAX_LOGS_LIMIT);
        if !within {
            return Err(ValidationError::InvalidLimit.into());
        }
    }
    Ok(())
}

async fn run_filter(
    state: &AppState,
    params: FilterParameters,
) -> Result<Json<LogsResponse>, ApiError> {
    check_filter(&params)?;
    debug!(?params, "filtering logs");

    match state
        .engine()
        .filter_logs_with(&params, state.shutdown_token())
        .await
    {
        Outcome::Ok(logs) => Ok(Json(LogsResponse { logs })),
        Outcome::NotFound => Err(ApiError::NotFound),
        Outcome::InvalidInput(err) => Err(ApiError::InvalidInput(err)),
        Outcome::Internal(kind) => Err(ApiError::Internal(kind)),
    }
}

/// Handle GET /logs/filter - filter on any combination of parameters.
pub async fn filter_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<LogsResponse>, ApiError> {
    run_filter(&state, query.into()).await
}

/// Handle GET /logs/ - all logs, narrowed by any query parameters.
pub async fn get_all_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<LogsResponse>, ApiError> {
    run_filter(&state, query.into()).await
}

/// Handle GET /logs/indexfilter/{index} - logs of one index.
pub async fn filter_by_index(
    State(state): State<Arc<AppState>>,
    Path(index): Path<String>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<LogsResponse>, ApiError> {
    let params = FilterParameters::from(query).with_index(index);
    run_filter(&state, params).await
}

/// Handle GET /logs/podnamefilter/{podname} - logs of one pod.
pub async fn filter_by_pod_name(
    State(state): State<Arc<AppState>>,
    Path(pod_name): Path<String>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<LogsResponse>, ApiError> {
    let params = FilterParameters::from(query).with_pod_name(pod_name);
    run_filter(&state, params).await
}

/// Handle GET /logs/timefilter/{starttime}/{finishtime} - logs in a time range.
pub async fn filter_by_time(
    State(state): State<Arc<AppState>>,
    Path((start, finish)): Path<(String, String)>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<LogsResponse>, ApiError> {
    let params = FilterParameters::from(query).with_time_range(start, finish);
    run_filter(&state, params).await
}

/// Path segments of the multi-parameter route.
#[derive(Debug, Clone, Deserialize)]
pub struct MultiFilterPath {
    /// Pod name.
    pub podname: String,
    /// Kubernetes namespace.
    pub namespace: String,
    /// Inclusive lower time bound.
    pub starttime: String,
    /// Inclusive upper time bound.
    pub finishtime: String,
}

/// Handle GET /logs/multifilter/{podname}/{namespace}/{starttime}/{finishtime}
/// - logs of one pod in one namespace within a time range.
pub async fn filter_by_multiple(
    State(state): State<Arc<AppState>>,
    Path(path): Path<MultiFilterPath>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<LogsResponse>, ApiError> {
    let params = FilterParameters::from(query)
        .with_pod_name(path.podname)
        .with_namespace(path.namespace)
        .with_time_range(path.starttime, path.finishtime);
    run_filter(&state, params).await
}

/// Handle GET /health - liveness check.
pub async fn health_check() -> Json<MessageResponse> {
    Json(MessageResponse { message: "Success" })
}

/// Handle GET /ready - backend reachability check.
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MessageResponse>, ApiError> {
    if state.engine().can_reach_backend().await {
        Ok(Json(MessageResponse { message: "Success" }))
    } else {
        Err(ApiError::NotReady)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test]
    fn test_query_maps_to_parameters() {
        let query = LogsQuery {
            namespace: Some("shop".to_string()),
            podname: Some("web-0".to_string()),
            containername: Some("api".to_string()),
            index: Some("app".to_string()),
            starttime: Some("2021-03-17T14:22:20+05:30".to_string()),
            finishtime: Some("2021-03-17T14:23:20+05:30".to_string()),
            level: Some("error".to_string()),
            maxlogs: Some("10".to_string()),
            labels: Some("app=web, env=prod,,".to_string()),
        };

        let params = FilterParameters::from(query);
        assert_eq!(params.namespace(), Some("shop"));
        assert_eq!(params.pod_name(), Some("web-0"));
        assert_eq!(params.container_name(), Some("api"));
        assert_eq!(params.index(), Some("app"));
        assert_eq!(params.level(), Some("error"));
        assert_eq!(params.max_results(), Some("10"));
        assert_eq!(params.labels, vec!["app=web", "env=prod"]);
        assert!(params.time_bounds().is_some());
    }

    #[test]
    fn test_empty_query_is_unfiltered() {
        assert_eq!(FilterParameters::from(LogsQuery::default()), FilterParameters::new());
    }

    #[test_case("0", true ; "zero")]
    #[test_case("1000", true ; "upper bound")]
    #[test_case("1001", false ; "above bound")]
    #[test_case("-2", false ; "negative")]
    #[test_case("abc", false ; "not a number")]
    fn test_limit_bounds(raw: &str, accepted: bool) {
        let params = FilterParameters::new().with_max_results(raw);
        assert_eq!(check_filter(&params).is_ok(), accepted);
    }

    #[test]
    fn test_time_error_precedes_limit_bound() {
        let params = FilterParameters::new()
            .with_time_range("hey", "hey")
            .with_max_results("5000");
        assert_eq!(
            check_filter(&params),
            Err(ApiError::InvalidInput(ValidationError::InvalidTimestamp))
        );
    }

    proptest! {
        #[test]
        fn label_list_never_yields_blank_or_comma(raw in "[a-z=, ]{0,40}") {
            let query = LogsQuery {
                labels: Some(raw),
                ..LogsQuery::default()
            };
            let params = FilterParameters::from(query);
            for label in &params.labels {
                prop_assert!(!label.is_empty());
                prop_assert!(!label.contains(','));
                prop_assert_eq!(label.trim(), label.as_str());
            }
        }
    }
}

//! End-to-end filter scenarios against both executors.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use logex_engine::{
    FilterParameters, InternalKind, LogRecord, Outcome, Partition, QueryEngine, ReferenceEngine,
    SearchBackend, SearchConfig, ValidationError, compile, search_body, shared_engine,
};
use proptest::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SCHEDULER_POD: &str = "openshift-kube-scheduler-ip-10-0-157-165.ec2.internal";

// ==================== Helper Functions ====================

fn at(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .expect("valid test timestamp")
        .with_timezone(&Utc)
}

fn texts(outcome: &Outcome) -> Vec<String> {
    match outcome {
        Outcome::Ok(records) => records.iter().map(ToString::to_string).collect(),
        other => panic!("expected records, got {other:?}"),
    }
}

async fn search_backend_returning(sources: Vec<Value>) -> (MockServer, SearchBackend) {
    let server = MockServer::start().await;
    let hits: Vec<Value> = sources.into_iter().map(|s| json!({ "_source": s })).collect();
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "hits": { "hits": hits } })))
        .mount(&server)
        .await;

    let backend = SearchBackend::new(&SearchConfig::new(server.uri())).expect("backend");
    (server, backend)
}

// ==================== Reference Engine Scenarios ====================

#[tokio::test]
async fn scenario_a_empty_filter_returns_everything_newest_first() {
    let store = shared_engine();
    let t = at("2021-03-17T14:22:40+05:30");
    store.put_at(t, Partition::App, ["r1", "r2", "r3"]);
    store.put_at(t - Duration::seconds(30), Partition::App, ["older"]);

    let engine = QueryEngine::new(store);
    let outcome = engine.filter_logs(&FilterParameters::new()).await;
    assert_eq!(texts(&outcome), vec!["r1", "r2", "r3", "older"]);
}

#[tokio::test]
async fn scenario_b_pod_name_filter() {
    let store = shared_engine();
    let record = format!("pod: {SCHEDULER_POD}, namespace: openshift-kube-scheduler");
    store.put(Partition::Infra, [record.clone(), "pod: other".to_string()]);
    let engine = QueryEngine::new(store);

    let outcome = engine
        .filter_logs(&FilterParameters::new().with_pod_name(SCHEDULER_POD))
        .await;
    assert_eq!(texts(&outcome), vec![record]);

    let outcome = engine
        .filter_logs(&FilterParameters::new().with_pod_name("hello"))
        .await;
    assert_eq!(outcome, Outcome::NotFound);
}

#[tokio::test]
async fn scenario_c_time_range_filter() {
    let params = FilterParameters::new()
        .with_time_range("2021-03-17T14:22:20+05:30", "2021-03-17T14:23:20+05:30");

    let inside = shared_engine();
    inside.put_at(at("2021-03-17T14:22:40+05:30"), Partition::App, ["in range"]);
    let outcome = QueryEngine::new(inside).filter_logs(&params).await;
    assert_eq!(texts(&outcome), vec!["in range"]);

    let outside = shared_engine();
    outside.put_at(at("2022-03-17T14:22:40+05:30"), Partition::App, ["next year"]);
    let outcome = QueryEngine::new(outside).filter_logs(&params).await;
    assert_eq!(outcome, Outcome::NotFound);
}

#[tokio::test]
async fn scenario_d_negative_limit_is_invalid_regardless_of_contents() {
    let store = shared_engine();
    store.put(Partition::Audit, ["anything"]);
    let params = FilterParameters::new().with_max_results("-2");

    let outcome = QueryEngine::new(store).filter_logs(&params).await;
    assert_eq!(outcome, Outcome::InvalidInput(ValidationError::InvalidLimit));

    let outcome = QueryEngine::new(shared_engine()).filter_logs(&params).await;
    assert_eq!(outcome, Outcome::InvalidInput(ValidationError::InvalidLimit));
}

#[tokio::test]
async fn invalid_time_takes_precedence_over_invalid_limit() {
    let params = FilterParameters::new()
        .with_time_range("hey", "hey")
        .with_max_results("-2");
    let outcome = QueryEngine::new(shared_engine()).filter_logs(&params).await;
    assert_eq!(outcome, Outcome::InvalidInput(ValidationError::InvalidTimestamp));
}

#[tokio::test]
async fn not_found_for_non_matching_clauses() {
    let store = shared_engine();
    store.put(Partition::App, [json!({"kubernetes": {"namespace_name": "shop"}})]);
    let engine = QueryEngine::new(store);

    let outcome = engine
        .filter_logs(&FilterParameters::new().with_namespace("billing"))
        .await;
    assert_eq!(outcome, Outcome::NotFound);

    let outcome = engine
        .filter_logs(&FilterParameters::new().with_index("nonexistent"))
        .await;
    assert_eq!(outcome, Outcome::NotFound);
}

#[test]
fn put_clear_put_is_idempotent() {
    let engine = ReferenceEngine::new();
    let t = at("2021-03-17T14:22:40+05:30");
    let query = compile(&FilterParameters::new());

    engine.put_at(t, Partition::Infra, ["a", "b"]);
    let first = engine.search(&query);

    engine.clear();
    engine.put_at(t, Partition::Infra, ["a", "b"]);
    assert_eq!(engine.search(&query), first);
}

// ==================== Search Backend Scenarios ====================

#[tokio::test]
async fn search_backend_pod_name_filter() {
    let record = json!({ "kubernetes": { "pod_name": SCHEDULER_POD }, "message": "started" });
    let (server, backend) = search_backend_returning(vec![record.clone()]).await;

    let outcome = QueryEngine::new(backend)
        .filter_logs(&FilterParameters::new().with_pod_name(SCHEDULER_POD))
        .await;
    assert_eq!(outcome, Outcome::Ok(vec![LogRecord::new(record)]));
    drop(server);
}

#[tokio::test]
async fn search_backend_sends_compiled_time_range() {
    let params = FilterParameters::new()
        .with_time_range("2021-03-17T14:22:20+05:30", "2021-03-17T14:23:20+05:30");
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(search_body(&compile(&params))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "hits": { "hits": [] } })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = SearchBackend::new(&SearchConfig::new(server.uri())).expect("backend");
    let outcome = QueryEngine::new(backend).filter_logs(&params).await;
    assert_eq!(outcome, Outcome::NotFound);
}

#[tokio::test]
async fn search_backend_failure_is_generic_internal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("cluster red"))
        .mount(&server)
        .await;

    let backend = SearchBackend::new(&SearchConfig::new(server.uri())).expect("backend");
    let outcome = QueryEngine::new(backend)
        .filter_logs(&FilterParameters::new())
        .await;
    assert_eq!(outcome, Outcome::Internal(InternalKind::Transport));
    assert_eq!(outcome.message().as_deref(), Some("failed to execute query"));
}

#[tokio::test]
async fn search_backend_negative_limit_never_reaches_cluster() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let backend = SearchBackend::new(&SearchConfig::new(server.uri())).expect("backend");
    let outcome = QueryEngine::new(backend)
        .filter_logs(&FilterParameters::new().with_max_results("-2"))
        .await;
    assert_eq!(outcome, Outcome::InvalidInput(ValidationError::InvalidLimit));
}

// ==================== Properties ====================

const NAMESPACES: [&str; 2] = ["shop", "billing"];
const PODS: [&str; 2] = ["web-0", "db-0"];
const CONTAINERS: [&str; 2] = ["api", "sidecar"];
const LEVELS: [&str; 2] = ["info", "error"];
const LABELS: [&str; 4] = ["tier=frontend", "tier=backend", "env=prod", "team=logs"];

fn seed_time() -> DateTime<Utc> {
    at("2021-03-17T00:00:00Z")
}

// Every record gets its own second, so time windows split the set.
fn seeded() -> ReferenceEngine {
    let engine = ReferenceEngine::new();
    let mut id: i64 = 0;
    for (p, partition) in Partition::ALL.into_iter().enumerate() {
        for namespace in NAMESPACES {
            for pod in PODS {
                for level in LEVELS {
                    id += 1;
                    let container = CONTAINERS[(id % 2) as usize];
                    let mut labels = vec![LABELS[(id % 2) as usize]];
                    if id % 3 == 0 {
                        labels.push(LABELS[2]);
                    }
                    if id % 4 == 0 {
                        labels.push(LABELS[3]);
                    }
                    engine.put_at(
                        seed_time() + Duration::seconds(id),
                        partition,
                        [json!({
                            "id": id,
                            "partition": p,
                            "level": level,
                            "kubernetes": {
                                "namespace_name": namespace,
                                "pod_name": pod,
                                "container_name": container,
                                "flat_labels": labels,
                            },
                        })],
                    );
                }
            }
        }
    }
    engine
}

fn ids(engine: &ReferenceEngine, params: &FilterParameters) -> BTreeSet<i64> {
    engine
        .search(&compile(params))
        .iter()
        .filter_map(|r| r.as_value()["id"].as_i64())
        .collect()
}

fn window(start: i64, finish: i64) -> (String, String) {
    (
        (seed_time() + Duration::seconds(start)).to_rfc3339(),
        (seed_time() + Duration::seconds(finish)).to_rfc3339(),
    )
}

proptest! {
    #[test]
    fn conjunction_is_intersection(
        namespace in proptest::option::of(0..NAMESPACES.len()),
        pod in proptest::option::of(0..PODS.len()),
        container in proptest::option::of(0..CONTAINERS.len()),
        index in proptest::option::of(0..Partition::ALL.len()),
        level in proptest::option::of(0..LEVELS.len()),
        time in proptest::option::of((0i64..30, 0i64..30)),
        labels in proptest::collection::vec(0..LABELS.len(), 0..=2),
    ) {
        let engine = seeded();
        let mut combined = FilterParameters::new();
        let mut singles = Vec::new();

        if let Some(i) = namespace {
            combined = combined.with_namespace(NAMESPACES[i]);
            singles.push(FilterParameters::new().with_namespace(NAMESPACES[i]));
        }
        if let Some(i) = pod {
            combined = combined.with_pod_name(PODS[i]);
            singles.push(FilterParameters::new().with_pod_name(PODS[i]));
        }
        if let Some(i) = container {
            combined = combined.with_container_name(CONTAINERS[i]);
            singles.push(FilterParameters::new().with_container_name(CONTAINERS[i]));
        }
        if let Some(i) = index {
            combined = combined.with_index(Partition::ALL[i].as_str());
            singles.push(FilterParameters::new().with_index(Partition::ALL[i].as_str()));
        }
        if let Some(i) = level {
            combined = combined.with_level(LEVELS[i]);
            singles.push(FilterParameters::new().with_level(LEVELS[i]));
        }
        if let Some((start, finish)) = time {
            let (start, finish) = window(start, finish);
            combined = combined.with_time_range(start.clone(), finish.clone());
            singles.push(FilterParameters::new().with_time_range(start, finish));
        }
        for i in labels {
            combined = combined.with_label(LABELS[i]);
            singles.push(FilterParameters::new().with_label(LABELS[i]));
        }

        let mut expected = ids(&engine, &FilterParameters::new());
        for single in &singles {
            let matched = ids(&engine, single);
            expected.retain(|id| matched.contains(id));
        }

        prop_assert_eq!(ids(&engine, &combined), expected);
    }

    #[test]
    fn single_dimensions_select_what_was_seeded(
        container in 0..CONTAINERS.len(),
        label in 0..LABELS.len(),
        (start, finish) in (0i64..30, 0i64..30),
    ) {
        let engine = seeded();
        let total = ids(&engine, &FilterParameters::new());
        prop_assert_eq!(total.len(), 24);

        let by_container = ids(&engine, &FilterParameters::new().with_container_name(CONTAINERS[container]));
        prop_assert!(by_container.iter().all(|id| CONTAINERS[(id % 2) as usize] == CONTAINERS[container]));
        prop_assert_eq!(by_container.len(), 12);

        let by_label = ids(&engine, &FilterParameters::new().with_label(LABELS[label]));
        let expected_label: BTreeSet<i64> = total
            .iter()
            .copied()
            .filter(|id| match label {
                0 | 1 => (id % 2) as usize == label,
                2 => id % 3 == 0,
                _ => id % 4 == 0,
            })
            .collect();
        prop_assert_eq!(by_label, expected_label);

        let (lo, hi) = window(start, finish);
        let by_time = ids(&engine, &FilterParameters::new().with_time_range(lo, hi));
        let expected_time: BTreeSet<i64> = total
            .iter()
            .copied()
            .filter(|id| (start..=finish).contains(id))
            .collect();
        prop_assert_eq!(by_time, expected_time);
    }

    #[test]
    fn results_never_exceed_limit(limit in 0usize..40) {
        let engine = seeded();
        let params = FilterParameters::new().with_max_results(limit.to_string());
        prop_assert!(engine.search(&compile(&params)).len() <= limit);
    }
}

//! Snapshot retrieval over HTTP against a mock cluster.

use crate::mocks::{legacy_cluster, MockCluster, MockResponse};
use index_doc::engine::events::ReportEvent;
use index_doc::engine::orchestrator::Orchestrator;
use index_doc::fetch::client::{Endpoint, HttpClient, HttpConfig};
use index_doc::fetch::source::{HttpSnapshotSource, SnapshotSource, SNAPSHOT_PATHS};
use index_doc::{checks, run_checks, IndexDocConfig, IndexDocError, Severity};

fn config(cluster: &MockCluster) -> IndexDocConfig {
    IndexDocConfig {
        host: cluster.url(),
        timeout_ms: 2000,
        max_retries: 0,
        ..Default::default()
    }
}

fn legacy_routes() -> std::collections::HashMap<String, MockResponse> {
    MockCluster::healthy(&serde_json::to_value(legacy_cluster()).unwrap())
}

#[test]
fn test_unauthorized_settings_aborts_run() {
    let mut routes = legacy_routes();
    routes.insert(
        "/_settings".to_string(),
        MockResponse::status(401, "Unauthorized", r#"{"error":"unauthorized"}"#),
    );
    let cluster = MockCluster::start(routes);
    let source = HttpSnapshotSource::from_config(&config(&cluster)).unwrap();
    let registry = checks::default_registry().unwrap();

    let mut events: Vec<ReportEvent> = Vec::new();
    let err = Orchestrator::new(&registry).run(&source, &mut events).unwrap_err();

    assert_eq!(
        err,
        IndexDocError::FetchFailure {
            url: format!("{}/_settings", cluster.url()),
            reason: "unauthorized".to_string(),
        }
    );

    let errors: Vec<&String> = events
        .iter()
        .filter_map(|e| match e {
            ReportEvent::Error(message) => Some(message),
            _ => None,
        })
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("unauthorized"));
    assert!(!events.iter().any(|e| matches!(e, ReportEvent::StartSection(_))));
}

#[test]
fn test_all_requests_issued() {
    let cluster = MockCluster::start(legacy_routes());
    let source = HttpSnapshotSource::from_config(&config(&cluster)).unwrap();

    let snapshot = source.fetch_snapshot().unwrap();
    assert_eq!(snapshot.index_names(), vec!["clean", "legacy"]);
    // Segments are unwrapped from the `indices` key
    assert!(snapshot.segments.get("legacy").is_some());

    let mut requested = cluster.requests();
    requested.sort();
    let mut expected: Vec<String> = SNAPSHOT_PATHS.iter().map(|p| p.to_string()).collect();
    expected.sort();
    assert_eq!(requested, expected);
}

#[test]
fn test_cluster_version() {
    let cluster = MockCluster::start(legacy_routes());
    let source = HttpSnapshotSource::from_config(&config(&cluster)).unwrap();

    let version = source.cluster_version().unwrap().unwrap();
    assert_eq!(version.number, "1.7.3");
    assert_eq!((version.major, version.minor, version.patch), (1, 7, 3));
    assert!(!version.snapshot);
}

#[test]
fn test_full_run_over_http() {
    let cluster = MockCluster::start(legacy_routes());
    let report = run_checks(&config(&cluster)).unwrap();

    assert!(report.completed);
    assert_eq!(report.nodes[0].label(), "Elasticsearch version: 1.7.3");
    assert_eq!(report.section("Index: clean").unwrap().severity(), Severity::Green);
    assert_eq!(report.section("Index: legacy").unwrap().severity(), Severity::Red);
}

#[test]
fn test_error_object_reason() {
    let mut routes = legacy_routes();
    routes.insert(
        "/_mappings".to_string(),
        MockResponse::status(
            403,
            "Forbidden",
            r#"{"error":{"type":"security_exception","reason":"action [indices:admin/mappings/get] is unauthorized"}}"#,
        ),
    );
    let cluster = MockCluster::start(routes);
    let report = run_checks(&config(&cluster)).unwrap();

    let error = report.error.unwrap();
    assert!(error.starts_with(&format!("Failed to fetch [{}/_mappings].  REASON: ", cluster.url())));
    assert!(error.ends_with("is unauthorized"));
    assert!(!report.completed);
}

#[test]
fn test_first_failure_in_request_order_wins() {
    let mut routes = legacy_routes();
    routes.insert(
        "/_aliases".to_string(),
        MockResponse::status(500, "Internal Server Error", ""),
    );
    routes.insert(
        "/_settings".to_string(),
        MockResponse::status(401, "Unauthorized", r#"{"error":"unauthorized"}"#),
    );
    let cluster = MockCluster::start(routes);
    let source = HttpSnapshotSource::from_config(&config(&cluster)).unwrap();

    match source.fetch_snapshot() {
        Err(IndexDocError::FetchFailure { url, reason }) => {
            assert!(url.ends_with("/_settings"));
            assert_eq!(reason, "unauthorized");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_status_line_fallback_and_retries() {
    let mut routes = legacy_routes();
    routes.insert(
        "/_warmers".to_string(),
        MockResponse::status(503, "Service Unavailable", ""),
    );
    let cluster = MockCluster::start(routes);
    let endpoint = Endpoint::parse(&cluster.url()).unwrap();
    let client = HttpClient::with_config(HttpConfig {
        connect_timeout_ms: 2000,
        read_timeout_ms: 2000,
        max_retries: 2,
        retry_delay_ms: 1,
    });
    let source = HttpSnapshotSource::new(endpoint, client);

    match source.get_json("/_warmers") {
        Err(IndexDocError::FetchFailure { reason, .. }) => {
            assert_eq!(reason, "503 Service Unavailable");
        }
        other => panic!("unexpected {:?}", other),
    }
    let attempts = cluster.requests().iter().filter(|p| *p == "/_warmers").count();
    assert_eq!(attempts, 3);
}

#[test]
fn test_connection_refused() {
    // Bind and drop to find a port nothing listens on
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let config = IndexDocConfig {
        host: format!("http://127.0.0.1:{}", port),
        timeout_ms: 500,
        max_retries: 0,
        ..Default::default()
    };

    let report = run_checks(&config).unwrap();
    let error = report.error.unwrap();
    assert!(error.starts_with(&format!("Failed to fetch [http://127.0.0.1:{}/].", port)));
}

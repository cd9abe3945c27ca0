// Tests for walk execution

use std::sync::{Arc, Mutex};
use std::time::Duration;

use meshwalk_core::walk::{DEFAULT_START_NODE, format_progress};
use meshwalk_core::{CoreError, WalkOptions, execute_walk};
use meshwalk_scanner::{FetchConfig, WalkProgress};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn options_for(server: &MockServer, start: &str) -> WalkOptions {
    WalkOptions {
        start: start.to_string(),
        endpoint: format!("{}/cgi-bin/{{node}}/sysinfo.json", server.uri()),
        fetch: FetchConfig {
            attempts: 2,
            timeout: Duration::from_secs(5),
            retry_min_delay: Duration::from_millis(1),
            retry_max_delay: Duration::from_millis(2),
            ..FetchConfig::default()
        },
        show_progress: false,
    }
}

// ============================================================================
// Option Tests
// ============================================================================

#[test]
fn test_default_options() {
    let options = WalkOptions::default();
    assert_eq!(options.start, DEFAULT_START_NODE);
    assert!(options.endpoint.contains("{node}.local.mesh:8080"));
    assert_eq!(options.fetch.max_concurrency, 200);
    assert_eq!(options.fetch.attempts, 5);
    assert_eq!(options.fetch.timeout, Duration::from_secs(120));
    assert!(options.show_progress);
}

#[test]
fn test_format_progress() {
    let progress = WalkProgress {
        completed: 12,
        scheduled: 40,
        discovered: 41,
        mapped: 7,
    };
    assert_eq!(
        format_progress(&progress),
        "Completed 12 of 40 fetches, 28 left. Found 41 hosts, 7 mapped nodes."
    );
}

// ============================================================================
// Execution Tests
// ============================================================================

#[tokio::test]
async fn test_execute_walk_builds_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/A/sysinfo.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "node": "A",
            "lat": "35.0",
            "lon": "-97.0",
            "hosts": [{"name": "B"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/B/sysinfo.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"node": "B"})))
        .mount(&server)
        .await;

    let updates: Arc<Mutex<Vec<WalkProgress>>> = Arc::new(Mutex::new(Vec::new()));
    let updates_clone = updates.clone();

    let snapshot = execute_walk(
        options_for(&server, "A"),
        Some(Arc::new(move |p: WalkProgress| updates_clone.lock().unwrap().push(p))),
        std::future::pending(),
    )
    .await
    .unwrap();

    assert_eq!(snapshot.mapped(), 1);
    assert_eq!(snapshot.node_info[0].data.node.as_deref(), Some("A"));
    assert_eq!(snapshot.non_mapped, 1);
    assert_eq!(snapshot.hosts_scraped, 2);
    assert_eq!(updates.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_execute_walk_with_dead_seed() {
    let server = MockServer::start().await;

    let snapshot = execute_walk(options_for(&server, "A"), None, std::future::pending())
        .await
        .unwrap();

    assert!(snapshot.node_info.is_empty());
    assert_eq!(snapshot.non_mapped, 0);
    assert_eq!(snapshot.hosts_scraped, 1);
}

#[tokio::test]
async fn test_execute_walk_interrupted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"node": "A"}))
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let result = execute_walk(
        options_for(&server, "A"),
        None,
        tokio::time::sleep(Duration::from_millis(50)),
    )
    .await;

    assert!(matches!(result, Err(CoreError::Interrupted)));
}

#[tokio::test]
async fn test_execute_walk_rejects_bad_endpoint() {
    let options = WalkOptions {
        endpoint: "http://example.com/sysinfo.json".to_string(),
        show_progress: false,
        ..WalkOptions::default()
    };

    let result = execute_walk(options, None, std::future::pending()).await;
    assert!(matches!(result, Err(CoreError::Scan(_))));
}

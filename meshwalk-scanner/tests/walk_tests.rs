// End-to-end walks over HTTP against a mock mesh

use std::time::{Duration, Instant};

use meshwalk_scanner::{FetchConfig, HttpFetcher, NodeEndpoint, Walker};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn test_config() -> FetchConfig {
    FetchConfig {
        max_concurrency: 4,
        attempts: 3,
        timeout: Duration::from_secs(5),
        retry_min_delay: Duration::from_millis(1),
        retry_max_delay: Duration::from_millis(10),
        ..FetchConfig::default()
    }
}

async fn mount_node(server: &MockServer, name: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/{}/sysinfo.json", name)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn walker_for(server: &MockServer) -> Walker<HttpFetcher> {
    let endpoint = NodeEndpoint::new(format!("{}/{{node}}/sysinfo.json", server.uri())).unwrap();
    Walker::new(HttpFetcher::new(test_config()).unwrap()).with_endpoint(endpoint)
}

// ============================================================================
// Walk Tests
// ============================================================================

#[tokio::test]
async fn test_walk_over_http() {
    let server = MockServer::start().await;

    mount_node(
        &server,
        "KI5VMF-oklahoma-supernode",
        json!({
            "node": "KI5VMF-oklahoma-supernode",
            "lat": "35.4676",
            "lon": "-97.5164",
            "node_details": {"mesh_supernode": true},
            "link_info": {"10.1.1.1": {"hostname": "KI5VMF-hap", "linkType": "TUN"}},
            "hosts": [{"name": "KI5VMF-hap"}, {"name": "KI5VMF-rocket"}, {"name": "KI5VMF-offline"}]
        }),
    )
    .await;
    mount_node(
        &server,
        "KI5VMF-hap",
        json!({
            "node": "KI5VMF-hap",
            "lat": 35.1,
            "lon": -97.1,
            "link_info": {"10.1.1.2": {"hostname": "KI5VMF-oklahoma-supernode", "linkType": "TUN"}},
            "hosts": [{"name": "KI5VMF-oklahoma-supernode"}, {"name": "KI5VMF-rocket"}]
        }),
    )
    .await;
    mount_node(
        &server,
        "KI5VMF-rocket",
        json!({"node": "KI5VMF-rocket", "lat": "", "lon": ""}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/KI5VMF-offline/sysinfo.json"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let outcome = walker_for(&server).run("KI5VMF-oklahoma-supernode").await;

    assert_eq!(outcome.discovered, 4);
    assert_eq!(outcome.total_attempted, 4);
    assert_eq!(outcome.non_mapped, 1);
    assert_eq!(outcome.records.len(), 2);

    let supernode = outcome
        .records
        .iter()
        .find(|r| r.node.as_deref() == Some("KI5VMF-oklahoma-supernode"))
        .unwrap();
    assert_eq!(supernode.link_info[0]["linkType"], "STUN");

    let hap = outcome
        .records
        .iter()
        .find(|r| r.node.as_deref() == Some("KI5VMF-hap"))
        .unwrap();
    assert_eq!(hap.link_info[0]["linkType"], "TUN");

    // One request per node, plus retries for the failing one.
    let requests = server.received_requests().await.unwrap();
    let offline = requests
        .iter()
        .filter(|r| r.url.path() == "/KI5VMF-offline/sysinfo.json")
        .count();
    assert_eq!(offline, 3);
    assert_eq!(requests.len() - offline, 3);
}

#[tokio::test]
async fn test_unreachable_seed_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let outcome = walker_for(&server).run("KI5VMF-1").await;

    assert!(outcome.records.is_empty());
    assert_eq!(outcome.non_mapped, 0);
    assert_eq!(outcome.total_attempted, 1);
}

#[tokio::test]
async fn test_concurrency_cap_limits_requests_in_flight() {
    let server = MockServer::start().await;
    let neighbors: Vec<String> = (1..=6).map(|i| format!("KI5VMF-{}", i)).collect();

    mount_node(
        &server,
        "KI5VMF-seed",
        json!({
            "node": "KI5VMF-seed",
            "hosts": neighbors.iter().map(|n| json!({"name": n})).collect::<Vec<_>>()
        }),
    )
    .await;
    for name in &neighbors {
        Mock::given(method("GET"))
            .and(path(format!("/{}/sysinfo.json", name)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"node": name}))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;
    }

    let config = FetchConfig {
        max_concurrency: 2,
        ..test_config()
    };
    let endpoint = NodeEndpoint::new(format!("{}/{{node}}/sysinfo.json", server.uri())).unwrap();
    let walker = Walker::new(HttpFetcher::new(config).unwrap()).with_endpoint(endpoint);

    let started = Instant::now();
    let outcome = walker.run("KI5VMF-seed").await;
    let elapsed = started.elapsed();

    assert_eq!(outcome.total_attempted, 7);
    assert_eq!(outcome.non_mapped, 7);
    // Six slow nodes through two slots take at least three rounds.
    assert!(
        elapsed >= Duration::from_millis(900),
        "walk finished in {:?}",
        elapsed
    );
}

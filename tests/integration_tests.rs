// Integration tests: HTTP and WebSocket endpoints

mod common;

use axum_test::TestServer;
use hostpulse::config::AppConfig;
use hostpulse::docker_repo::DockerRepo;
use hostpulse::models::MetricsSnapshot;
use hostpulse::routes;
use hostpulse::sampler::MetricsSampler;
use hostpulse::sysinfo_repo::SysinfoRepo;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::broadcast;

const TEST_CONFIG: &str = r#"
[server]
port = 8081
host = "0.0.0.0"

[publishing]
broadcast_capacity = 10

[monitoring]
sample_interval_ms = 1000
stats_log_interval_secs = 60

[docker]
log_tail_lines = 50
"#;

fn test_app_config() -> AppConfig {
    AppConfig::load_from_str(TEST_CONFIG).unwrap()
}

async fn test_app() -> (axum::Router, broadcast::Sender<MetricsSnapshot>) {
    let config = test_app_config();
    let (tx, _) = broadcast::channel(config.publishing.broadcast_capacity);
    let repo = Arc::new(SysinfoRepo::new());
    let system_info = repo.get_system_info().await.expect("system info");
    let app = routes::app(
        tx.clone(),
        Arc::new(MetricsSampler::new(repo)),
        Arc::new(DockerRepo::connect().expect("docker client")),
        Arc::new(system_info),
        Arc::new(AtomicUsize::new(0)),
        config,
    );
    (app, tx)
}

/// Build TestServer with http_transport (required for WebSocket tests).
async fn test_server_with_http() -> (TestServer, broadcast::Sender<MetricsSnapshot>) {
    let (app, tx) = test_app().await;
    let server = TestServer::builder().http_transport().try_build(app).unwrap();
    (server, tx)
}

#[tokio::test]
async fn test_root_endpoint() {
    let (app, _) = test_app().await;
    let server = TestServer::try_new(app).unwrap();
    let response = server.get("/").await;
    response.assert_status_ok();
    response.assert_text("hostpulse: up");
}

#[tokio::test]
async fn test_version_endpoint() {
    let (app, _) = test_app().await;
    let server = TestServer::try_new(app).unwrap();
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json.get("name").and_then(|v| v.as_str()), Some("hostpulse"));
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_metrics_endpoint_returns_snapshot() {
    let (app, _) = test_app().await;
    let server = TestServer::try_new(app).unwrap();
    let response = server.get("/api/metrics").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    // Live sampling; null only if a host source failed outright.
    if !json.is_null() {
        assert!(json.get("cpu").is_some());
        assert!(json.get("uptimeFormatted").is_some());
    }
}

#[tokio::test]
async fn test_system_info_endpoint() {
    let (app, _) = test_app().await;
    let server = TestServer::try_new(app).unwrap();
    let response = server.get("/api/system-info").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert!(json.get("hostname").and_then(|v| v.as_str()).is_some());
    assert!(json.get("logicalCores").and_then(|v| v.as_u64()).is_some());
}

#[tokio::test]
async fn test_processes_endpoint_returns_array() {
    let (app, _) = test_app().await;
    let server = TestServer::try_new(app).unwrap();
    let response = server.get("/api/processes").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert!(json.is_array());
}

#[tokio::test]
async fn test_docker_containers_endpoint_returns_array() {
    // With no daemon reachable the list is empty, never an error.
    let (app, _) = test_app().await;
    let server = TestServer::try_new(app).unwrap();
    let response = server.get("/api/docker/containers").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert!(json.is_array());
}

#[tokio::test]
async fn test_docker_logs_rejects_malformed_id() {
    // Identifier validation happens before the runtime is touched, so this
    // holds whether or not a daemon is present.
    let (app, _) = test_app().await;
    let server = TestServer::try_new(app).unwrap();
    let response = server.get("/api/docker/logs/abc-def").await;
    response.assert_status_bad_request();
    let json: serde_json::Value = response.json();
    assert_eq!(json.get("success").and_then(|v| v.as_bool()), Some(false));
    assert!(json.get("error").and_then(|v| v.as_str()).is_some());
}

// --- WebSocket message tests (require http_transport + ws feature) ---
// Receive until we get valid JSON (server may send Ping first).

async fn receive_first_json_text<T: serde::de::DeserializeOwned>(
    ws: &mut axum_test::TestWebSocket,
) -> T {
    let deadline = tokio::time::Instant::now() + tokio::time::Duration::from_secs(3);
    loop {
        let text = ws.receive_text().await;
        if let Ok(v) = serde_json::from_str::<T>(&text) {
            return v;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for JSON"
        );
    }
}

#[tokio::test]
async fn test_ws_receives_broadcast_snapshot() {
    let (server, tx) = test_server_with_http().await;
    let mut ws = server.get_websocket("/ws").await.into_websocket().await;
    let tx_clone = tx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        let _ = tx_clone.send(common::test_snapshot(42));
    });
    let received: MetricsSnapshot = receive_first_json_text(&mut ws).await;
    assert_eq!(received.timestamp, 42);
    assert_eq!(received.ram.usage_percent, 50.0);
}

#[tokio::test]
async fn test_ws_two_clients_receive_same_frame() {
    let (server, tx) = test_server_with_http().await;
    let mut ws1 = server.get_websocket("/ws").await.into_websocket().await;
    let mut ws2 = server.get_websocket("/ws").await.into_websocket().await;
    let tx_clone = tx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        let _ = tx_clone.send(common::test_snapshot(7));
    });
    let a: MetricsSnapshot = receive_first_json_text(&mut ws1).await;
    let b: MetricsSnapshot = receive_first_json_text(&mut ws2).await;
    assert_eq!(a.timestamp, 7);
    assert_eq!(b.timestamp, 7);
}

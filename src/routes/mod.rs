// HTTP + WebSocket routes

mod http;
mod ws;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::docker_repo::DockerRepo;
use crate::models::{MetricsSnapshot, SystemInfo};
use crate::sampler::MetricsSampler;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) stats_tx: broadcast::Sender<MetricsSnapshot>,
    pub(crate) sampler: Arc<MetricsSampler>,
    pub(crate) docker_repo: Arc<DockerRepo>,
    pub(crate) system_info: Arc<SystemInfo>,
    pub(crate) ws_connections: Arc<AtomicUsize>,
    pub(crate) config: AppConfig,
}

#[allow(clippy::too_many_arguments)]
pub fn app(
    stats_tx: broadcast::Sender<MetricsSnapshot>,
    sampler: Arc<MetricsSampler>,
    docker_repo: Arc<DockerRepo>,
    system_info: Arc<SystemInfo>,
    ws_connections: Arc<AtomicUsize>,
    config: AppConfig,
) -> Router {
    let state = AppState {
        stats_tx,
        sampler,
        docker_repo,
        system_info,
        ws_connections,
        config,
    };
    Router::new()
        .route("/", get(http::root_handler)) // GET / (liveness)
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/metrics", get(http::metrics_handler)) // GET /api/metrics
        .route("/api/processes", get(http::processes_handler)) // GET /api/processes
        .route("/api/system-info", get(http::system_info_handler)) // GET /api/system-info
        .route("/api/docker/containers", get(http::containers_handler)) // GET /api/docker/containers
        .route("/api/docker/logs/{id}", get(http::logs_handler)) // GET /api/docker/logs/{id}
        .route("/api/docker/start", post(http::start_handler)) // POST /api/docker/start
        .route("/api/docker/stop", post(http::stop_handler)) // POST /api/docker/stop
        .route("/api/docker/restart", post(http::restart_handler)) // POST /api/docker/restart
        .route("/ws", get(ws::ws_metrics)) // WS /ws
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}

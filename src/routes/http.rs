// On-demand GET/POST handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use super::AppState;
use crate::docker_repo::ControlError;
use crate::models::ControlOutcome;
use crate::version::{NAME, VERSION};

/// GET / — liveness probe.
pub(super) async fn root_handler() -> impl IntoResponse {
    "hostpulse: up"
}

/// GET /version — returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/metrics — one snapshot on demand; JSON null when the tick fails.
pub(super) async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.sampler.sample().await)
}

/// GET /api/processes — full process list; empty on source failure.
pub(super) async fn processes_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.sampler.process_list().await)
}

/// GET /api/system-info — static host identity (fetched once at startup).
pub(super) async fn system_info_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.system_info.as_ref().clone())
}

/// GET /api/docker/containers — merged container records; empty on runtime outage.
pub(super) async fn containers_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.docker_repo.list_containers().await)
}

/// GET /api/docker/logs/{id} — log tail as plain text; failures as a
/// ControlOutcome, with 400 for malformed identifiers.
pub(super) async fn logs_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let lines = state.config.docker.log_tail_lines;
    match state.docker_repo.tail_logs(&id, lines).await {
        Ok(text) => text.into_response(),
        Err(e @ ControlError::InvalidIdentifier(_)) => (
            StatusCode::BAD_REQUEST,
            Json(ControlOutcome::failed(
                "Failed to fetch container logs",
                e.to_string(),
            )),
        )
            .into_response(),
        Err(ControlError::Runtime(message)) => Json(ControlOutcome::failed(
            "Failed to fetch container logs",
            message,
        ))
        .into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ControlRequest {
    pub id: String,
}

/// POST /api/docker/start — body {"id": ...}.
pub(super) async fn start_handler(
    State(state): State<AppState>,
    Json(req): Json<ControlRequest>,
) -> impl IntoResponse {
    Json(state.docker_repo.start(&req.id).await)
}

/// POST /api/docker/stop — body {"id": ...}.
pub(super) async fn stop_handler(
    State(state): State<AppState>,
    Json(req): Json<ControlRequest>,
) -> impl IntoResponse {
    Json(state.docker_repo.stop(&req.id).await)
}

/// POST /api/docker/restart — body {"id": ...}.
pub(super) async fn restart_handler(
    State(state): State<AppState>,
    Json(req): Json<ControlRequest>,
) -> impl IntoResponse {
    Json(state.docker_repo.restart(&req.id).await)
}

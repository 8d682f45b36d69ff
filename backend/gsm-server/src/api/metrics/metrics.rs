//! Resource usage REST API handlers

use crate::{ApiErrorBody, ApiResult, AppState, MetricsResponse, ServerNotRunningResponse};

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use log::debug;

/// GET /api/metrics
///
/// CPU, memory and uptime of the server binary plus host totals.
pub async fn get_metrics(State(state): State<AppState>) -> ApiResult<Response> {
    let set = state.orchestrator.locate().await?;
    let Some(pid) = set.server_pid() else {
        return Ok(not_running());
    };

    let sampler = state.sampler.clone();
    let disk_path = state.orchestrator.game_config().install_dir.clone();
    let snapshot = tokio::task::spawn_blocking(move || sampler.sample(pid, &disk_path)).await?;

    // Exited between the scan and the sample
    let Some(process) = snapshot.process else {
        debug!("Server pid {pid} vanished while sampling");
        return Ok(not_running());
    };

    Ok(Json(MetricsResponse {
        server_running: true,
        timestamp: Utc::now(),
        process: process.into(),
        system: snapshot.system.into(),
    })
    .into_response())
}

fn not_running() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ServerNotRunningResponse {
            server_running: false,
            error: ApiErrorBody {
                code: String::from("NOT_FOUND"),
                message: String::from("Server process not found"),
                details: None,
            },
        }),
    )
        .into_response()
}

/// GET /metrics
///
/// Prometheus text exposition of the lifecycle counters.
pub async fn prometheus_metrics(State(state): State<AppState>) -> Response {
    match state.prometheus {
        Some(ref handle) => (
            StatusCode::OK,
            [(http::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics exporter not installed").into_response(),
    }
}

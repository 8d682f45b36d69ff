//! Game log REST API handlers
//!
//! Read-only access to the game's own log directory.

use crate::{ApiResult, AppState, LogContentResponse, LogFileDto, LogListResponse, LogQuery};

use axum::{
    Json,
    extract::{Path, Query, State},
};

/// GET /api/logs
///
/// Log files, newest first
pub async fn list_logs(State(state): State<AppState>) -> ApiResult<Json<LogListResponse>> {
    let logs = state.game_logs.clone();
    let files = tokio::task::spawn_blocking(move || logs.list()).await??;

    Ok(Json(LogListResponse {
        logs: files.into_iter().map(LogFileDto::from).collect(),
    }))
}

/// GET /api/logs/{filename}?lines=N
pub async fn get_log(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    Query(query): Query<LogQuery>,
) -> ApiResult<Json<LogContentResponse>> {
    let logs = state.game_logs.clone();
    let lines = query.lines();
    let tail = tokio::task::spawn_blocking(move || logs.tail(&filename, lines)).await??;

    Ok(Json(tail.into()))
}

//! Server lifecycle REST API handlers

use crate::{
    ApiError, ApiResult, AppState, RestartResponse, StatusResponse, UpdateInfoResponse,
    UpdateResponse,
};

use gsm_core::InstallManifest;

use std::sync::Arc;

use axum::{Json, extract::State};
use log::info;

/// GET /api/server/status
///
/// Fresh scan of the host; never waits for an in-flight operation.
pub async fn get_status(State(state): State<AppState>) -> ApiResult<Json<StatusResponse>> {
    let status = state.orchestrator.status().await?;
    Ok(Json(status.into()))
}

/// POST /api/server/restart
///
/// Runs on its own task so a dropped connection cannot abandon a half-done restart.
pub async fn restart_server(State(state): State<AppState>) -> ApiResult<Json<RestartResponse>> {
    info!("Restart requested");
    let orchestrator = Arc::clone(&state.orchestrator);
    let report = tokio::spawn(async move { orchestrator.restart().await }).await??;
    Ok(Json(report.into()))
}

/// POST /api/server/update
pub async fn update_server(State(state): State<AppState>) -> ApiResult<Json<UpdateResponse>> {
    info!("Update requested");
    let orchestrator = Arc::clone(&state.orchestrator);
    let report = tokio::spawn(async move { orchestrator.update().await }).await??;
    Ok(Json(report.into()))
}

/// GET /api/server/update-info
pub async fn get_update_info(
    State(state): State<AppState>,
) -> ApiResult<Json<UpdateInfoResponse>> {
    let Some(app_id) = state.orchestrator.provisioning_config().app_id.clone() else {
        return Err(ApiError::not_found(
            "provisioning.app_id is not configured, no install manifest to read",
        ));
    };
    let install_dir = state.orchestrator.game_config().install_dir.clone();

    let manifest =
        tokio::task::spawn_blocking(move || InstallManifest::read(&install_dir, &app_id))
            .await??;
    Ok(Json(manifest.into()))
}

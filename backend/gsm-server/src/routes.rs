use crate::{
    AppState, get_log, get_metrics, get_status, get_update_info, health, list_logs,
    operator_guard, prometheus_metrics, restart_server, update_server,
};

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

/// Build the application router with all endpoints
pub fn build_router(state: AppState) -> Router {
    // Mutating and log-reading endpoints need the operator credential
    let protected = Router::new()
        .route("/api/server/restart", post(restart_server))
        .route("/api/server/update", post(update_server))
        .route("/api/logs", get(list_logs))
        .route("/api/logs/{filename}", get(get_log))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            operator_guard,
        ));

    Router::new()
        // Health check endpoints
        .route("/health", get(health::health_check))
        .route("/live", get(health::liveness_check))
        .route("/ready", get(health::readiness_check))
        // Prometheus exposition
        .route("/metrics", get(prometheus_metrics))
        // Read-only server endpoints
        .route("/api/server/status", get(get_status))
        .route("/api/server/update-info", get(get_update_info))
        .route("/api/metrics", get(get_metrics))
        .merge(protected)
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

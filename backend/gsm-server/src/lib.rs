pub mod api;
pub mod app_state;
pub mod error;
pub mod health;
pub mod logger;
pub mod middleware;
pub mod routes;

#[cfg(test)]
mod tests;

pub use api::{
    error::{ApiError, ApiErrorBody, ApiErrorResponse, Result as ApiResult},
    logs::{
        log_content_response::LogContentResponse,
        log_list_response::{LogFileDto, LogListResponse},
        log_query::LogQuery,
        logs::{get_log, list_logs},
    },
    metrics::{
        metrics::{get_metrics, prometheus_metrics},
        metrics_response::{
            MetricsResponse, ProcessMetricsDto, ServerNotRunningResponse, SystemMetricsDto,
        },
    },
    server::{
        restart_response::RestartResponse,
        server::{get_status, get_update_info, restart_server, update_server},
        status_response::StatusResponse,
        update_info_response::UpdateInfoResponse,
        update_response::UpdateResponse,
    },
};
pub use app_state::AppState;
pub use middleware::operator_guard::{API_KEY_HEADER, operator_guard};

pub use crate::routes::build_router;

//! REST API error types
//!
//! Every failure leaves the facade as `{"error": {"code", "message", "details"?}}`
//! with a status code derived from the error category.

use gsm_auth::AuthError;
use gsm_core::LifecycleError;

use std::panic::Location;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use error_location::ErrorLocation;
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

/// JSON error response body
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    /// Machine-readable error code (e.g., "NOT_FOUND", "LIFECYCLE_BUSY")
    pub code: String,
    pub message: String,
    /// Structured context such as a captured output tail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// 404
    #[error("Resource not found: {message} {location}")]
    NotFound {
        message: String,
        location: ErrorLocation,
    },

    /// 401
    #[error("Unauthorized ({code}): {message} {location}")]
    Unauthorized {
        code: &'static str,
        message: String,
        location: ErrorLocation,
    },

    /// 429
    #[error("Rate limited: {message} {location}")]
    RateLimited {
        message: String,
        location: ErrorLocation,
    },

    /// 409, another lifecycle operation holds the lock
    #[error("Conflict: {message} {location}")]
    Busy {
        message: String,
        details: Option<Value>,
        location: ErrorLocation,
    },

    /// 504
    #[error("Timeout: {message} {location}")]
    Timeout {
        message: String,
        details: Option<Value>,
        location: ErrorLocation,
    },

    /// 502, the provisioning tool failed
    #[error("Upstream failure: {message} {location}")]
    BadGateway {
        code: &'static str,
        message: String,
        details: Option<Value>,
        location: ErrorLocation,
    },

    /// 503
    #[error("Unavailable ({code}): {message} {location}")]
    Unavailable {
        code: &'static str,
        message: String,
        location: ErrorLocation,
    },

    /// 400
    #[error("Bad request: {message} {location}")]
    BadRequest {
        message: String,
        location: ErrorLocation,
    },

    /// 500
    #[error("Internal error ({code}): {message} {location}")]
    Internal {
        code: &'static str,
        message: String,
        location: ErrorLocation,
    },
}

impl ApiError {
    #[track_caller]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            code: "INTERNAL_ERROR",
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Busy { .. } => StatusCode::CONFLICT,
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            Self::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn into_body(self) -> ApiErrorBody {
        let (code, message, details) = match self {
            Self::NotFound { message, .. } => ("NOT_FOUND", message, None),
            Self::Unauthorized { code, message, .. } => (code, message, None),
            Self::RateLimited { message, .. } => ("RATE_LIMIT_EXCEEDED", message, None),
            Self::Busy {
                message, details, ..
            } => ("LIFECYCLE_BUSY", message, details),
            Self::Timeout {
                message, details, ..
            } => ("TIMEOUT", message, details),
            Self::BadGateway {
                code,
                message,
                details,
                ..
            } => (code, message, details),
            Self::Unavailable { code, message, .. } => (code, message, None),
            Self::BadRequest { message, .. } => ("BAD_REQUEST", message, None),
            Self::Internal { code, message, .. } => (code, message, None),
        };

        ApiErrorBody {
            code: code.to_string(),
            message,
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{self}");
        } else {
            log::warn!("{self}");
        }

        (
            status,
            Json(ApiErrorResponse {
                error: self.into_body(),
            }),
        )
            .into_response()
    }
}

/// Lifecycle failures keep their category; the source location stays in the log.
impl From<LifecycleError> for ApiError {
    #[track_caller]
    fn from(e: LifecycleError) -> Self {
        let location = ErrorLocation::from(Location::caller());
        let code = e.error_code();
        let hint = e.recovery_hint();

        match e {
            LifecycleError::NotFound { message, .. } => ApiError::NotFound { message, location },
            LifecycleError::LifecycleBusy {
                requested,
                in_flight,
                ..
            } => ApiError::Busy {
                message: format!("Cannot {requested}: {in_flight} already in progress"),
                details: Some(json!({
                    "requested": requested,
                    "in_flight": in_flight,
                    "retryable": true,
                    "hint": hint,
                })),
                location,
            },
            LifecycleError::Timeout {
                stage,
                after,
                relaunched_pid,
                output_tail,
                ..
            } => ApiError::Timeout {
                message: format!("{} did not finish within {}s", stage.as_str(), after.as_secs()),
                details: Some(json!({
                    "stage": stage.as_str(),
                    "relaunched_pid": relaunched_pid,
                    "output_tail": output_tail,
                    "hint": hint,
                })),
                location,
            },
            LifecycleError::ProvisioningFailed {
                exit_code,
                output_tail,
                relaunched_pid,
                ..
            } => ApiError::BadGateway {
                code,
                message: format!("Provisioning tool exited with code {exit_code:?}"),
                details: Some(json!({
                    "exit_code": exit_code,
                    "output_tail": output_tail,
                    "relaunched_pid": relaunched_pid,
                    "hint": hint,
                })),
                location,
            },
            LifecycleError::Configuration { message, .. } => ApiError::Unavailable {
                code,
                message,
                location,
            },
            LifecycleError::Cancelled { stage, .. } => ApiError::Unavailable {
                code,
                message: format!("Controller is shutting down, {stage} was cancelled"),
                location,
            },
            LifecycleError::MissingExecutable {
                install_dir,
                candidates,
                ..
            } => ApiError::Internal {
                code,
                message: format!(
                    "No launch executable in {}: tried {}",
                    install_dir.display(),
                    candidates.join(", ")
                ),
                location,
            },
            LifecycleError::Spawn { program, source, .. } => ApiError::Internal {
                code,
                message: format!("Failed to start {}: {source}", program.display()),
                location,
            },
            LifecycleError::Io { source, .. } => {
                log::error!("I/O error: {source}");
                ApiError::Internal {
                    code,
                    message: String::from("I/O operation failed"),
                    location,
                }
            }
            LifecycleError::Internal { message, .. } => ApiError::Internal {
                code,
                message,
                location,
            },
        }
    }
}

impl From<AuthError> for ApiError {
    #[track_caller]
    fn from(e: AuthError) -> Self {
        let location = ErrorLocation::from(Location::caller());
        let message = e.public_message();

        match e {
            AuthError::RateLimitExceeded { .. } => ApiError::RateLimited { message, location },
            AuthError::MissingApiKey { .. } | AuthError::InvalidApiKey { .. } => {
                ApiError::Unauthorized {
                    code: e.error_code(),
                    message,
                    location,
                }
            }
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    #[track_caller]
    fn from(e: tokio::task::JoinError) -> Self {
        log::error!("Background task failed: {e}");
        ApiError::internal("Background task failed")
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

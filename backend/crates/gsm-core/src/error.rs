use std::panic::Location;
use std::path::PathBuf;
use std::time::Duration;

use error_location::ErrorLocation;
use thiserror::Error;

/// Stage of a lifecycle operation that ran past its time bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutStage {
    Shutdown,
    Provisioning,
}

impl TimeoutStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shutdown => "shutdown",
            Self::Provisioning => "provisioning",
        }
    }
}

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("Not found: {message} {location}")]
    NotFound {
        message: String,
        location: ErrorLocation,
    },

    #[error("{} exceeded its bound after {}s {location}", .stage.as_str(), .after.as_secs())]
    Timeout {
        stage: TimeoutStage,
        after: Duration,
        /// Pid of the server launched after a provisioning timeout, if any
        relaunched_pid: Option<u32>,
        /// Last lines the provisioning tool printed before it was killed
        output_tail: Vec<String>,
        location: ErrorLocation,
    },

    #[error("Lifecycle operation '{in_flight}' already running, rejected '{requested}' {location}")]
    LifecycleBusy {
        requested: &'static str,
        in_flight: &'static str,
        location: ErrorLocation,
    },

    #[error("No launch executable in {}: tried {candidates:?} {location}", .install_dir.display())]
    MissingExecutable {
        install_dir: PathBuf,
        candidates: Vec<String>,
        location: ErrorLocation,
    },

    #[error("Provisioning failed with exit code {exit_code:?} {location}")]
    ProvisioningFailed {
        exit_code: Option<i32>,
        output_tail: Vec<String>,
        relaunched_pid: Option<u32>,
        location: ErrorLocation,
    },

    #[error("Failed to spawn {}: {source} {location}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Configuration error: {message} {location}")]
    Configuration {
        message: String,
        location: ErrorLocation,
    },

    #[error("Operation cancelled during {stage} {location}")]
    Cancelled {
        stage: &'static str,
        location: ErrorLocation,
    },

    #[error("IO error: {source} {location}")]
    Io {
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Internal error: {message} {location}")]
    Internal {
        message: String,
        location: ErrorLocation,
    },
}

impl LifecycleError {
    #[track_caller]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn busy(requested: &'static str, in_flight: Option<&'static str>) -> Self {
        Self::LifecycleBusy {
            requested,
            in_flight: in_flight.unwrap_or("unknown"),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Timeout { .. } => "TIMEOUT",
            Self::LifecycleBusy { .. } => "LIFECYCLE_BUSY",
            Self::MissingExecutable { .. } => "MISSING_EXECUTABLE",
            Self::ProvisioningFailed { .. } => "PROVISIONING_FAILED",
            Self::Spawn { .. } => "SPAWN_FAILED",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Cancelled { .. } => "CANCELLED",
            Self::Io { .. } => "IO_ERROR",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Only a busy rejection clears up on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LifecycleBusy { .. })
    }

    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::Timeout {
                stage: TimeoutStage::Shutdown,
                ..
            } => {
                "The game server did not exit after a forced kill. \
                   Inspect the host process table or restart the host."
            }
            Self::Timeout {
                stage: TimeoutStage::Provisioning,
                ..
            } => {
                "The installer exceeded its time bound and was killed. \
                   Check network access to Steam and retry the update."
            }
            Self::LifecycleBusy { .. } => {
                "Another restart or update is in progress. Retry once it has finished."
            }
            Self::MissingExecutable { .. } => {
                "The server is not installed in the configured directory. \
                   Run an update or fix game.install_dir."
            }
            Self::ProvisioningFailed { .. } => {
                "The installer reported an error. Inspect the output tail for details."
            }
            Self::Spawn { .. } => "The executable exists but could not be started. Check permissions.",
            Self::Configuration { .. } => "Fix the controller configuration and restart it.",
            _ => "An unexpected error occurred. Please check the logs for details.",
        }
    }
}

impl From<std::io::Error> for LifecycleError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<tokio::task::JoinError> for LifecycleError {
    #[track_caller]
    fn from(source: tokio::task::JoinError) -> Self {
        Self::Internal {
            message: format!("background task failed: {source}"),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, LifecycleError>;

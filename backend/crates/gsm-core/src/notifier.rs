use log::info;
use thiserror::Error;

/// Lifecycle milestones announced to the notification sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    RestartStarted,
    RestartCompleted,
    UpdateStarted,
    UpdateCompleted,
    LifecycleFailed,
}

impl LifecycleEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RestartStarted => "restart_started",
            Self::RestartCompleted => "restart_completed",
            Self::UpdateStarted => "update_started",
            Self::UpdateCompleted => "update_completed",
            Self::LifecycleFailed => "lifecycle_failed",
        }
    }
}

#[derive(Error, Debug)]
#[error("Notification '{event}' not delivered: {message}")]
pub struct NotificationError {
    pub event: &'static str,
    pub message: String,
}

/// Fire-and-forget announcement of lifecycle events.
///
/// Delivery failures are logged by the caller and never fail an operation.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, event: LifecycleEvent, detail: &str) -> Result<(), NotificationError>;
}

/// Writes events to the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&self, event: LifecycleEvent, detail: &str) -> Result<(), NotificationError> {
        info!("[{}] {detail}", event.as_str());
        Ok(())
    }
}

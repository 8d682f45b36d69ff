use serde::Serialize;

/// Lifecycle state of the managed server.
///
/// Never stored: idle states come from a fresh scan, transitional states
/// from the operation currently holding the lifecycle lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Stopped,
    Starting,
    Running,
    Stopping,
    Updating,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Updating => "updating",
        }
    }

    pub fn is_transitional(&self) -> bool {
        matches!(self, Self::Starting | Self::Stopping | Self::Updating)
    }
}

/// Mutating operations serialized by the lifecycle lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleOperation {
    Restart,
    Update,
}

impl LifecycleOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Restart => "restart",
            Self::Update => "update",
        }
    }
}

/// Progress of the operation currently holding the lifecycle lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InFlight {
    pub operation: LifecycleOperation,
    pub state: LifecycleState,
}

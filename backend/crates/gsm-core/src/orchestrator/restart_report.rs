use crate::{LaunchSpec, ShutdownResult};

use std::time::Duration;

/// Outcome of a successful restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartReport {
    pub previous_pid: Option<u32>,
    pub was_running: bool,
    /// None when nothing was running and the restart was a plain start
    pub shutdown: Option<ShutdownResult>,
    pub launch: LaunchSpec,
    pub new_pid: u32,
    pub elapsed: Duration,
}

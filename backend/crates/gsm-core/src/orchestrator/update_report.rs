use crate::{LaunchSpec, ProvisionOutcome, ShutdownResult};

use std::time::Duration;

/// Outcome of a successful update: provisioning exited 0 and the server relaunched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    pub previous_pid: Option<u32>,
    pub was_running: bool,
    pub shutdown: Option<ShutdownResult>,
    pub provisioning: ProvisionOutcome,
    pub launch: LaunchSpec,
    pub new_pid: u32,
    pub elapsed: Duration,
}

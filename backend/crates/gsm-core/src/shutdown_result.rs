use crate::ProcessRole;

use std::time::Duration;

use serde::Serialize;

/// What happened to one process during a shutdown attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationOutcome {
    /// Exited after the graceful signal
    Exited,
    /// Gone before it could be signalled
    AlreadyGone,
    /// Exited after the forced kill
    Killed,
    /// Still alive when the attempt gave up
    Survived,
    /// Still alive and at least one signal could not be delivered
    SignalFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessOutcome {
    pub pid: u32,
    pub role: ProcessRole,
    pub outcome: TerminationOutcome,
}

/// Produced once per shutdown attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShutdownResult {
    /// The server binary (or the whole set, when it had no binary) is gone
    pub terminated: bool,
    /// Graceful termination was not enough for the authoritative processes
    pub forced: bool,
    pub elapsed: Duration,
    pub outcomes: Vec<ProcessOutcome>,
}

impl ShutdownResult {
    pub fn nothing_to_stop() -> Self {
        Self {
            terminated: true,
            forced: false,
            elapsed: Duration::ZERO,
            outcomes: Vec::new(),
        }
    }

    pub fn outcome_for(&self, pid: u32) -> Option<TerminationOutcome> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.pid == pid)
            .map(|outcome| outcome.outcome)
    }
}

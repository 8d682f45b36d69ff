use std::time::Duration;

/// Result of a finished, timed out or cancelled provisioning run.
///
/// Whether a new build was actually downloaded cannot be told from this;
/// a zero exit code only means the tool reported success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionOutcome {
    /// None when the tool was killed by a signal
    pub exit_code: Option<i32>,
    pub output_tail: Vec<String>,
    pub timed_out: bool,
    pub cancelled: bool,
    pub pid: Option<u32>,
    pub elapsed: Duration,
}

impl ProvisionOutcome {
    pub fn succeeded(&self) -> bool {
        !self.timed_out && !self.cancelled && self.exit_code == Some(0)
    }
}

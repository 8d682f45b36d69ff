use gsm_core::RestartReport;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct RestartResponse {
    pub success: bool,
    pub was_running: bool,
    pub previous_pid: Option<u32>,
    pub new_pid: u32,
    pub executable: String,
    pub new_launch_args: Vec<String>,
    /// Whether SIGKILL was needed to stop the previous instance
    pub forced_shutdown: bool,
    pub elapsed_ms: u128,
}

impl From<RestartReport> for RestartResponse {
    fn from(report: RestartReport) -> Self {
        Self {
            success: true,
            was_running: report.was_running,
            previous_pid: report.previous_pid,
            new_pid: report.new_pid,
            executable: report.launch.executable.display().to_string(),
            new_launch_args: report.launch.args,
            forced_shutdown: report.shutdown.is_some_and(|shutdown| shutdown.forced),
            elapsed_ms: report.elapsed.as_millis(),
        }
    }
}

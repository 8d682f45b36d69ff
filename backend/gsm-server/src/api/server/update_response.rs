use gsm_core::UpdateReport;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub success: bool,
    pub was_running: bool,
    pub previous_pid: Option<u32>,
    pub provisioning_exit_code: Option<i32>,
    pub provisioning_elapsed_ms: u128,
    pub output_tail: Vec<String>,
    pub new_pid: u32,
    pub new_launch_args: Vec<String>,
    pub forced_shutdown: bool,
    pub elapsed_ms: u128,
}

impl From<UpdateReport> for UpdateResponse {
    fn from(report: UpdateReport) -> Self {
        Self {
            success: true,
            was_running: report.was_running,
            previous_pid: report.previous_pid,
            provisioning_exit_code: report.provisioning.exit_code,
            provisioning_elapsed_ms: report.provisioning.elapsed.as_millis(),
            output_tail: report.provisioning.output_tail,
            new_pid: report.new_pid,
            new_launch_args: report.launch.args,
            forced_shutdown: report.shutdown.is_some_and(|shutdown| shutdown.forced),
            elapsed_ms: report.elapsed.as_millis(),
        }
    }
}

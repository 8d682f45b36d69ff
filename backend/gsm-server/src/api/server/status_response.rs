use gsm_core::{InFlight, LifecycleState, ProcessSummary, ServerStatus};

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub running: bool,
    pub state: LifecycleState,
    pub pid: Option<u32>,
    /// Seconds since the server binary started
    pub uptime: Option<u64>,
    pub uptime_formatted: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub processes: Vec<ProcessSummary>,
    pub in_flight: Option<InFlight>,
}

impl From<ServerStatus> for StatusResponse {
    fn from(status: ServerStatus) -> Self {
        Self {
            running: status.running,
            state: status.state,
            pid: status.pid,
            uptime: status.uptime.map(|uptime| uptime.as_secs()),
            uptime_formatted: status
                .uptime
                .map(|uptime| humantime::format_duration(uptime).to_string()),
            started_at: status.started_at,
            processes: status.processes,
            in_flight: status.in_flight,
        }
    }
}

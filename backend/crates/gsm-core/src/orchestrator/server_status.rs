use crate::{InFlight, LifecycleState, ProcessRole, ProcessSet};

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessSummary {
    pub pid: u32,
    pub role: ProcessRole,
}

/// Live projection of the host process table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerStatus {
    pub state: LifecycleState,
    pub running: bool,
    pub pid: Option<u32>,
    pub started_at: Option<DateTime<Utc>>,
    pub uptime: Option<Duration>,
    pub processes: Vec<ProcessSummary>,
    pub in_flight: Option<InFlight>,
}

impl ServerStatus {
    pub fn from_scan(set: &ProcessSet, in_flight: Option<InFlight>) -> Self {
        let running = set.is_running();
        let state = match in_flight {
            Some(progress) => progress.state,
            None if running => LifecycleState::Running,
            None => LifecycleState::Stopped,
        };

        let binary = set.server_binary();
        let started_at = binary.and_then(|handle| {
            DateTime::from_timestamp(i64::try_from(handle.started_at).ok()?, 0)
        });
        let uptime = binary.map(|handle| {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs();
            Duration::from_secs(now.saturating_sub(handle.started_at))
        });

        Self {
            state,
            running,
            pid: binary.map(|handle| handle.pid),
            started_at,
            uptime,
            processes: set
                .iter()
                .map(|handle| ProcessSummary {
                    pid: handle.pid,
                    role: handle.role,
                })
                .collect(),
            in_flight,
        }
    }
}

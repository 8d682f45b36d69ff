use crate::{ProcessEntry, ProcessRole};

use std::path::PathBuf;

use serde::Serialize;

/// A classified process captured at scan time.
///
/// Handles go stale as soon as they are created; a process that has exited
/// by the time it is signalled is reported as already gone, not as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessHandle {
    pub pid: u32,
    pub role: ProcessRole,
    pub executable: Option<PathBuf>,
    pub cmdline: Vec<String>,
    pub parent_pid: Option<u32>,
    pub children: Vec<u32>,
    pub user: Option<String>,
    pub started_at: u64,
}

impl ProcessHandle {
    pub fn from_entry(entry: &ProcessEntry, role: ProcessRole, children: Vec<u32>) -> Self {
        Self {
            pid: entry.pid,
            role,
            executable: entry.executable.clone(),
            cmdline: entry.cmdline.clone(),
            parent_pid: entry.parent_pid,
            children,
            user: entry.user.clone(),
            started_at: entry.started_at,
        }
    }
}

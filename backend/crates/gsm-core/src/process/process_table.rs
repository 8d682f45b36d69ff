use crate::ProcessEntry;

use std::ffi::OsStr;

use log::debug;
use sysinfo::{ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System, UpdateKind};

/// Read-only enumeration of host processes.
pub trait ProcessTable: Send + Sync {
    /// Fresh snapshot of every visible process. Never cached between calls.
    fn snapshot(&self) -> Vec<ProcessEntry>;
}

/// Process table backed by `sysinfo`.
#[derive(Debug, Default)]
pub struct SysinfoProcessTable;

impl SysinfoProcessTable {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessTable for SysinfoProcessTable {
    fn snapshot(&self) -> Vec<ProcessEntry> {
        let mut system = System::new();
        system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::new()
                .with_cmd(UpdateKind::Always)
                .with_exe(UpdateKind::Always)
                .with_user(UpdateKind::Always),
        );

        let mut entries = Vec::with_capacity(system.processes().len());
        for (pid, process) in system.processes() {
            // Threads show up as processes on Linux; only keep the leaders
            if process.thread_kind().is_some() {
                continue;
            }
            if process.status() == ProcessStatus::Zombie {
                continue;
            }

            let name: &OsStr = process.name().as_ref();
            entries.push(ProcessEntry {
                pid: pid.as_u32(),
                parent_pid: process.parent().map(|parent| parent.as_u32()),
                name: name.to_string_lossy().into_owned(),
                executable: process.exe().map(|path| path.to_path_buf()),
                cmdline: process
                    .cmd()
                    .iter()
                    .map(|arg| {
                        let arg: &OsStr = arg.as_ref();
                        arg.to_string_lossy().into_owned()
                    })
                    .collect(),
                user: process.user_id().map(|uid| uid.to_string()),
                started_at: process.start_time(),
            });
        }

        debug!("Process table snapshot: {} processes", entries.len());
        entries
    }
}

use crate::{ProcessHandle, ProcessRole};

use serde::Serialize;

/// The processes believed to make up one running server instance.
///
/// Ordered shell wrappers first, server binaries second, descendants last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessSet {
    handles: Vec<ProcessHandle>,
}

impl ProcessSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a set, sorting handles into discovery order.
    ///
    /// The sort is stable so relative order within a role is kept.
    pub fn new(mut handles: Vec<ProcessHandle>) -> Self {
        handles.sort_by_key(|handle| role_rank(handle.role));
        Self { handles }
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn handles(&self) -> &[ProcessHandle] {
        &self.handles
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessHandle> {
        self.handles.iter()
    }

    /// Handles in signalling order: descendants, then binaries, then wrappers.
    pub fn shutdown_order(&self) -> impl Iterator<Item = &ProcessHandle> {
        self.handles.iter().rev()
    }

    /// The server is running iff a binary was found.
    pub fn is_running(&self) -> bool {
        self.handles
            .iter()
            .any(|handle| handle.role == ProcessRole::ServerBinary)
    }

    /// The first (oldest-discovered) server binary.
    pub fn server_binary(&self) -> Option<&ProcessHandle> {
        self.handles
            .iter()
            .find(|handle| handle.role == ProcessRole::ServerBinary)
    }

    pub fn server_pid(&self) -> Option<u32> {
        self.server_binary().map(|handle| handle.pid)
    }

    pub fn pids(&self) -> Vec<u32> {
        self.handles.iter().map(|handle| handle.pid).collect()
    }

    pub fn contains(&self, pid: u32) -> bool {
        self.handles.iter().any(|handle| handle.pid == pid)
    }
}

fn role_rank(role: ProcessRole) -> u8 {
    match role {
        ProcessRole::ShellWrapper => 0,
        ProcessRole::ServerBinary => 1,
        ProcessRole::Descendant => 2,
    }
}

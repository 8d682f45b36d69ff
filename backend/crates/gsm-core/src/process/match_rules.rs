use crate::ProcessEntry;

use std::path::PathBuf;

use gsm_config::LifecycleConfig;

/// Substring heuristics used to recognise the managed server.
#[derive(Debug, Clone)]
pub struct MatchRules {
    pub wrapper_pattern: String,
    pub binary_pattern: String,
    pub control_plane_patterns: Vec<String>,
}

impl MatchRules {
    pub fn from_config(config: &LifecycleConfig) -> Self {
        Self {
            wrapper_pattern: config.wrapper_pattern.clone(),
            binary_pattern: config.binary_pattern.clone(),
            control_plane_patterns: config.control_plane_patterns.clone(),
        }
    }

    pub fn is_control_plane(&self, entry: &ProcessEntry) -> bool {
        let command_line = entry.command_line();
        self.control_plane_patterns
            .iter()
            .any(|pattern| command_line.contains(pattern.as_str()) || entry.name == *pattern)
    }

    pub fn is_wrapper(&self, entry: &ProcessEntry) -> bool {
        entry.command_line().contains(&self.wrapper_pattern)
    }

    /// Executable file name, process name or command line carries the pattern.
    pub fn is_server_binary(&self, entry: &ProcessEntry) -> bool {
        let exe_matches = entry
            .executable
            .as_ref()
            .and_then(|path| path.file_name())
            .is_some_and(|file| file.to_string_lossy().contains(&self.binary_pattern));

        exe_matches
            || entry.name.contains(&self.binary_pattern)
            || entry.command_line().contains(&self.binary_pattern)
    }
}

/// Identity of the running controller, never to be classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfIdentity {
    pub pid: u32,
    pub executable: Option<PathBuf>,
}

impl SelfIdentity {
    pub fn current() -> Self {
        Self {
            pid: std::process::id(),
            executable: std::env::current_exe().ok(),
        }
    }

    pub fn matches(&self, entry: &ProcessEntry) -> bool {
        if entry.pid == self.pid {
            return true;
        }
        matches!(
            (&self.executable, &entry.executable),
            (Some(own), Some(other)) if own == other
        )
    }
}

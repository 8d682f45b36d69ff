use std::path::PathBuf;

/// One row of a host process table snapshot.
///
/// Metadata fields are best-effort: anything the scanner could not read
/// (exited mid-scan, privilege boundary) is left empty rather than failing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessEntry {
    pub pid: u32,
    pub parent_pid: Option<u32>,
    pub name: String,
    pub executable: Option<PathBuf>,
    pub cmdline: Vec<String>,
    pub user: Option<String>,
    /// Seconds since the Unix epoch
    pub started_at: u64,
}

impl ProcessEntry {
    /// Command line joined with single spaces.
    pub fn command_line(&self) -> String {
        self.cmdline.join(" ")
    }
}

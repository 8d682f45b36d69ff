use std::path::PathBuf;

use serde::Serialize;

/// Everything needed to spawn the server once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchSpec {
    pub executable: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

use std::path::PathBuf;
use std::time::Duration;

use gsm_config::SteamCredentials;

/// One invocation of the package manager.
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    pub app_id: String,
    pub credentials: SteamCredentials,
    pub install_dir: PathBuf,
    pub timeout: Duration,
}

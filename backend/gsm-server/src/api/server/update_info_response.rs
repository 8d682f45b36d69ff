use gsm_core::InstallManifest;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// What is installed on disk, not whether a newer build exists.
#[derive(Debug, Serialize)]
pub struct UpdateInfoResponse {
    pub app_id: String,
    pub name: Option<String>,
    pub build_id: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub size_on_disk: Option<u64>,
    pub state_flags: Option<u32>,
    pub authoritative: bool,
}

impl From<InstallManifest> for UpdateInfoResponse {
    fn from(manifest: InstallManifest) -> Self {
        Self {
            app_id: manifest.app_id,
            name: manifest.name,
            build_id: manifest.build_id,
            last_updated: manifest.last_updated,
            size_on_disk: manifest.size_on_disk,
            state_flags: manifest.state_flags,
            authoritative: false,
        }
    }
}

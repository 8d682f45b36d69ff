use crate::{LifecycleError, Result as LifecycleResult};

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::debug;
use serde::Serialize;

/// Installed-build metadata from Steam's `appmanifest_<app_id>.acf`.
///
/// Describes what is on disk; says nothing about whether a newer build exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallManifest {
    pub app_id: String,
    pub name: Option<String>,
    pub build_id: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub size_on_disk: Option<u64>,
    pub state_flags: Option<u32>,
}

impl InstallManifest {
    pub fn path(install_dir: &Path, app_id: &str) -> PathBuf {
        install_dir
            .join("steamapps")
            .join(format!("appmanifest_{app_id}.acf"))
    }

    pub fn read(install_dir: &Path, app_id: &str) -> LifecycleResult<Self> {
        let path = Self::path(install_dir, app_id);
        if !path.is_file() {
            return Err(LifecycleError::not_found(format!(
                "install manifest {} does not exist",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(&path)?;
        debug!("Read install manifest {}", path.display());
        Ok(Self::parse(app_id, &content))
    }

    /// Parse the top-level `AppState` keys of a KeyValues document.
    ///
    /// Keys inside nested blocks (depots, config) are ignored.
    pub fn parse(app_id: &str, content: &str) -> Self {
        let mut manifest = Self {
            app_id: app_id.to_string(),
            name: None,
            build_id: None,
            last_updated: None,
            size_on_disk: None,
            state_flags: None,
        };

        let mut depth = 0usize;
        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.starts_with('{') {
                depth += 1;
                continue;
            }
            if trimmed.starts_with('}') {
                depth = depth.saturating_sub(1);
                continue;
            }
            if depth != 1 {
                continue;
            }

            let tokens: Vec<&str> = trimmed.split('"').skip(1).step_by(2).collect();
            let [key, value] = tokens.as_slice() else {
                continue;
            };

            match key.to_ascii_lowercase().as_str() {
                "appid" => manifest.app_id = value.to_string(),
                "name" => manifest.name = Some(value.to_string()),
                "buildid" => manifest.build_id = Some(value.to_string()),
                "lastupdated" => {
                    manifest.last_updated = value
                        .parse::<i64>()
                        .ok()
                        .and_then(|secs| DateTime::from_timestamp(secs, 0));
                }
                "sizeondisk" => manifest.size_on_disk = value.parse().ok(),
                "stateflags" => manifest.state_flags = value.parse().ok(),
                _ => {}
            }
        }

        manifest
    }
}

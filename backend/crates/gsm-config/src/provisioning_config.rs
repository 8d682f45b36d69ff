use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_OUTPUT_TAIL_LINES, DEFAULT_PROVISION_TIMEOUT_SECS,
    DEFAULT_STEAM_USER, DEFAULT_TOOL_PATH, MAX_PROVISION_TIMEOUT_SECS,
};

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Package manager invocation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProvisioningConfig {
    pub tool_path: PathBuf,
    /// Steam application id of the dedicated server; required for updates
    pub app_id: Option<String>,
    pub username: String,
    pub password: Option<String>,
    pub guard_code: Option<String>,
    pub timeout_secs: u64,
    /// Number of trailing output lines retained for diagnostics
    pub output_tail_lines: usize,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            tool_path: PathBuf::from(DEFAULT_TOOL_PATH),
            app_id: None,
            username: String::from(DEFAULT_STEAM_USER),
            password: None,
            guard_code: None,
            timeout_secs: DEFAULT_PROVISION_TIMEOUT_SECS,
            output_tail_lines: DEFAULT_OUTPUT_TAIL_LINES,
        }
    }
}

impl ProvisioningConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.timeout_secs == 0 || self.timeout_secs > MAX_PROVISION_TIMEOUT_SECS {
            return Err(ConfigError::provisioning(format!(
                "provisioning.timeout_secs must be 1-{}, got {}",
                MAX_PROVISION_TIMEOUT_SECS, self.timeout_secs
            )));
        }

        if let Some(ref app_id) = self.app_id
            && (app_id.is_empty() || !app_id.chars().all(|c| c.is_ascii_digit()))
        {
            return Err(ConfigError::provisioning(format!(
                "provisioning.app_id must be numeric, got '{app_id}'"
            )));
        }

        if self.username.trim().is_empty() {
            return Err(ConfigError::provisioning(
                "provisioning.username cannot be empty (use 'anonymous')",
            ));
        }

        if self.guard_code.is_some() && self.password.is_none() {
            return Err(ConfigError::provisioning(
                "provisioning.guard_code requires provisioning.password",
            ));
        }

        if self.output_tail_lines == 0 {
            return Err(ConfigError::provisioning(
                "provisioning.output_tail_lines must be at least 1",
            ));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn credentials(&self) -> SteamCredentials {
        SteamCredentials {
            username: self.username.clone(),
            password: self.password.clone(),
            guard_code: self.guard_code.clone(),
        }
    }
}

/// Login material handed to the package manager.
///
/// `Debug` redacts the secret fields.
#[derive(Clone, PartialEq, Eq)]
pub struct SteamCredentials {
    pub username: String,
    pub password: Option<String>,
    pub guard_code: Option<String>,
}

impl SteamCredentials {
    pub fn anonymous() -> Self {
        Self {
            username: String::from(DEFAULT_STEAM_USER),
            password: None,
            guard_code: None,
        }
    }
}

impl fmt::Debug for SteamCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SteamCredentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("guard_code", &self.guard_code.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

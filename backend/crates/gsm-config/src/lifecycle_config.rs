use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_BINARY_PATTERN, DEFAULT_CONTROL_PLANE_PATTERNS,
    DEFAULT_FORCE_TIMEOUT_SECS, DEFAULT_GRACEFUL_TIMEOUT_SECS, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_WRAPPER_PATTERN, MAX_POLL_INTERVAL_MS,
};

use std::time::Duration;

use serde::Deserialize;

/// Shutdown timing and process identification heuristics.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    pub graceful_timeout_secs: u64,
    pub force_timeout_secs: u64,
    pub poll_interval_ms: u64,
    /// Command-line substring of the launcher shell script
    pub wrapper_pattern: String,
    /// Executable/command-line substring of the server binary
    pub binary_pattern: String,
    /// Command-line substrings identifying the control plane and its helpers
    pub control_plane_patterns: Vec<String>,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            graceful_timeout_secs: DEFAULT_GRACEFUL_TIMEOUT_SECS,
            force_timeout_secs: DEFAULT_FORCE_TIMEOUT_SECS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            wrapper_pattern: String::from(DEFAULT_WRAPPER_PATTERN),
            binary_pattern: String::from(DEFAULT_BINARY_PATTERN),
            control_plane_patterns: DEFAULT_CONTROL_PLANE_PATTERNS
                .iter()
                .map(|p| String::from(*p))
                .collect(),
        }
    }
}

impl LifecycleConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.graceful_timeout_secs == 0 {
            return Err(ConfigError::lifecycle(
                "lifecycle.graceful_timeout_secs must be at least 1",
            ));
        }

        if self.force_timeout_secs == 0 {
            return Err(ConfigError::lifecycle(
                "lifecycle.force_timeout_secs must be at least 1",
            ));
        }

        if self.poll_interval_ms == 0 || self.poll_interval_ms > MAX_POLL_INTERVAL_MS {
            return Err(ConfigError::lifecycle(format!(
                "lifecycle.poll_interval_ms must be 1-{}, got {}",
                MAX_POLL_INTERVAL_MS, self.poll_interval_ms
            )));
        }

        if self.wrapper_pattern.trim().is_empty() || self.binary_pattern.trim().is_empty() {
            return Err(ConfigError::lifecycle(
                "lifecycle.wrapper_pattern and lifecycle.binary_pattern cannot be empty",
            ));
        }

        if self.control_plane_patterns.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::lifecycle(
                "lifecycle.control_plane_patterns cannot contain empty entries",
            ));
        }

        Ok(())
    }

    pub fn graceful_timeout(&self) -> Duration {
        Duration::from_secs(self.graceful_timeout_secs)
    }

    pub fn force_timeout(&self) -> Duration {
        Duration::from_secs(self.force_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

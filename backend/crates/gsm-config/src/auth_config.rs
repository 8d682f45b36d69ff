use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_RATE_LIMIT_MAX_REQUESTS,
    DEFAULT_RATE_LIMIT_WINDOW_SECS,
};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Operator credential for protected operations; None leaves them open
    pub api_key: Option<String>,
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            rate_limit_max_requests: DEFAULT_RATE_LIMIT_MAX_REQUESTS,
            rate_limit_window_secs: DEFAULT_RATE_LIMIT_WINDOW_SECS,
        }
    }
}

impl AuthConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if let Some(ref key) = self.api_key
            && key.trim().is_empty()
        {
            return Err(ConfigError::auth(
                "auth.api_key cannot be blank; remove it to disable authentication",
            ));
        }

        if self.rate_limit_max_requests == 0 || self.rate_limit_window_secs == 0 {
            return Err(ConfigError::auth(
                "auth.rate_limit_max_requests and auth.rate_limit_window_secs must be at least 1",
            ));
        }

        Ok(())
    }
}

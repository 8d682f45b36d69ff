use crate::{ConfigError, ConfigErrorResult, DEFAULT_HOST, DEFAULT_PORT};

use std::net::IpAddr;

use serde::Deserialize;

/// Bind settings for the HTTP control plane.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from(DEFAULT_HOST),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.port == 0 {
            return Err(ConfigError::server("server.port must be between 1 and 65535"));
        }

        if self.host.parse::<IpAddr>().is_err() {
            return Err(ConfigError::server(format!(
                "server.host must be an IP address, got '{}'",
                self.host
            )));
        }

        Ok(())
    }
}

use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_GAME_LOG_SUBDIR, DEFAULT_INSTALL_DIR,
    DEFAULT_LISTEN_PORT, DEFAULT_QUERY_PORT, DEFAULT_SERVER_BINARY, DEFAULT_WRAPPER_SCRIPT,
};

use std::net::IpAddr;
use std::path::PathBuf;

use serde::Deserialize;

/// Operator-declared launch inputs for the managed game server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Directory the provisioning tool installs into; also the launch cwd
    pub install_dir: PathBuf,
    /// Game traffic port (`-Port=`)
    pub listen_port: u16,
    /// Steam query port (`-QueryPort=`)
    pub query_port: u16,
    /// Optional bind address (`-multihome=`)
    pub multihome_address: Option<String>,
    /// Extra arguments appended after the generated ones
    pub extra_args: Vec<String>,
    /// Launcher script, preferred when present
    pub wrapper_script: String,
    /// Raw server binary, used when the wrapper is absent
    pub server_binary: String,
    /// Game log directory; defaults to `<install_dir>/Vein/Saved/Logs`
    pub log_dir: Option<PathBuf>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            install_dir: PathBuf::from(DEFAULT_INSTALL_DIR),
            listen_port: DEFAULT_LISTEN_PORT,
            query_port: DEFAULT_QUERY_PORT,
            multihome_address: None,
            extra_args: Vec::new(),
            wrapper_script: String::from(DEFAULT_WRAPPER_SCRIPT),
            server_binary: String::from(DEFAULT_SERVER_BINARY),
            log_dir: None,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.listen_port == 0 || self.query_port == 0 {
            return Err(ConfigError::game(
                "game.listen_port and game.query_port must be between 1 and 65535",
            ));
        }

        if self.listen_port == self.query_port {
            return Err(ConfigError::game(format!(
                "game.listen_port and game.query_port must differ, both are {}",
                self.listen_port
            )));
        }

        if let Some(ref address) = self.multihome_address
            && address.parse::<IpAddr>().is_err()
        {
            return Err(ConfigError::game(format!(
                "game.multihome_address must be an IP address, got '{address}'"
            )));
        }

        if self.wrapper_script.trim().is_empty() || self.server_binary.trim().is_empty() {
            return Err(ConfigError::game(
                "game.wrapper_script and game.server_binary cannot be empty",
            ));
        }

        for name in [&self.wrapper_script, &self.server_binary] {
            if name.contains('/') || name.contains("..") {
                return Err(ConfigError::game(format!(
                    "executable names must be plain file names inside install_dir, got '{name}'"
                )));
            }
        }

        Ok(())
    }

    /// Resolved game log directory.
    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| self.install_dir.join(DEFAULT_GAME_LOG_SUBDIR))
    }
}

use crate::{
    AuthConfig, CONFIG_DIR_ENV, CONFIG_FILENAME, ConfigError, ConfigErrorResult,
    DEFAULT_CONFIG_DIR, GameConfig, LifecycleConfig, LoggingConfig, ProvisioningConfig,
    ServerConfig,
};

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub game: GameConfig,
    pub lifecycle: LifecycleConfig,
    pub provisioning: ProvisioningConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load config with full production error handling.
    ///
    /// Loading order:
    /// 1. Check for GSM_CONFIG_DIR env var, else use ./.gsm/
    /// 2. Auto-create config directory if it doesn't exist
    /// 3. Load config.toml if it exists, else use defaults
    /// 4. Apply GSM_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;
        Self::load_from(&config_dir)
    }

    /// Same as [`Config::load`] with an explicit config directory.
    pub fn load_from(config_dir: &Path) -> ConfigErrorResult<Self> {
        if !config_dir.exists() {
            std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::Io {
                path: config_dir.to_path_buf(),
                source: e,
            })?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Load and parse TOML file with detailed error context.
    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the config directory.
    /// Priority: GSM_CONFIG_DIR env var > ./.gsm/ (relative to cwd)
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(DEFAULT_CONFIG_DIR))
    }

    /// Validate all configuration.
    /// Call after load() to catch all errors at startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.server.validate()?;
        self.game.validate()?;
        self.lifecycle.validate()?;
        self.provisioning.validate()?;
        self.auth.validate()?;

        let log_dir = Path::new(&self.logging.dir);
        if log_dir.is_absolute() || self.logging.dir.contains("..") {
            return Err(ConfigError::config(
                "logging.dir must be relative and cannot contain '..'",
            ));
        }

        Ok(())
    }

    /// Get control plane bind address as string.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Log configuration summary (NEVER logs secrets).
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!("  control plane: {}", self.bind_addr());
        info!(
            "  game: install_dir={}, port={}, query_port={}, multihome={}, extra_args={}",
            self.game.install_dir.display(),
            self.game.listen_port,
            self.game.query_port,
            self.game.multihome_address.as_deref().unwrap_or("-"),
            self.game.extra_args.len()
        );
        info!(
            "  lifecycle: graceful={}s, force={}s, binary='{}', wrapper='{}'",
            self.lifecycle.graceful_timeout_secs,
            self.lifecycle.force_timeout_secs,
            self.lifecycle.binary_pattern,
            self.lifecycle.wrapper_pattern
        );
        info!(
            "  provisioning: tool={}, app_id={}, user={}, password={}, timeout={}s",
            self.provisioning.tool_path.display(),
            self.provisioning.app_id.as_deref().unwrap_or("unset"),
            self.provisioning.username,
            if self.provisioning.password.is_some() {
                "set"
            } else {
                "unset"
            },
            self.provisioning.timeout_secs
        );
        info!(
            "  auth: api_key={}, rate_limit={}/{}s",
            if self.auth.api_key.is_some() {
                "set"
            } else {
                "unset"
            },
            self.auth.rate_limit_max_requests,
            self.auth.rate_limit_window_secs
        );
        info!(
            "  logging: {} (colored: {})",
            *self.logging.level, self.logging.colored
        );
    }

    fn apply_env_overrides(&mut self) {
        // Server
        Self::apply_env_string("GSM_SERVER_HOST", &mut self.server.host);
        Self::apply_env_parse("GSM_SERVER_PORT", &mut self.server.port);

        // Game
        Self::apply_env_parse("GSM_GAME_INSTALL_DIR", &mut self.game.install_dir);
        Self::apply_env_parse("GSM_GAME_PORT", &mut self.game.listen_port);
        Self::apply_env_parse("GSM_GAME_QUERY_PORT", &mut self.game.query_port);
        Self::apply_env_option_string(
            "GSM_GAME_MULTIHOME_IP",
            &mut self.game.multihome_address,
        );
        Self::apply_env_list("GSM_GAME_EXTRA_ARGS", &mut self.game.extra_args);
        Self::apply_env_option_parse("GSM_GAME_LOG_DIR", &mut self.game.log_dir);

        // Lifecycle
        Self::apply_env_parse(
            "GSM_GRACEFUL_TIMEOUT_SECS",
            &mut self.lifecycle.graceful_timeout_secs,
        );
        Self::apply_env_parse(
            "GSM_FORCE_TIMEOUT_SECS",
            &mut self.lifecycle.force_timeout_secs,
        );

        // Provisioning
        Self::apply_env_parse("GSM_STEAMCMD_PATH", &mut self.provisioning.tool_path);
        Self::apply_env_option_string("GSM_APP_ID", &mut self.provisioning.app_id);
        Self::apply_env_string("GSM_STEAM_USER", &mut self.provisioning.username);
        Self::apply_env_option_string("GSM_STEAM_PASS", &mut self.provisioning.password);
        Self::apply_env_option_string("GSM_STEAM_AUTH", &mut self.provisioning.guard_code);
        Self::apply_env_parse(
            "GSM_PROVISION_TIMEOUT_SECS",
            &mut self.provisioning.timeout_secs,
        );

        // Auth
        Self::apply_env_option_string("GSM_API_KEY", &mut self.auth.api_key);

        // Logging
        Self::apply_env_parse("GSM_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("GSM_LOG_COLORED", &mut self.logging.colored);
        Self::apply_env_option_string("GSM_LOG_FILE", &mut self.logging.file);
    }

    /// Helper: Apply environment variable override for String values
    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Helper: Apply environment variable override for bool values (accepts "true"/"1")
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    /// Helper: Apply environment variable override for parseable values
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    /// Helper: Apply environment variable override for Option<T> values
    fn apply_env_option_parse<T: std::str::FromStr>(var_name: &str, target: &mut Option<T>) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = Some(parsed);
        }
    }

    /// Helper: Apply environment variable override for Option<String> values.
    /// An empty value clears the option.
    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = if val.is_empty() { None } else { Some(val) };
        }
    }

    /// Helper: Apply environment variable override for whitespace separated lists
    fn apply_env_list(var_name: &str, target: &mut Vec<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val.split_whitespace().map(String::from).collect();
        }
    }
}

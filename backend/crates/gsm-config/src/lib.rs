mod auth_config;
mod config;
mod error;
mod game_config;
mod lifecycle_config;
mod log_level;
mod logging_config;
mod provisioning_config;
mod server_config;

#[cfg(test)]
mod tests;

pub use auth_config::AuthConfig;
pub use config::Config;
pub use error::{ConfigError, ConfigErrorResult};
pub use game_config::GameConfig;
pub use lifecycle_config::LifecycleConfig;
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use provisioning_config::{ProvisioningConfig, SteamCredentials};
pub use server_config::ServerConfig;

const CONFIG_DIR_ENV: &str = "GSM_CONFIG_DIR";
const DEFAULT_CONFIG_DIR: &str = ".gsm";
const CONFIG_FILENAME: &str = "config.toml";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 9081;

const DEFAULT_INSTALL_DIR: &str = "/home/steam/vein-server";
const DEFAULT_LISTEN_PORT: u16 = 7777;
const DEFAULT_QUERY_PORT: u16 = 27015;
const DEFAULT_WRAPPER_SCRIPT: &str = "VeinServer.sh";
const DEFAULT_SERVER_BINARY: &str = "VeinServer";
const DEFAULT_GAME_LOG_SUBDIR: &str = "Vein/Saved/Logs";

const DEFAULT_GRACEFUL_TIMEOUT_SECS: u64 = 30;
const DEFAULT_FORCE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_POLL_INTERVAL_MS: u64 = 100;
const MAX_POLL_INTERVAL_MS: u64 = 5_000;
const DEFAULT_WRAPPER_PATTERN: &str = "VeinServer.sh";
const DEFAULT_BINARY_PATTERN: &str = "VeinServer";
const DEFAULT_CONTROL_PLANE_PATTERNS: [&str; 4] = [
    "gsm-server",
    "server-api.py",
    "http-forwarder.py",
    "backup.py",
];

const DEFAULT_TOOL_PATH: &str = "/home/steam/steamcmd/steamcmd.sh";
const DEFAULT_STEAM_USER: &str = "anonymous";
const DEFAULT_PROVISION_TIMEOUT_SECS: u64 = 600;
const MAX_PROVISION_TIMEOUT_SECS: u64 = 3_600;
const DEFAULT_OUTPUT_TAIL_LINES: usize = 50;

const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 10;
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;

const DEFAULT_LOG_LEVEL_STRING: &str = "info";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_DIRECTORY: &str = "log";

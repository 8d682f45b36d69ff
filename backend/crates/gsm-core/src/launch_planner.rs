use crate::{LaunchSpec, LifecycleError, Result as LifecycleResult};

use std::panic::Location;

use error_location::ErrorLocation;
use gsm_config::GameConfig;
use log::warn;

/// Flags generated from configuration; operator extras may not redefine them.
const RESERVED_FLAGS: [&str; 3] = ["-port=", "-queryport=", "-multihome="];

/// Builds the launch command for the server from configuration.
pub struct LaunchPlanner;

impl LaunchPlanner {
    /// Resolve the executable and argument vector.
    ///
    /// Argument order: `-log`, `-QueryPort=`, `-Port=`, optional `-multihome=`,
    /// then operator extras. The wrapper script wins over the raw binary when
    /// both exist.
    #[track_caller]
    pub fn plan(config: &GameConfig) -> LifecycleResult<LaunchSpec> {
        let candidates = [&config.wrapper_script, &config.server_binary];
        let executable = candidates
            .iter()
            .map(|name| config.install_dir.join(name))
            .find(|path| path.is_file())
            .ok_or_else(|| LifecycleError::MissingExecutable {
                install_dir: config.install_dir.clone(),
                candidates: candidates.iter().map(|name| name.to_string()).collect(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(LaunchSpec {
            executable,
            args: Self::arguments(config),
            working_dir: config.install_dir.clone(),
        })
    }

    /// Argument vector alone; pure function of the configuration.
    pub fn arguments(config: &GameConfig) -> Vec<String> {
        let mut args = vec![
            String::from("-log"),
            format!("-QueryPort={}", config.query_port),
            format!("-Port={}", config.listen_port),
        ];

        if let Some(ref address) = config.multihome_address {
            args.push(format!("-multihome={address}"));
        }

        for extra in &config.extra_args {
            if extra.trim().is_empty() {
                continue;
            }
            if is_reserved(extra) {
                warn!("Ignoring extra argument '{extra}': it redefines a generated flag");
                continue;
            }
            args.push(extra.clone());
        }

        args
    }
}

fn is_reserved(arg: &str) -> bool {
    let lowered = arg.to_ascii_lowercase();
    RESERVED_FLAGS.iter().any(|flag| lowered.starts_with(flag))
}

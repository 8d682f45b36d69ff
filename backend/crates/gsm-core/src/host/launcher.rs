use crate::{LaunchSpec, LifecycleError, Result as LifecycleResult};

use std::panic::Location;
use std::process::{Command, Stdio};

use error_location::ErrorLocation;
use log::{info, warn};

/// Starts the game server.
pub trait ProcessLauncher: Send + Sync {
    /// Spawn the process described by `spec` and return its pid.
    fn launch(&self, spec: &LaunchSpec) -> LifecycleResult<u32>;
}

/// Spawns the server in its own session with stdio closed, so it outlives
/// the controller.
#[derive(Debug, Default)]
pub struct DetachedLauncher;

impl DetachedLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessLauncher for DetachedLauncher {
    #[track_caller]
    fn launch(&self, spec: &LaunchSpec) -> LifecycleResult<u32> {
        let location = ErrorLocation::from(Location::caller());

        let mut cmd = Command::new(&spec.executable);
        cmd.args(&spec.args).current_dir(&spec.working_dir);

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            unsafe {
                cmd.pre_exec(|| {
                    libc::setsid();
                    Ok(())
                });
            }
        }

        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let mut child = cmd.spawn().map_err(|source| LifecycleError::Spawn {
            program: spec.executable.clone(),
            source,
            location,
        })?;

        let pid = child.id();
        info!(
            "Launched {} with pid {pid} (args: {})",
            spec.executable.display(),
            spec.args.join(" ")
        );

        // Reap on exit so a dead server never lingers as a zombie
        let reaper = std::thread::Builder::new()
            .name(format!("gsm-reaper-{pid}"))
            .spawn(move || match child.wait() {
                Ok(status) => info!("Game server pid {pid} exited: {status}"),
                Err(e) => warn!("Failed to wait for game server pid {pid}: {e}"),
            });
        if let Err(e) = reaper {
            warn!("Could not start reaper for pid {pid}: {e}");
        }

        Ok(pid)
    }
}

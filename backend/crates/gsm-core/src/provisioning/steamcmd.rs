use crate::{
    LifecycleError, OutputTail, ProvisionOutcome, ProvisionRequest, Provisioner,
    Result as LifecycleResult,
};

use std::panic::Location;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use error_location::ErrorLocation;
use gsm_config::ProvisioningConfig;
use log::{debug, info, warn};
use nix::sys::signal::{Signal, killpg};
use nix::unistd::Pid;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// How long to keep reading output after the tool is gone.
const OUTPUT_DRAIN_GRACE: Duration = Duration::from_secs(2);
const REDACTED: &str = "<redacted>";
/// Consecutive read failures tolerated before the output pipe is abandoned.
const MAX_READ_ERRORS: u32 = 8;

enum Finish {
    Exited(std::process::ExitStatus),
    TimedOut,
    Cancelled,
}

/// Runs `steamcmd` in its own process group.
pub struct SteamCmdProvisioner {
    tool_path: PathBuf,
    tail_lines: usize,
}

impl SteamCmdProvisioner {
    pub fn new(tool_path: PathBuf, tail_lines: usize) -> Self {
        Self {
            tool_path,
            tail_lines,
        }
    }

    pub fn from_config(config: &ProvisioningConfig) -> Self {
        Self::new(config.tool_path.clone(), config.output_tail_lines)
    }

    /// `+force_install_dir <dir> +login <user> [pass [guard]] +app_update <id> validate +quit`
    pub fn arguments(request: &ProvisionRequest) -> Vec<String> {
        let mut args = vec![
            String::from("+force_install_dir"),
            request.install_dir.display().to_string(),
            String::from("+login"),
            request.credentials.username.clone(),
        ];
        if let Some(ref password) = request.credentials.password {
            args.push(password.clone());
            if let Some(ref guard_code) = request.credentials.guard_code {
                args.push(guard_code.clone());
            }
        }
        args.extend([
            String::from("+app_update"),
            request.app_id.clone(),
            String::from("validate"),
            String::from("+quit"),
        ]);
        args
    }

    /// Arguments safe to log.
    fn redacted_arguments(request: &ProvisionRequest) -> String {
        Self::arguments(request)
            .into_iter()
            .map(|arg| {
                let secret = Some(&arg) == request.credentials.password.as_ref()
                    || Some(&arg) == request.credentials.guard_code.as_ref();
                if secret { String::from(REDACTED) } else { arg }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl Provisioner for SteamCmdProvisioner {
    async fn provision(
        &self,
        request: &ProvisionRequest,
        cancel: CancellationToken,
    ) -> LifecycleResult<ProvisionOutcome> {
        let location = ErrorLocation::from(Location::caller());
        info!(
            "Running {} {} (timeout {}s)",
            self.tool_path.display(),
            Self::redacted_arguments(request),
            request.timeout.as_secs()
        );

        let started = Instant::now();
        let mut child = Command::new(&self.tool_path)
            .args(Self::arguments(request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0)
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| LifecycleError::Spawn {
                program: self.tool_path.clone(),
                source,
                location,
            })?;
        let pid = child.id();

        let tail = Arc::new(Mutex::new(OutputTail::new(self.tail_lines)));
        let mut readers = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_reader(stdout, Arc::clone(&tail)));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_reader(stderr, Arc::clone(&tail)));
        }

        let finish = tokio::select! {
            status = child.wait() => Finish::Exited(status?),
            _ = tokio::time::sleep(request.timeout) => Finish::TimedOut,
            _ = cancel.cancelled() => Finish::Cancelled,
        };

        let exit_code = match &finish {
            Finish::Exited(status) => status.code(),
            Finish::TimedOut | Finish::Cancelled => {
                if let Some(pid) = pid {
                    kill_group(pid);
                }
                // Reap so the killed tool does not linger as a zombie
                if let Err(e) = child.wait().await {
                    warn!("Failed to reap provisioning tool: {e}");
                }
                None
            }
        };

        for reader in readers {
            let abort = reader.abort_handle();
            if tokio::time::timeout(OUTPUT_DRAIN_GRACE, reader).await.is_err() {
                abort.abort();
            }
        }

        let elapsed = started.elapsed();
        let output_tail = tail
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .to_lines();
        let outcome = ProvisionOutcome {
            exit_code,
            output_tail,
            timed_out: matches!(finish, Finish::TimedOut),
            cancelled: matches!(finish, Finish::Cancelled),
            pid,
            elapsed,
        };

        if outcome.timed_out {
            warn!(
                "Provisioning timed out after {}s and was killed",
                request.timeout.as_secs()
            );
        } else if outcome.cancelled {
            warn!("Provisioning cancelled after {}ms", elapsed.as_millis());
        } else {
            info!(
                "Provisioning finished with exit code {:?} in {}s",
                outcome.exit_code,
                elapsed.as_secs()
            );
        }

        Ok(outcome)
    }
}

/// Reads until EOF so the tool never writes into a closed pipe.
fn spawn_reader<R>(stream: R, tail: Arc<Mutex<OutputTail>>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        let mut read_errors = 0;
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    read_errors = 0;
                    let line = String::from_utf8_lossy(&buf);
                    let line = line.trim_end_matches(['\n', '\r']);
                    debug!("steamcmd: {line}");
                    tail.lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(line);
                }
                Err(e) => {
                    read_errors += 1;
                    warn!("Failed to read steamcmd output: {e}");
                    if read_errors >= MAX_READ_ERRORS {
                        break;
                    }
                }
            }
        }
    })
}

/// SIGKILL the tool and everything it started.
fn kill_group(pid: u32) {
    let Ok(raw) = i32::try_from(pid) else {
        return;
    };
    if let Err(e) = killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        warn!("Failed to kill provisioning process group {pid}: {e}");
    }
}

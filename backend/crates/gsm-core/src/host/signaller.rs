use log::{debug, warn};
use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;

/// Termination strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// SIGTERM
    Graceful,
    /// SIGKILL
    Forced,
}

impl ShutdownSignal {
    fn as_signal(self) -> Signal {
        match self {
            Self::Graceful => Signal::SIGTERM,
            Self::Forced => Signal::SIGKILL,
        }
    }
}

/// Result of delivering one signal to one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalDelivery {
    Delivered,
    /// The process exited before the signal reached it
    AlreadyGone,
    Failed(String),
}

/// Signal delivery and liveness probing for host processes.
pub trait ProcessSignaller: Send + Sync {
    fn send(&self, pid: u32, signal: ShutdownSignal) -> SignalDelivery;

    /// Exited and zombie processes count as not alive.
    fn is_alive(&self, pid: u32) -> bool;
}

/// Unix signals via `nix`.
#[derive(Debug, Default)]
pub struct NixSignaller;

impl NixSignaller {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessSignaller for NixSignaller {
    fn send(&self, pid: u32, signal: ShutdownSignal) -> SignalDelivery {
        let Some(target) = to_pid(pid) else {
            return SignalDelivery::Failed(format!("refusing to signal pid {pid}"));
        };

        match kill(target, signal.as_signal()) {
            Ok(()) => {
                debug!("Sent {:?} to pid {pid}", signal.as_signal());
                SignalDelivery::Delivered
            }
            Err(Errno::ESRCH) => SignalDelivery::AlreadyGone,
            Err(e) => {
                warn!("Failed to send {:?} to pid {pid}: {e}", signal.as_signal());
                SignalDelivery::Failed(e.to_string())
            }
        }
    }

    fn is_alive(&self, pid: u32) -> bool {
        let Some(target) = to_pid(pid) else {
            return false;
        };

        match kill(target, None) {
            Ok(()) => !is_zombie(pid),
            // Exists but belongs to someone else
            Err(Errno::EPERM) => !is_zombie(pid),
            Err(_) => false,
        }
    }
}

/// Pids 0 and 1, and anything that does not fit in `pid_t`, are never signalled.
fn to_pid(pid: u32) -> Option<Pid> {
    match i32::try_from(pid) {
        Ok(raw) if raw > 1 => Some(Pid::from_raw(raw)),
        _ => None,
    }
}

/// Zombie check through procfs. Unknown means not a zombie.
fn is_zombie(pid: u32) -> bool {
    let Ok(stat) = std::fs::read_to_string(format!("/proc/{pid}/stat")) else {
        return false;
    };
    // The state field follows the parenthesised command name, which may contain spaces
    stat.rfind(')')
        .and_then(|idx| stat[idx + 1..].split_whitespace().next())
        .is_some_and(|state| state == "Z")
}

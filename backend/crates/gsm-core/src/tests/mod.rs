
use crate::{
    HostServices, LaunchSpec, LifecycleEvent, NotificationError, NotificationSink,
    ProcessEntry, ProcessLauncher, ProcessSignaller, ProcessTable, ProvisionOutcome,
    ProvisionRequest, Provisioner, Result as LifecycleResult, SelfIdentity, ShutdownSignal,
    SignalDelivery,
};

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Far above any real pid so fake processes never collide with the test process.
pub(crate) const FAKE_PID_BASE: u32 = 5_000_000;
pub(crate) const CONTROLLER_PID: u32 = 4_999_999;

pub(crate) fn entry(pid: u32, parent: Option<u32>, name: &str, cmdline: &[&str]) -> ProcessEntry {
    ProcessEntry {
        pid,
        parent_pid: parent,
        name: name.to_string(),
        executable: None,
        cmdline: cmdline.iter().map(|arg| arg.to_string()).collect(),
        user: Some(String::from("1000")),
        started_at: 1_700_000_000,
    }
}

pub(crate) fn wrapper_entry(pid: u32) -> ProcessEntry {
    entry(pid, Some(1), "sh", &["/bin/sh", "./VeinServer.sh", "-log"])
}

pub(crate) fn binary_entry(pid: u32, parent: Option<u32>) -> ProcessEntry {
    let mut entry = entry(
        pid,
        parent,
        "VeinServer-Linu",
        &["/home/steam/vein-server/Vein/Binaries/Linux/VeinServer-Linux-Shipping", "Vein"],
    );
    entry.executable = Some(PathBuf::from(
        "/home/steam/vein-server/Vein/Binaries/Linux/VeinServer-Linux-Shipping",
    ));
    entry
}

/// Reaction of a fake process to signals.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Behavior {
    /// Exits this long after SIGTERM
    ExitsAfter(Duration),
    /// Exits this long after SIGTERM, but a fresh binary takes its place
    Respawns(Duration),
    /// Only SIGKILL stops it
    IgnoresTerm,
    /// Survives even SIGKILL (stuck in uninterruptible sleep)
    Unkillable,
}

struct FakeProcess {
    entry: ProcessEntry,
    behavior: Behavior,
    exit_at: Option<Instant>,
    alive: bool,
}

impl FakeProcess {
    fn refresh(&mut self) {
        if let Some(exit_at) = self.exit_at
            && Instant::now() >= exit_at
        {
            self.alive = false;
        }
    }
}

/// What the fake provisioner reports.
#[derive(Debug, Clone)]
pub(crate) enum FakeProvision {
    Exit(i32),
    TimedOut,
    CannotStart,
}

#[derive(Default)]
struct FakeState {
    processes: BTreeMap<u32, FakeProcess>,
    signals: Vec<(u32, ShutdownSignal)>,
    launches: Vec<LaunchSpec>,
    /// Live server binaries seen at each provisioning call
    provision_calls: Vec<usize>,
    provision: Option<FakeProvision>,
    provision_delay: Duration,
    events: Vec<LifecycleEvent>,
    launch_delay: Duration,
    next_pid: u32,
}

/// In-memory host: process table, signals, launcher, provisioner and notifier.
pub(crate) struct FakeHost {
    state: Mutex<FakeState>,
}

impl FakeHost {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(FakeState {
                next_pid: FAKE_PID_BASE + 1_000,
                provision: Some(FakeProvision::Exit(0)),
                ..FakeState::default()
            }),
        })
    }

    pub(crate) fn add(&self, entry: ProcessEntry, behavior: Behavior) {
        let mut state = self.state.lock().unwrap();
        state.processes.insert(
            entry.pid,
            FakeProcess {
                entry,
                behavior,
                exit_at: None,
                alive: true,
            },
        );
    }

    /// A wrapper plus binary pair that exits `delay` after SIGTERM.
    pub(crate) fn add_running_server(&self, behavior: Behavior) -> (u32, u32) {
        let wrapper = FAKE_PID_BASE + 1;
        let binary = FAKE_PID_BASE + 2;
        self.add(wrapper_entry(wrapper), Behavior::ExitsAfter(Duration::from_millis(5)));
        self.add(binary_entry(binary, Some(wrapper)), behavior);
        (wrapper, binary)
    }

    pub(crate) fn set_provision(&self, provision: FakeProvision, delay: Duration) {
        let mut state = self.state.lock().unwrap();
        state.provision = Some(provision);
        state.provision_delay = delay;
    }

    pub(crate) fn set_launch_delay(&self, delay: Duration) {
        self.state.lock().unwrap().launch_delay = delay;
    }

    pub(crate) fn signals(&self) -> Vec<(u32, ShutdownSignal)> {
        self.state.lock().unwrap().signals.clone()
    }

    pub(crate) fn launches(&self) -> Vec<LaunchSpec> {
        self.state.lock().unwrap().launches.clone()
    }

    pub(crate) fn provision_calls(&self) -> Vec<usize> {
        self.state.lock().unwrap().provision_calls.clone()
    }

    pub(crate) fn events(&self) -> Vec<LifecycleEvent> {
        self.state.lock().unwrap().events.clone()
    }

    pub(crate) fn alive(&self, pid: u32) -> bool {
        self.is_alive(pid)
    }

    pub(crate) fn services(self: &Arc<Self>) -> HostServices {
        HostServices {
            table: Arc::clone(self) as Arc<dyn ProcessTable>,
            signaller: Arc::clone(self) as Arc<dyn ProcessSignaller>,
            launcher: Arc::clone(self) as Arc<dyn ProcessLauncher>,
            provisioner: Arc::clone(self) as Arc<dyn Provisioner>,
            notifier: Arc::clone(self) as Arc<dyn NotificationSink>,
            identity: SelfIdentity {
                pid: CONTROLLER_PID,
                executable: None,
            },
        }
    }

    fn live_binaries(state: &mut FakeState) -> usize {
        state
            .processes
            .values_mut()
            .map(|process| {
                process.refresh();
                process.alive && process.entry.command_line().contains("VeinServer-Linux")
            })
            .filter(|live| *live)
            .count()
    }
}

impl ProcessTable for FakeHost {
    fn snapshot(&self) -> Vec<ProcessEntry> {
        let mut state = self.state.lock().unwrap();
        state
            .processes
            .values_mut()
            .filter_map(|process| {
                process.refresh();
                process.alive.then(|| process.entry.clone())
            })
            .collect()
    }
}

impl ProcessSignaller for FakeHost {
    fn send(&self, pid: u32, signal: ShutdownSignal) -> SignalDelivery {
        let mut state = self.state.lock().unwrap();
        state.signals.push((pid, signal));
        let Some(process) = state.processes.get_mut(&pid) else {
            return SignalDelivery::AlreadyGone;
        };
        process.refresh();
        if !process.alive {
            return SignalDelivery::AlreadyGone;
        }

        let mut respawn = false;
        match (signal, process.behavior) {
            (ShutdownSignal::Graceful, Behavior::ExitsAfter(delay)) => {
                process.exit_at.get_or_insert(Instant::now() + delay);
            }
            (ShutdownSignal::Graceful, Behavior::Respawns(delay)) => {
                respawn = process.exit_at.is_none();
                process.exit_at.get_or_insert(Instant::now() + delay);
            }
            (
                ShutdownSignal::Forced,
                Behavior::ExitsAfter(_) | Behavior::Respawns(_) | Behavior::IgnoresTerm,
            ) => {
                process.alive = false;
            }
            _ => {}
        }

        if respawn {
            let replacement = state.next_pid;
            state.next_pid += 1;
            state.processes.insert(
                replacement,
                FakeProcess {
                    entry: binary_entry(replacement, Some(1)),
                    behavior: Behavior::ExitsAfter(Duration::from_millis(5)),
                    exit_at: None,
                    alive: true,
                },
            );
        }
        SignalDelivery::Delivered
    }

    fn is_alive(&self, pid: u32) -> bool {
        let mut state = self.state.lock().unwrap();
        state.processes.get_mut(&pid).is_some_and(|process| {
            process.refresh();
            process.alive
        })
    }
}

impl ProcessLauncher for FakeHost {
    fn launch(&self, spec: &LaunchSpec) -> LifecycleResult<u32> {
        let delay = self.state.lock().unwrap().launch_delay;
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }

        let mut state = self.state.lock().unwrap();
        let pid = state.next_pid;
        state.next_pid += 1;
        state.launches.push(spec.clone());
        state.processes.insert(
            pid,
            FakeProcess {
                entry: binary_entry(pid, Some(1)),
                behavior: Behavior::ExitsAfter(Duration::from_millis(5)),
                exit_at: None,
                alive: true,
            },
        );
        Ok(pid)
    }
}

#[async_trait]
impl Provisioner for FakeHost {
    async fn provision(
        &self,
        request: &ProvisionRequest,
        cancel: CancellationToken,
    ) -> LifecycleResult<ProvisionOutcome> {
        let (provision, delay) = {
            let mut state = self.state.lock().unwrap();
            let live = Self::live_binaries(&mut state);
            state.provision_calls.push(live);
            (state.provision.clone(), state.provision_delay)
        };

        let cancelled = tokio::select! {
            _ = tokio::time::sleep(delay) => false,
            _ = cancel.cancelled() => true,
        };

        let (exit_code, timed_out) = match provision {
            Some(FakeProvision::Exit(code)) => (Some(code), false),
            Some(FakeProvision::TimedOut) => (None, true),
            Some(FakeProvision::CannotStart) | None => {
                return Err(crate::LifecycleError::Spawn {
                    program: PathBuf::from("/missing/steamcmd.sh"),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                    location: error_location::ErrorLocation::from(
                        std::panic::Location::caller(),
                    ),
                });
            }
        };

        Ok(ProvisionOutcome {
            exit_code: if cancelled { None } else { exit_code },
            output_tail: vec![format!("Success! App '{}' fully installed.", request.app_id)],
            timed_out: timed_out && !cancelled,
            cancelled,
            pid: Some(FAKE_PID_BASE + 900),
            elapsed: delay,
        })
    }
}

impl NotificationSink for FakeHost {
    fn notify(&self, event: LifecycleEvent, _detail: &str) -> Result<(), NotificationError> {
        self.state.lock().unwrap().events.push(event);
        Ok(())
    }
}

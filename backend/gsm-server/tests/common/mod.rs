#![allow(dead_code)]

//! Test infrastructure for gsm-server API tests

use gsm_config::{Config, GameConfig, LifecycleConfig, ProvisioningConfig};
use gsm_core::{
    HostServices, LaunchSpec, LifecycleEvent, NotificationError, NotificationSink, ProcessEntry,
    ProcessLauncher, ProcessSignaller, ProcessTable, ProvisionOutcome, ProvisionRequest,
    Provisioner, Result as LifecycleResult, SelfIdentity, ShutdownSignal, SignalDelivery,
};
use gsm_server::AppState;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

pub const API_KEY: &str = "test-operator-key";
pub const APP_ID: &str = "2131400";

const FIRST_PID: u32 = 7_000_000;

struct FakeServer {
    entry: ProcessEntry,
    exit_at: Option<Instant>,
}

/// In-memory host where every server exits `exit_delay` after SIGTERM.
pub struct TestHost {
    processes: Mutex<BTreeMap<u32, FakeServer>>,
    next_pid: Mutex<u32>,
    launches: Mutex<usize>,
    exit_delay: Duration,
    provision_delay: Duration,
    provision_exit_code: i32,
}

impl TestHost {
    pub fn new(exit_delay: Duration) -> Arc<Self> {
        Self::with_provisioning(exit_delay, Duration::ZERO, 0)
    }

    pub fn with_provisioning(
        exit_delay: Duration,
        provision_delay: Duration,
        provision_exit_code: i32,
    ) -> Arc<Self> {
        Arc::new(Self {
            processes: Mutex::new(BTreeMap::new()),
            next_pid: Mutex::new(FIRST_PID),
            launches: Mutex::new(0),
            exit_delay,
            provision_delay,
            provision_exit_code,
        })
    }

    /// Register a running server binary and return its pid.
    pub fn start_server(&self) -> u32 {
        let pid = {
            let mut next = self.next_pid.lock().unwrap();
            *next += 1;
            *next
        };
        let binary = "/srv/vein/Vein/Binaries/Linux/VeinServer-Linux-Shipping";
        self.processes.lock().unwrap().insert(
            pid,
            FakeServer {
                entry: ProcessEntry {
                    pid,
                    parent_pid: Some(1),
                    name: String::from("VeinServer-Linu"),
                    executable: Some(PathBuf::from(binary)),
                    cmdline: vec![binary.to_string()],
                    user: None,
                    started_at: 1_700_000_000,
                },
                exit_at: None,
            },
        );
        pid
    }

    /// Number of servers started through the launcher.
    pub fn launches(&self) -> usize {
        *self.launches.lock().unwrap()
    }

    pub fn services(self: &Arc<Self>) -> HostServices {
        HostServices {
            table: Arc::clone(self) as Arc<dyn ProcessTable>,
            signaller: Arc::clone(self) as Arc<dyn ProcessSignaller>,
            launcher: Arc::clone(self) as Arc<dyn ProcessLauncher>,
            provisioner: Arc::clone(self) as Arc<dyn Provisioner>,
            notifier: Arc::clone(self) as Arc<dyn NotificationSink>,
            identity: SelfIdentity {
                pid: FIRST_PID - 1,
                executable: None,
            },
        }
    }

    fn reap(processes: &mut BTreeMap<u32, FakeServer>) {
        let now = Instant::now();
        processes.retain(|_, server| server.exit_at.is_none_or(|at| now < at));
    }
}

impl ProcessTable for TestHost {
    fn snapshot(&self) -> Vec<ProcessEntry> {
        let mut processes = self.processes.lock().unwrap();
        Self::reap(&mut processes);
        processes.values().map(|server| server.entry.clone()).collect()
    }
}

impl ProcessSignaller for TestHost {
    fn send(&self, pid: u32, signal: ShutdownSignal) -> SignalDelivery {
        let mut processes = self.processes.lock().unwrap();
        Self::reap(&mut processes);
        match (processes.get_mut(&pid), signal) {
            (None, _) => SignalDelivery::AlreadyGone,
            (Some(server), ShutdownSignal::Graceful) => {
                server.exit_at.get_or_insert(Instant::now() + self.exit_delay);
                SignalDelivery::Delivered
            }
            (Some(_), ShutdownSignal::Forced) => {
                processes.remove(&pid);
                SignalDelivery::Delivered
            }
        }
    }

    fn is_alive(&self, pid: u32) -> bool {
        let mut processes = self.processes.lock().unwrap();
        Self::reap(&mut processes);
        processes.contains_key(&pid)
    }
}

impl ProcessLauncher for TestHost {
    fn launch(&self, _spec: &LaunchSpec) -> LifecycleResult<u32> {
        *self.launches.lock().unwrap() += 1;
        Ok(self.start_server())
    }
}

#[async_trait]
impl Provisioner for TestHost {
    async fn provision(
        &self,
        request: &ProvisionRequest,
        cancel: CancellationToken,
    ) -> LifecycleResult<ProvisionOutcome> {
        let cancelled = tokio::select! {
            _ = tokio::time::sleep(self.provision_delay) => false,
            _ = cancel.cancelled() => true,
        };

        Ok(ProvisionOutcome {
            exit_code: (!cancelled).then_some(self.provision_exit_code),
            output_tail: vec![format!("app_update {} finished", request.app_id)],
            timed_out: false,
            cancelled,
            pid: None,
            elapsed: self.provision_delay,
        })
    }
}

impl NotificationSink for TestHost {
    fn notify(&self, _event: LifecycleEvent, _detail: &str) -> Result<(), NotificationError> {
        Ok(())
    }
}

/// Install directory with a launch script, game logs and an app manifest.
pub fn create_install_dir() -> TempDir {
    let dir = TempDir::new().expect("Failed to create install dir");
    std::fs::write(dir.path().join("VeinServer.sh"), "#!/bin/sh\n").unwrap();

    let logs = dir.path().join("Vein/Saved/Logs");
    std::fs::create_dir_all(&logs).unwrap();
    std::fs::write(logs.join("Vein.log"), "boot\nloading map\nready\n").unwrap();

    let steamapps = dir.path().join("steamapps");
    std::fs::create_dir_all(&steamapps).unwrap();
    std::fs::write(
        steamapps.join(format!("appmanifest_{APP_ID}.acf")),
        "\"AppState\"\n{\n\t\"appid\"\t\t\"2131400\"\n\t\"name\"\t\t\"VEIN Dedicated Server\"\n\t\"buildid\"\t\t\"14820391\"\n\t\"LastUpdated\"\t\t\"1718000000\"\n}\n",
    )
    .unwrap();

    dir
}

pub fn test_config(install_dir: &TempDir, api_key: Option<&str>) -> Config {
    let mut config = Config {
        game: GameConfig {
            install_dir: install_dir.path().to_path_buf(),
            ..GameConfig::default()
        },
        lifecycle: LifecycleConfig {
            graceful_timeout_secs: 1,
            force_timeout_secs: 1,
            poll_interval_ms: 10,
            ..LifecycleConfig::default()
        },
        provisioning: ProvisioningConfig {
            app_id: Some(String::from(APP_ID)),
            ..ProvisioningConfig::default()
        },
        ..Config::default()
    };
    config.auth.api_key = api_key.map(String::from);
    config
}

/// AppState backed by `host`, protected by `API_KEY`.
pub fn create_test_app_state(install_dir: &TempDir, host: &Arc<TestHost>) -> AppState {
    AppState::new(
        &test_config(install_dir, Some(API_KEY)),
        host.services(),
        CancellationToken::new(),
    )
}

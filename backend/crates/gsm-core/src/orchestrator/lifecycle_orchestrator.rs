use crate::{
    HostServices, InFlight, LaunchPlanner, LaunchSpec, LifecycleError, LifecycleEvent,
    LifecycleMetrics, LifecycleOperation, LifecycleState, MatchRules, NotificationSink,
    ProcessLauncher, ProcessLocator, ProcessSet, ProvisionOutcome, ProvisionRequest, Provisioner,
    RestartReport, Result as LifecycleResult, ServerStatus, ShutdownCoordinator, ShutdownResult,
    TimeoutStage, UpdateReport,
};

use std::panic::Location;
use std::sync::Arc;
use std::time::Duration;

use error_location::ErrorLocation;
use gsm_config::{Config, GameConfig, LifecycleConfig, ProvisioningConfig};
use log::{error, info, warn};
use tokio::sync::{Mutex, MutexGuard, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Top-level lifecycle state machine.
///
/// `restart` and `update` are serialized by a single lock and fail fast with
/// `LifecycleBusy` instead of queueing. `status` never takes the lock.
pub struct LifecycleOrchestrator {
    game: GameConfig,
    lifecycle: LifecycleConfig,
    provisioning: ProvisioningConfig,
    locator: Arc<ProcessLocator>,
    coordinator: ShutdownCoordinator,
    launcher: Arc<dyn ProcessLauncher>,
    provisioner: Arc<dyn Provisioner>,
    notifier: Arc<dyn NotificationSink>,
    metrics: LifecycleMetrics,
    lock: Mutex<()>,
    progress: watch::Sender<Option<InFlight>>,
    cancel: CancellationToken,
}

/// Holds the lifecycle lock and clears the published progress on drop.
struct OperationGuard<'a> {
    operation: LifecycleOperation,
    progress: &'a watch::Sender<Option<InFlight>>,
    _lock: MutexGuard<'a, ()>,
}

impl OperationGuard<'_> {
    fn set_state(&self, state: LifecycleState) {
        info!("{} -> {}", self.operation.as_str(), state.as_str());
        self.progress.send_replace(Some(InFlight {
            operation: self.operation,
            state,
        }));
    }
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.progress.send_replace(None);
    }
}

impl LifecycleOrchestrator {
    /// `cancel` is the controller's root token; cancelling it kills an
    /// in-flight provisioning run.
    pub fn new(config: &Config, host: HostServices, cancel: CancellationToken) -> Self {
        let rules = MatchRules::from_config(&config.lifecycle);
        let (progress, _) = watch::channel(None);

        Self {
            game: config.game.clone(),
            lifecycle: config.lifecycle.clone(),
            provisioning: config.provisioning.clone(),
            locator: Arc::new(ProcessLocator::new(host.table, rules, host.identity)),
            coordinator: ShutdownCoordinator::new(
                host.signaller,
                config.lifecycle.poll_interval(),
            ),
            launcher: host.launcher,
            provisioner: host.provisioner,
            notifier: host.notifier,
            metrics: LifecycleMetrics::new(),
            lock: Mutex::new(()),
            progress,
            cancel,
        }
    }

    pub fn game_config(&self) -> &GameConfig {
        &self.game
    }

    pub fn provisioning_config(&self) -> &ProvisioningConfig {
        &self.provisioning
    }

    /// Progress of the operation holding the lock, if any.
    pub fn in_flight(&self) -> Option<InFlight> {
        *self.progress.borrow()
    }

    /// Fresh scan on the blocking pool.
    pub async fn locate(&self) -> LifecycleResult<ProcessSet> {
        let locator = Arc::clone(&self.locator);
        Ok(tokio::task::spawn_blocking(move || locator.locate()).await?)
    }

    pub async fn status(&self) -> LifecycleResult<ServerStatus> {
        let set = self.locate().await?;
        Ok(ServerStatus::from_scan(&set, self.in_flight()))
    }

    /// Stop whatever is running, then start from a freshly planned launch.
    ///
    /// Restarting a stopped server is a plain start.
    pub async fn restart(&self) -> LifecycleResult<RestartReport> {
        let guard = self.begin(LifecycleOperation::Restart)?;
        let started = Instant::now();
        self.emit(LifecycleEvent::RestartStarted, "restart requested");

        let result = self.run_restart(&guard, started).await;

        match &result {
            Ok(report) => self.emit(
                LifecycleEvent::RestartCompleted,
                &format!(
                    "server restarted: previous pid {:?}, new pid {}",
                    report.previous_pid, report.new_pid
                ),
            ),
            Err(e) => self.report_failure(LifecycleOperation::Restart, e),
        }
        self.metrics
            .operation_finished("restart", result.is_ok(), started.elapsed());
        result
    }

    /// Stop the server, run the provisioning tool, then launch again.
    ///
    /// A launch is attempted even when provisioning fails; the error still
    /// reports the provisioning failure.
    pub async fn update(&self) -> LifecycleResult<UpdateReport> {
        let guard = self.begin(LifecycleOperation::Update)?;
        let started = Instant::now();
        self.emit(LifecycleEvent::UpdateStarted, "update requested");

        let result = self.run_update(&guard, started).await;

        match &result {
            Ok(report) => self.emit(
                LifecycleEvent::UpdateCompleted,
                &format!(
                    "server updated: provisioning exit code {:?}, new pid {}",
                    report.provisioning.exit_code, report.new_pid
                ),
            ),
            Err(e) => self.report_failure(LifecycleOperation::Update, e),
        }
        self.metrics
            .operation_finished("update", result.is_ok(), started.elapsed());
        result
    }

    /// Take the lifecycle lock without waiting.
    fn begin(&self, operation: LifecycleOperation) -> LifecycleResult<OperationGuard<'_>> {
        let Ok(lock) = self.lock.try_lock() else {
            let in_flight = self.in_flight().map(|progress| progress.operation.as_str());
            warn!(
                "Rejecting {}: {} already in progress",
                operation.as_str(),
                in_flight.unwrap_or("another operation")
            );
            self.metrics.busy_rejected(operation.as_str());
            return Err(LifecycleError::busy(operation.as_str(), in_flight));
        };

        let guard = OperationGuard {
            operation,
            progress: &self.progress,
            _lock: lock,
        };
        // Corrected once the first scan shows whether anything is running
        guard.set_state(LifecycleState::Stopping);
        self.metrics.operation_started(operation.as_str());
        Ok(guard)
    }

    async fn run_restart(
        &self,
        guard: &OperationGuard<'_>,
        started: Instant,
    ) -> LifecycleResult<RestartReport> {
        let set = self.locate().await?;
        let previous_pid = set.server_pid();
        let was_running = set.is_running();

        let shutdown = if set.is_empty() {
            info!("No server processes found, restart is a plain start");
            guard.set_state(LifecycleState::Starting);
            None
        } else {
            let result = self.stop(&set).await?;
            guard.set_state(LifecycleState::Starting);
            Some(result)
        };

        let (launch, new_pid) = self.launch()?;

        Ok(RestartReport {
            previous_pid,
            was_running,
            shutdown,
            launch,
            new_pid,
            elapsed: started.elapsed(),
        })
    }

    async fn run_update(
        &self,
        guard: &OperationGuard<'_>,
        started: Instant,
    ) -> LifecycleResult<UpdateReport> {
        let Some(app_id) = self.provisioning.app_id.clone() else {
            return Err(LifecycleError::configuration(
                "provisioning.app_id is not set, updates are disabled",
            ));
        };

        let set = self.locate().await?;
        let previous_pid = set.server_pid();
        let was_running = set.is_running();

        let shutdown = if set.is_empty() {
            None
        } else {
            Some(self.stop(&set).await?)
        };

        guard.set_state(LifecycleState::Updating);
        let request = ProvisionRequest {
            app_id,
            credentials: self.provisioning.credentials(),
            install_dir: self.game.install_dir.clone(),
            timeout: self.provisioning.timeout(),
        };
        let provisioning = match self
            .provisioner
            .provision(&request, self.cancel.child_token())
            .await
        {
            Ok(outcome) if outcome.cancelled => {
                // Controller is going away; leave the install alone
                return Err(LifecycleError::Cancelled {
                    stage: "provisioning",
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Provisioning tool could not be started: {e}");
                ProvisionOutcome {
                    exit_code: None,
                    output_tail: vec![e.to_string()],
                    timed_out: false,
                    cancelled: false,
                    pid: None,
                    elapsed: Duration::ZERO,
                }
            }
        };
        self.metrics.provisioning_finished(
            provisioning.exit_code,
            provisioning.timed_out,
            provisioning.elapsed,
        );

        // Always try to leave a running server behind
        guard.set_state(LifecycleState::Starting);
        let launched = self.launch();

        if provisioning.succeeded() {
            let (launch, new_pid) = launched?;
            return Ok(UpdateReport {
                previous_pid,
                was_running,
                shutdown,
                provisioning,
                launch,
                new_pid,
                elapsed: started.elapsed(),
            });
        }

        let relaunched_pid = match launched {
            Ok((_, pid)) => Some(pid),
            Err(e) => {
                error!("Relaunch after failed provisioning also failed: {e}");
                None
            }
        };

        if provisioning.timed_out {
            Err(LifecycleError::Timeout {
                stage: TimeoutStage::Provisioning,
                after: request.timeout,
                relaunched_pid,
                output_tail: provisioning.output_tail,
                location: ErrorLocation::from(Location::caller()),
            })
        } else {
            Err(LifecycleError::ProvisioningFailed {
                exit_code: provisioning.exit_code,
                output_tail: provisioning.output_tail,
                relaunched_pid,
                location: ErrorLocation::from(Location::caller()),
            })
        }
    }

    /// Shut `set` down, then rescan: the stop only counts once no server
    /// binary is left on the process table, whatever its pid.
    async fn stop(&self, set: &ProcessSet) -> LifecycleResult<ShutdownResult> {
        let result = self
            .coordinator
            .shutdown(
                set,
                self.lifecycle.graceful_timeout(),
                self.lifecycle.force_timeout(),
            )
            .await;
        self.metrics
            .shutdown_finished(result.forced, result.terminated, result.elapsed);

        if !result.terminated {
            return Err(LifecycleError::Timeout {
                stage: TimeoutStage::Shutdown,
                after: result.elapsed,
                relaunched_pid: None,
                output_tail: Vec::new(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let remaining = self.locate().await?;
        if let Some(pid) = remaining.server_pid() {
            error!("Server pid {pid} present after shutdown, refusing to continue");
            return Err(LifecycleError::Timeout {
                stage: TimeoutStage::Shutdown,
                after: result.elapsed,
                relaunched_pid: None,
                output_tail: Vec::new(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(result)
    }

    fn launch(&self) -> LifecycleResult<(LaunchSpec, u32)> {
        let spec = LaunchPlanner::plan(&self.game)?;
        let pid = self.launcher.launch(&spec)?;
        self.metrics.server_launched();
        Ok((spec, pid))
    }

    fn report_failure(&self, operation: LifecycleOperation, e: &LifecycleError) {
        error!("{} failed: {e}", operation.as_str());
        self.emit(
            LifecycleEvent::LifecycleFailed,
            &format!("{} failed [{}]: {e}", operation.as_str(), e.error_code()),
        );
    }

    fn emit(&self, event: LifecycleEvent, detail: &str) {
        if let Err(e) = self.notifier.notify(event, detail) {
            warn!("{e}");
        }
    }
}

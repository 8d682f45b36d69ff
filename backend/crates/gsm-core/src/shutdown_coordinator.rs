use crate::{
    ProcessHandle, ProcessOutcome, ProcessRole, ProcessSet, ProcessSignaller, ShutdownResult,
    ShutdownSignal, SignalDelivery, TerminationOutcome,
};

use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use tokio::time::Instant;

/// Drives a located process set through SIGTERM, then SIGKILL.
///
/// Signals go innermost-first (descendants, binary, wrapper) so the binary
/// is asked to exit before the script that might respawn it. Waiting is
/// async polling and never blocks a runtime thread.
pub struct ShutdownCoordinator {
    signaller: Arc<dyn ProcessSignaller>,
    poll_interval: Duration,
}

struct Tracked<'a> {
    handle: &'a ProcessHandle,
    already_gone: bool,
    killed: bool,
    delivery_failed: bool,
    gone: bool,
}

impl<'a> Tracked<'a> {
    fn new(handle: &'a ProcessHandle) -> Self {
        Self {
            handle,
            already_gone: false,
            killed: false,
            delivery_failed: false,
            gone: false,
        }
    }

    fn outcome(&self) -> TerminationOutcome {
        match (self.gone, self.already_gone, self.killed, self.delivery_failed) {
            (true, true, _, _) => TerminationOutcome::AlreadyGone,
            (true, false, true, _) => TerminationOutcome::Killed,
            (true, false, false, _) => TerminationOutcome::Exited,
            (false, _, _, true) => TerminationOutcome::SignalFailed,
            (false, _, _, false) => TerminationOutcome::Survived,
        }
    }
}

impl ShutdownCoordinator {
    pub fn new(signaller: Arc<dyn ProcessSignaller>, poll_interval: Duration) -> Self {
        Self {
            signaller,
            poll_interval,
        }
    }

    pub async fn shutdown(
        &self,
        set: &ProcessSet,
        graceful_timeout: Duration,
        force_timeout: Duration,
    ) -> ShutdownResult {
        if set.is_empty() {
            return ShutdownResult::nothing_to_stop();
        }

        let started = Instant::now();
        let mut tracked: Vec<Tracked<'_>> = set.shutdown_order().map(Tracked::new).collect();

        // The binary decides success; a set without one is judged as a whole
        let has_binary = set.is_running();
        let authoritative =
            move |t: &Tracked<'_>| !has_binary || t.handle.role == ProcessRole::ServerBinary;

        info!(
            "Stopping {} process(es), server pid {:?}, graceful timeout {}s",
            set.len(),
            set.server_pid(),
            graceful_timeout.as_secs()
        );
        self.signal_all(&mut tracked, ShutdownSignal::Graceful);

        let graceful_deadline = started + graceful_timeout;
        let mut forced = false;
        if self
            .wait_until(&mut tracked, graceful_deadline, authoritative)
            .await
        {
            // The remaining helpers get what is left of the graceful window
            self.wait_until(&mut tracked, graceful_deadline, |_| true)
                .await;
        } else {
            forced = true;
            warn!(
                "Server did not exit within {}s, escalating to SIGKILL",
                graceful_timeout.as_secs()
            );
        }

        if tracked.iter().any(|t| !t.gone) {
            self.signal_all(&mut tracked, ShutdownSignal::Forced);
            let force_deadline = Instant::now() + force_timeout;
            self.wait_until(&mut tracked, force_deadline, |_| true)
                .await;
        }

        let terminated = tracked.iter().filter(|t| authoritative(t)).all(|t| t.gone);
        let elapsed = started.elapsed();

        // Report in discovery order
        let outcomes = tracked
            .iter()
            .rev()
            .map(|t| ProcessOutcome {
                pid: t.handle.pid,
                role: t.handle.role,
                outcome: t.outcome(),
            })
            .collect();

        if terminated {
            info!(
                "Shutdown complete in {}ms (forced: {forced})",
                elapsed.as_millis()
            );
        } else {
            warn!(
                "Shutdown failed: server still alive {}ms after SIGKILL",
                force_timeout.as_millis()
            );
        }

        ShutdownResult {
            terminated,
            forced,
            elapsed,
            outcomes,
        }
    }

    fn signal_all(&self, tracked: &mut [Tracked<'_>], signal: ShutdownSignal) {
        for t in tracked.iter_mut().filter(|t| !t.gone) {
            match self.signaller.send(t.handle.pid, signal) {
                SignalDelivery::Delivered => {
                    if signal == ShutdownSignal::Forced {
                        t.killed = true;
                    }
                }
                SignalDelivery::AlreadyGone => {
                    t.gone = true;
                    if signal == ShutdownSignal::Graceful {
                        t.already_gone = true;
                    }
                }
                SignalDelivery::Failed(reason) => {
                    warn!(
                        "Could not send {signal:?} to {} pid {}: {reason}",
                        t.handle.role.as_str(),
                        t.handle.pid
                    );
                    t.delivery_failed = true;
                }
            }
        }
    }

    /// Poll liveness until every watched process is gone or the deadline passes.
    async fn wait_until<F>(&self, tracked: &mut [Tracked<'_>], deadline: Instant, watched: F) -> bool
    where
        F: Fn(&Tracked<'_>) -> bool,
    {
        loop {
            for t in tracked.iter_mut().filter(|t| !t.gone) {
                if !self.signaller.is_alive(t.handle.pid) {
                    t.gone = true;
                }
            }

            if tracked.iter().filter(|t| watched(t)).all(|t| t.gone) {
                return true;
            }

            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }
}

use std::time::Duration;

use metrics::{counter, gauge, histogram};

/// Metrics for lifecycle operations
#[derive(Clone)]
pub struct LifecycleMetrics {
    prefix: &'static str,
}

impl LifecycleMetrics {
    pub fn new() -> Self {
        Self {
            prefix: "gsm_lifecycle",
        }
    }

    /// Record a restart or update taking the lifecycle lock
    pub fn operation_started(&self, operation: &str) {
        counter!(format!("{}_{}_started_total", self.prefix, operation)).increment(1);
        gauge!(format!("{}_in_flight", self.prefix)).set(1.0);
    }

    /// Record the end of an operation
    pub fn operation_finished(&self, operation: &str, succeeded: bool, duration: Duration) {
        let outcome = if succeeded { "completed" } else { "failed" };
        counter!(format!("{}_{}_{}_total", self.prefix, operation, outcome)).increment(1);
        histogram!(format!("{}_{}_duration_seconds", self.prefix, operation))
            .record(duration.as_secs_f64());
        gauge!(format!("{}_in_flight", self.prefix)).set(0.0);
    }

    /// Record a request rejected because another operation holds the lock
    pub fn busy_rejected(&self, operation: &str) {
        counter!(format!("{}_busy_rejections_total", self.prefix)).increment(1);
        counter!(format!("{}_{}_busy_rejections_total", self.prefix, operation)).increment(1);
    }

    pub fn shutdown_finished(&self, forced: bool, terminated: bool, duration: Duration) {
        histogram!(format!("{}_shutdown_duration_seconds", self.prefix))
            .record(duration.as_secs_f64());
        if forced {
            counter!(format!("{}_forced_shutdowns_total", self.prefix)).increment(1);
        }
        if !terminated {
            counter!(format!("{}_shutdown_failures_total", self.prefix)).increment(1);
        }
    }

    pub fn provisioning_finished(&self, exit_code: Option<i32>, timed_out: bool, duration: Duration) {
        histogram!(format!("{}_provisioning_duration_seconds", self.prefix))
            .record(duration.as_secs_f64());
        if timed_out {
            counter!(format!("{}_provisioning_timeouts_total", self.prefix)).increment(1);
        } else if exit_code != Some(0) {
            counter!(format!("{}_provisioning_failures_total", self.prefix)).increment(1);
        }
    }

    pub fn server_launched(&self) {
        counter!(format!("{}_launches_total", self.prefix)).increment(1);
    }
}

impl Default for LifecycleMetrics {
    fn default() -> Self {
        Self::new()
    }
}

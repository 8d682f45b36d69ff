use crate::ApiErrorBody;

use gsm_core::{ProcessUsage, SystemUsage};

use chrono::{DateTime, Utc};
use serde::Serialize;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Debug, Serialize)]
pub struct ProcessMetricsDto {
    pub pid: u32,
    pub cpu_percent: f32,
    pub memory_mb: f64,
    pub memory_percent: f64,
    pub uptime_seconds: u64,
    pub uptime_formatted: String,
}

impl From<ProcessUsage> for ProcessMetricsDto {
    fn from(usage: ProcessUsage) -> Self {
        Self {
            pid: usage.pid,
            cpu_percent: usage.cpu_percent,
            memory_mb: usage.memory_bytes as f64 / BYTES_PER_MB,
            memory_percent: usage.memory_percent,
            uptime_seconds: usage.uptime.as_secs(),
            uptime_formatted: humantime::format_duration(usage.uptime).to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SystemMetricsDto {
    pub cpu_percent: f32,
    pub memory_total_gb: f64,
    pub memory_used_gb: f64,
    pub memory_percent: f64,
    pub disk_total_gb: Option<f64>,
    pub disk_used_gb: Option<f64>,
    pub disk_percent: Option<f64>,
}

impl From<SystemUsage> for SystemMetricsDto {
    fn from(usage: SystemUsage) -> Self {
        Self {
            cpu_percent: usage.cpu_percent,
            memory_total_gb: usage.memory_total_bytes as f64 / BYTES_PER_GB,
            memory_used_gb: usage.memory_used_bytes as f64 / BYTES_PER_GB,
            memory_percent: usage.memory_percent,
            disk_total_gb: usage
                .disk
                .as_ref()
                .map(|disk| disk.total_bytes as f64 / BYTES_PER_GB),
            disk_used_gb: usage
                .disk
                .as_ref()
                .map(|disk| disk.used_bytes as f64 / BYTES_PER_GB),
            disk_percent: usage.disk.as_ref().map(|disk| disk.percent),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub server_running: bool,
    pub timestamp: DateTime<Utc>,
    pub process: ProcessMetricsDto,
    pub system: SystemMetricsDto,
}

/// 404 body when there is no server binary to sample
#[derive(Debug, Serialize)]
pub struct ServerNotRunningResponse {
    pub server_running: bool,
    pub error: ApiErrorBody,
}

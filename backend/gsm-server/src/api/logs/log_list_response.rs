use gsm_core::LogFileInfo;

use chrono::{DateTime, Utc};
use serde::Serialize;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Serialize)]
pub struct LogFileDto {
    pub name: String,
    pub size_bytes: u64,
    pub size_mb: f64,
    pub modified: DateTime<Utc>,
}

impl From<LogFileInfo> for LogFileDto {
    fn from(info: LogFileInfo) -> Self {
        Self {
            size_mb: (info.size_bytes as f64 / BYTES_PER_MB * 100.0).round() / 100.0,
            name: info.name,
            size_bytes: info.size_bytes,
            modified: info.modified,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LogListResponse {
    pub logs: Vec<LogFileDto>,
}

use crate::{LifecycleError, Result as LifecycleResult};

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

const LOG_EXTENSION: &str = "log";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogFileInfo {
    pub name: String,
    pub size_bytes: u64,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogTail {
    pub filename: String,
    pub lines_returned: usize,
    pub total_lines: usize,
    pub content: String,
}

/// Read access to the game's own log files.
///
/// Only plain `*.log` names directly inside the directory are served.
#[derive(Debug, Clone)]
pub struct GameLogDirectory {
    dir: PathBuf,
}

impl GameLogDirectory {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Log files, newest first.
    pub fn list(&self) -> LifecycleResult<Vec<LogFileInfo>> {
        if !self.dir.is_dir() {
            return Err(LifecycleError::not_found(format!(
                "log directory {} does not exist",
                self.dir.display()
            )));
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            // Entries that vanish mid-listing are skipped
            let Ok(entry) = entry else { continue };
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(LOG_EXTENSION) {
                continue;
            }
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }

            files.push(LogFileInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                size_bytes: metadata.len(),
                modified: metadata
                    .modified()
                    .map(DateTime::<Utc>::from)
                    .unwrap_or_default(),
            });
        }

        files.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.name.cmp(&b.name)));
        Ok(files)
    }

    /// Last `lines` lines of one log file; `0` returns the whole file.
    pub fn tail(&self, filename: &str, lines: usize) -> LifecycleResult<LogTail> {
        let path = self.resolve(filename)?;
        let bytes = std::fs::read(&path)?;
        let text = String::from_utf8_lossy(&bytes);

        let all: Vec<&str> = text.lines().collect();
        let total_lines = all.len();
        let start = if lines == 0 {
            0
        } else {
            total_lines.saturating_sub(lines)
        };
        let selected = &all[start..];

        Ok(LogTail {
            filename: filename.to_string(),
            lines_returned: selected.len(),
            total_lines,
            content: selected.join("\n"),
        })
    }

    /// Map a client-supplied name to a file inside the directory.
    fn resolve(&self, filename: &str) -> LifecycleResult<PathBuf> {
        let not_found = || LifecycleError::not_found(format!("log file '{filename}' not found"));

        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..")
        {
            return Err(not_found());
        }

        let candidate = self.dir.join(filename);
        let (Ok(dir), Ok(resolved)) = (self.dir.canonicalize(), candidate.canonicalize()) else {
            return Err(not_found());
        };
        if !resolved.starts_with(&dir) || !resolved.is_file() {
            return Err(not_found());
        }

        Ok(resolved)
    }
}

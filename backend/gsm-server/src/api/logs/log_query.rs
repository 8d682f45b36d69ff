use serde::Deserialize;

pub const DEFAULT_TAIL_LINES: usize = 100;

/// Query for GET /api/logs/{filename}
#[derive(Debug, Default, Deserialize)]
pub struct LogQuery {
    /// Trailing lines to return; 0 returns the whole file
    pub lines: Option<usize>,
}

impl LogQuery {
    pub fn lines(&self) -> usize {
        self.lines.unwrap_or(DEFAULT_TAIL_LINES)
    }
}

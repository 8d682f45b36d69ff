use gsm_core::LogTail;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct LogContentResponse {
    pub filename: String,
    pub lines_returned: usize,
    pub total_lines: usize,
    pub content: String,
}

impl From<LogTail> for LogContentResponse {
    fn from(tail: LogTail) -> Self {
        Self {
            filename: tail.filename,
            lines_returned: tail.lines_returned,
            total_lines: tail.total_lines,
            content: tail.content,
        }
    }
}

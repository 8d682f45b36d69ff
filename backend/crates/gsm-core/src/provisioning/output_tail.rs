use std::collections::VecDeque;

/// Keeps the last `capacity` lines of a stream.
#[derive(Debug, Clone)]
pub struct OutputTail {
    lines: VecDeque<String>,
    capacity: usize,
    total: usize,
}

impl OutputTail {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
            total: 0,
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
        self.total += 1;
    }

    /// Lines seen so far, including the ones already dropped.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn to_lines(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }
}

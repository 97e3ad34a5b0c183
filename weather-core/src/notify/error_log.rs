use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{ErrorCategory, Severity};

/// Number of entries an [`ErrorLog`] keeps.
pub const ERROR_LOG_CAPACITY: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorLogEntry {
    pub timestamp: DateTime<Utc>,
    pub category: ErrorCategory,
    pub severity: Severity,
    pub message: String,
    pub detail: String,
}

/// Bounded, insertion-ordered history of classified failures.
///
/// Once full, each push drops the oldest entry.
#[derive(Debug, Clone)]
pub struct ErrorLog {
    entries: VecDeque<ErrorLogEntry>,
    capacity: usize,
}

impl Default for ErrorLog {
    fn default() -> Self {
        Self::with_capacity(ERROR_LOG_CAPACITY)
    }
}

impl ErrorLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: VecDeque::with_capacity(capacity), capacity }
    }

    pub fn push(&mut self, entry: ErrorLogEntry) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Oldest first.
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &ErrorLogEntry> + '_ {
        self.entries.iter()
    }

    /// Newest first.
    pub fn recent(&self) -> impl Iterator<Item = &ErrorLogEntry> + '_ {
        self.entries.iter().rev()
    }

    pub fn snapshot(&self) -> Vec<ErrorLogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

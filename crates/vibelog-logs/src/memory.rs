//! In-memory log of recent entries

use parking_lot::Mutex;
use std::collections::VecDeque;
use vibelog_core::LogEntry;

/// Bounded buffer of the most recent entries; a limit of 0 keeps everything
#[derive(Debug, Default)]
pub struct MemoryLog {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: VecDeque<LogEntry>,
    limit: usize,
}

impl Inner {
    fn trim(&mut self) {
        if self.limit == 0 {
            return;
        }
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
    }
}

impl MemoryLog {
    pub fn new(limit: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: VecDeque::new(),
                limit,
            }),
        }
    }

    /// Append an entry, evicting the oldest ones over the limit
    pub fn push(&self, entry: LogEntry) {
        let mut inner = self.inner.lock();
        inner.entries.push_back(entry);
        inner.trim();
    }

    /// Copy of the buffered entries, oldest first
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.inner.lock().entries.iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }

    pub fn set_limit(&self, limit: usize) {
        let mut inner = self.inner.lock();
        inner.limit = limit;
        inner.trim();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }
}

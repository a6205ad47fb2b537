//! Bounded activity log.
//!
//! Presence changes and relayed messages are appended in arrival order.
//! When the log is full the oldest entry is evicted.

use std::collections::VecDeque;

use atelier_shared::protocol::ServerEnvelope;

#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: VecDeque<ServerEnvelope>,
    capacity: usize,
}

impl ActivityLog {
    /// `capacity` が 0 の場合は 1 件だけ保持する
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn push(&mut self, entry: ServerEnvelope) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// 古い順の全エントリ
    pub fn entries(&self) -> Vec<ServerEnvelope> {
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
}

//! Bounded per-target traffic history.

use std::collections::{vec_deque, HashMap, VecDeque};

use super::entry::NetworkLogEntry;

/// Fixed-capacity ring buffer of entries in request-arrival order.
#[derive(Debug, Clone)]
pub struct TrafficLog {
    entries: VecDeque<NetworkLogEntry>,
    capacity: usize,
}

impl TrafficLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, returning the oldest one if it had to be evicted.
    pub fn push(&mut self, entry: NetworkLogEntry) -> Option<NetworkLogEntry> {
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    /// Most recent entry with this request id. Ids are unique among live
    /// entries, so scanning newest-first finds the only candidate quickly.
    pub fn find_mut(&mut self, request_id: &str) -> Option<&mut NetworkLogEntry> {
        self.entries
            .iter_mut()
            .rev()
            .find(|e| e.request_id == request_id)
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, NetworkLogEntry> {
        self.entries.iter()
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

/// One [`TrafficLog`] per target, created lazily and kept for the process lifetime.
#[derive(Debug, Default)]
pub struct HistoryStore {
    logs: HashMap<String, TrafficLog>,
    capacity: usize,
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            logs: HashMap::new(),
            capacity,
        }
    }

    /// The target's log, creating an empty one on first use.
    pub fn bucket(&mut self, target_id: &str) -> &mut TrafficLog {
        let capacity = self.capacity;
        self.logs
            .entry(target_id.to_string())
            .or_insert_with(|| TrafficLog::new(capacity))
    }

    pub fn get(&self, target_id: &str) -> Option<&TrafficLog> {
        self.logs.get(target_id)
    }

    pub fn get_mut(&mut self, target_id: &str) -> Option<&mut TrafficLog> {
        self.logs.get_mut(target_id)
    }
}

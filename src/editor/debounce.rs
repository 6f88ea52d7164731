//! Per-key quiescence timer driven by caller-supplied timestamps.

use std::collections::BTreeMap;

/// At most one pending deadline per key. Scheduling again replaces the
/// previous deadline instead of stacking a second one.
#[derive(Debug, Clone)]
pub struct Debouncer<K: Ord + Clone> {
    window_ms: u64,
    deadlines: BTreeMap<K, u64>,
}

impl<K: Ord + Clone> Debouncer<K> {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            deadlines: BTreeMap::new(),
        }
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// (Re)arm the timer for `key` at `now_ms + window`.
    pub fn schedule(&mut self, key: K, now_ms: u64) {
        let deadline = now_ms.saturating_add(self.window_ms);
        self.deadlines.insert(key, deadline);
    }

    /// Disarm `key`. Returns whether a deadline was pending.
    pub fn cancel(&mut self, key: &K) -> bool {
        self.deadlines.remove(key).is_some()
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.deadlines.contains_key(key)
    }

    /// Earliest pending deadline, for hosts that sleep until the next one.
    pub fn next_deadline(&self) -> Option<u64> {
        self.deadlines.values().min().copied()
    }

    /// Remove and return every key whose deadline is at or before `now_ms`.
    pub fn take_due(&mut self, now_ms: u64) -> Vec<K> {
        let due: Vec<K> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now_ms)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &due {
            self.deadlines.remove(key);
        }
        due
    }

    /// Remove and return every pending key, due or not.
    pub fn drain(&mut self) -> Vec<K> {
        std::mem::take(&mut self.deadlines).into_keys().collect()
    }
}

//! Deferred eviction of tracks whose UI surface went away.

use std::collections::HashMap;
use std::time::Instant;

/// One cancelable deadline per track id. Re-arming replaces the deadline.
#[derive(Debug, Default)]
pub(crate) struct OrphanTimers {
    deadlines: HashMap<String, Instant>,
}

impl OrphanTimers {
    pub fn arm(&mut self, id: &str, at: Instant) {
        self.deadlines.insert(id.to_string(), at);
    }

    pub fn cancel(&mut self, id: &str) -> bool {
        self.deadlines.remove(id).is_some()
    }

    #[cfg(test)]
    pub fn is_armed(&self, id: &str) -> bool {
        self.deadlines.contains_key(id)
    }

    /// Remove and return every id whose deadline is at or before `now`,
    /// earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<String> {
        let mut due: Vec<(Instant, String)> = self
            .deadlines
            .iter()
            .filter(|(_, at)| **at <= now)
            .map(|(id, at)| (*at, id.clone()))
            .collect();
        due.sort();
        for (_, id) in &due {
            self.deadlines.remove(id);
        }
        due.into_iter().map(|(_, id)| id).collect()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    pub fn clear(&mut self) {
        self.deadlines.clear();
    }
}

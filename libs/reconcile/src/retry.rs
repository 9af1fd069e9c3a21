//! Cross-sweep failure tracking.
//!
//! No correction is retried within a sweep; all retry happens via the next
//! scheduled sweep. This tracker remembers how many consecutive sweeps an
//! entity's correction has failed so persistent failures can be escalated in
//! the logs instead of warning forever.

use std::collections::BTreeMap;

/// Tracks consecutive per-entity correction failures across sweeps.
#[derive(Debug, Clone, Default)]
pub struct RetryTracker {
    failures: BTreeMap<String, u32>,
}

impl RetryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failed correction for an entity.
    ///
    /// Returns the consecutive failure count including this one.
    pub fn record_failure(&mut self, key: &str) -> u32 {
        let count = self.failures.entry(key.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// Consecutive failures recorded for an entity.
    pub fn consecutive(&self, key: &str) -> u32 {
        self.failures.get(key).copied().unwrap_or(0)
    }

    /// Clears tracking for an entity after a successful correction.
    pub fn clear(&mut self, key: &str) {
        self.failures.remove(key);
    }

    /// Drops entries whose entity is no longer part of the sweep, keeping
    /// the tracker bounded by the live entity set.
    pub fn retain<F>(&mut self, live: F)
    where
        F: Fn(&str) -> bool,
    {
        self.failures.retain(|key, _| live(key));
    }
}

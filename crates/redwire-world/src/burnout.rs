//! Per-position state-change history for redstone torches.
//!
//! Block values are rewritten on every state change, so the history that
//! drives torch burnout cannot live in the block itself. The registry keeps it
//! keyed by position for as long as the torch exists; the torch removes its
//! entry when broken.
//!
//! Locking is two-level: the map mutex guards insert/remove only, and each
//! entry has its own mutex for reading and appending history.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::pos::Pos;

/// Recent state changes of one torch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BurnoutData {
    /// Absolute tick numbers at which each recorded change expires.
    state_changes: Vec<u64>,
    pub burned_out: bool,
    /// Tick at which the torch burned out.
    pub burnout_tick: u64,
}

impl BurnoutData {
    /// Record a state change at `now` that stays relevant for `window` ticks.
    pub fn record(&mut self, now: u64, window: u64) {
        self.state_changes.push(now + window);
    }

    /// Number of recorded changes that have not expired at `now`.
    pub fn active(&self, now: u64) -> usize {
        self.state_changes.iter().filter(|&&t| t > now).count()
    }

    /// Drop expired changes.
    pub fn prune(&mut self, now: u64) {
        self.state_changes.retain(|&t| t > now);
    }

    pub fn burn_out(&mut self, now: u64) {
        self.burned_out = true;
        self.burnout_tick = now;
    }

    pub fn recover(&mut self) {
        self.burned_out = false;
    }
}

/// Shared handle to one entry.
pub type BurnoutEntry = Arc<Mutex<BurnoutData>>;

/// Position-keyed burnout history, owned by the world.
#[derive(Debug, Default)]
pub struct BurnoutRegistry {
    entries: Mutex<HashMap<Pos, BurnoutEntry>>,
}

impl BurnoutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> MutexGuard<'_, HashMap<Pos, BurnoutEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the entry for `pos`, creating an empty one on first use.
    pub fn entry(&self, pos: Pos) -> BurnoutEntry {
        self.map().entry(pos).or_default().clone()
    }

    /// Get the entry for `pos` without creating it.
    pub fn get(&self, pos: Pos) -> Option<BurnoutEntry> {
        self.map().get(&pos).cloned()
    }

    /// Remove the entry for `pos`. Returns whether one existed.
    pub fn remove(&self, pos: Pos) -> bool {
        self.map().remove(&pos).is_some()
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.map().contains_key(&pos)
    }

    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map().is_empty()
    }
}

/// Lock a single entry, ignoring poisoning: the data is plain history and
/// stays consistent even if a holder panicked.
pub fn lock_entry(entry: &BurnoutEntry) -> MutexGuard<'_, BurnoutData> {
    entry.lock().unwrap_or_else(PoisonError::into_inner)
}

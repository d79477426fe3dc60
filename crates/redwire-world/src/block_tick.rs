//! Scheduled block tick queue.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};
use std::time::Duration;

use crate::pos::Pos;

/// Length of one game tick (20 ticks per second).
pub const TICK_DURATION: Duration = Duration::from_millis(50);

/// Convert a delay to whole game ticks. Anything shorter than one tick still
/// waits for the next tick.
pub fn duration_to_ticks(delay: Duration) -> u64 {
    let ticks = (delay.as_millis() / TICK_DURATION.as_millis()) as u64;
    ticks.max(1)
}

/// A block tick scheduled for a future game tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTick {
    pub pos: Pos,
    /// Name of the block that requested the tick. The tick is dropped if a
    /// different kind of block occupies `pos` when it fires.
    pub block: &'static str,
    pub target_tick: u64,
    /// Insertion order, so ticks due on the same game tick fire FIFO.
    seq: u64,
}

impl Ord for ScheduledTick {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.target_tick
            .cmp(&other.target_tick)
            .then(self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for ScheduledTick {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority queue for scheduled block ticks.
#[derive(Debug, Default)]
pub struct TickScheduler {
    queue: BinaryHeap<Reverse<ScheduledTick>>,
    pending: HashSet<Pos>,
    next_seq: u64,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a tick at `pos` to fire `delay` ticks after `current_tick`.
    /// Returns `false` if a tick is already pending for the position.
    pub fn schedule(
        &mut self,
        pos: Pos,
        block: &'static str,
        delay: u64,
        current_tick: u64,
    ) -> bool {
        if !self.pending.insert(pos) {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(ScheduledTick {
            pos,
            block,
            target_tick: current_tick + delay,
            seq,
        }));
        true
    }

    /// Drain all ticks whose target_tick <= current_tick.
    pub fn drain_ready(&mut self, current_tick: u64) -> Vec<ScheduledTick> {
        let mut ready = Vec::new();
        while let Some(Reverse(tick)) = self.queue.peek() {
            if tick.target_tick > current_tick {
                break;
            }
            if let Some(Reverse(tick)) = self.queue.pop() {
                self.pending.remove(&tick.pos);
                ready.push(tick);
            }
        }
        ready
    }

    /// Check whether a tick is already scheduled for a position.
    pub fn is_scheduled(&self, pos: Pos) -> bool {
        self.pending.contains(&pos)
    }

    /// Target tick of the pending tick at `pos`, if any.
    pub fn target_of(&self, pos: Pos) -> Option<u64> {
        self.queue
            .iter()
            .find(|Reverse(t)| t.pos == pos)
            .map(|Reverse(t)| t.target_tick)
    }

    /// Number of pending ticks.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

//! The block store contract and an in-memory world implementing it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::trace;

use crate::block::{Air, Block, BlockRef, SetOpts, Sound};
use crate::block_tick::{duration_to_ticks, TickScheduler};
use crate::burnout::BurnoutRegistry;
use crate::pos::{Face, Pos, FACES};

/// Read/write access to the blocks of a world during one tick.
///
/// Writes are immediately visible to subsequent reads.
pub trait BlockStore {
    /// The block at `pos`. Unset cells are air.
    fn block(&self, pos: Pos) -> BlockRef;

    fn set_block(&mut self, pos: Pos, block: BlockRef, opts: SetOpts);

    /// Ask for `block`'s [`ScheduledTicker`](crate::block::ScheduledTicker)
    /// to run at `pos` after `delay`.
    fn schedule_block_update(&mut self, pos: Pos, block: &dyn Block, delay: Duration);

    /// Power arriving at a block from the emitter at `pos`, where `face` is
    /// the querying block's face pointing at `pos`.
    ///
    /// With `include_dust = false` redstone dust contributes nothing, which
    /// lets dust query its surroundings without seeing itself.
    fn redstone_power(&self, pos: Pos, face: Face, include_dust: bool) -> u8;

    fn play_sound(&mut self, pos: Pos, sound: Sound);

    fn current_tick(&self) -> u64;

    fn torch_burnout(&self) -> &BurnoutRegistry;
}

/// Write `block` at `pos` and run its placement hook.
pub fn place_block(store: &mut dyn BlockStore, pos: Pos, block: BlockRef) {
    store.set_block(pos, block.clone(), SetOpts::default());
    block.on_placed(pos, store);
}

/// Replace the block at `pos` with air and run the old block's break hook.
/// Returns the removed block.
pub fn break_block(store: &mut dyn BlockStore, pos: Pos) -> BlockRef {
    let old = store.block(pos);
    store.set_block(pos, Arc::new(Air), SetOpts::default());
    old.on_broken(pos, store);
    old
}

/// Standard power query shared by store implementations: the conductor's own
/// weak power, plus, for opaque full blocks, the strongest power any of its
/// neighbours pushes into it.
pub fn conducted_power(store: &dyn BlockStore, pos: Pos, face: Face, include_dust: bool) -> u8 {
    let block = store.block(pos);
    let mut power = block
        .as_conductor()
        .map_or(0, |c| c.weak_power(pos, face, store, include_dust));

    if block.light_diffusion_level() == Some(0) || !block.is_solid() {
        return power;
    }
    for f in FACES {
        let side = pos.side(f);
        let neighbour = store.block(side);
        if let Some(c) = neighbour.as_conductor() {
            power = power.max(c.strong_power(side, f, store, include_dust));
        }
    }
    power
}

/// In-memory world: sparse block map, tick scheduler, change and sound logs.
pub struct World {
    blocks: HashMap<Pos, BlockRef>,
    air: BlockRef,
    scheduler: TickScheduler,
    current_tick: u64,
    burnout: BurnoutRegistry,
    changes: Vec<(Pos, BlockRef)>,
    sounds: Vec<(Pos, Sound)>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            blocks: HashMap::new(),
            air: Arc::new(Air),
            scheduler: TickScheduler::new(),
            current_tick: 0,
            burnout: BurnoutRegistry::new(),
            changes: Vec::new(),
            sounds: Vec::new(),
        }
    }

    /// Advance one game tick and run every scheduled tick that is now due.
    /// Returns the number of ticks dispatched.
    pub fn tick(&mut self) -> usize {
        self.current_tick += 1;
        let ready = self.scheduler.drain_ready(self.current_tick);
        let mut dispatched = 0;
        for st in ready {
            let block = self.block(st.pos);
            if block.name() != st.block {
                trace!(pos = %st.pos, expected = st.block, found = block.name(), "dropping stale tick");
                continue;
            }
            if let Some(ticker) = block.as_scheduled_ticker() {
                ticker.scheduled_tick(st.pos, self);
                dispatched += 1;
            }
        }
        dispatched
    }

    /// Run `n` game ticks.
    pub fn run_ticks(&mut self, n: u64) {
        for _ in 0..n {
            self.tick();
        }
    }

    /// Take the log of block writes made since the last call.
    pub fn drain_changes(&mut self) -> Vec<(Pos, BlockRef)> {
        std::mem::take(&mut self.changes)
    }

    /// Take the log of sounds played since the last call.
    pub fn drain_sounds(&mut self) -> Vec<(Pos, Sound)> {
        std::mem::take(&mut self.sounds)
    }

    pub fn is_scheduled(&self, pos: Pos) -> bool {
        self.scheduler.is_scheduled(pos)
    }

    /// Tick at which the pending scheduled tick at `pos` fires.
    pub fn scheduled_at(&self, pos: Pos) -> Option<u64> {
        self.scheduler.target_of(pos)
    }

    pub fn pending_ticks(&self) -> usize {
        self.scheduler.len()
    }

    /// Number of non-air cells.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Fill the box between two corners (inclusive) with `block`, without
    /// running any hooks.
    pub fn fill(&mut self, from: Pos, to: Pos, block: BlockRef) {
        for x in from.x.min(to.x)..=from.x.max(to.x) {
            for y in from.y.min(to.y)..=from.y.max(to.y) {
                for z in from.z.min(to.z)..=from.z.max(to.z) {
                    self.blocks.insert(Pos::new(x, y, z), block.clone());
                }
            }
        }
    }
}

impl BlockStore for World {
    fn block(&self, pos: Pos) -> BlockRef {
        self.blocks.get(&pos).unwrap_or(&self.air).clone()
    }

    fn set_block(&mut self, pos: Pos, block: BlockRef, opts: SetOpts) {
        if block.is_air() {
            self.blocks.remove(&pos);
        } else {
            self.blocks.insert(pos, block.clone());
        }
        self.changes.push((pos, block));

        if opts.disable_block_updates {
            return;
        }
        for face in FACES {
            let side = pos.side(face);
            let neighbour = self.block(side);
            if let Some(u) = neighbour.as_neighbour_updater() {
                u.neighbour_update(side, pos, self);
            }
        }
    }

    fn schedule_block_update(&mut self, pos: Pos, block: &dyn Block, delay: Duration) {
        let ticks = duration_to_ticks(delay);
        if self
            .scheduler
            .schedule(pos, block.name(), ticks, self.current_tick)
        {
            trace!(%pos, block = block.name(), ticks, "scheduled block update");
        }
    }

    fn redstone_power(&self, pos: Pos, face: Face, include_dust: bool) -> u8 {
        conducted_power(self, pos, face, include_dust)
    }

    fn play_sound(&mut self, pos: Pos, sound: Sound) {
        self.sounds.push((pos, sound));
    }

    fn current_tick(&self) -> u64 {
        self.current_tick
    }

    fn torch_burnout(&self) -> &BurnoutRegistry {
        &self.burnout
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::block::{Conductor, Glass, NeighbourUpdater, ScheduledTicker, Stone};

    /// Emits a fixed weak and strong power on every face.
    #[derive(Debug)]
    struct Emitter {
        weak: u8,
        strong: u8,
    }

    impl Block for Emitter {
        fn name(&self) -> &'static str {
            "test:emitter"
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_conductor(&self) -> Option<&dyn Conductor> {
            Some(self)
        }
    }

    impl Conductor for Emitter {
        fn source(&self) -> bool {
            true
        }
        fn weak_power(&self, _: Pos, _: Face, _: &dyn BlockStore, _: bool) -> u8 {
            self.weak
        }
        fn strong_power(&self, _: Pos, _: Face, _: &dyn BlockStore, _: bool) -> u8 {
            self.strong
        }
    }

    static TICKS: AtomicUsize = AtomicUsize::new(0);
    static NEIGHBOUR_UPDATES: AtomicUsize = AtomicUsize::new(0);

    #[derive(Debug)]
    struct Counter;

    impl Block for Counter {
        fn name(&self) -> &'static str {
            "test:counter"
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_scheduled_ticker(&self) -> Option<&dyn ScheduledTicker> {
            Some(self)
        }
        fn as_neighbour_updater(&self) -> Option<&dyn NeighbourUpdater> {
            Some(self)
        }
    }

    impl ScheduledTicker for Counter {
        fn scheduled_tick(&self, _: Pos, _: &mut dyn BlockStore) {
            TICKS.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl NeighbourUpdater for Counter {
        fn neighbour_update(&self, _: Pos, _: Pos, _: &mut dyn BlockStore) {
            NEIGHBOUR_UPDATES.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn unset_cells_are_air() {
        let w = World::new();
        assert!(w.block(Pos::new(100, -5, 3)).is_air());
        assert!(w.is_empty());
    }

    #[test]
    fn writes_are_logged_and_air_clears() {
        let mut w = World::new();
        let p = Pos::new(0, 0, 0);
        w.set_block(p, Arc::new(Stone), SetOpts::default());
        assert!(w.block(p).is::<Stone>());
        assert_eq!(w.len(), 1);
        w.set_block(p, Arc::new(Air), SetOpts::default());
        assert!(w.is_empty());
        assert_eq!(w.drain_changes().len(), 2);
        assert!(w.drain_changes().is_empty());
    }

    #[test]
    fn solid_block_conducts_strong_power_only() {
        let mut w = World::new();
        let stone = Pos::new(0, 0, 0);
        w.set_block(stone, Arc::new(Stone), SetOpts::NO_UPDATES);
        w.set_block(
            Pos::new(1, 0, 0),
            Arc::new(Emitter { weak: 15, strong: 0 }),
            SetOpts::NO_UPDATES,
        );
        assert_eq!(w.redstone_power(stone, Face::Up, true), 0);

        w.set_block(
            Pos::new(1, 0, 0),
            Arc::new(Emitter { weak: 15, strong: 9 }),
            SetOpts::NO_UPDATES,
        );
        assert_eq!(w.redstone_power(stone, Face::Up, true), 9);
    }

    #[test]
    fn transparent_blocks_do_not_conduct() {
        let mut w = World::new();
        let glass = Pos::new(0, 0, 0);
        w.set_block(glass, Arc::new(Glass), SetOpts::NO_UPDATES);
        w.set_block(
            Pos::new(0, 1, 0),
            Arc::new(Emitter { weak: 15, strong: 15 }),
            SetOpts::NO_UPDATES,
        );
        assert_eq!(w.redstone_power(glass, Face::East, true), 0);
        // The emitter itself is still seen directly.
        assert_eq!(w.redstone_power(Pos::new(0, 1, 0), Face::Up, true), 15);
    }

    #[test]
    fn scheduled_tick_fires_after_delay_and_skips_replaced_blocks() {
        let mut w = World::new();
        let p = Pos::new(3, 3, 3);
        w.set_block(p, Arc::new(Counter), SetOpts::NO_UPDATES);
        let before = TICKS.load(Ordering::SeqCst);
        w.schedule_block_update(p, &Counter, Duration::from_millis(100));
        assert_eq!(w.scheduled_at(p), Some(2));
        w.tick();
        assert_eq!(TICKS.load(Ordering::SeqCst), before);
        assert_eq!(w.tick(), 1);
        assert!(TICKS.load(Ordering::SeqCst) > before);

        w.schedule_block_update(p, &Counter, Duration::from_millis(50));
        w.set_block(p, Arc::new(Stone), SetOpts::NO_UPDATES);
        assert_eq!(w.tick(), 0);
        assert_eq!(w.pending_ticks(), 0);
    }

    #[test]
    fn neighbour_updates_respect_opts() {
        let mut w = World::new();
        let c = Pos::new(0, 1, 0);
        w.set_block(c, Arc::new(Counter), SetOpts::NO_UPDATES);
        let before = NEIGHBOUR_UPDATES.load(Ordering::SeqCst);
        w.set_block(Pos::new(0, 0, 0), Arc::new(Stone), SetOpts::NO_UPDATES);
        assert_eq!(NEIGHBOUR_UPDATES.load(Ordering::SeqCst), before);
        w.set_block(Pos::new(0, 0, 0), Arc::new(Glass), SetOpts::default());
        assert!(NEIGHBOUR_UPDATES.load(Ordering::SeqCst) > before);
    }
}

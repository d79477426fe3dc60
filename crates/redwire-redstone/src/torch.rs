//! Redstone torch with burnout protection.
//!
//! A torch inverts the signal of the block it is attached to. Every state
//! change is recorded in the world's burnout registry; a torch that changes
//! state too often within [`BURNOUT_WINDOW_TICKS`] burns out and ignores its
//! input until the history has drained.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use redwire_world::burnout::lock_entry;
use redwire_world::{
    break_block, Block, BlockStore, Conductor, Face, NeighbourUpdater, Pos, RedstoneUpdater,
    ScheduledTicker, SetOpts, Sound,
};

use crate::power::update_directional_redstone;
use crate::repeater::REDSTONE_TICK;
use crate::wire::MAX_POWER;

/// Delay between an input change and the torch following it.
pub const TORCH_DELAY: Duration = REDSTONE_TICK;

/// Ticks a recorded state change counts towards burnout.
pub const BURNOUT_WINDOW_TICKS: u64 = 60;

/// Torches burn out on the first change beyond this many in the window.
pub const BURNOUT_THRESHOLD: usize = 8;

/// `facing` points from the torch to the block it is attached to; standing
/// torches face down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedstoneTorch {
    pub facing: Face,
    pub lit: bool,
}

impl Default for RedstoneTorch {
    fn default() -> Self {
        Self {
            facing: Face::Down,
            lit: true,
        }
    }
}

impl RedstoneTorch {
    pub fn new(facing: Face) -> Self {
        Self { facing, lit: true }
    }

    /// Power the attachment block receives. A torch is lit exactly when this
    /// is zero.
    pub fn input_power(&self, pos: Pos, store: &dyn BlockStore) -> u8 {
        store.redstone_power(pos.side(self.facing), self.facing, true)
    }

    fn with_lit(self, lit: bool) -> Self {
        Self { lit, ..self }
    }

    /// Write this state and notify around the torch and the block above it.
    fn apply(&self, pos: Pos, store: &mut dyn BlockStore) {
        store.set_block(pos, Arc::new(*self), SetOpts::default());
        update_directional_redstone(pos, store, Face::Up);
    }
}

impl Block for RedstoneTorch {
    fn name(&self) -> &'static str {
        "minecraft:redstone_torch"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_conductor(&self) -> Option<&dyn Conductor> {
        Some(self)
    }

    fn as_redstone_updater(&self) -> Option<&dyn RedstoneUpdater> {
        Some(self)
    }

    fn as_scheduled_ticker(&self) -> Option<&dyn ScheduledTicker> {
        Some(self)
    }

    fn as_neighbour_updater(&self) -> Option<&dyn NeighbourUpdater> {
        Some(self)
    }

    fn on_placed(&self, pos: Pos, store: &mut dyn BlockStore) {
        store.torch_burnout().entry(pos);
        let lit = self.input_power(pos, &*store) == 0;
        if lit != self.lit {
            self.with_lit(lit).apply(pos, store);
        } else {
            update_directional_redstone(pos, store, Face::Up);
        }
    }

    fn on_broken(&self, pos: Pos, store: &mut dyn BlockStore) {
        store.torch_burnout().remove(pos);
        update_directional_redstone(pos, store, Face::Up);
    }
}

impl Conductor for RedstoneTorch {
    fn source(&self) -> bool {
        true
    }

    fn weak_power(&self, _: Pos, face: Face, _: &dyn BlockStore, _: bool) -> u8 {
        // Nothing flows back into the attachment block.
        if self.lit && face != self.facing.opposite() {
            MAX_POWER
        } else {
            0
        }
    }

    fn strong_power(&self, _: Pos, face: Face, _: &dyn BlockStore, _: bool) -> u8 {
        if self.lit && face == Face::Down {
            MAX_POWER
        } else {
            0
        }
    }
}

impl RedstoneUpdater for RedstoneTorch {
    fn redstone_update(&self, pos: Pos, store: &mut dyn BlockStore) {
        let now = store.current_tick();
        let input = self.input_power(pos, &*store) > 0;
        let entry = store.torch_burnout().entry(pos);

        let recovered = {
            let mut data = lock_entry(&entry);
            if data.burned_out {
                data.prune(now);
                if data.active(now) >= BURNOUT_THRESHOLD {
                    return;
                }
                data.recover();
                true
            } else {
                false
            }
        };
        if recovered {
            debug!(%pos, tick = now, "redstone torch recovered from burnout");
            self.with_lit(!input).apply(pos, store);
            return;
        }

        if input != self.lit {
            return;
        }
        store.schedule_block_update(pos, self, TORCH_DELAY);
    }
}

impl ScheduledTicker for RedstoneTorch {
    fn scheduled_tick(&self, pos: Pos, store: &mut dyn BlockStore) {
        let now = store.current_tick();
        let input = self.input_power(pos, &*store) > 0;
        if input != self.lit {
            return;
        }
        let entry = store.torch_burnout().entry(pos);

        let burned_out = {
            let mut data = lock_entry(&entry);
            if data.burned_out {
                return;
            }
            data.record(now, BURNOUT_WINDOW_TICKS);
            if data.active(now) > BURNOUT_THRESHOLD {
                data.burn_out(now);
                true
            } else {
                data.prune(now);
                false
            }
        };

        if burned_out {
            debug!(%pos, tick = now, "redstone torch burned out");
            store.play_sound(pos, Sound::Fizz);
            self.with_lit(false).apply(pos, store);
            return;
        }
        trace!(%pos, lit = !self.lit, "redstone torch toggled");
        self.with_lit(!self.lit).apply(pos, store);
    }
}

impl NeighbourUpdater for RedstoneTorch {
    fn neighbour_update(&self, pos: Pos, _changed: Pos, store: &mut dyn BlockStore) {
        if !store.block(pos.side(self.facing)).is_solid() {
            break_block(store, pos);
        }
    }
}

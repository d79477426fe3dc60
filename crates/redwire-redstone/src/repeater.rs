//! Redstone repeater: a one-way delay line that refreshes the signal to full
//! strength.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use tracing::trace;

use redwire_world::{
    break_block, Activatable, Block, BlockStore, Conductor, Direction, Face, NeighbourUpdater,
    Pos, RedstoneUpdater, ScheduledTicker, SetOpts,
};

use crate::comparator::RedstoneComparator;
use crate::power::update_gate_redstone;
use crate::wire::MAX_POWER;

/// Length of one redstone tick.
pub const REDSTONE_TICK: Duration = Duration::from_millis(100);

/// Highest delay setting; the delay is `delay + 1` redstone ticks.
pub const MAX_DELAY: u8 = 3;

/// `facing` points from the repeater towards its input. The output is the
/// cell on the opposite side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedstoneRepeater {
    pub facing: Direction,
    pub delay: u8,
    pub powered: bool,
}

impl RedstoneRepeater {
    pub fn new(facing: Direction, delay: u8) -> Self {
        Self {
            facing,
            delay: delay.min(MAX_DELAY),
            powered: false,
        }
    }

    /// Time between an input change and the output following it.
    pub fn delay_duration(&self) -> Duration {
        REDSTONE_TICK * (u32::from(self.delay) + 1)
    }

    /// Signal arriving at the back of the repeater.
    pub fn input_power(&self, pos: Pos, store: &dyn BlockStore) -> u8 {
        let face = self.facing.face();
        store.redstone_power(pos.side(face), face, true)
    }

    /// Whether a powered diode on either side points into this repeater.
    pub fn locked(&self, pos: Pos, store: &dyn BlockStore) -> bool {
        [self.facing.rotate_left(), self.facing.rotate_right()]
            .into_iter()
            .any(|dir| {
                let side = store.block(pos.side(dir.face()));
                if let Some(r) = side.downcast_ref::<RedstoneRepeater>() {
                    return r.powered && r.facing == dir;
                }
                if let Some(c) = side.downcast_ref::<RedstoneComparator>() {
                    return c.powered && c.facing == dir;
                }
                false
            })
    }

    fn write(&self, pos: Pos, store: &mut dyn BlockStore) {
        store.set_block(pos, Arc::new(*self), SetOpts::default());
    }
}

impl Block for RedstoneRepeater {
    fn name(&self) -> &'static str {
        "minecraft:repeater"
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

    fn as_activatable(&self) -> Option<&dyn Activatable> {
        Some(self)
    }

    fn on_placed(&self, pos: Pos, store: &mut dyn BlockStore) {
        self.redstone_update(pos, store);
    }

    fn on_broken(&self, pos: Pos, store: &mut dyn BlockStore) {
        if self.powered {
            update_gate_redstone(pos, store, self.facing.face());
        }
    }
}

impl Conductor for RedstoneRepeater {
    fn source(&self) -> bool {
        false
    }

    fn weak_power(&self, _: Pos, face: Face, _: &dyn BlockStore, _: bool) -> u8 {
        if self.powered && face == self.facing.face() {
            MAX_POWER
        } else {
            0
        }
    }

    fn strong_power(&self, pos: Pos, face: Face, store: &dyn BlockStore, include_dust: bool) -> u8 {
        self.weak_power(pos, face, store, include_dust)
    }
}

impl RedstoneUpdater for RedstoneRepeater {
    fn redstone_update(&self, pos: Pos, store: &mut dyn BlockStore) {
        if self.locked(pos, &*store) {
            return;
        }
        if (self.input_power(pos, &*store) > 0) != self.powered {
            store.schedule_block_update(pos, self, self.delay_duration());
        }
    }
}

impl ScheduledTicker for RedstoneRepeater {
    fn scheduled_tick(&self, pos: Pos, store: &mut dyn BlockStore) {
        if self.locked(pos, &*store) {
            return;
        }
        let input = self.input_power(pos, &*store) > 0;
        if self.powered && input {
            return;
        }
        let next = RedstoneRepeater {
            powered: !self.powered,
            ..*self
        };
        trace!(%pos, powered = next.powered, "repeater switched");
        next.write(pos, store);
        update_gate_redstone(pos, store, self.facing.face());
        update_gate_redstone(pos, store, self.facing.opposite().face());

        if next.powered && !input {
            // Hold the pulse for at least one full delay.
            store.schedule_block_update(pos, &next, next.delay_duration());
        }
    }
}

impl NeighbourUpdater for RedstoneRepeater {
    fn neighbour_update(&self, pos: Pos, _changed: Pos, store: &mut dyn BlockStore) {
        if !store.block(pos.side(Face::Down)).is_solid() {
            break_block(store, pos);
        }
    }
}

impl Activatable for RedstoneRepeater {
    fn activate(&self, pos: Pos, store: &mut dyn BlockStore) -> bool {
        let next = RedstoneRepeater {
            delay: (self.delay + 1) % (MAX_DELAY + 1),
            ..*self
        };
        next.write(pos, store);
        true
    }
}

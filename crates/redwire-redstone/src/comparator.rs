//! Redstone comparator.

use std::any::Any;
use std::sync::Arc;

use tracing::trace;

use redwire_world::{
    break_block, Activatable, Block, BlockStore, Conductor, Direction, Face, NeighbourUpdater,
    Pos, RedstoneUpdater, ScheduledTicker, SetOpts, Sound,
};

use crate::power::update_gate_redstone;
use crate::repeater::{RedstoneRepeater, REDSTONE_TICK};
use crate::wire::{dust_power, RedstoneWire};

/// Compares the rear signal with the strongest side signal.
///
/// In compare mode the rear signal passes through unless a side is stronger.
/// In subtract mode the output is the rear signal minus the side signal.
/// `facing` points from the comparator towards its rear input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedstoneComparator {
    pub facing: Direction,
    pub subtract: bool,
    pub powered: bool,
    pub power: u8,
}

impl RedstoneComparator {
    pub fn new(facing: Direction, subtract: bool) -> Self {
        Self {
            facing,
            subtract,
            powered: false,
            power: 0,
        }
    }

    pub fn rear_power(&self, pos: Pos, store: &dyn BlockStore) -> u8 {
        let face = self.facing.face();
        store.redstone_power(pos.side(face), face, true)
    }

    /// Strongest signal entering from the left or right.
    pub fn side_power(&self, pos: Pos, store: &dyn BlockStore) -> u8 {
        [self.facing.rotate_left(), self.facing.rotate_right()]
            .into_iter()
            .map(|dir| side_input(pos.side(dir.face()), dir.face(), store))
            .max()
            .unwrap_or(0)
    }

    /// Output the comparator should settle on with its current inputs.
    pub fn output(&self, pos: Pos, store: &dyn BlockStore) -> u8 {
        let rear = self.rear_power(pos, store);
        let side = self.side_power(pos, store);
        if self.subtract {
            rear.saturating_sub(side)
        } else if rear >= side {
            rear
        } else {
            0
        }
    }

    fn write(&self, pos: Pos, store: &mut dyn BlockStore) {
        store.set_block(pos, Arc::new(*self), SetOpts::default());
    }
}

/// Power a side input contributes: dust by level, diodes only through their
/// output, other sources directly.
fn side_input(pos: Pos, face: Face, store: &dyn BlockStore) -> u8 {
    let block = store.block(pos);
    if block.is::<RedstoneWire>() {
        return dust_power(&*block);
    }
    let Some(conductor) = block.as_conductor() else {
        return 0;
    };
    if block.is::<RedstoneRepeater>() || block.is::<RedstoneComparator>() {
        return conductor.strong_power(pos, face, store, true);
    }
    if !conductor.source() {
        return 0;
    }
    if block.is_solid() {
        conductor.weak_power(pos, face, store, true)
    } else {
        conductor.strong_power(pos, face, store, true)
    }
}

impl Block for RedstoneComparator {
    fn name(&self) -> &'static str {
        "minecraft:comparator"
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
        if self.power > 0 {
            update_gate_redstone(pos, store, self.facing.face());
        }
    }
}

impl Conductor for RedstoneComparator {
    fn source(&self) -> bool {
        false
    }

    fn weak_power(&self, _: Pos, face: Face, _: &dyn BlockStore, _: bool) -> u8 {
        if face == self.facing.face() {
            self.power
        } else {
            0
        }
    }

    fn strong_power(&self, pos: Pos, face: Face, store: &dyn BlockStore, include_dust: bool) -> u8 {
        self.weak_power(pos, face, store, include_dust)
    }
}

impl RedstoneUpdater for RedstoneComparator {
    fn redstone_update(&self, pos: Pos, store: &mut dyn BlockStore) {
        if self.output(pos, &*store) != self.power {
            store.schedule_block_update(pos, self, REDSTONE_TICK);
        }
    }
}

impl ScheduledTicker for RedstoneComparator {
    fn scheduled_tick(&self, pos: Pos, store: &mut dyn BlockStore) {
        let power = self.output(pos, &*store);
        if power == self.power {
            return;
        }
        let next = RedstoneComparator {
            power,
            powered: power > 0,
            ..*self
        };
        trace!(%pos, power, "comparator output changed");
        next.write(pos, store);
        update_gate_redstone(pos, store, self.facing.face());
        update_gate_redstone(pos, store, self.facing.opposite().face());
    }
}

impl NeighbourUpdater for RedstoneComparator {
    fn neighbour_update(&self, pos: Pos, _changed: Pos, store: &mut dyn BlockStore) {
        if !store.block(pos.side(Face::Down)).is_solid() {
            break_block(store, pos);
        }
    }
}

impl Activatable for RedstoneComparator {
    fn activate(&self, pos: Pos, store: &mut dyn BlockStore) -> bool {
        let next = RedstoneComparator {
            subtract: !self.subtract,
            ..*self
        };
        next.write(pos, store);
        store.play_sound(
            pos,
            if next.subtract {
                Sound::PowerOn
            } else {
                Sound::PowerOff
            },
        );
        next.redstone_update(pos, store);
        true
    }
}

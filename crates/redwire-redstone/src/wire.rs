//! Redstone dust.

use std::any::Any;

use redwire_world::{
    break_block, Block, BlockStore, Conductor, Face, NeighbourUpdater, Pos, RedstoneUpdater, FACES,
    HORIZONTAL_FACES,
};

use crate::comparator::RedstoneComparator;
use crate::network::{update_strong_redstone, update_wire_power};
use crate::repeater::RedstoneRepeater;

/// Highest signal strength.
pub const MAX_POWER: u8 = 15;

/// Redstone dust carrying a signal of 0..=15.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedstoneWire {
    pub power: u8,
}

impl RedstoneWire {
    pub fn new(power: u8) -> Self {
        Self {
            power: power.min(MAX_POWER),
        }
    }

    /// Whether the dust points towards `face`, directly, up over a solid
    /// block or down a step.
    pub fn connection(pos: Pos, face: Face, store: &dyn BlockStore) -> bool {
        let side_pos = pos.side(face);
        let side = store.block(side_pos);
        if connects_to(&*side, face, true) {
            return true;
        }
        if side.is_solid() {
            let above_free = !store.block(pos.side(Face::Up)).is_solid();
            above_free
                && lets_dust_climb(&*side)
                && connects_to(&*store.block(side_pos.side(Face::Up)), face, false)
        } else {
            connects_to(&*store.block(side_pos.side(Face::Down)), face, false)
        }
    }
}

/// Signal level of `block` if it is dust, 0 otherwise.
pub(crate) fn dust_power(block: &dyn Block) -> u8 {
    block
        .downcast_ref::<RedstoneWire>()
        .map_or(0, |wire| wire.power)
}

/// Whether dust may run up the side of `block`. Solid blocks that let all
/// light through (glass) only carry the signal downwards.
pub(crate) fn lets_dust_climb(block: &dyn Block) -> bool {
    block.light_diffusion_level().map_or(true, |level| level > 0)
}

/// Whether dust next to `block` visually connects to it across `face`.
fn connects_to(block: &dyn Block, face: Face, allow_direct_sources: bool) -> bool {
    if block.is::<RedstoneWire>() {
        return true;
    }
    if let Some(repeater) = block.downcast_ref::<RedstoneRepeater>() {
        return repeater.facing.face().axis() == face.axis();
    }
    if let Some(comparator) = block.downcast_ref::<RedstoneComparator>() {
        return comparator.facing.face().axis() == face.axis();
    }
    allow_direct_sources && block.as_conductor().is_some_and(|c| c.source())
}

/// Power the dust at `pos` would carry given its current surroundings.
pub fn calculate_power(pos: Pos, store: &dyn BlockStore) -> u8 {
    let mut wire_power = 0;
    for face in FACES {
        wire_power = wire_power.max(store.redstone_power(pos.side(face), face, false));
    }
    if wire_power >= MAX_POWER {
        return MAX_POWER;
    }

    let above_solid = store.block(pos.side(Face::Up)).is_solid();
    let mut block_power = 0;
    for face in HORIZONTAL_FACES {
        let side_pos = pos.side(face);
        let side = store.block(side_pos);
        block_power = block_power.max(dust_power(&*side));
        if !side.is_solid() {
            block_power = block_power.max(dust_power(&*store.block(side_pos.side(Face::Down))));
        } else if lets_dust_climb(&*side) && !above_solid {
            block_power = block_power.max(dust_power(&*store.block(side_pos.side(Face::Up))));
        }
    }
    wire_power.max(block_power.saturating_sub(1))
}

impl Block for RedstoneWire {
    fn name(&self) -> &'static str {
        "minecraft:redstone_wire"
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

    fn as_neighbour_updater(&self) -> Option<&dyn NeighbourUpdater> {
        Some(self)
    }

    fn on_placed(&self, pos: Pos, store: &mut dyn BlockStore) {
        let power = calculate_power(pos, &*store);
        update_wire_power(pos, RedstoneWire { power }, store);
    }

    fn on_broken(&self, pos: Pos, store: &mut dyn BlockStore) {
        update_strong_redstone(pos, store);
    }
}

impl Conductor for RedstoneWire {
    fn source(&self) -> bool {
        false
    }

    fn weak_power(&self, pos: Pos, face: Face, store: &dyn BlockStore, include_dust: bool) -> u8 {
        if !include_dust {
            return 0;
        }
        match face {
            Face::Up => return self.power,
            Face::Down => return 0,
            _ => {}
        }
        // The querier sits behind face.opposite().
        if Self::connection(pos, face.opposite(), store) {
            return self.power;
        }
        // Straight runs and unconnected dots power whatever is in front.
        if Self::connection(pos, face.rotate_left(), store)
            || Self::connection(pos, face.rotate_right(), store)
        {
            return 0;
        }
        self.power
    }

    fn strong_power(&self, pos: Pos, face: Face, store: &dyn BlockStore, include_dust: bool) -> u8 {
        self.weak_power(pos, face, store, include_dust)
    }
}

impl RedstoneUpdater for RedstoneWire {
    fn redstone_update(&self, pos: Pos, store: &mut dyn BlockStore) {
        let power = calculate_power(pos, &*store);
        if power != self.power {
            update_wire_power(pos, RedstoneWire { power }, store);
        }
    }
}

impl NeighbourUpdater for RedstoneWire {
    fn neighbour_update(&self, pos: Pos, _changed: Pos, store: &mut dyn BlockStore) {
        if !store.block(pos.side(Face::Down)).is_solid() {
            break_block(store, pos);
            return;
        }
        self.redstone_update(pos, store);
    }
}

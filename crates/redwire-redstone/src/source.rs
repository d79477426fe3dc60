//! Blocks that produce a signal on their own: the redstone block, levers and
//! buttons.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use redwire_world::{
    break_block, Activatable, Block, BlockStore, Conductor, Face, NeighbourUpdater, Pos,
    ScheduledTicker, SetOpts, Sound,
};

use crate::power::{update_around_redstone, update_directional_redstone};
use crate::wire::MAX_POWER;

/// How long a stone button stays pressed.
pub const BUTTON_PRESS_DURATION: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// Redstone block
// ---------------------------------------------------------------------------

/// Solid block emitting full weak power on every face.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedstoneBlock;

impl Block for RedstoneBlock {
    fn name(&self) -> &'static str {
        "minecraft:redstone_block"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn is_solid(&self) -> bool {
        true
    }

    fn as_conductor(&self) -> Option<&dyn Conductor> {
        Some(self)
    }

    fn on_placed(&self, pos: Pos, store: &mut dyn BlockStore) {
        update_around_redstone(pos, store, &[]);
    }

    fn on_broken(&self, pos: Pos, store: &mut dyn BlockStore) {
        update_around_redstone(pos, store, &[]);
    }
}

impl Conductor for RedstoneBlock {
    fn source(&self) -> bool {
        true
    }

    fn weak_power(&self, _: Pos, _: Face, _: &dyn BlockStore, _: bool) -> u8 {
        MAX_POWER
    }

    fn strong_power(&self, _: Pos, _: Face, _: &dyn BlockStore, _: bool) -> u8 {
        0
    }
}

// ---------------------------------------------------------------------------
// Attached switches
// ---------------------------------------------------------------------------

/// Switches weakly power every side while on.
fn switch_weak_power(on: bool) -> u8 {
    if on {
        MAX_POWER
    } else {
        0
    }
}

/// Switches strongly power only the block they are attached to.
fn switch_strong_power(on: bool, attach: Face, face: Face) -> u8 {
    if on && face == attach.opposite() {
        MAX_POWER
    } else {
        0
    }
}

/// Break an attached block whose support is gone. Returns whether it broke.
fn break_if_unsupported(pos: Pos, attach: Face, store: &mut dyn BlockStore) -> bool {
    if store.block(pos.side(attach)).is_solid() {
        return false;
    }
    break_block(store, pos);
    true
}

/// A toggle switch. `attach` points from the lever to the block it hangs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lever {
    pub attach: Face,
    pub powered: bool,
}

impl Default for Lever {
    fn default() -> Self {
        Self {
            attach: Face::Down,
            powered: false,
        }
    }
}

impl Lever {
    pub fn new(attach: Face) -> Self {
        Self {
            attach,
            powered: false,
        }
    }
}

impl Block for Lever {
    fn name(&self) -> &'static str {
        "minecraft:lever"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_conductor(&self) -> Option<&dyn Conductor> {
        Some(self)
    }

    fn as_activatable(&self) -> Option<&dyn Activatable> {
        Some(self)
    }

    fn as_neighbour_updater(&self) -> Option<&dyn NeighbourUpdater> {
        Some(self)
    }

    fn on_placed(&self, pos: Pos, store: &mut dyn BlockStore) {
        if self.powered {
            update_directional_redstone(pos, store, self.attach);
        }
    }

    fn on_broken(&self, pos: Pos, store: &mut dyn BlockStore) {
        if self.powered {
            update_directional_redstone(pos, store, self.attach);
        }
    }
}

impl Conductor for Lever {
    fn source(&self) -> bool {
        true
    }

    fn weak_power(&self, _: Pos, _: Face, _: &dyn BlockStore, _: bool) -> u8 {
        switch_weak_power(self.powered)
    }

    fn strong_power(&self, _: Pos, face: Face, _: &dyn BlockStore, _: bool) -> u8 {
        switch_strong_power(self.powered, self.attach, face)
    }
}

impl Activatable for Lever {
    fn activate(&self, pos: Pos, store: &mut dyn BlockStore) -> bool {
        let next = Lever {
            powered: !self.powered,
            ..*self
        };
        debug!(%pos, powered = next.powered, "lever toggled");
        store.set_block(pos, Arc::new(next), SetOpts::default());
        store.play_sound(
            pos,
            if next.powered {
                Sound::PowerOn
            } else {
                Sound::PowerOff
            },
        );
        update_directional_redstone(pos, store, self.attach);
        true
    }
}

impl NeighbourUpdater for Lever {
    fn neighbour_update(&self, pos: Pos, _changed: Pos, store: &mut dyn BlockStore) {
        break_if_unsupported(pos, self.attach, store);
    }
}

/// A push button that releases itself after [`BUTTON_PRESS_DURATION`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoneButton {
    pub attach: Face,
    pub pressed: bool,
}

impl Default for StoneButton {
    fn default() -> Self {
        Self {
            attach: Face::Down,
            pressed: false,
        }
    }
}

impl StoneButton {
    pub fn new(attach: Face) -> Self {
        Self {
            attach,
            pressed: false,
        }
    }
}

impl Block for StoneButton {
    fn name(&self) -> &'static str {
        "minecraft:stone_button"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_conductor(&self) -> Option<&dyn Conductor> {
        Some(self)
    }

    fn as_activatable(&self) -> Option<&dyn Activatable> {
        Some(self)
    }

    fn as_scheduled_ticker(&self) -> Option<&dyn ScheduledTicker> {
        Some(self)
    }

    fn as_neighbour_updater(&self) -> Option<&dyn NeighbourUpdater> {
        Some(self)
    }

    fn on_broken(&self, pos: Pos, store: &mut dyn BlockStore) {
        if self.pressed {
            update_directional_redstone(pos, store, self.attach);
        }
    }
}

impl Conductor for StoneButton {
    fn source(&self) -> bool {
        true
    }

    fn weak_power(&self, _: Pos, _: Face, _: &dyn BlockStore, _: bool) -> u8 {
        switch_weak_power(self.pressed)
    }

    fn strong_power(&self, _: Pos, face: Face, _: &dyn BlockStore, _: bool) -> u8 {
        switch_strong_power(self.pressed, self.attach, face)
    }
}

impl Activatable for StoneButton {
    fn activate(&self, pos: Pos, store: &mut dyn BlockStore) -> bool {
        if self.pressed {
            return true;
        }
        let pressed = StoneButton {
            pressed: true,
            ..*self
        };
        store.set_block(pos, Arc::new(pressed), SetOpts::default());
        store.play_sound(pos, Sound::PowerOn);
        update_directional_redstone(pos, store, self.attach);
        store.schedule_block_update(pos, &pressed, BUTTON_PRESS_DURATION);
        true
    }
}

impl ScheduledTicker for StoneButton {
    fn scheduled_tick(&self, pos: Pos, store: &mut dyn BlockStore) {
        if !self.pressed {
            return;
        }
        let released = StoneButton {
            pressed: false,
            ..*self
        };
        store.set_block(pos, Arc::new(released), SetOpts::default());
        store.play_sound(pos, Sound::PowerOff);
        update_directional_redstone(pos, store, self.attach);
    }
}

impl NeighbourUpdater for StoneButton {
    fn neighbour_update(&self, pos: Pos, _changed: Pos, store: &mut dyn BlockStore) {
        break_if_unsupported(pos, self.attach, store);
    }
}

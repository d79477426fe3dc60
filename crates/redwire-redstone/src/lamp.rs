//! Redstone lamp.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use redwire_world::{Block, BlockStore, Pos, RedstoneUpdater, ScheduledTicker, SetOpts};

use crate::power::received_redstone_power;

/// How long a lamp keeps shining after losing power.
pub const LAMP_OFF_DELAY: Duration = Duration::from_millis(200);

/// Solid block that lights up while powered. Turning on is immediate,
/// turning off waits [`LAMP_OFF_DELAY`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedstoneLamp {
    pub lit: bool,
}

impl RedstoneLamp {
    fn set_lit(pos: Pos, lit: bool, store: &mut dyn BlockStore) {
        store.set_block(pos, Arc::new(RedstoneLamp { lit }), SetOpts::NO_UPDATES);
    }
}

impl Block for RedstoneLamp {
    fn name(&self) -> &'static str {
        "minecraft:redstone_lamp"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn is_solid(&self) -> bool {
        true
    }

    fn as_redstone_updater(&self) -> Option<&dyn RedstoneUpdater> {
        Some(self)
    }

    fn as_scheduled_ticker(&self) -> Option<&dyn ScheduledTicker> {
        Some(self)
    }

    fn on_placed(&self, pos: Pos, store: &mut dyn BlockStore) {
        self.redstone_update(pos, store);
    }
}

impl RedstoneUpdater for RedstoneLamp {
    fn redstone_update(&self, pos: Pos, store: &mut dyn BlockStore) {
        let powered = received_redstone_power(pos, &*store, &[]);
        if powered && !self.lit {
            Self::set_lit(pos, true, store);
        } else if !powered && self.lit {
            store.schedule_block_update(pos, self, LAMP_OFF_DELAY);
        }
    }
}

impl ScheduledTicker for RedstoneLamp {
    fn scheduled_tick(&self, pos: Pos, store: &mut dyn BlockStore) {
        if self.lit && !received_redstone_power(pos, &*store, &[]) {
            Self::set_lit(pos, false, store);
        }
    }
}

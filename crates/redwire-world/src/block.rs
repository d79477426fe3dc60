//! Block contract and capability traits.
//!
//! Blocks are immutable values shared as `Arc<dyn Block>`. A state change is
//! expressed by writing a new value into the store at the same position.
//! Optional behaviour is exposed through `as_*` capability accessors, and the
//! concrete type can be recovered with [`downcast_ref`](trait.Block.html#method.downcast_ref).

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::pos::{Face, Pos};
use crate::store::BlockStore;

/// Shared handle to a block value.
pub type BlockRef = Arc<dyn Block>;

/// A value occupying one cell of the world.
pub trait Block: Any + fmt::Debug + Send + Sync {
    /// Namespaced identifier, e.g. `"minecraft:stone"`. Two values with the
    /// same name are the same kind of block in different states.
    fn name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    /// Whether the block has a full solid model. Solid blocks conduct strong
    /// power and let dust climb over them.
    fn is_solid(&self) -> bool {
        false
    }

    /// Light diffusion level, `None` for blocks that do not diffuse light.
    fn light_diffusion_level(&self) -> Option<u8> {
        None
    }

    fn as_conductor(&self) -> Option<&dyn Conductor> {
        None
    }

    fn as_redstone_updater(&self) -> Option<&dyn RedstoneUpdater> {
        None
    }

    fn as_scheduled_ticker(&self) -> Option<&dyn ScheduledTicker> {
        None
    }

    fn as_neighbour_updater(&self) -> Option<&dyn NeighbourUpdater> {
        None
    }

    fn as_activatable(&self) -> Option<&dyn Activatable> {
        None
    }

    /// Called after the block has been written to `pos` by [`place_block`](crate::store::place_block).
    fn on_placed(&self, _pos: Pos, _store: &mut dyn BlockStore) {}

    /// Called after the block has been removed from `pos` by [`break_block`](crate::store::break_block).
    fn on_broken(&self, _pos: Pos, _store: &mut dyn BlockStore) {}
}

impl dyn Block {
    pub fn downcast_ref<T: Block>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn is<T: Block>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Whether the block is air.
    pub fn is_air(&self) -> bool {
        self.is::<Air>()
    }
}

/// A block that emits redstone power.
///
/// `face` is always the face of the querying block that points at the
/// emitter, i.e. the querier sits at `pos.side(face.opposite())`.
pub trait Conductor {
    /// Whether the block produces power on its own (levers, torches, ...).
    fn source(&self) -> bool;

    fn weak_power(&self, pos: Pos, face: Face, store: &dyn BlockStore, include_dust: bool) -> u8;

    fn strong_power(&self, pos: Pos, face: Face, store: &dyn BlockStore, include_dust: bool)
        -> u8;
}

/// A block that reacts when the redstone signal around it may have changed.
pub trait RedstoneUpdater {
    fn redstone_update(&self, pos: Pos, store: &mut dyn BlockStore);
}

/// A block that can receive a deferred tick registered with
/// [`BlockStore::schedule_block_update`].
pub trait ScheduledTicker {
    fn scheduled_tick(&self, pos: Pos, store: &mut dyn BlockStore);
}

/// A block that reacts to a neighbouring cell being rewritten.
pub trait NeighbourUpdater {
    fn neighbour_update(&self, pos: Pos, changed: Pos, store: &mut dyn BlockStore);
}

/// A block a player can interact with.
pub trait Activatable {
    /// Returns `true` if the activation was consumed.
    fn activate(&self, pos: Pos, store: &mut dyn BlockStore) -> bool;
}

/// Options for [`BlockStore::set_block`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOpts {
    /// Do not run neighbour updates for this write.
    pub disable_block_updates: bool,
}

impl SetOpts {
    pub const NO_UPDATES: SetOpts = SetOpts {
        disable_block_updates: true,
    };
}

/// Sounds emitted by blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    /// A torch burning out.
    Fizz,
    PowerOn,
    PowerOff,
}

// ---------------------------------------------------------------------------
// Basic blocks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Air;

impl Block for Air {
    fn name(&self) -> &'static str {
        "minecraft:air"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Plain opaque full block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stone;

impl Block for Stone {
    fn name(&self) -> &'static str {
        "minecraft:stone"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn is_solid(&self) -> bool {
        true
    }
}

/// Solid but fully light-transparent: does not conduct strong power.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Glass;

impl Block for Glass {
    fn name(&self) -> &'static str {
        "minecraft:glass"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn is_solid(&self) -> bool {
        true
    }

    fn light_diffusion_level(&self) -> Option<u8> {
        Some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downcast_through_trait_object() {
        let b: BlockRef = Arc::new(Stone);
        assert!(b.is::<Stone>());
        assert!(!b.is_air());
        assert_eq!(b.downcast_ref::<Stone>(), Some(&Stone));
        assert!(b.downcast_ref::<Glass>().is_none());
    }

    #[test]
    fn conductor_classification() {
        assert!(Stone.is_solid());
        assert!(Glass.is_solid());
        assert_eq!(Glass.light_diffusion_level(), Some(0));
        assert_eq!(Stone.light_diffusion_level(), None);
        assert!(!Air.is_solid());
        assert!(Stone.as_conductor().is_none());
    }
}

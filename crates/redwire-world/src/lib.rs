//! World model for the redstone engine: positions, the block contract, the
//! block store and its scheduled ticks.

pub mod block;
pub mod block_tick;
pub mod burnout;
pub mod pos;
pub mod store;

pub use block::{
    Activatable, Air, Block, BlockRef, Conductor, Glass, NeighbourUpdater, RedstoneUpdater,
    ScheduledTicker, SetOpts, Sound, Stone,
};
pub use burnout::{BurnoutData, BurnoutRegistry};
pub use pos::{Axis, Direction, Face, Pos, FACES, HORIZONTAL_FACES};
pub use store::{break_block, place_block, BlockStore, World};

//! Redstone signal propagation: the dust network walker, the power helpers
//! shared by components, and the redstone blocks themselves.

pub mod comparator;
pub mod lamp;
pub mod network;
pub mod power;
pub mod repeater;
pub mod source;
pub mod torch;
pub mod wire;

pub use comparator::RedstoneComparator;
pub use lamp::RedstoneLamp;
pub use network::{update_strong_redstone, WalkStats};
pub use power::{
    received_redstone_power, update_around_redstone, update_directional_redstone,
    update_gate_redstone,
};
pub use repeater::RedstoneRepeater;
pub use source::{Lever, RedstoneBlock, StoneButton};
pub use torch::RedstoneTorch;
pub use wire::{RedstoneWire, MAX_POWER};

//! JSON circuit layouts.
//!
//! A layout lists box fills (written without hooks, for floors and walls),
//! then blocks placed one by one in file order with their placement hooks,
//! then actions keyed by game tick.

use std::sync::Arc;

use serde::Deserialize;

use redwire_redstone::{
    Lever, RedstoneBlock, RedstoneComparator, RedstoneLamp, RedstoneRepeater, RedstoneTorch,
    RedstoneWire, StoneButton, MAX_POWER,
};
use redwire_world::{place_block, BlockRef, Direction, Face, Glass, Pos, Stone, World};

use crate::error::{read_file, SimError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaceSpec {
    Down,
    Up,
    North,
    South,
    West,
    East,
}

impl From<FaceSpec> for Face {
    fn from(f: FaceSpec) -> Self {
        match f {
            FaceSpec::Down => Face::Down,
            FaceSpec::Up => Face::Up,
            FaceSpec::North => Face::North,
            FaceSpec::South => Face::South,
            FaceSpec::West => Face::West,
            FaceSpec::East => Face::East,
        }
    }
}

fn default_attach() -> FaceSpec {
    FaceSpec::Down
}

/// A block as written in a layout file, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockSpec {
    Stone,
    Glass,
    RedstoneBlock,
    RedstoneLamp,
    RedstoneWire {
        #[serde(default)]
        power: u8,
    },
    Lever {
        #[serde(default = "default_attach")]
        attach: FaceSpec,
        #[serde(default)]
        powered: bool,
    },
    StoneButton {
        #[serde(default = "default_attach")]
        attach: FaceSpec,
    },
    RedstoneTorch {
        #[serde(default = "default_attach")]
        facing: FaceSpec,
    },
    Repeater {
        facing: FaceSpec,
        #[serde(default)]
        delay: u8,
    },
    Comparator {
        facing: FaceSpec,
        #[serde(default)]
        subtract: bool,
    },
}

impl BlockSpec {
    /// Build the block value for `pos`, rejecting states the engine cannot
    /// represent.
    pub fn build(&self, pos: Pos) -> Result<BlockRef, SimError> {
        let invalid = |reason: String| SimError::InvalidBlock { pos, reason };
        let horizontal = |f: FaceSpec| -> Result<Direction, SimError> {
            Face::from(f)
                .direction()
                .ok_or_else(|| invalid(format!("diode facing must be horizontal, got {f:?}")))
        };

        let block: BlockRef = match *self {
            BlockSpec::Stone => Arc::new(Stone),
            BlockSpec::Glass => Arc::new(Glass),
            BlockSpec::RedstoneBlock => Arc::new(RedstoneBlock),
            BlockSpec::RedstoneLamp => Arc::new(RedstoneLamp::default()),
            BlockSpec::RedstoneWire { power } => {
                if power > MAX_POWER {
                    return Err(invalid(format!("dust power {power} above {MAX_POWER}")));
                }
                Arc::new(RedstoneWire::new(power))
            }
            BlockSpec::Lever { attach, powered } => Arc::new(Lever {
                attach: attach.into(),
                powered,
            }),
            BlockSpec::StoneButton { attach } => Arc::new(StoneButton::new(attach.into())),
            BlockSpec::RedstoneTorch { facing } => {
                if facing == FaceSpec::Up {
                    return Err(invalid("torches cannot hang from a ceiling".into()));
                }
                Arc::new(RedstoneTorch::new(facing.into()))
            }
            BlockSpec::Repeater { facing, delay } => {
                if delay > redwire_redstone::repeater::MAX_DELAY {
                    return Err(invalid(format!("repeater delay {delay} out of range 0..=3")));
                }
                Arc::new(RedstoneRepeater::new(horizontal(facing)?, delay))
            }
            BlockSpec::Comparator { facing, subtract } => {
                Arc::new(RedstoneComparator::new(horizontal(facing)?, subtract))
            }
        };
        Ok(block)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Fill {
    pub from: [i32; 3],
    pub to: [i32; 3],
    pub block: BlockSpec,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockEntry {
    pub pos: [i32; 3],
    pub block: BlockSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Use the block like a player would (levers, buttons, diodes).
    Activate,
    Break,
    Place(BlockSpec),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Action {
    pub tick: u64,
    pub pos: [i32; 3],
    pub kind: ActionKind,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Layout {
    #[serde(default)]
    pub fills: Vec<Fill>,
    #[serde(default)]
    pub blocks: Vec<BlockEntry>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl Layout {
    pub fn load(path: &str) -> Result<Self, SimError> {
        Self::from_json(&read_file(path)?)
    }

    pub fn from_json(contents: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Write the layout's fills and blocks into `world`.
    pub fn build(&self, world: &mut World) -> Result<(), SimError> {
        for fill in &self.fills {
            let block = fill.block.build(Pos::from(fill.from))?;
            world.fill(Pos::from(fill.from), Pos::from(fill.to), block);
        }
        for entry in &self.blocks {
            let pos = Pos::from(entry.pos);
            place_block(world, pos, entry.block.build(pos)?);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use redwire_world::BlockStore;

    use super::*;

    #[test]
    fn parse_layout() {
        let json = r#"{
            "fills": [
                { "from": [0, -1, 0], "to": [3, -1, 0], "block": { "type": "stone" } }
            ],
            "blocks": [
                { "pos": [0, 0, 0], "block": { "type": "lever", "powered": true } },
                { "pos": [1, 0, 0], "block": { "type": "redstone_wire" } },
                { "pos": [2, 0, 0], "block": { "type": "repeater", "facing": "west", "delay": 2 } }
            ],
            "actions": [
                { "tick": 5, "pos": [0, 0, 0], "kind": "activate" },
                { "tick": 9, "pos": [3, 0, 0], "kind": { "place": { "type": "redstone_lamp" } } }
            ]
        }"#;
        let layout = Layout::from_json(json).unwrap();
        assert_eq!(layout.fills.len(), 1);
        assert_eq!(
            layout.blocks[0].block,
            BlockSpec::Lever {
                attach: FaceSpec::Down,
                powered: true
            }
        );
        assert_eq!(layout.blocks[1].block, BlockSpec::RedstoneWire { power: 0 });
        assert_eq!(layout.actions[0].kind, ActionKind::Activate);
        assert_eq!(layout.actions[1].kind, ActionKind::Place(BlockSpec::RedstoneLamp));

        let mut world = World::new();
        layout.build(&mut world).unwrap();
        assert!(world.block(Pos::new(3, -1, 0)).is::<Stone>());
        // The powered lever fed the dust when it was placed.
        let dust = world.block(Pos::new(1, 0, 0));
        assert_eq!(dust.downcast_ref::<RedstoneWire>().map(|w| w.power), Some(15));
    }

    #[test]
    fn unknown_block_type_is_a_layout_error() {
        let json = r#"{ "blocks": [ { "pos": [0, 0, 0], "block": { "type": "piston" } } ] }"#;
        assert!(matches!(Layout::from_json(json), Err(SimError::Layout(_))));
    }

    #[test]
    fn out_of_range_states_are_rejected() {
        let pos = Pos::new(1, 2, 3);
        let bad = [
            BlockSpec::Repeater {
                facing: FaceSpec::North,
                delay: 4,
            },
            BlockSpec::Repeater {
                facing: FaceSpec::Up,
                delay: 0,
            },
            BlockSpec::Comparator {
                facing: FaceSpec::Down,
                subtract: false,
            },
            BlockSpec::RedstoneWire { power: 16 },
            BlockSpec::RedstoneTorch {
                facing: FaceSpec::Up,
            },
        ];
        for spec in bad {
            match spec.build(pos) {
                Err(SimError::InvalidBlock { pos: p, .. }) => assert_eq!(p, pos),
                other => panic!("{spec:?} built: {other:?}"),
            }
        }
    }

    #[test]
    fn wall_torch_faces_its_support() {
        let block = BlockSpec::RedstoneTorch {
            facing: FaceSpec::West,
        }
        .build(Pos::new(0, 0, 0))
        .unwrap();
        assert_eq!(
            block.downcast_ref::<RedstoneTorch>().map(|t| t.facing),
            Some(Face::West)
        );
    }
}

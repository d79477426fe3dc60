//! Incremental redstone dust propagation.
//!
//! A change to one dust block spreads through a graph of [`WireNode`]s that is
//! discovered on demand around the changed position. Every node knows its 24
//! nearest cells in a canonical order relative to the direction the signal
//! is travelling, and nodes are processed breadth first in layers, so two
//! paths reaching the same dust block always see its neighbours in the same
//! order and agree on the result.
//!
//! Dust values are cached in the nodes for the whole walk. Store writes are
//! coalesced: dirty dust is committed right before any other block is
//! notified, and once more when the walk finishes.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use redwire_world::{Block, BlockRef, BlockStore, Pos, SetOpts, FACES};

use crate::wire::{dust_power, lets_dust_climb, RedstoneWire, MAX_POWER};

/// Index of a node in the network arena.
pub type NodeId = usize;

const NEIGHBOUR_COUNT: usize = 24;

// Headings.
const NORTH: usize = 0;
const EAST: usize = 1;
const SOUTH: usize = 2;
const WEST: usize = 3;

/// Permutations from raw neighbour order (see [`compute_redstone_neighbours`])
/// to canonical order, one row per heading:
///
/// - 0..4: down, up, down-down, up-up
/// - 4..8: the horizontal neighbours left, forward, right, back
/// - 8..16: (below, above) pairs for those four horizontals
/// - 16..24: the outer ring
pub const REORDERING: [[usize; NEIGHBOUR_COUNT]; 4] = [
    [2, 3, 16, 19, 0, 4, 1, 5, 7, 8, 17, 20, 12, 13, 18, 21, 6, 9, 22, 14, 11, 10, 23, 15],
    [2, 3, 16, 19, 4, 1, 5, 0, 17, 20, 12, 13, 18, 21, 7, 8, 22, 14, 11, 15, 23, 9, 6, 10],
    [2, 3, 16, 19, 1, 5, 0, 4, 12, 13, 18, 21, 7, 8, 17, 20, 11, 15, 23, 10, 6, 14, 22, 9],
    [2, 3, 16, 19, 5, 0, 4, 1, 18, 21, 7, 8, 17, 20, 12, 13, 23, 10, 6, 9, 22, 15, 11, 14],
];

/// Canonical slot of the cell above the node.
const SLOT_UP: usize = 1;
/// Canonical slots of the horizontal neighbours.
const RS_NEIGHBOURS: [usize; 4] = [4, 5, 6, 7];
/// Canonical slots of the cells above the horizontal neighbours.
const RS_NEIGHBOURS_UP: [usize; 4] = [9, 11, 13, 15];
/// Canonical slots of the cells below the horizontal neighbours.
const RS_NEIGHBOURS_DN: [usize; 4] = [8, 10, 12, 14];

/// The 24 cells a dust change can affect, in raw order: the 6 direct
/// neighbours (west, east, down, up, north, south), then the cells one more
/// step away from each of them, without duplicates.
pub fn compute_redstone_neighbours(pos: Pos) -> [Pos; NEIGHBOUR_COUNT] {
    let Pos { x, y, z } = pos;
    [
        Pos::new(x - 1, y, z),
        Pos::new(x + 1, y, z),
        Pos::new(x, y - 1, z),
        Pos::new(x, y + 1, z),
        Pos::new(x, y, z - 1),
        Pos::new(x, y, z + 1),
        Pos::new(x - 2, y, z),
        Pos::new(x - 1, y - 1, z),
        Pos::new(x - 1, y + 1, z),
        Pos::new(x - 1, y, z - 1),
        Pos::new(x - 1, y, z + 1),
        Pos::new(x + 2, y, z),
        Pos::new(x + 1, y - 1, z),
        Pos::new(x + 1, y + 1, z),
        Pos::new(x + 1, y, z - 1),
        Pos::new(x + 1, y, z + 1),
        Pos::new(x, y - 2, z),
        Pos::new(x, y - 1, z - 1),
        Pos::new(x, y - 1, z + 1),
        Pos::new(x, y + 2, z),
        Pos::new(x, y + 1, z - 1),
        Pos::new(x, y + 1, z + 1),
        Pos::new(x, y, z - 2),
        Pos::new(x, y, z + 2),
    ]
}

/// Resolve a bias vector (each component in -1..=1) to a heading. Ties are
/// broken towards a fixed direction so the walk is deterministic.
pub fn compute_redstone_heading(rx: i32, rz: i32) -> usize {
    let code = (rx + 1) + 3 * (rz + 1);
    match code {
        0 | 1 => NORTH,
        2 | 5 => EAST,
        3 | 4 => WEST,
        6..=8 => SOUTH,
        _ => unreachable!("redstone heading code {code} out of range for bias ({rx}, {rz})"),
    }
}

#[derive(Debug)]
struct WireNode {
    pos: Pos,
    /// Snapshot of the block, read once per walk.
    block: BlockRef,
    visited: bool,
    /// `block` holds a dust value not yet written to the store.
    dirty: bool,
    oriented: bool,
    neighbours: [NodeId; NEIGHBOUR_COUNT],
    x_bias: i32,
    z_bias: i32,
    layer: u32,
}

impl WireNode {
    fn new(pos: Pos, block: BlockRef) -> Self {
        Self {
            pos,
            block,
            visited: false,
            dirty: false,
            oriented: false,
            neighbours: [0; NEIGHBOUR_COUNT],
            x_bias: 0,
            z_bias: 0,
            layer: 0,
        }
    }

    fn wire(&self) -> Option<RedstoneWire> {
        self.block.downcast_ref::<RedstoneWire>().copied()
    }
}

/// Counters for one walk, reported through `tracing`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WalkStats {
    pub nodes: usize,
    pub layers: u32,
    pub recomputed: usize,
    pub writes: usize,
    pub notified: usize,
}

/// One propagation cycle. Created per update and dropped afterwards.
#[derive(Debug, Default)]
pub(crate) struct WireNetwork {
    nodes: Vec<WireNode>,
    node_cache: HashMap<Pos, NodeId>,
    /// This layer, next layer, layer after next.
    update_queue: [Vec<NodeId>; 3],
    current_walk_layer: u32,
    pending: Vec<NodeId>,
    stats: WalkStats,
}

impl WireNetwork {
    fn new() -> Self {
        Self::default()
    }

    /// Seed the network with the node whose block just changed.
    fn insert_root(&mut self, pos: Pos, block: BlockRef, dirty: bool) -> NodeId {
        let id = self.nodes.len();
        let mut root = WireNode::new(pos, block);
        root.visited = true;
        self.nodes.push(root);
        self.node_cache.insert(pos, id);
        if dirty {
            self.mark_dirty(id);
        }
        id
    }

    /// Fetch the node at `pos`, reading its block from the store on first use.
    fn node(&mut self, pos: Pos, store: &dyn BlockStore) -> NodeId {
        if let Some(&id) = self.node_cache.get(&pos) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(WireNode::new(pos, store.block(pos)));
        self.node_cache.insert(pos, id);
        id
    }

    fn mark_dirty(&mut self, id: NodeId) {
        let node = &mut self.nodes[id];
        if !node.dirty {
            node.dirty = true;
            self.pending.push(id);
        }
    }

    /// Create the node's neighbours and put them in canonical order for the
    /// direction the signal arrives from.
    fn identify_neighbours(&mut self, id: NodeId, store: &dyn BlockStore) {
        let positions = compute_redstone_neighbours(self.nodes[id].pos);
        let mut found = [0; NEIGHBOUR_COUNT];
        let mut visited = [false; NEIGHBOUR_COUNT];
        for (i, pos) in positions.into_iter().enumerate() {
            let n = self.node(pos, store);
            found[i] = n;
            visited[i] = self.nodes[n].visited;
        }

        let from_west = visited[0] || visited[7] || visited[8];
        let from_east = visited[1] || visited[12] || visited[13];
        let from_north = visited[4] || visited[17] || visited[20];
        let from_south = visited[5] || visited[18] || visited[21];

        let mut cx = 0;
        let mut cz = 0;
        if from_west {
            cx += 1;
        }
        if from_east {
            cx -= 1;
        }
        if from_north {
            cz += 1;
        }
        if from_south {
            cz -= 1;
        }

        let (x_bias, z_bias) = (self.nodes[id].x_bias, self.nodes[id].z_bias);
        let heading = if cx == 0 && cz == 0 {
            for &n in &found {
                self.nodes[n].x_bias = x_bias;
                self.nodes[n].z_bias = z_bias;
            }
            compute_redstone_heading(x_bias, z_bias)
        } else {
            if cx != 0 && cz != 0 {
                // Signal arrives diagonally: keep the axis we were already
                // travelling along.
                if x_bias != 0 {
                    cz = 0;
                }
                if z_bias != 0 {
                    cx = 0;
                }
            }
            for &n in &found {
                self.nodes[n].x_bias = cx;
                self.nodes[n].z_bias = cz;
            }
            compute_redstone_heading(cx, cz)
        };

        let node = &mut self.nodes[id];
        for (slot, &raw) in REORDERING[heading].iter().enumerate() {
            node.neighbours[slot] = found[raw];
        }
        node.oriented = true;
    }

    /// Schedule the neighbours of a changed node: all 24 for the next layer,
    /// and the first four canonical ones once more for the layer after.
    fn propagate_changes(&mut self, id: NodeId, layer: u32, store: &dyn BlockStore) {
        if !self.nodes[id].oriented {
            self.identify_neighbours(id, store);
        }
        let neighbours = self.nodes[id].neighbours;

        let layer_one = layer + 1;
        for &n in &neighbours {
            let neighbour = &mut self.nodes[n];
            if layer_one > neighbour.layer {
                neighbour.layer = layer_one;
                self.update_queue[1].push(n);
            }
        }

        let layer_two = layer + 2;
        for &n in &neighbours[..4] {
            let neighbour = &mut self.nodes[n];
            if layer_two > neighbour.layer {
                neighbour.layer = layer_two;
                self.update_queue[2].push(n);
            }
        }
    }

    fn shift_queue(&mut self) {
        self.update_queue[0] = std::mem::take(&mut self.update_queue[1]);
        self.update_queue[1] = std::mem::take(&mut self.update_queue[2]);
    }

    fn breadth_first_walk(&mut self, store: &mut dyn BlockStore) {
        self.shift_queue();
        self.current_walk_layer = 1;

        while !self.update_queue[0].is_empty() || !self.update_queue[1].is_empty() {
            let layer = std::mem::take(&mut self.update_queue[0]);
            for id in layer {
                if self.nodes[id].block.is::<RedstoneWire>() {
                    self.update_node(id, self.current_walk_layer, &*store);
                    continue;
                }
                // Other blocks are leaves: notify the live block, never expand.
                let pos = self.nodes[id].pos;
                let block = store.block(pos);
                if let Some(updater) = block.as_redstone_updater() {
                    self.commit(store);
                    updater.redstone_update(pos, store);
                    self.stats.notified += 1;
                }
            }
            self.shift_queue();
            self.current_walk_layer += 1;
        }

        self.stats.layers = self.current_walk_layer;
        self.current_walk_layer = 0;
        self.commit(store);
    }

    fn update_node(&mut self, id: NodeId, layer: u32, store: &dyn BlockStore) {
        let Some(old) = self.nodes[id].wire() else {
            unreachable!("non-dust node at {} routed into update_node", self.nodes[id].pos);
        };
        self.nodes[id].visited = true;
        self.stats.recomputed += 1;

        let new = self.calculate_current_changes(id, store);
        if old.power != new.power {
            self.propagate_changes(id, layer, store);
        }
    }

    /// Cached block in canonical slot `slot` of an oriented node.
    fn slot_block(&self, id: NodeId, slot: usize) -> &dyn Block {
        &*self.nodes[self.nodes[id].neighbours[slot]].block
    }

    /// Recompute the power of the dust at `id` and cache the result.
    fn calculate_current_changes(&mut self, id: NodeId, store: &dyn BlockStore) -> RedstoneWire {
        let Some(mut wire) = self.nodes[id].wire() else {
            unreachable!("power recomputed for non-dust node at {}", self.nodes[id].pos);
        };
        if !self.nodes[id].oriented {
            self.identify_neighbours(id, store);
        }
        let pos = self.nodes[id].pos;

        let mut wire_power = 0;
        for face in FACES {
            wire_power = wire_power.max(store.redstone_power(pos.side(face), face, false));
        }

        let mut block_power = 0;
        if wire_power < MAX_POWER {
            let centre_up_solid = self.slot_block(id, SLOT_UP).is_solid();
            for m in 0..4 {
                let neighbour = self.slot_block(id, RS_NEIGHBOURS[m]);
                block_power = block_power.max(dust_power(neighbour));
                if !neighbour.is_solid() {
                    block_power = block_power.max(dust_power(self.slot_block(id, RS_NEIGHBOURS_DN[m])));
                } else if lets_dust_climb(neighbour) && !centre_up_solid {
                    block_power = block_power.max(dust_power(self.slot_block(id, RS_NEIGHBOURS_UP[m])));
                }
            }
        }

        let power = wire_power.max(block_power.saturating_sub(1));
        if power != wire.power {
            wire.power = power;
            self.nodes[id].block = Arc::new(wire);
            self.mark_dirty(id);
        }
        wire
    }

    /// Write every dirty dust value to the store.
    fn commit(&mut self, store: &mut dyn BlockStore) {
        for id in self.pending.drain(..) {
            let node = &mut self.nodes[id];
            node.dirty = false;
            store.set_block(node.pos, node.block.clone(), SetOpts::NO_UPDATES);
            self.stats.writes += 1;
        }
    }

    fn run(&mut self, root: NodeId, store: &mut dyn BlockStore) -> WalkStats {
        self.propagate_changes(root, 0, &*store);
        self.breadth_first_walk(store);
        self.stats.nodes = self.nodes.len();
        trace!(
            root = %self.nodes[root].pos,
            nodes = self.stats.nodes,
            layers = self.stats.layers,
            recomputed = self.stats.recomputed,
            writes = self.stats.writes,
            notified = self.stats.notified,
            "wire network walk finished"
        );
        self.stats
    }
}

/// Propagate a change of the block at `pos` through the surrounding dust.
///
/// Called when dust is placed or broken, or when something a dust network
/// depends on changed at `pos`.
pub fn update_strong_redstone(pos: Pos, store: &mut dyn BlockStore) -> WalkStats {
    let block = store.block(pos);
    let mut network = WireNetwork::new();
    let root = network.insert_root(pos, block, false);
    network.run(root, store)
}

/// Propagate a new power level for the dust at `pos`. The new value is not
/// written until the walk commits it.
pub(crate) fn update_wire_power(pos: Pos, wire: RedstoneWire, store: &mut dyn BlockStore) -> WalkStats {
    let changed = store.block(pos).downcast_ref::<RedstoneWire>() != Some(&wire);
    let mut network = WireNetwork::new();
    let root = network.insert_root(pos, Arc::new(wire), changed);
    network.run(root, store)
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use redwire_world::{break_block, place_block, Face, Glass, Stone, World};

    use super::*;
    use crate::source::RedstoneBlock;
    use crate::test_util::{dust_line, power_at, solid_floor, writes_per_pos};

    /// Face from the node towards canonical horizontal slot `m` for `heading`.
    fn horizontal_face(heading: usize, m: usize) -> Face {
        match REORDERING[heading][RS_NEIGHBOURS[m]] {
            0 => Face::West,
            1 => Face::East,
            4 => Face::North,
            5 => Face::South,
            raw => panic!("raw slot {raw} is not horizontal"),
        }
    }

    #[test]
    fn neighbours_are_distinct_and_within_two_steps() {
        let origin = Pos::new(3, 4, 5);
        let n = compute_redstone_neighbours(origin);
        let unique: HashSet<Pos> = n.iter().copied().collect();
        assert_eq!(unique.len(), NEIGHBOUR_COUNT);
        assert!(!unique.contains(&origin));
        for (i, p) in n.iter().enumerate() {
            let d = (p.x - origin.x).abs() + (p.y - origin.y).abs() + (p.z - origin.z).abs();
            if i < 6 {
                assert_eq!(d, 1, "slot {i}");
            } else {
                assert_eq!(d, 2, "slot {i}");
            }
        }
    }

    #[test]
    fn reordering_rows_are_permutations_with_canonical_layout() {
        let origin = Pos::new(0, 0, 0);
        let raw = compute_redstone_neighbours(origin);
        for (heading, row) in REORDERING.iter().enumerate() {
            let unique: HashSet<usize> = row.iter().copied().collect();
            assert_eq!(unique.len(), NEIGHBOUR_COUNT);
            assert!(row.iter().all(|&i| i < NEIGHBOUR_COUNT));

            assert_eq!(raw[row[0]], origin.side(Face::Down));
            assert_eq!(raw[row[SLOT_UP]], origin.side(Face::Up));
            for m in 0..4 {
                let side = raw[row[RS_NEIGHBOURS[m]]];
                assert_eq!(side.y, 0);
                assert_eq!(raw[row[RS_NEIGHBOURS_DN[m]]], side.side(Face::Down));
                assert_eq!(raw[row[RS_NEIGHBOURS_UP[m]]], side.side(Face::Up));
            }
            // Forward is the heading itself; left and right are its rotations.
            let forward = horizontal_face(heading, 1);
            assert_eq!(horizontal_face(heading, 0), forward.rotate_left());
            assert_eq!(horizontal_face(heading, 2), forward.rotate_right());
            assert_eq!(horizontal_face(heading, 3), forward.opposite());
        }
        assert_eq!(horizontal_face(NORTH, 1), Face::North);
        assert_eq!(horizontal_face(EAST, 1), Face::East);
        assert_eq!(horizontal_face(SOUTH, 1), Face::South);
        assert_eq!(horizontal_face(WEST, 1), Face::West);
    }

    #[test]
    fn heading_follows_bias() {
        assert_eq!(compute_redstone_heading(1, 0), EAST);
        assert_eq!(compute_redstone_heading(-1, 0), WEST);
        assert_eq!(compute_redstone_heading(0, 1), SOUTH);
        assert_eq!(compute_redstone_heading(0, -1), NORTH);
        assert_eq!(compute_redstone_heading(0, 0), WEST);
    }

    #[test]
    #[should_panic]
    fn heading_out_of_range_panics() {
        compute_redstone_heading(2, 0);
    }

    /// Dust at x = 0..5 on stone, redstone block placed west of x = 0.
    fn powered_run() -> World {
        let mut world = World::new();
        solid_floor(&mut world, -2, 8);
        dust_line(&mut world, 0, 5);
        place_block(&mut world, Pos::new(-1, 0, 0), Arc::new(RedstoneBlock));
        world
    }

    #[test]
    fn straight_run_decays_by_one_per_block() {
        let world = powered_run();
        let powers: Vec<u8> = (0..=5).map(|x| power_at(&world, Pos::new(x, 0, 0))).collect();
        assert_eq!(powers, vec![15, 14, 13, 12, 11, 10]);
    }

    #[test]
    fn removing_the_source_depowers_with_one_write_each() {
        let mut world = powered_run();
        world.drain_changes();
        break_block(&mut world, Pos::new(-1, 0, 0));

        for x in 0..=5 {
            assert_eq!(power_at(&world, Pos::new(x, 0, 0)), 0, "x = {x}");
        }
        let writes = writes_per_pos(&world.drain_changes());
        for x in 0..=5 {
            assert_eq!(writes.get(&Pos::new(x, 0, 0)), Some(&1), "x = {x}");
        }
    }

    #[test]
    fn signal_dies_after_fifteen_blocks() {
        let mut world = World::new();
        solid_floor(&mut world, -2, 22);
        dust_line(&mut world, 0, 20);
        place_block(&mut world, Pos::new(-1, 0, 0), Arc::new(RedstoneBlock));
        for d in 0..=20 {
            let expected = 15u8.saturating_sub(d as u8);
            assert_eq!(power_at(&world, Pos::new(d, 0, 0)), expected, "d = {d}");
        }
    }

    #[test]
    fn second_update_is_a_no_op() {
        let mut world = powered_run();
        world.drain_changes();
        let first = update_strong_redstone(Pos::new(2, 0, 0), &mut world);
        assert_eq!(first.writes, 0);
        let second = update_strong_redstone(Pos::new(2, 0, 0), &mut world);
        assert_eq!(second.writes, 0);
        assert!(world.drain_changes().is_empty());
    }

    #[test]
    fn build_order_does_not_change_the_result() {
        let mut forward = World::new();
        solid_floor(&mut forward, -2, 12);
        place_block(&mut forward, Pos::new(-1, 0, 0), Arc::new(RedstoneBlock));
        place_block(&mut forward, Pos::new(11, 0, 0), Arc::new(RedstoneBlock));
        for x in 0..=10 {
            place_block(&mut forward, Pos::new(x, 0, 0), Arc::new(RedstoneWire::default()));
        }

        let mut backward = World::new();
        solid_floor(&mut backward, -2, 12);
        for x in (0..=10).rev() {
            place_block(&mut backward, Pos::new(x, 0, 0), Arc::new(RedstoneWire::default()));
        }
        place_block(&mut backward, Pos::new(11, 0, 0), Arc::new(RedstoneBlock));
        place_block(&mut backward, Pos::new(-1, 0, 0), Arc::new(RedstoneBlock));

        let a: Vec<u8> = (0..=10).map(|x| power_at(&forward, Pos::new(x, 0, 0))).collect();
        let b: Vec<u8> = (0..=10).map(|x| power_at(&backward, Pos::new(x, 0, 0))).collect();
        assert_eq!(a, b);
        assert_eq!(a, vec![15, 14, 13, 12, 11, 10, 11, 12, 13, 14, 15]);
    }

    #[test]
    fn ring_of_dust_terminates_in_both_directions() {
        let mut world = World::new();
        world.fill(Pos::new(-1, -1, -1), Pos::new(6, -1, 6), Arc::new(Stone));
        let mut ring = Vec::new();
        for i in 0..5 {
            ring.push(Pos::new(i, 0, 0));
            ring.push(Pos::new(5, 0, i));
            ring.push(Pos::new(5 - i, 0, 5));
            ring.push(Pos::new(0, 0, 5 - i));
        }
        for &p in &ring {
            place_block(&mut world, p, Arc::new(RedstoneWire::default()));
        }
        let source = Pos::new(-1, 0, 0);
        place_block(&mut world, source, Arc::new(RedstoneBlock));
        assert_eq!(power_at(&world, Pos::new(0, 0, 0)), 15);
        // Farthest point of the 20-block ring is 10 steps away either way.
        assert_eq!(power_at(&world, Pos::new(5, 0, 5)), 5);

        break_block(&mut world, source);
        for &p in &ring {
            assert_eq!(power_at(&world, p), 0, "{p}");
        }
    }

    #[test]
    fn dust_steps_up_and_down_blocks() {
        let mut world = World::new();
        solid_floor(&mut world, -2, 6);
        // A stone step at x = 2 carries dust on top at y = 1.
        world.fill(Pos::new(2, 0, 0), Pos::new(2, 0, 0), Arc::new(Stone));
        for p in [
            Pos::new(0, 0, 0),
            Pos::new(1, 0, 0),
            Pos::new(2, 1, 0),
            Pos::new(3, 0, 0),
        ] {
            place_block(&mut world, p, Arc::new(RedstoneWire::default()));
        }
        place_block(&mut world, Pos::new(-1, 0, 0), Arc::new(RedstoneBlock));
        assert_eq!(power_at(&world, Pos::new(1, 0, 0)), 14);
        assert_eq!(power_at(&world, Pos::new(2, 1, 0)), 13);
        assert_eq!(power_at(&world, Pos::new(3, 0, 0)), 12);
    }

    #[test]
    fn solid_block_above_cuts_the_step_up() {
        let mut world = World::new();
        solid_floor(&mut world, -2, 4);
        world.fill(Pos::new(2, 0, 0), Pos::new(2, 0, 0), Arc::new(Stone));
        // Stone above the lower dust blocks the diagonal climb.
        world.fill(Pos::new(1, 1, 0), Pos::new(1, 1, 0), Arc::new(Stone));
        place_block(&mut world, Pos::new(1, 0, 0), Arc::new(RedstoneWire::default()));
        place_block(&mut world, Pos::new(2, 1, 0), Arc::new(RedstoneWire::default()));
        place_block(&mut world, Pos::new(0, 0, 0), Arc::new(RedstoneBlock));
        assert_eq!(power_at(&world, Pos::new(1, 0, 0)), 15);
        assert_eq!(power_at(&world, Pos::new(2, 1, 0)), 0);
    }

    #[test]
    fn transparent_step_only_carries_the_signal_upwards() {
        let mut world = World::new();
        solid_floor(&mut world, -2, 4);
        world.fill(Pos::new(2, 0, 0), Pos::new(2, 0, 0), Arc::new(Glass));
        let low = Pos::new(1, 0, 0);
        let high = Pos::new(2, 1, 0);
        place_block(&mut world, low, Arc::new(RedstoneWire::default()));
        place_block(&mut world, high, Arc::new(RedstoneWire::default()));

        place_block(&mut world, Pos::new(0, 0, 0), Arc::new(RedstoneBlock));
        assert_eq!(power_at(&world, low), 15);
        assert_eq!(power_at(&world, high), 14);

        break_block(&mut world, Pos::new(0, 0, 0));
        assert_eq!(power_at(&world, low), 0);
        assert_eq!(power_at(&world, high), 0);

        // Powering the upper dust leaves the lower one dark.
        place_block(&mut world, Pos::new(3, 1, 0), Arc::new(RedstoneBlock));
        assert_eq!(power_at(&world, high), 15);
        assert_eq!(power_at(&world, low), 0);
    }

    #[test]
    fn branches_are_written_once_per_walk() {
        let mut world = World::new();
        world.fill(Pos::new(-3, -1, -3), Pos::new(3, -1, 3), Arc::new(Stone));
        let mut dust = Vec::new();
        for i in 1..=3 {
            dust.push(Pos::new(i, 0, 0));
            dust.push(Pos::new(-i, 0, 0));
            dust.push(Pos::new(0, 0, i));
            dust.push(Pos::new(0, 0, -i));
        }
        for &p in &dust {
            place_block(&mut world, p, Arc::new(RedstoneWire::default()));
        }
        world.drain_changes();

        let centre = Pos::new(0, 0, 0);
        place_block(&mut world, centre, Arc::new(RedstoneBlock));
        let writes: HashMap<Pos, usize> = writes_per_pos(&world.drain_changes());
        for &p in &dust {
            let d = (p.x.abs() + p.z.abs()) as u8;
            assert_eq!(power_at(&world, p), 16 - d, "{p}");
            assert_eq!(writes.get(&p), Some(&1), "{p}");
        }
    }
}

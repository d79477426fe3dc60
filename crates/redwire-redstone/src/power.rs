//! Non-incremental power helpers used by discrete components.
//!
//! None of these build a wire graph: they notify or query the six direct
//! neighbours of a position and nothing more.

use redwire_world::{BlockStore, Face, Pos, FACES};

/// Notification order for [`update_around_redstone`].
const UPDATE_ORDER: [Face; 6] = [
    Face::East,
    Face::West,
    Face::Up,
    Face::Down,
    Face::South,
    Face::North,
];

/// Notify every redstone-aware block directly around `centre`, skipping the
/// neighbours behind `ignored_faces`.
pub fn update_around_redstone(centre: Pos, store: &mut dyn BlockStore, ignored_faces: &[Face]) {
    for face in UPDATE_ORDER {
        if ignored_faces.contains(&face) {
            continue;
        }
        let pos = centre.side(face);
        let block = store.block(pos);
        if let Some(updater) = block.as_redstone_updater() {
            updater.redstone_update(pos, store);
        }
    }
}

/// Notify around `pos` and around the block behind `face`, for components
/// whose output goes through one face (levers, buttons, torches).
pub fn update_directional_redstone(pos: Pos, store: &mut dyn BlockStore, face: Face) {
    update_around_redstone(pos, store, &[]);
    update_around_redstone(pos.side(face), store, &[face.opposite()]);
}

/// Notify the block a gate outputs into and everything around it.
///
/// `face` points from the gate towards its input, so the output block is at
/// `centre.side(face.opposite())`. The gate itself is not notified again.
pub fn update_gate_redstone(centre: Pos, store: &mut dyn BlockStore, face: Face) {
    let pos = centre.side(face.opposite());
    let block = store.block(pos);
    if let Some(updater) = block.as_redstone_updater() {
        updater.redstone_update(pos, store);
    }
    update_around_redstone(pos, store, &[face]);
}

/// Whether any non-ignored face of `pos` receives power, dust included.
pub fn received_redstone_power(pos: Pos, store: &dyn BlockStore, ignored_faces: &[Face]) -> bool {
    FACES
        .iter()
        .filter(|&&face| !ignored_faces.contains(&face))
        .any(|&face| store.redstone_power(pos.side(face), face, true) > 0)
}

#[cfg(test)]
mod tests {
    use std::any::Any;
    use std::sync::{Arc, Mutex};

    use redwire_world::{Block, RedstoneUpdater, SetOpts, Stone, World};

    use super::*;
    use crate::source::RedstoneBlock;

    /// Records every notification it receives into a shared log.
    #[derive(Debug)]
    struct Probe {
        log: Arc<Mutex<Vec<Pos>>>,
    }

    impl Block for Probe {
        fn name(&self) -> &'static str {
            "test:probe"
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_redstone_updater(&self) -> Option<&dyn RedstoneUpdater> {
            Some(self)
        }
    }

    impl RedstoneUpdater for Probe {
        fn redstone_update(&self, pos: Pos, _: &mut dyn BlockStore) {
            self.log.lock().unwrap().push(pos);
        }
    }

    fn probes_around(world: &mut World, centre: Pos, log: &Arc<Mutex<Vec<Pos>>>) {
        for face in FACES {
            world.set_block(
                centre.side(face),
                Arc::new(Probe { log: log.clone() }),
                SetOpts::NO_UPDATES,
            );
        }
    }

    #[test]
    fn around_notifies_six_in_order_and_honours_ignores() {
        let mut world = World::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let c = Pos::new(0, 0, 0);
        probes_around(&mut world, c, &log);

        update_around_redstone(c, &mut world, &[]);
        let expected: Vec<Pos> = UPDATE_ORDER.iter().map(|&f| c.side(f)).collect();
        assert_eq!(*log.lock().unwrap(), expected);

        log.lock().unwrap().clear();
        update_around_redstone(c, &mut world, &[Face::Up, Face::West]);
        let got = log.lock().unwrap().clone();
        assert_eq!(got.len(), 4);
        assert!(!got.contains(&c.side(Face::Up)));
        assert!(!got.contains(&c.side(Face::West)));
    }

    #[test]
    fn gate_notifies_output_block_then_its_surroundings() {
        let mut world = World::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let gate = Pos::new(0, 0, 0);
        // Gate input is to the north, so the output is to the south.
        let output = gate.side(Face::South);
        world.set_block(output, Arc::new(Probe { log: log.clone() }), SetOpts::NO_UPDATES);
        probes_around(&mut world, output, &log);
        world.set_block(gate, Arc::new(Stone), SetOpts::NO_UPDATES);

        update_gate_redstone(gate, &mut world, Face::North);
        let got = log.lock().unwrap().clone();
        assert_eq!(got[0], output);
        // Five neighbours of the output; the gate cell (now stone) is skipped anyway.
        assert_eq!(got.len(), 6);
        assert!(!got.contains(&gate));
    }

    #[test]
    fn directional_skips_the_origin_on_second_pass() {
        let mut world = World::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let lever = Pos::new(0, 0, 0);
        let attached = lever.side(Face::Down);
        world.set_block(lever, Arc::new(Probe { log: log.clone() }), SetOpts::NO_UPDATES);
        probes_around(&mut world, attached, &log);

        update_directional_redstone(lever, &mut world, Face::Down);
        let got = log.lock().unwrap().clone();
        // The lever cell is notified by neither pass; the attached cell's
        // neighbours other than the lever are notified once each.
        assert_eq!(got.iter().filter(|&&p| p == lever).count(), 0);
        assert_eq!(got.len(), 5);
    }

    #[test]
    fn received_power_sees_adjacent_sources() {
        let mut world = World::new();
        let p = Pos::new(0, 0, 0);
        assert!(!received_redstone_power(p, &world, &[]));
        world.set_block(p.side(Face::East), Arc::new(RedstoneBlock), SetOpts::NO_UPDATES);
        assert!(received_redstone_power(p, &world, &[]));
        assert!(!received_redstone_power(p, &world, &[Face::East]));
    }
}

//! Tick-driven circuit simulation: applies scripted actions, then advances the
//! world one game tick at a time.

use tracing::{debug, warn};

use redwire_world::{break_block, place_block, BlockRef, BlockStore, Pos, Sound, World};

use crate::error::SimError;
use crate::layout::{ActionKind, Layout};

enum Step {
    Activate,
    Break,
    Place(BlockRef),
}

struct ScheduledAction {
    tick: u64,
    pos: Pos,
    step: Step,
}

/// Everything that happened during one call to [`Simulation::step`].
pub struct StepReport {
    /// Game tick the world reached.
    pub tick: u64,
    /// Scripted actions applied before the tick ran.
    pub actions: usize,
    /// Scheduled block ticks dispatched.
    pub dispatched: usize,
    pub changes: Vec<(Pos, BlockRef)>,
    pub sounds: Vec<(Pos, Sound)>,
}

impl StepReport {
    pub fn is_quiet(&self) -> bool {
        self.actions == 0 && self.changes.is_empty() && self.sounds.is_empty()
    }
}

pub struct Simulation {
    world: World,
    actions: Vec<ScheduledAction>,
    next: usize,
}

impl Simulation {
    /// Build the layout into a fresh world. Every placed block is validated
    /// up front, so a running simulation never fails.
    pub fn new(layout: &Layout) -> Result<Self, SimError> {
        let mut world = World::new();
        layout.build(&mut world)?;
        world.drain_changes();
        world.drain_sounds();

        let mut actions = layout
            .actions
            .iter()
            .map(|a| {
                let pos = Pos::from(a.pos);
                let step = match &a.kind {
                    ActionKind::Activate => Step::Activate,
                    ActionKind::Break => Step::Break,
                    ActionKind::Place(spec) => Step::Place(spec.build(pos)?),
                };
                Ok(ScheduledAction {
                    tick: a.tick,
                    pos,
                    step,
                })
            })
            .collect::<Result<Vec<_>, SimError>>()?;
        // Stable: actions sharing a tick keep their file order.
        actions.sort_by_key(|a| a.tick);

        debug!(
            blocks = world.len(),
            actions = actions.len(),
            pending = world.pending_ticks(),
            "circuit built"
        );
        Ok(Self {
            world,
            actions,
            next: 0,
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn current_tick(&self) -> u64 {
        self.world.current_tick()
    }

    /// Whether scripted actions remain.
    pub fn has_pending_actions(&self) -> bool {
        self.next < self.actions.len()
    }

    /// Apply the actions due at the current tick, then advance one tick.
    pub fn step(&mut self) -> StepReport {
        let now = self.world.current_tick();
        let mut applied = 0;
        while let Some(action) = self.actions.get(self.next) {
            if action.tick > now {
                break;
            }
            apply(&mut self.world, action);
            self.next += 1;
            applied += 1;
        }

        let dispatched = self.world.tick();
        StepReport {
            tick: self.world.current_tick(),
            actions: applied,
            dispatched,
            changes: self.world.drain_changes(),
            sounds: self.world.drain_sounds(),
        }
    }
}

fn apply(world: &mut World, action: &ScheduledAction) {
    let pos = action.pos;
    match &action.step {
        Step::Activate => {
            let block = world.block(pos);
            let used = block
                .as_activatable()
                .is_some_and(|a| a.activate(pos, world));
            if used {
                debug!(%pos, block = block.name(), "activated");
            } else {
                warn!(%pos, block = block.name(), "block cannot be activated");
            }
        }
        Step::Break => {
            let old = break_block(world, pos);
            debug!(%pos, block = old.name(), "broken");
        }
        Step::Place(block) => {
            place_block(world, pos, block.clone());
            debug!(%pos, block = block.name(), "placed");
        }
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative simulation state for Gridfire.
//!
//! [`World`] is the single simulation context: it owns the occupancy grid, the
//! actor registry, and the deferred collision queue. Every mutation goes
//! through [`apply`], and a [`Command::Tick`] runs one fixed step:
//!
//! 1. every actor moves in registry order, one cell per axis per sub-step,
//!    recording contacts instead of acting on them;
//! 2. the collision queue is drained, applying variant-specific damage,
//!    bounces, and removals;
//! 3. any actor left with non-positive hit points is destroyed.

mod actors;
mod collision;
mod config;
mod grid;
mod lifecycle;
mod movement;

use std::time::Duration;

use gridfire_core::{ActorKind, Command, Event, SimulationState, SpawnError, StateError};
use thiserror::Error;

pub use config::{EffectTuning, EnemyTuning, PlayerTuning, ProjectileTuning, WorldConfig};
pub use grid::OccupancyConflict;

use self::{actors::ActorRegistry, collision::CollisionQueue, grid::OccupancyGrid};

/// Failures that abort a single [`apply`] call.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WorldError {
    /// The game-state machine rejected a transition.
    #[error(transparent)]
    State(#[from] StateError),
}

/// Represents the authoritative Gridfire world state.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    state: SimulationState,
    grid: OccupancyGrid,
    registry: ActorRegistry,
    collisions: CollisionQueue,
    elapsed: Duration,
    tick_index: u64,
}

impl World {
    /// Creates a world of `columns` x `rows` cells with the player at bottom-centre.
    ///
    /// The dimensions are fixed for the lifetime of the world.
    #[must_use]
    pub fn new(columns: u32, rows: u32, config: WorldConfig) -> Self {
        let mut world = Self {
            config,
            state: SimulationState::Init,
            grid: OccupancyGrid::new(columns, rows),
            registry: ActorRegistry::default(),
            collisions: CollisionQueue::default(),
            elapsed: Duration::ZERO,
            tick_index: 0,
        };
        world.spawn_player();
        world
    }

    fn set_state(
        &mut self,
        next: SimulationState,
        out_events: &mut Vec<Event>,
    ) -> Result<(), StateError> {
        let adopted = self.state.transition(next)?;
        if adopted != self.state {
            log::debug!("state {} -> {adopted}", self.state);
            out_events.push(Event::StateChanged {
                from: self.state,
                to: adopted,
            });
            self.state = adopted;
        }
        Ok(())
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        self.elapsed = self.elapsed.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });

        self.registry.age_effects();
        self.movement_pass(out_events);
        self.drain_collisions(out_events);
        self.reap_dead(out_events);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Only state-machine misuse is reported as an error; gameplay commands that
/// cannot be honoured are ignored or answered with rejection events.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), WorldError> {
    if let Command::SetState { state } = command {
        world.set_state(state, out_events)?;
        return Ok(());
    }
    if let Command::Quit = command {
        if world.state != SimulationState::Quit {
            world.set_state(SimulationState::Quit, out_events)?;
            out_events.push(Event::QuitRequested);
        }
        return Ok(());
    }

    if world.state != SimulationState::Play {
        if let Command::SpawnEnemy { cell } = command {
            out_events.push(Event::SpawnRejected {
                kind: ActorKind::Enemy,
                cell,
                reason: SpawnError::InvalidState,
            });
        }
        return Ok(());
    }

    match command {
        Command::Move { dx, dy } => {
            if let Some(player) = world
                .registry
                .player_id()
                .and_then(|id| world.registry.get_mut(id))
            {
                player.pending += glam::Vec2::new(dx, dy);
            }
        }
        Command::Shoot => {
            if let Some(player) = world.registry.player_id() {
                world.fire(player, out_events);
            }
        }
        Command::Fire { shooter } => world.fire(shooter, out_events),
        Command::SpawnEnemy { cell } => world.spawn_enemy(cell, out_events),
        Command::SteerEnemy { enemy, velocity } => {
            if let Some(actor) = world
                .registry
                .get_mut(enemy)
                .filter(|actor| actor.kind == ActorKind::Enemy)
            {
                actor.velocity = velocity;
            }
        }
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::SetState { .. } | Command::Quit => {}
    }
    Ok(())
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use gridfire_core::{ActorId, ActorView, OccupancyView, SimulationState};

    /// Captures everything a renderer may draw after the latest tick.
    #[must_use]
    pub fn actor_view(world: &World) -> ActorView {
        let actors = world.registry.iter().map(|actor| actor.snapshot()).collect();
        ActorView::from_snapshots(actors, world.registry.effect_snapshots())
    }

    /// Exposes a read-only view of the dense occupancy grid.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        world.grid.view()
    }

    /// Identifier of the live player, if any.
    #[must_use]
    pub fn player(world: &World) -> Option<ActorId> {
        world.registry.player_id()
    }

    /// Current state of the simulation state machine.
    #[must_use]
    pub fn state(world: &World) -> SimulationState {
        world.state
    }

    /// Grid dimensions as `(columns, rows)`.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        world.grid.dimensions()
    }

    /// Simulated time accumulated over all ticks.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Number of ticks simulated so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Contacts queued but not yet resolved. Zero between ticks.
    #[must_use]
    pub fn pending_collisions(world: &World) -> usize {
        world.collisions.len()
    }

    /// Tuning the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &super::WorldConfig {
        &world.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_starts_in_init_with_a_player() {
        let world = World::new(30, 12, WorldConfig::default());
        assert_eq!(query::state(&world), SimulationState::Init);
        assert!(query::player(&world).is_some());
        assert_eq!(query::dimensions(&world), (30, 12));
    }

    #[test]
    fn ticks_are_ignored_outside_play() {
        let mut world = World::new(30, 12, WorldConfig::default());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(33),
            },
            &mut events,
        )
        .expect("tick");

        assert!(events.is_empty());
        assert_eq!(query::tick_index(&world), 0);
    }

    #[test]
    fn invalid_transition_leaves_state_untouched() {
        let mut world = World::new(30, 12, WorldConfig::default());
        let mut events = Vec::new();

        let result = apply(
            &mut world,
            Command::SetState {
                state: SimulationState::Pause,
            },
            &mut events,
        );

        assert_eq!(
            result,
            Err(WorldError::State(StateError::InvalidTransition {
                from: SimulationState::Init,
                to: SimulationState::Pause,
            }))
        );
        assert_eq!(query::state(&world), SimulationState::Init);
        assert!(events.is_empty());
    }

    #[test]
    fn quit_is_announced_once() {
        let mut world = World::new(30, 12, WorldConfig::default());
        let mut events = Vec::new();

        apply(&mut world, Command::Quit, &mut events).expect("quit");
        apply(&mut world, Command::Quit, &mut events).expect("quit again");

        assert_eq!(
            events,
            vec![
                Event::StateChanged {
                    from: SimulationState::Init,
                    to: SimulationState::Quit,
                },
                Event::QuitRequested,
            ]
        );
    }

    #[test]
    fn spawns_outside_play_are_rejected() {
        let mut world = World::new(30, 12, WorldConfig::default());
        let mut events = Vec::new();
        let cell = gridfire_core::CellCoord::new(1, 1);

        apply(&mut world, Command::SpawnEnemy { cell }, &mut events).expect("spawn");

        assert_eq!(
            events,
            vec![Event::SpawnRejected {
                kind: ActorKind::Enemy,
                cell,
                reason: SpawnError::InvalidState,
            }]
        );
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting enemy spawn commands.
//!
//! Enemies appear on the spawn row (a tenth of the way down the grid) at a
//! random column. Spawns are either requested explicitly through
//! [`Spawning::request`] or produced by an optional periodic cadence.

use std::time::Duration;

use gridfire_core::{CellCoord, Command, Event, SimulationState};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_interval: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided spawn cadence and seed.
    ///
    /// A zero interval disables periodic spawning; requested spawns still fire.
    #[must_use]
    pub const fn new(spawn_interval: Duration, rng_seed: u64) -> Self {
        Self {
            spawn_interval,
            rng_seed,
        }
    }
}

/// Pure system that deterministically emits spawn commands while in play.
#[derive(Debug)]
pub struct Spawning {
    spawn_interval: Duration,
    accumulator: Duration,
    requested: usize,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            accumulator: Duration::ZERO,
            requested: 0,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Queues one spawn for the next [`Spawning::handle`] call.
    pub fn request(&mut self) {
        self.requested = self.requested.saturating_add(1);
    }

    /// Consumes events to emit spawn commands for an enemy of `enemy_width` cells.
    ///
    /// `dimensions` are the grid's `(columns, rows)`. Outside of play the
    /// cadence is reset and pending requests are dropped.
    pub fn handle(
        &mut self,
        events: &[Event],
        state: SimulationState,
        dimensions: (u32, u32),
        enemy_width: u32,
        out: &mut Vec<Command>,
    ) {
        if state != SimulationState::Play {
            self.accumulator = Duration::ZERO;
            self.requested = 0;
            return;
        }

        let mut accumulated = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                accumulated = accumulated.saturating_add(*dt);
            }
        }
        self.accumulator = self.accumulator.saturating_add(accumulated);

        let spawn_attempts = self.resolve_spawn_attempts() + std::mem::take(&mut self.requested);
        for _ in 0..spawn_attempts {
            let cell = self.select_cell(dimensions, enemy_width);
            log::debug!("requesting enemy at {cell:?}");
            out.push(Command::SpawnEnemy { cell });
        }
    }

    fn resolve_spawn_attempts(&mut self) -> usize {
        if self.spawn_interval.is_zero() {
            self.accumulator = Duration::ZERO;
            return 0;
        }

        let mut attempts = 0;
        while self.accumulator >= self.spawn_interval {
            self.accumulator -= self.spawn_interval;
            attempts += 1;
        }
        attempts
    }

    fn select_cell(&mut self, (columns, rows): (u32, u32), enemy_width: u32) -> CellCoord {
        let last_column = columns.saturating_sub(enemy_width.max(1));
        let column = self.rng.gen_range(0..=last_column);
        CellCoord::new(column, rows / 10)
    }
}

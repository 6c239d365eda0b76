#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy behaviour system: erratic but bounded drifting plus opportunistic fire.
//!
//! Every tick each live enemy stumbles, meaning its velocity receives a small
//! random perturbation and is then clamped. It then attempts to fire. The
//! system never touches the world directly; it emits [`Command::SteerEnemy`]
//! and [`Command::Fire`] batches that must be applied before the tick that
//! moves the enemies.

use glam::Vec2;
use gridfire_core::{ActorKind, ActorView, Command, SimulationState};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

/// Probability thresholds and increments that shape enemy drift.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Horizontal velocity change, added or subtracted on a coin flip.
    pub horizontal_step: f32,
    /// Vertical velocity increase applied with `vertical_chance`.
    pub vertical_step: f32,
    /// Probability of a vertical increase; otherwise vertical velocity resets.
    pub vertical_chance: f64,
    /// Probability of attempting to fire each tick.
    pub fire_chance: f64,
    /// Both velocity components are clamped to `[-limit, limit]`.
    pub limit: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            horizontal_step: 0.1,
            vertical_step: 0.3,
            vertical_chance: 0.35,
            fire_chance: 0.9,
            limit: 1.0,
        }
    }
}

/// Seeded system producing steering and fire commands for every enemy.
#[derive(Debug)]
pub struct EnemyAi {
    tuning: Tuning,
    rng: ChaCha8Rng,
}

impl EnemyAi {
    /// Creates the system with the provided tuning and random seed.
    #[must_use]
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        Self {
            tuning,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Emits one steering command and at most one fire command per enemy.
    ///
    /// Nothing is emitted outside of play so paused sessions keep their
    /// random stream intact.
    pub fn handle(&mut self, state: SimulationState, actors: &ActorView, out: &mut Vec<Command>) {
        if state != SimulationState::Play {
            return;
        }

        for enemy in actors.of_kind(ActorKind::Enemy) {
            let velocity = self.stumble(enemy.velocity);
            out.push(Command::SteerEnemy {
                enemy: enemy.id,
                velocity,
            });
            if self.rng.gen_bool(probability(self.tuning.fire_chance)) {
                out.push(Command::Fire { shooter: enemy.id });
            }
        }
    }

    fn stumble(&mut self, velocity: Vec2) -> Vec2 {
        let Tuning {
            horizontal_step,
            vertical_step,
            vertical_chance,
            limit,
            ..
        } = self.tuning;

        let dx = if self.rng.gen_bool(0.5) {
            velocity.x + horizontal_step
        } else {
            velocity.x - horizontal_step
        };
        let dy = if self.rng.gen_bool(probability(vertical_chance)) {
            velocity.y + vertical_step
        } else {
            0.0
        };

        let limit = limit.abs();
        Vec2::new(dx, dy).clamp(Vec2::splat(-limit), Vec2::splat(limit))
    }
}

/// `gen_bool` panics outside `[0, 1]`; configuration files may say anything.
fn probability(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

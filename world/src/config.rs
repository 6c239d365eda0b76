//! Tunable defaults applied when the world creates actors.

use std::time::Duration;

use gridfire_core::{Facing, Glyph};
use serde::Deserialize;

/// Aggregated tuning knobs for every actor variant.
///
/// Every field falls back to its default when omitted, so configuration files
/// only need to mention the values they override.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Defaults applied to the player created at start-up.
    pub player: PlayerTuning,
    /// Defaults applied to every spawned enemy.
    pub enemy: EnemyTuning,
    /// Defaults applied to every fired projectile.
    pub projectile: ProjectileTuning,
    /// Display-only effects left behind by destroyed actors.
    pub effects: EffectTuning,
}

/// Player defaults.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Starting hit points.
    pub hp: i32,
    /// Cells travelled per unit of requested magnitude.
    pub speed: f32,
    /// Sprite drawn for the player.
    pub glyph: Glyph,
    /// Direction shots travel in.
    pub facing: Facing,
    /// Minimum time between two shots, in milliseconds.
    pub cooldown_ms: u64,
}

impl PlayerTuning {
    /// Minimum time between two shots.
    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            hp: 3,
            speed: 2.0,
            glyph: Glyph::new("/=\\"),
            facing: Facing::Up,
            cooldown_ms: 0,
        }
    }
}

/// Enemy defaults.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    /// Starting hit points.
    pub hp: i32,
    /// Cells travelled per unit of velocity.
    pub speed: f32,
    /// Sprite drawn for enemies.
    pub glyph: Glyph,
    /// Direction shots travel in.
    pub facing: Facing,
    /// Minimum time between two shots, in milliseconds.
    pub cooldown_ms: u64,
    /// Damage dealt to the player on contact.
    pub damage: i32,
    /// Factor applied to the negated horizontal velocity after touching a side edge.
    pub horizontal_bounce_damping: f32,
    /// Factor applied to the negated vertical velocity after touching the top or bottom edge.
    pub vertical_bounce_damping: f32,
}

impl EnemyTuning {
    /// Minimum time between two shots.
    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            hp: 3,
            speed: 1.0,
            glyph: Glyph::new("<-->"),
            facing: Facing::Down,
            cooldown_ms: 2_000,
            damage: 1,
            horizontal_bounce_damping: 0.8,
            vertical_bounce_damping: 0.2,
        }
    }
}

/// Projectile defaults.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    /// Hit points; any collision destroys a projectile regardless.
    pub hp: i32,
    /// Cells travelled per tick.
    pub speed: f32,
    /// Damage dealt to whatever the projectile hits.
    pub damage: i32,
    /// Sprite drawn for projectiles.
    pub glyph: Glyph,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            hp: 1,
            speed: 1.0,
            damage: 1,
            glyph: Glyph::new("|"),
        }
    }
}

/// Display-only effect defaults.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EffectTuning {
    /// Glyph drawn where an actor was destroyed.
    pub explosion_glyph: Glyph,
    /// Ticks an explosion stays visible.
    pub lifetime_ticks: u32,
}

impl Default for EffectTuning {
    fn default() -> Self {
        Self {
            explosion_glyph: Glyph::new("*"),
            lifetime_ticks: 6,
        }
    }
}

//! Actor state and the registry that owns it.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use gridfire_core::{
    ActorId, ActorKind, ActorSnapshot, CellCoord, CellSpan, EffectSnapshot, Facing, Glyph,
};

use crate::config::{EffectTuning, EnemyTuning, PlayerTuning, ProjectileTuning};

/// Authoritative state of a single collidable actor.
#[derive(Clone, Debug)]
pub(crate) struct Actor {
    pub(crate) id: ActorId,
    pub(crate) kind: ActorKind,
    pub(crate) cell: CellCoord,
    pub(crate) velocity: Vec2,
    /// Player input accumulated since the last movement pass.
    pub(crate) pending: Vec2,
    pub(crate) hp: i32,
    pub(crate) speed: f32,
    pub(crate) glyph: Glyph,
    pub(crate) facing: Facing,
    pub(crate) cooldown: Duration,
    pub(crate) last_shot: Option<Duration>,
    pub(crate) damage: i32,
}

impl Actor {
    pub(crate) fn player(id: ActorId, cell: CellCoord, tuning: &PlayerTuning) -> Self {
        Self {
            id,
            kind: ActorKind::Player,
            cell,
            velocity: Vec2::ZERO,
            pending: Vec2::ZERO,
            hp: tuning.hp,
            speed: tuning.speed,
            glyph: tuning.glyph.clone(),
            facing: tuning.facing,
            cooldown: tuning.cooldown(),
            last_shot: None,
            damage: 0,
        }
    }

    pub(crate) fn enemy(id: ActorId, cell: CellCoord, tuning: &EnemyTuning) -> Self {
        Self {
            id,
            kind: ActorKind::Enemy,
            cell,
            velocity: Vec2::ZERO,
            pending: Vec2::ZERO,
            hp: tuning.hp,
            speed: tuning.speed,
            glyph: tuning.glyph.clone(),
            facing: tuning.facing,
            cooldown: tuning.cooldown(),
            last_shot: None,
            damage: tuning.damage,
        }
    }

    pub(crate) fn projectile(
        id: ActorId,
        cell: CellCoord,
        facing: Facing,
        tuning: &ProjectileTuning,
    ) -> Self {
        Self {
            id,
            kind: ActorKind::Projectile,
            cell,
            velocity: Vec2::new(0.0, facing.sign() as f32),
            pending: Vec2::ZERO,
            hp: tuning.hp,
            speed: tuning.speed,
            glyph: tuning.glyph.clone(),
            facing,
            cooldown: Duration::ZERO,
            last_shot: None,
            damage: tuning.damage,
        }
    }

    pub(crate) fn width(&self) -> u32 {
        self.glyph.width()
    }

    pub(crate) fn span(&self) -> CellSpan {
        CellSpan::new(self.cell, self.width())
    }

    /// Whether enough simulated time passed since the previous shot.
    pub(crate) fn ready_to_fire(&self, now: Duration) -> bool {
        if self.kind == ActorKind::Projectile {
            return false;
        }
        self.last_shot
            .map_or(true, |last| now.saturating_sub(last) > self.cooldown)
    }

    /// Displacement for this tick: velocity plus queued input, which is consumed.
    pub(crate) fn take_displacement(&mut self) -> Vec2 {
        let displacement = self.velocity + self.pending;
        self.pending = Vec2::ZERO;
        displacement
    }

    pub(crate) fn snapshot(&self) -> ActorSnapshot {
        ActorSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            glyph: self.glyph.clone(),
            hp: self.hp,
            velocity: self.velocity,
            facing: self.facing,
        }
    }
}

/// Display-only effect that never enters the occupancy grid.
#[derive(Clone, Debug)]
pub(crate) struct Effect {
    cell: CellCoord,
    glyph: Glyph,
    remaining_ticks: u32,
}

impl Effect {
    pub(crate) fn explosion(cell: CellCoord, tuning: &EffectTuning) -> Self {
        Self {
            cell,
            glyph: tuning.explosion_glyph.clone(),
            remaining_ticks: tuning.lifetime_ticks,
        }
    }

    fn snapshot(&self) -> EffectSnapshot {
        EffectSnapshot {
            cell: self.cell,
            glyph: self.glyph.clone(),
            remaining_ticks: self.remaining_ticks,
        }
    }
}

/// Owns the player singleton, enemies, projectiles, and effects.
#[derive(Debug, Default)]
pub(crate) struct ActorRegistry {
    player: Option<Actor>,
    enemies: BTreeMap<ActorId, Actor>,
    projectiles: BTreeMap<ActorId, Actor>,
    effects: Vec<Effect>,
    next_actor_id: u32,
}

impl ActorRegistry {
    pub(crate) fn allocate_id(&mut self) -> ActorId {
        let id = ActorId::new(self.next_actor_id);
        self.next_actor_id = self.next_actor_id.wrapping_add(1);
        id
    }

    pub(crate) fn insert(&mut self, actor: Actor) {
        match actor.kind {
            ActorKind::Player => self.player = Some(actor),
            ActorKind::Enemy => {
                let _ = self.enemies.insert(actor.id, actor);
            }
            ActorKind::Projectile => {
                let _ = self.projectiles.insert(actor.id, actor);
            }
        }
    }

    pub(crate) fn get(&self, id: ActorId) -> Option<&Actor> {
        if let Some(player) = self.player.as_ref().filter(|player| player.id == id) {
            return Some(player);
        }
        self.enemies.get(&id).or_else(|| self.projectiles.get(&id))
    }

    pub(crate) fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        if self.player.as_ref().is_some_and(|player| player.id == id) {
            return self.player.as_mut();
        }
        if let Some(enemy) = self.enemies.get_mut(&id) {
            return Some(enemy);
        }
        self.projectiles.get_mut(&id)
    }

    pub(crate) fn kind_of(&self, id: ActorId) -> Option<ActorKind> {
        self.get(id).map(|actor| actor.kind)
    }

    /// Removes an actor from whichever collection holds it.
    pub(crate) fn remove(&mut self, id: ActorId) -> Option<Actor> {
        if self.player.as_ref().is_some_and(|player| player.id == id) {
            return self.player.take();
        }
        self.enemies
            .remove(&id)
            .or_else(|| self.projectiles.remove(&id))
    }

    pub(crate) fn player_id(&self) -> Option<ActorId> {
        self.player.as_ref().map(|player| player.id)
    }

    /// Identifiers in movement order: player, enemies, then projectiles.
    pub(crate) fn sweep_order(&self) -> Vec<ActorId> {
        self.player
            .iter()
            .map(|player| player.id)
            .chain(self.enemies.keys().copied())
            .chain(self.projectiles.keys().copied())
            .collect()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.player
            .iter()
            .chain(self.enemies.values())
            .chain(self.projectiles.values())
    }

    pub(crate) fn push_effect(&mut self, effect: Effect) {
        if effect.remaining_ticks > 0 {
            self.effects.push(effect);
        }
    }

    /// Ages every effect by one tick, dropping the expired ones.
    pub(crate) fn age_effects(&mut self) {
        for effect in &mut self.effects {
            effect.remaining_ticks = effect.remaining_ticks.saturating_sub(1);
        }
        self.effects.retain(|effect| effect.remaining_ticks > 0);
    }

    pub(crate) fn effect_snapshots(&self) -> Vec<EffectSnapshot> {
        self.effects.iter().map(Effect::snapshot).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;

    #[test]
    fn registry_routes_actors_by_kind() {
        let config = WorldConfig::default();
        let mut registry = ActorRegistry::default();
        let player_id = registry.allocate_id();
        let enemy_id = registry.allocate_id();
        let shot_id = registry.allocate_id();

        registry.insert(Actor::player(player_id, CellCoord::new(0, 9), &config.player));
        registry.insert(Actor::enemy(enemy_id, CellCoord::new(2, 1), &config.enemy));
        registry.insert(Actor::projectile(
            shot_id,
            CellCoord::new(3, 2),
            Facing::Down,
            &config.projectile,
        ));

        assert_eq!(registry.kind_of(player_id), Some(ActorKind::Player));
        assert_eq!(registry.kind_of(enemy_id), Some(ActorKind::Enemy));
        assert_eq!(registry.kind_of(shot_id), Some(ActorKind::Projectile));
        assert_eq!(registry.sweep_order(), vec![player_id, enemy_id, shot_id]);
    }

    #[test]
    fn removal_is_idempotent() {
        let config = WorldConfig::default();
        let mut registry = ActorRegistry::default();
        let enemy_id = registry.allocate_id();
        registry.insert(Actor::enemy(enemy_id, CellCoord::new(0, 0), &config.enemy));

        assert!(registry.remove(enemy_id).is_some());
        assert!(registry.remove(enemy_id).is_none());
        assert_eq!(registry.kind_of(enemy_id), None);
    }

    #[test]
    fn cooldown_requires_strictly_more_time_than_configured() {
        let config = WorldConfig::default();
        let mut enemy = Actor::enemy(ActorId::new(1), CellCoord::new(0, 0), &config.enemy);
        assert!(enemy.ready_to_fire(Duration::ZERO));

        enemy.last_shot = Some(Duration::from_secs(1));
        assert!(!enemy.ready_to_fire(Duration::from_secs(3)));
        assert!(enemy.ready_to_fire(Duration::from_millis(3_001)));
    }

    #[test]
    fn projectiles_never_fire() {
        let config = WorldConfig::default();
        let shot = Actor::projectile(
            ActorId::new(4),
            CellCoord::new(0, 0),
            Facing::Up,
            &config.projectile,
        );
        assert!(!shot.ready_to_fire(Duration::from_secs(60)));
    }

    #[test]
    fn effects_expire_after_their_lifetime() {
        let mut registry = ActorRegistry::default();
        let tuning = EffectTuning {
            lifetime_ticks: 2,
            ..EffectTuning::default()
        };
        registry.push_effect(Effect::explosion(CellCoord::new(1, 1), &tuning));

        registry.age_effects();
        assert_eq!(registry.effect_snapshots().len(), 1);
        registry.age_effects();
        assert!(registry.effect_snapshots().is_empty());
    }
}

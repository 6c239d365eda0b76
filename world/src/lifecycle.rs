//! Spawning, firing, damage, and removal of actors.

use gridfire_core::{ActorId, ActorKind, CellCoord, CellSpan, Event, SpawnError};

use crate::{
    actors::{Actor, Effect},
    World,
};

/// Why an actor is being removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Removal {
    /// Destroyed by damage or a collision; leaves an explosion behind.
    Killed,
    /// Left the grid; vanishes silently.
    Expired,
}

impl World {
    /// Places the player at bottom-centre. Grids too small to hold it stay empty.
    pub(crate) fn spawn_player(&mut self) {
        let (columns, rows) = self.grid.dimensions();
        let width = self.config.player.glyph.width();
        let desired_x = i64::from(columns / 2);
        let desired_y = i64::from(rows) - 1;
        let Some(cell) = self.grid.clamp_anchor(desired_x, desired_y, width) else {
            log::warn!("{columns}x{rows} grid cannot hold a {width}-wide player");
            return;
        };

        let id = self.registry.allocate_id();
        let player = Actor::player(id, cell, &self.config.player);
        if let Err(conflict) = self.grid.claim(id, player.span()) {
            log::warn!("player placement failed: {conflict}");
            return;
        }
        self.registry.insert(player);
        log::debug!("player {id:?} placed at {cell:?}");
    }

    /// Registers a new enemy with its leftmost cell at `cell`.
    pub(crate) fn spawn_enemy(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        let span = CellSpan::new(cell, self.config.enemy.glyph.width());
        let x = i64::from(cell.column());
        let y = i64::from(cell.row());
        if self.grid.edge_crossed(x, y, span.width()).is_some() {
            out_events.push(Event::SpawnRejected {
                kind: ActorKind::Enemy,
                cell,
                reason: SpawnError::OutOfBounds,
            });
            return;
        }
        if span.cells().any(|covered| {
            self.grid
                .occupant_at(i64::from(covered.column()), i64::from(covered.row()))
                .is_some()
        }) {
            out_events.push(Event::SpawnRejected {
                kind: ActorKind::Enemy,
                cell,
                reason: SpawnError::Occupied,
            });
            return;
        }

        let id = self.registry.allocate_id();
        let enemy = Actor::enemy(id, cell, &self.config.enemy);
        if let Err(conflict) = self.grid.claim(id, enemy.span()) {
            log::warn!("enemy placement failed: {conflict}");
            return;
        }
        self.registry.insert(enemy);
        log::debug!("enemy {id:?} spawned at {cell:?}");
        out_events.push(Event::ActorSpawned {
            actor: id,
            kind: ActorKind::Enemy,
            cell,
        });
    }

    /// Releases a projectile one cell ahead of the shooter's centre column.
    ///
    /// Shots that would appear inside another actor hit it immediately; shots
    /// that would appear inside the shooter itself are lost.
    pub(crate) fn fire(&mut self, shooter: ActorId, out_events: &mut Vec<Event>) {
        let now = self.elapsed;
        let (columns, rows) = self.grid.dimensions();
        let Some(actor) = self.registry.get_mut(shooter) else {
            return;
        };
        if !actor.ready_to_fire(now) {
            return;
        }
        actor.last_shot = Some(now);

        let facing = actor.facing;
        let centre = i64::from(actor.cell.column()) + i64::from(actor.width() / 2);
        let ahead = i64::from(actor.cell.row()) + i64::from(facing.sign());
        let x = centre.clamp(0, i64::from(columns.saturating_sub(1)));
        let y = ahead.clamp(0, i64::from(rows.saturating_sub(1)));
        let (Ok(column), Ok(row)) = (u32::try_from(x), u32::try_from(y)) else {
            return;
        };
        let cell = CellCoord::new(column, row);

        match self.grid.occupant_at(x, y) {
            Some(occupant) if occupant == shooter => {
                log::trace!("shot from {shooter:?} smothered at {cell:?}");
            }
            Some(occupant) => {
                out_events.push(Event::PointBlankHit {
                    shooter,
                    target: occupant,
                });
                if self.registry.kind_of(occupant) == Some(ActorKind::Projectile) {
                    let _ = self.destroy(occupant, Removal::Killed, out_events);
                } else {
                    let damage = self.config.projectile.damage.saturating_neg();
                    self.add_hp(occupant, damage, out_events);
                }
            }
            None => {
                let id = self.registry.allocate_id();
                let projectile = Actor::projectile(id, cell, facing, &self.config.projectile);
                if let Err(conflict) = self.grid.claim(id, projectile.span()) {
                    log::warn!("projectile placement failed: {conflict}");
                    return;
                }
                self.registry.insert(projectile);
                out_events.push(Event::ShotFired {
                    shooter,
                    projectile: id,
                });
                out_events.push(Event::ActorSpawned {
                    actor: id,
                    kind: ActorKind::Projectile,
                    cell,
                });
            }
        }
    }

    /// Applies a hit point delta, destroying the actor once it drops to zero.
    pub(crate) fn add_hp(&mut self, actor: ActorId, amount: i32, out_events: &mut Vec<Event>) {
        let Some(target) = self.registry.get_mut(actor) else {
            return;
        };
        target.hp = target.hp.saturating_add(amount);
        let hp = target.hp;
        if amount < 0 {
            out_events.push(Event::ActorDamaged {
                actor,
                amount: amount.saturating_neg(),
                hp,
            });
        }
        if hp <= 0 {
            let _ = self.destroy(actor, Removal::Killed, out_events);
        }
    }

    /// Removes an actor from the registry and the grid.
    ///
    /// Returns `false` when the actor was already gone; repeated calls never
    /// emit events twice.
    pub(crate) fn destroy(
        &mut self,
        actor: ActorId,
        removal: Removal,
        out_events: &mut Vec<Event>,
    ) -> bool {
        let Some(removed) = self.registry.remove(actor) else {
            return false;
        };
        self.grid.release(removed.id, removed.span());
        if removal == Removal::Killed {
            self.registry
                .push_effect(Effect::explosion(removed.cell, &self.config.effects));
        }

        log::debug!("{:?} {actor:?} destroyed at {:?}", removed.kind, removed.cell);
        out_events.push(Event::ActorDestroyed {
            actor,
            kind: removed.kind,
            cell: removed.cell,
        });
        if removed.kind == ActorKind::Player {
            log::info!("player {actor:?} destroyed");
            out_events.push(Event::PlayerDestroyed { actor });
        }
        true
    }

    /// Destroys every actor whose hit points reached zero.
    pub(crate) fn reap_dead(&mut self, out_events: &mut Vec<Event>) {
        let dead: Vec<ActorId> = self
            .registry
            .iter()
            .filter(|actor| actor.hp <= 0)
            .map(|actor| actor.id)
            .collect();
        for actor in dead {
            let _ = self.destroy(actor, Removal::Killed, out_events);
        }
    }
}

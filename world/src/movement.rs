//! Sub-stepped movement with boundary policies and deferred collision discovery.

use glam::Vec2;
use gridfire_core::{ActorKind, CellCoord, Edge, Event};

use crate::{
    actors::Actor, collision::CollisionQueue, config::WorldConfig, grid::OccupancyGrid,
    lifecycle::Removal, World,
};

/// How a single actor's movement for the tick ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Resolution {
    /// The actor remains on the grid.
    Settled,
    /// The actor crossed an edge that removes it.
    LeftGrid,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Advanced,
    Blocked,
    Edge(Edge),
}

/// Resolves requested displacements one cell per axis per sub-step.
///
/// Contacts are only recorded into the queue; no other actor is mutated while
/// the sweep is in progress.
pub(crate) struct MovementResolver<'w> {
    grid: &'w mut OccupancyGrid,
    collisions: &'w mut CollisionQueue,
    config: &'w WorldConfig,
}

impl<'w> MovementResolver<'w> {
    pub(crate) fn new(
        grid: &'w mut OccupancyGrid,
        collisions: &'w mut CollisionQueue,
        config: &'w WorldConfig,
    ) -> Self {
        Self {
            grid,
            collisions,
            config,
        }
    }

    /// Moves `actor` by `int(displacement * speed)` cells along each axis.
    pub(crate) fn resolve(
        &mut self,
        actor: &mut Actor,
        displacement: Vec2,
        out_events: &mut Vec<Event>,
    ) -> Resolution {
        let (columns, rows) = self.grid.dimensions();
        // Anything longer than the grid must hit an edge first.
        let mut remaining_x = truncate_steps(displacement.x * actor.speed, columns);
        let mut remaining_y = truncate_steps(displacement.y * actor.speed, rows);

        while remaining_x != 0 || remaining_y != 0 {
            let step_x = remaining_x.signum();
            let step_y = remaining_y.signum();
            remaining_x -= step_x;
            remaining_y -= step_y;

            if step_x != 0 {
                if let Step::Edge(edge) = self.try_step(actor, step_x, 0) {
                    remaining_x = 0;
                    if self.hit_edge(actor, edge, out_events) == Resolution::LeftGrid {
                        return Resolution::LeftGrid;
                    }
                }
            }
            if step_y != 0 {
                if let Step::Edge(edge) = self.try_step(actor, 0, step_y) {
                    remaining_y = 0;
                    if self.hit_edge(actor, edge, out_events) == Resolution::LeftGrid {
                        return Resolution::LeftGrid;
                    }
                }
            }
        }

        Resolution::Settled
    }

    fn try_step(&mut self, actor: &mut Actor, dx: i64, dy: i64) -> Step {
        let width = actor.width();
        let x = i64::from(actor.cell.column()) + dx;
        let y = i64::from(actor.cell.row()) + dy;

        if let Some(edge) = self.grid.edge_crossed(x, y, width) {
            return Step::Edge(edge);
        }

        let mut blocked = false;
        for offset in 0..i64::from(width) {
            if let Some(occupant) = self.grid.occupant_at(x + offset, y) {
                if occupant != actor.id {
                    self.collisions.push(actor.id, actor.kind, occupant);
                    blocked = true;
                }
            }
        }
        if blocked {
            return Step::Blocked;
        }

        let (Ok(column), Ok(row)) = (u32::try_from(x), u32::try_from(y)) else {
            return Step::Blocked;
        };
        if self.relocate(actor, CellCoord::new(column, row)) {
            Step::Advanced
        } else {
            Step::Blocked
        }
    }

    /// Releases the old cells and claims the new ones, restoring on failure.
    fn relocate(&mut self, actor: &mut Actor, target: CellCoord) -> bool {
        let previous = actor.cell;
        self.grid.release(actor.id, actor.span());
        actor.cell = target;
        match self.grid.claim(actor.id, actor.span()) {
            Ok(()) => true,
            Err(conflict) => {
                log::warn!("{:?} could not enter {target:?}: {conflict}", actor.id);
                actor.cell = previous;
                if let Err(restore) = self.grid.claim(actor.id, actor.span()) {
                    log::error!("{:?} lost its cells at {previous:?}: {restore}", actor.id);
                }
                false
            }
        }
    }

    fn hit_edge(&mut self, actor: &mut Actor, edge: Edge, out_events: &mut Vec<Event>) -> Resolution {
        out_events.push(Event::BoundaryReached {
            actor: actor.id,
            edge,
        });

        match actor.kind {
            ActorKind::Projectile => return Resolution::LeftGrid,
            ActorKind::Player => {}
            ActorKind::Enemy => {
                let tuning = &self.config.enemy;
                match edge {
                    Edge::Left | Edge::Right => {
                        actor.velocity.x *= -tuning.horizontal_bounce_damping;
                    }
                    Edge::Top | Edge::Bottom => {
                        actor.velocity.y *= -tuning.vertical_bounce_damping;
                    }
                }
            }
        }

        self.clamp_into_bounds(actor);
        Resolution::Settled
    }

    /// Pulls an actor back to the nearest anchor at which its sprite fits.
    fn clamp_into_bounds(&mut self, actor: &mut Actor) {
        let x = i64::from(actor.cell.column());
        let y = i64::from(actor.cell.row());
        match self.grid.clamp_anchor(x, y, actor.width()) {
            Some(anchor) if anchor != actor.cell => {
                let _ = self.relocate(actor, anchor);
            }
            Some(_) => {}
            None => log::warn!("{:?} is wider than the grid", actor.id),
        }
    }
}

fn truncate_steps(distance: f32, limit: u32) -> i64 {
    let limit = i64::from(limit);
    // `as` saturates and maps NaN to zero.
    (distance.trunc() as i64).clamp(-limit, limit)
}

impl World {
    /// Moves every actor once, in registry order, queueing contacts.
    pub(crate) fn movement_pass(&mut self, out_events: &mut Vec<Event>) {
        for id in self.registry.sweep_order() {
            let Self {
                registry,
                grid,
                collisions,
                config,
                ..
            } = self;
            let Some(actor) = registry.get_mut(id) else {
                continue;
            };

            let displacement = actor.take_displacement();
            let from = actor.cell;
            let resolution =
                MovementResolver::new(grid, collisions, config).resolve(actor, displacement, out_events);
            let to = actor.cell;

            if from != to {
                log::trace!("{id:?} moved {from:?} -> {to:?}");
                out_events.push(Event::ActorMoved { actor: id, from, to });
            }
            if resolution == Resolution::LeftGrid {
                let _ = self.destroy(id, Removal::Expired, out_events);
            }
        }
    }
}

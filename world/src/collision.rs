//! Deferred collision bookkeeping and variant-specific resolution.

use gridfire_core::{ActorId, ActorKind, Event};

use crate::{lifecycle::Removal, World};

/// Contact discovered while an instigator was moving.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CollisionPair {
    pub(crate) instigator: ActorId,
    pub(crate) instigator_kind: ActorKind,
    pub(crate) recipient: ActorId,
}

impl CollisionPair {
    fn same_contact(&self, other: &Self) -> bool {
        (self.instigator == other.instigator && self.recipient == other.recipient)
            || (self.instigator == other.recipient && self.recipient == other.instigator)
    }
}

/// Contacts recorded during the movement phase, drained once every actor moved.
///
/// A contact between two actors is recorded at most once per tick regardless of
/// how many sub-steps or sprite cells rediscover it. When both actors run into
/// each other, the contact keeps the instigator that has a collide handler:
/// players have none, so a player-instigated entry yields to the other side.
#[derive(Debug, Default)]
pub(crate) struct CollisionQueue {
    pairs: Vec<CollisionPair>,
}

impl CollisionQueue {
    pub(crate) fn push(
        &mut self,
        instigator: ActorId,
        instigator_kind: ActorKind,
        recipient: ActorId,
    ) {
        if instigator == recipient {
            return;
        }
        let pair = CollisionPair {
            instigator,
            instigator_kind,
            recipient,
        };
        match self.pairs.iter_mut().find(|queued| queued.same_contact(&pair)) {
            Some(queued) => {
                if queued.instigator_kind == ActorKind::Player
                    && instigator_kind != ActorKind::Player
                {
                    *queued = pair;
                }
            }
            None => self.pairs.push(pair),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.pairs.len()
    }

    fn take(&mut self) -> Vec<CollisionPair> {
        std::mem::take(&mut self.pairs)
    }
}

impl World {
    /// Resolves every queued contact in FIFO order.
    pub(crate) fn drain_collisions(&mut self, out_events: &mut Vec<Event>) {
        for pair in self.collisions.take() {
            self.resolve_contact(pair, out_events);
        }
    }

    fn resolve_contact(&mut self, pair: CollisionPair, out_events: &mut Vec<Event>) {
        let CollisionPair {
            instigator,
            recipient,
            ..
        } = pair;
        let (Some(instigator_kind), Some(recipient_kind)) = (
            self.registry.kind_of(instigator),
            self.registry.kind_of(recipient),
        ) else {
            log::trace!("skipping stale contact {instigator:?} -> {recipient:?}");
            return;
        };

        out_events.push(Event::CollisionResolved {
            instigator,
            recipient,
        });

        match (instigator_kind, recipient_kind) {
            (ActorKind::Projectile, ActorKind::Projectile) => {
                let _ = self.destroy(instigator, Removal::Killed, out_events);
                let _ = self.destroy(recipient, Removal::Killed, out_events);
            }
            (ActorKind::Projectile, ActorKind::Player | ActorKind::Enemy) => {
                self.projectile_hit(instigator, recipient, out_events);
            }
            (ActorKind::Enemy, ActorKind::Projectile) => {
                self.projectile_hit(recipient, instigator, out_events);
            }
            (ActorKind::Enemy, ActorKind::Player) => {
                self.enemy_contact(instigator, recipient, out_events);
            }
            (ActorKind::Enemy, ActorKind::Enemy) => {
                for enemy in [instigator, recipient] {
                    if let Some(actor) = self.registry.get_mut(enemy) {
                        actor.velocity = -actor.velocity;
                    }
                }
            }
            // Players only ever receive contacts.
            (ActorKind::Player, _) => {}
        }
    }

    fn projectile_hit(&mut self, projectile: ActorId, target: ActorId, out_events: &mut Vec<Event>) {
        let damage = self
            .registry
            .get(projectile)
            .map_or(0, |actor| actor.damage);
        self.add_hp(target, damage.saturating_neg(), out_events);
        let _ = self.destroy(projectile, Removal::Killed, out_events);
    }

    fn enemy_contact(&mut self, enemy: ActorId, player: ActorId, out_events: &mut Vec<Event>) {
        let damage = self.registry.get(enemy).map_or(0, |actor| actor.damage);
        self.add_hp(player, damage.saturating_neg(), out_events);
    }
}

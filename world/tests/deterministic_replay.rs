use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use glam::Vec2;
use gridfire_core::{ActorId, CellCoord, Command, Event, SimulationState};
use gridfire_world::{self as world, query, World, WorldConfig};

#[test]
fn scripted_session_replays_identically() {
    let first = replay(script());
    let second = replay(script());

    assert_eq!(first, second, "world replay diverged");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(
        first
            .events
            .iter()
            .any(|event| matches!(event, Event::CollisionResolved { .. })),
        "script should exercise collision resolution",
    );
}

fn replay(commands: Vec<Command>) -> ReplayOutcome {
    let mut world = World::new(24, 14, WorldConfig::default());
    let mut events = Vec::new();

    for command in commands {
        world::apply(&mut world, command, &mut events).expect("scripted command");
    }

    let actors = query::actor_view(&world)
        .iter()
        .map(|actor| ActorRecord {
            id: actor.id,
            cell: actor.cell,
            hp: actor.hp,
        })
        .collect();

    ReplayOutcome {
        events,
        actors,
        tick_index: query::tick_index(&world),
    }
}

fn script() -> Vec<Command> {
    let tick = Command::Tick {
        dt: Duration::from_millis(33),
    };
    let mut commands = vec![
        Command::SetState {
            state: SimulationState::Play,
        },
        Command::SpawnEnemy {
            cell: CellCoord::new(3, 1),
        },
        Command::SpawnEnemy {
            cell: CellCoord::new(14, 1),
        },
        Command::SteerEnemy {
            enemy: ActorId::new(1),
            velocity: Vec2::new(1.0, 0.0),
        },
        Command::SteerEnemy {
            enemy: ActorId::new(2),
            velocity: Vec2::new(-1.0, 1.0),
        },
        Command::Move { dx: -1.0, dy: 0.0 },
        Command::Shoot,
    ];
    for round in 0..24 {
        if round % 6 == 0 {
            commands.push(Command::Fire {
                shooter: ActorId::new(1),
            });
            commands.push(Command::Fire {
                shooter: ActorId::new(2),
            });
        }
        if round % 4 == 0 {
            commands.push(Command::Shoot);
        }
        commands.push(tick.clone());
    }
    commands
}

#[derive(Debug, PartialEq, Eq)]
struct ActorRecord {
    id: ActorId,
    cell: CellCoord,
    hp: i32,
}

#[derive(Debug, PartialEq, Eq)]
struct ReplayOutcome {
    events: Vec<Event>,
    actors: Vec<ActorRecord>,
    tick_index: u64,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.events.len().hash(&mut hasher);
        self.tick_index.hash(&mut hasher);
        for actor in &self.actors {
            actor.id.hash(&mut hasher);
            actor.cell.hash(&mut hasher);
            actor.hp.hash(&mut hasher);
        }
        hasher.finish()
    }
}

use std::time::Duration;

use gridfire_core::{ActorId, ActorKind, CellCoord, Command, Event, SimulationState};
use gridfire_system_enemy_ai::{EnemyAi, Tuning};
use gridfire_world::{self as world, query, World, WorldConfig};

fn world_with_enemies(cells: &[CellCoord]) -> World {
    let mut world = World::new(40, 20, WorldConfig::default());
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SetState {
            state: SimulationState::Play,
        },
        &mut events,
    )
    .expect("init -> play");
    for cell in cells {
        world::apply(&mut world, Command::SpawnEnemy { cell: *cell }, &mut events)
            .expect("spawn");
    }
    world
}

#[test]
fn every_enemy_is_steered_once_per_tick() {
    let world = world_with_enemies(&[CellCoord::new(2, 2), CellCoord::new(20, 2)]);
    let mut ai = EnemyAi::new(Tuning::default(), 42);
    let mut commands = Vec::new();

    ai.handle(query::state(&world), &query::actor_view(&world), &mut commands);

    let steered: Vec<ActorId> = commands
        .iter()
        .filter_map(|command| match command {
            Command::SteerEnemy { enemy, .. } => Some(*enemy),
            _ => None,
        })
        .collect();
    assert_eq!(steered, vec![ActorId::new(1), ActorId::new(2)]);
}

#[test]
fn certain_fire_chance_fires_for_every_enemy() {
    let world = world_with_enemies(&[CellCoord::new(2, 2), CellCoord::new(20, 2)]);
    let tuning = Tuning {
        fire_chance: 1.0,
        ..Tuning::default()
    };
    let mut ai = EnemyAi::new(tuning, 42);
    let mut commands = Vec::new();

    ai.handle(query::state(&world), &query::actor_view(&world), &mut commands);

    let shots = commands
        .iter()
        .filter(|command| matches!(command, Command::Fire { .. }))
        .count();
    assert_eq!(shots, 2);
}

#[test]
fn nothing_is_emitted_outside_play() {
    let world = world_with_enemies(&[CellCoord::new(2, 2)]);
    let mut ai = EnemyAi::new(Tuning::default(), 42);
    let mut commands = Vec::new();

    ai.handle(SimulationState::Pause, &query::actor_view(&world), &mut commands);

    assert!(commands.is_empty());
}

#[test]
fn seeded_sessions_replay_identically() {
    let run = || {
        let mut world = world_with_enemies(&[CellCoord::new(2, 2), CellCoord::new(20, 2)]);
        let mut ai = EnemyAi::new(Tuning::default(), 0x5eed);
        let mut events = Vec::new();
        for _ in 0..60 {
            let mut commands = Vec::new();
            ai.handle(query::state(&world), &query::actor_view(&world), &mut commands);
            commands.push(Command::Tick {
                dt: Duration::from_millis(33),
            });
            for command in commands {
                world::apply(&mut world, command, &mut events).expect("command");
            }
        }
        let cells: Vec<(ActorKind, CellCoord)> = query::actor_view(&world)
            .iter()
            .map(|actor| (actor.kind, actor.cell))
            .collect();
        (events, cells)
    };

    let (first_events, first_cells) = run();
    let (second_events, second_cells) = run();
    assert_eq!(first_events, second_events);
    assert_eq!(first_cells, second_cells);
    assert!(first_events
        .iter()
        .any(|event| matches!(event, Event::ShotFired { .. })));
}

#[test]
fn tuning_reads_partial_toml() {
    let tuning: Tuning = toml::from_str("fire_chance = 0.25").expect("parse tuning");
    assert_eq!(tuning.fire_chance, 0.25);
    assert_eq!(tuning.horizontal_step, Tuning::default().horizontal_step);
}

use std::time::Duration;

use gridfire_core::{ActorKind, CellCoord, Command, Event, SimulationState};
use gridfire_system_spawning::{Config, Spawning};
use gridfire_world::{self as world, query, World, WorldConfig};

fn advanced(millis: u64) -> Event {
    Event::TimeAdvanced {
        dt: Duration::from_millis(millis),
    }
}

fn spawn_cells(commands: &[Command]) -> Vec<CellCoord> {
    commands
        .iter()
        .map(|command| match command {
            Command::SpawnEnemy { cell } => *cell,
            other => panic!("unexpected command emitted: {other:?}"),
        })
        .collect()
}

#[test]
fn emits_multiple_spawn_commands_for_large_dt() {
    let mut spawning = Spawning::new(Config::new(Duration::from_millis(500), 0x1234_5678));
    let mut commands = Vec::new();

    spawning.handle(
        &[Event::TimeAdvanced {
            dt: Duration::from_secs(2),
        }],
        SimulationState::Play,
        (80, 40),
        4,
        &mut commands,
    );

    let cells = spawn_cells(&commands);
    assert_eq!(cells.len(), 4, "expected one spawn per interval");
    for cell in cells {
        assert_eq!(cell.row(), 4);
        assert!(cell.column() <= 76);
    }
}

#[test]
fn leaving_play_resets_cadence_and_requests() {
    let mut spawning = Spawning::new(Config::new(Duration::from_secs(1), 0x4d59_5df4_d0f3_3173));
    let mut commands = Vec::new();

    spawning.handle(&[advanced(500)], SimulationState::Play, (40, 20), 4, &mut commands);
    assert!(commands.is_empty(), "no spawn before full interval");

    spawning.request();
    spawning.handle(&[], SimulationState::Pause, (40, 20), 4, &mut commands);
    assert!(commands.is_empty(), "paused simulation spawns nothing");

    spawning.handle(&[advanced(500)], SimulationState::Play, (40, 20), 4, &mut commands);
    assert!(
        commands.is_empty(),
        "accumulator and requests should reset outside play"
    );

    spawning.handle(&[advanced(500)], SimulationState::Play, (40, 20), 4, &mut commands);
    assert_eq!(commands.len(), 1);
}

#[test]
fn requests_are_served_without_a_cadence() {
    let mut spawning = Spawning::new(Config::new(Duration::ZERO, 99));
    let mut commands = Vec::new();

    spawning.request();
    spawning.request();
    spawning.handle(&[advanced(33)], SimulationState::Play, (40, 20), 4, &mut commands);
    assert_eq!(commands.len(), 2);

    commands.clear();
    spawning.handle(&[advanced(33)], SimulationState::Play, (40, 20), 4, &mut commands);
    assert!(commands.is_empty(), "requests are consumed once");
}

#[test]
fn identical_seeds_choose_identical_columns() {
    let run = || {
        let mut spawning = Spawning::new(Config::new(Duration::from_millis(100), 0xfeed));
        let mut commands = Vec::new();
        for _ in 0..10 {
            spawning.handle(&[advanced(100)], SimulationState::Play, (60, 30), 4, &mut commands);
        }
        spawn_cells(&commands)
    };

    assert_eq!(run(), run());
}

#[test]
fn spawn_commands_are_accepted_by_the_world() {
    let mut world = World::new(60, 30, WorldConfig::default());
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SetState {
            state: SimulationState::Play,
        },
        &mut events,
    )
    .expect("init -> play");

    let enemy_width = query::config(&world).enemy.glyph.width();
    let mut spawning = Spawning::new(Config::new(Duration::ZERO, 3));
    spawning.request();
    let mut commands = Vec::new();
    spawning.handle(
        &[],
        query::state(&world),
        query::dimensions(&world),
        enemy_width,
        &mut commands,
    );

    events.clear();
    for command in commands {
        world::apply(&mut world, command, &mut events).expect("spawn");
    }

    assert!(events.iter().any(|event| matches!(
        event,
        Event::ActorSpawned {
            kind: ActorKind::Enemy,
            ..
        }
    )));
    assert_eq!(query::actor_view(&world).of_kind(ActorKind::Enemy).count(), 1);
}

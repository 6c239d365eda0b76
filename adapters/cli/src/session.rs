//! Drives the world, its systems, and the surrounding game-state machine.

use std::{
    fmt,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use gridfire_core::{
    dispatch_hooks, ActorKind, Command, Event, GameStateHooks, SimulationState,
};
use gridfire_system_clock::{frame_duration, FramePacer};
use gridfire_system_enemy_ai::EnemyAi;
use gridfire_system_spawning::{Config as SpawningConfig, Spawning};
use gridfire_world::{self as world, query, World};

use crate::{
    config::FileConfig,
    keymap::{Input, Script, UnknownCommand},
};

/// Construction parameters gathered from the command line.
#[derive(Clone, Debug)]
pub(crate) struct SessionSettings {
    pub(crate) columns: u32,
    pub(crate) rows: u32,
    pub(crate) seed: u64,
    pub(crate) spawn_interval: Duration,
}

/// One game: the world, the systems feeding it, and run statistics.
pub(crate) struct Session {
    world: World,
    enemy_ai: EnemyAi,
    spawning: Spawning,
    enemy_width: u32,
    last_events: Vec<Event>,
    requested_states: Vec<SimulationState>,
    stats: Stats,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Stats {
    ticks: u64,
    shots_fired: u64,
    enemies_spawned: u64,
    enemies_destroyed: u64,
    spawns_rejected: u64,
}

impl Session {
    /// Builds the world and starts play.
    pub(crate) fn start(settings: &SessionSettings, config: FileConfig) -> Result<Self> {
        let FileConfig { world, enemy_ai } = config;
        let enemy_width = world.enemy.glyph.width();
        let mut session = Self {
            world: World::new(settings.columns, settings.rows, world),
            enemy_ai: EnemyAi::new(enemy_ai, settings.seed),
            spawning: Spawning::new(SpawningConfig::new(
                settings.spawn_interval,
                settings.seed.rotate_left(32),
            )),
            enemy_width,
            last_events: Vec::new(),
            requested_states: Vec::new(),
            stats: Stats::default(),
        };
        session.submit(Command::SetState {
            state: SimulationState::Play,
        })?;
        log::info!(
            "session started on a {}x{} grid",
            settings.columns,
            settings.rows
        );
        Ok(session)
    }

    /// Current state of the simulation.
    pub(crate) fn state(&self) -> SimulationState {
        query::state(&self.world)
    }

    /// Whether the run loop should stop.
    pub(crate) fn finished(&self) -> bool {
        matches!(
            self.state(),
            SimulationState::GameOver | SimulationState::Quit
        )
    }

    /// Runs one tick: input, systems, simulation, then game-state hooks.
    pub(crate) fn step(&mut self, input: Option<Input>, dt: Duration) -> Result<()> {
        let mut commands = Vec::new();
        if let Some(input) = input {
            log::debug!("input {input}");
            match input.command() {
                Some(command) => commands.push(command),
                None => self.spawning.request(),
            }
        }

        let state = self.state();
        self.enemy_ai
            .handle(state, &query::actor_view(&self.world), &mut commands);
        self.spawning.handle(
            &self.last_events,
            state,
            query::dimensions(&self.world),
            self.enemy_width,
            &mut commands,
        );
        commands.push(Command::Tick { dt });

        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut events)
                .context("world rejected a command")?;
        }
        self.record(&events);

        dispatch_hooks(&events, self);
        for state in std::mem::take(&mut self.requested_states) {
            self.submit(Command::SetState { state })?;
        }

        self.last_events = events;
        Ok(())
    }

    fn submit(&mut self, command: Command) -> Result<()> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events)
            .context("world rejected a state change")?;
        for event in &events {
            if let Event::StateChanged { from, to } = event {
                log::info!("state {from} -> {to}");
            }
        }
        Ok(())
    }

    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::TimeAdvanced { .. } => self.stats.ticks += 1,
                Event::ShotFired { .. } => self.stats.shots_fired += 1,
                Event::ActorSpawned {
                    kind: ActorKind::Enemy,
                    ..
                } => self.stats.enemies_spawned += 1,
                Event::ActorDestroyed {
                    kind: ActorKind::Enemy,
                    ..
                } => self.stats.enemies_destroyed += 1,
                Event::SpawnRejected { reason, cell, .. } => {
                    log::debug!("spawn at {cell:?} rejected: {reason:?}");
                    self.stats.spawns_rejected += 1;
                }
                _ => {}
            }
        }
    }

    /// Final report of the run.
    pub(crate) fn summary(&self, diagnostics: Vec<UnknownCommand>) -> Summary {
        let view = query::actor_view(&self.world);
        Summary {
            state: self.state(),
            elapsed: query::elapsed(&self.world),
            stats: self.stats,
            player_hp: query::player(&self.world)
                .and_then(|player| view.get(player))
                .map(|player| player.hp),
            live_enemies: view.of_kind(ActorKind::Enemy).count(),
            live_projectiles: view.of_kind(ActorKind::Projectile).count(),
            diagnostics,
        }
    }
}

impl GameStateHooks for Session {
    fn on_player_destroyed(&mut self) {
        log::info!("player destroyed");
        self.requested_states.push(SimulationState::GameOver);
    }

    fn on_quit_requested(&mut self) {
        self.requested_states.push(SimulationState::Quit);
    }
}

/// How ticks are paced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Pacing {
    /// Fixed `1 / framerate` steps with no waiting.
    Headless,
    /// Busy-polls the wall clock, releasing at most `framerate` ticks a second.
    RealTime,
}

/// Runs until quit, game over, or `max_ticks` ticks.
pub(crate) fn run(
    session: &mut Session,
    script: &Script,
    max_ticks: u64,
    framerate: u32,
    pacing: Pacing,
) -> Result<()> {
    let mut pacer = match pacing {
        Pacing::Headless => None,
        Pacing::RealTime => Some(FramePacer::new(framerate, Instant::now())?),
    };
    let fixed_dt = frame_duration(framerate)?;

    let mut tick = 0_usize;
    while (tick as u64) < max_ticks && !session.finished() {
        let dt = match pacer.as_mut() {
            None => fixed_dt,
            Some(pacer) => match pacer.poll(Instant::now()) {
                Some(dt) => dt,
                None => {
                    std::hint::spin_loop();
                    continue;
                }
            },
        };
        session.step(script.input_at(tick), dt)?;
        tick += 1;
    }
    Ok(())
}

/// End-of-run report printed by the binary.
#[derive(Clone, Debug)]
pub(crate) struct Summary {
    state: SimulationState,
    elapsed: Duration,
    stats: Stats,
    player_hp: Option<i32>,
    live_enemies: usize,
    live_projectiles: usize,
    diagnostics: Vec<UnknownCommand>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "state: {}", self.state)?;
        writeln!(
            f,
            "ticks: {} ({:.2}s simulated)",
            self.stats.ticks,
            self.elapsed.as_secs_f64()
        )?;
        match self.player_hp {
            Some(hp) => writeln!(f, "player hp: {hp}")?,
            None => writeln!(f, "player: destroyed")?,
        }
        writeln!(
            f,
            "enemies: {} live, {} spawned, {} destroyed, {} rejected",
            self.live_enemies,
            self.stats.enemies_spawned,
            self.stats.enemies_destroyed,
            self.stats.spawns_rejected
        )?;
        writeln!(
            f,
            "projectiles: {} live, {} fired",
            self.live_projectiles, self.stats.shots_fired
        )?;
        if self.diagnostics.is_empty() {
            return Ok(());
        }
        writeln!(f, "diagnostics:")?;
        for diagnostic in &self.diagnostics {
            writeln!(f, "  {diagnostic}")?;
        }
        Ok(())
    }
}

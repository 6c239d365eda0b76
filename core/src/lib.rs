#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Gridfire simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing logical intents, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values that systems and
//! the surrounding game-state machine react to. Systems consume event streams,
//! query immutable snapshots such as [`ActorView`] and [`OccupancyView`], and
//! respond exclusively with new command batches.

use std::{fmt, str::FromStr, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle states recognised by the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationState {
    /// The world was constructed but play has not started.
    Init,
    /// Ticks advance the simulation.
    Play,
    /// Ticks are ignored until play resumes.
    Pause,
    /// The player was destroyed; only quitting remains.
    GameOver,
    /// Terminal state requested by the player.
    Quit,
}

impl SimulationState {
    /// Every recognised state in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Init,
        Self::Play,
        Self::Pause,
        Self::GameOver,
        Self::Quit,
    ];

    /// Canonical lowercase name of the state.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Play => "play",
            Self::Pause => "pause",
            Self::GameOver => "gameover",
            Self::Quit => "quit",
        }
    }

    /// Reports whether the simulation may move from `self` into `next`.
    ///
    /// Re-entering the current state is always allowed and treated as a no-op
    /// by callers.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Init, Self::Init)
                | (Self::Play, Self::Play)
                | (Self::Pause, Self::Pause)
                | (Self::GameOver, Self::GameOver)
                | (Self::Quit, Self::Quit)
                | (Self::Init, Self::Play)
                | (Self::Play, Self::Pause)
                | (Self::Pause, Self::Play)
                | (Self::Play, Self::GameOver)
                | (Self::Pause, Self::GameOver)
                | (Self::Init, Self::Quit)
                | (Self::Play, Self::Quit)
                | (Self::Pause, Self::Quit)
                | (Self::GameOver, Self::Quit)
        )
    }

    /// Validates a transition, returning the state to adopt.
    pub fn transition(self, next: Self) -> Result<Self, StateError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(StateError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for SimulationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SimulationState {
    type Err = StateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalised = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|state| state.name() == normalised)
            .ok_or_else(|| StateError::Unknown(value.to_owned()))
    }
}

/// Failures raised when the game-state machine is misused.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StateError {
    /// The requested state name is not one of the recognised states.
    #[error("unknown simulation state `{0}`")]
    Unknown(String),
    /// The requested state exists but cannot be reached from the current one.
    #[error("invalid state transition from {from} to {to}")]
    InvalidTransition {
        /// State active when the request was made.
        from: SimulationState,
        /// State that was requested.
        to: SimulationState,
    },
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Requests a transition of the simulation state machine.
    SetState {
        /// State the world should adopt.
        state: SimulationState,
    },
    /// Queues a player displacement resolved during the next tick.
    ///
    /// Magnitudes are scaled by the player's speed and truncated towards zero.
    Move {
        /// Horizontal magnitude; positive moves right.
        dx: f32,
        /// Vertical magnitude; positive moves down.
        dy: f32,
    },
    /// Requests that the player fire a projectile.
    Shoot,
    /// Requests that the identified player or enemy fire a projectile.
    Fire {
        /// Actor attempting to fire.
        shooter: ActorId,
    },
    /// Requests creation of an enemy anchored at the provided cell.
    SpawnEnemy {
        /// Leftmost cell the enemy sprite should occupy.
        cell: CellCoord,
    },
    /// Replaces the velocity of an enemy ahead of the next movement pass.
    SteerEnemy {
        /// Enemy being steered.
        enemy: ActorId,
        /// Per-tick displacement magnitudes before speed scaling.
        velocity: Vec2,
    },
    /// Advances the simulation by one tick.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the session ends.
    Quit,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that the simulation entered a new state.
    StateChanged {
        /// State active before the transition.
        from: SimulationState,
        /// State active after the transition.
        to: SimulationState,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an actor was registered and placed on the grid.
    ActorSpawned {
        /// Identifier assigned to the actor.
        actor: ActorId,
        /// Variant of the actor.
        kind: ActorKind,
        /// Leftmost cell occupied by the actor.
        cell: CellCoord,
    },
    /// Reports that a spawn request could not be honoured.
    SpawnRejected {
        /// Variant that was requested.
        kind: ActorKind,
        /// Cell supplied with the request.
        cell: CellCoord,
        /// Specific reason the spawn failed.
        reason: SpawnError,
    },
    /// Confirms that a shooter released a projectile.
    ShotFired {
        /// Actor that fired.
        shooter: ActorId,
        /// Projectile created by the shot.
        projectile: ActorId,
    },
    /// Reports that a shot was released directly into an occupied cell.
    PointBlankHit {
        /// Actor that fired.
        shooter: ActorId,
        /// Actor occupying the projectile's spawn cell.
        target: ActorId,
    },
    /// Confirms that an actor changed position during a tick.
    ActorMoved {
        /// Actor that moved.
        actor: ActorId,
        /// Cell occupied before the tick's movement pass.
        from: CellCoord,
        /// Cell occupied after the tick's movement pass.
        to: CellCoord,
    },
    /// Reports that an actor attempted to leave the grid.
    BoundaryReached {
        /// Actor that touched the edge.
        actor: ActorId,
        /// Edge that was touched.
        edge: Edge,
    },
    /// Confirms that a queued collision pair was resolved.
    CollisionResolved {
        /// Actor whose movement discovered the collision.
        instigator: ActorId,
        /// Actor that occupied the contested cell.
        recipient: ActorId,
    },
    /// Reports a hit point change.
    ActorDamaged {
        /// Actor that took damage.
        actor: ActorId,
        /// Damage applied.
        amount: i32,
        /// Hit points remaining after the damage.
        hp: i32,
    },
    /// Confirms that an actor was removed from the registry and the grid.
    ActorDestroyed {
        /// Actor that was removed.
        actor: ActorId,
        /// Variant of the removed actor.
        kind: ActorKind,
        /// Leftmost cell the actor occupied when it was removed.
        cell: CellCoord,
    },
    /// Requests a game-over transition from the surrounding state machine.
    PlayerDestroyed {
        /// Identifier the player carried.
        actor: ActorId,
    },
    /// Requests an exit transition from the surrounding state machine.
    QuitRequested,
}

/// Reasons a spawn request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnError {
    /// The simulation is not in play.
    InvalidState,
    /// The sprite would extend beyond the grid bounds.
    OutOfBounds,
    /// The sprite would overlap another actor.
    Occupied,
}

/// Grid edges an actor may collide with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Column zero.
    Left,
    /// Last column.
    Right,
    /// Row zero.
    Top,
    /// Last row.
    Bottom,
}

/// Collidable actor variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActorKind {
    /// The singleton actor controlled by input.
    Player,
    /// Spawned hostiles that drift and fire.
    Enemy,
    /// Shots released by players and enemies.
    Projectile,
}

/// Vertical orientation used when firing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    /// Towards decreasing rows.
    Up,
    /// Towards increasing rows.
    Down,
}

impl Facing {
    /// Row delta associated with the orientation.
    #[must_use]
    pub const fn sign(self) -> i32 {
        match self {
            Self::Up => -1,
            Self::Down => 1,
        }
    }
}

/// Stable identifier assigned to an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(u32);

impl ActorId {
    /// Creates a new actor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Horizontal run of cells covered by a sprite: `[origin, origin + width)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellSpan {
    origin: CellCoord,
    width: u32,
}

impl CellSpan {
    /// Constructs a span anchored at `origin` covering `width` columns.
    #[must_use]
    pub const fn new(origin: CellCoord, width: u32) -> Self {
        Self { origin, width }
    }

    /// Number of columns covered.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Iterates the covered cells from left to right.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let row = self.origin.row();
        let start = self.origin.column();
        (start..start.saturating_add(self.width)).map(move |column| CellCoord::new(column, row))
    }

    /// Reports whether the span covers `cell`.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.row() == self.origin.row()
            && cell.column() >= self.origin.column()
            && cell.column() < self.origin.column().saturating_add(self.width)
    }
}

/// Display glyph of an actor; its character count is the sprite width.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Glyph(String);

impl Glyph {
    /// Wraps the provided text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Text drawn for the actor.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of cells covered by the glyph. Empty glyphs still cover one cell.
    #[must_use]
    pub fn width(&self) -> u32 {
        let count = u32::try_from(self.0.chars().count()).unwrap_or(u32::MAX);
        count.max(1)
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable representation of a single actor's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct ActorSnapshot {
    /// Identifier assigned to the actor.
    pub id: ActorId,
    /// Variant of the actor.
    pub kind: ActorKind,
    /// Leftmost cell occupied by the actor.
    pub cell: CellCoord,
    /// Glyph drawn for the actor.
    pub glyph: Glyph,
    /// Remaining hit points.
    pub hp: i32,
    /// Current per-tick velocity before speed scaling.
    pub velocity: Vec2,
    /// Orientation used when firing.
    pub facing: Facing,
}

impl ActorSnapshot {
    /// Cells covered by the actor's sprite.
    #[must_use]
    pub fn span(&self) -> CellSpan {
        CellSpan::new(self.cell, self.glyph.width())
    }
}

/// Immutable representation of a display-only effect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectSnapshot {
    /// Leftmost cell the effect is drawn at.
    pub cell: CellCoord,
    /// Glyph drawn for the effect.
    pub glyph: Glyph,
    /// Ticks remaining before the effect disappears.
    pub remaining_ticks: u32,
}

/// Read-only snapshot of everything a renderer may draw after a tick.
#[derive(Clone, Debug, Default)]
pub struct ActorView {
    actors: Vec<ActorSnapshot>,
    effects: Vec<EffectSnapshot>,
}

impl ActorView {
    /// Creates a new view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut actors: Vec<ActorSnapshot>, effects: Vec<EffectSnapshot>) -> Self {
        actors.sort_by_key(|snapshot| snapshot.id);
        Self { actors, effects }
    }

    /// Iterator over the live actors in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ActorSnapshot> {
        self.actors.iter()
    }

    /// Iterator over live actors of a single variant.
    pub fn of_kind(&self, kind: ActorKind) -> impl Iterator<Item = &ActorSnapshot> {
        self.actors.iter().filter(move |snapshot| snapshot.kind == kind)
    }

    /// Looks up a single actor.
    #[must_use]
    pub fn get(&self, actor: ActorId) -> Option<&ActorSnapshot> {
        self.actors
            .binary_search_by_key(&actor, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.actors.get(index))
    }

    /// Display-only effects.
    #[must_use]
    pub fn effects(&self) -> &[EffectSnapshot] {
        &self.effects
    }
}

/// Read-only view into the dense occupancy grid.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyView<'a> {
    cells: &'a [Option<ActorId>],
    columns: u32,
    rows: u32,
}

impl<'a> OccupancyView<'a> {
    /// Captures a new occupancy view backed by the provided row-major cells.
    #[must_use]
    pub fn new(cells: &'a [Option<ActorId>], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Returns the occupant at signed coordinates; anything off-grid is empty.
    #[must_use]
    pub fn occupant_at(&self, x: i64, y: i64) -> Option<ActorId> {
        self.index(x, y)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Every cell currently claimed by `actor`, in row-major order.
    #[must_use]
    pub fn cells_of(&self, actor: ActorId) -> Vec<CellCoord> {
        let width = self.columns.max(1);
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, occupant)| **occupant == Some(actor))
            .filter_map(|(index, _)| {
                let index = u32::try_from(index).ok()?;
                Some(CellCoord::new(index % width, index / width))
            })
            .collect()
    }

    /// Returns an iterator over all cells.
    pub fn iter(&self) -> impl Iterator<Item = Option<ActorId>> + 'a {
        self.cells.iter().copied()
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= i64::from(self.columns) || y >= i64::from(self.rows) {
            return None;
        }
        let row = usize::try_from(y).ok()?;
        let column = usize::try_from(x).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }
}

/// Transitions the core requests from the surrounding game-state machine.
pub trait GameStateHooks {
    /// Called once for every destroyed player.
    fn on_player_destroyed(&mut self);

    /// Called once for every quit request.
    fn on_quit_requested(&mut self);
}

/// Forwards game-state requests found in `events` to `hooks`.
pub fn dispatch_hooks<H>(events: &[Event], hooks: &mut H)
where
    H: GameStateHooks + ?Sized,
{
    for event in events {
        match event {
            Event::PlayerDestroyed { .. } => hooks.on_player_destroyed(),
            Event::QuitRequested => hooks.on_quit_requested(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn actor_id_round_trips_through_bincode() {
        assert_round_trip(&ActorId::new(42));
    }

    #[test]
    fn state_names_parse_case_insensitively() {
        assert_eq!("GameOver".parse::<SimulationState>(), Ok(SimulationState::GameOver));
        assert_eq!(" play ".parse::<SimulationState>(), Ok(SimulationState::Play));
    }

    #[test]
    fn unknown_state_name_is_rejected() {
        assert_eq!(
            "victory".parse::<SimulationState>(),
            Err(StateError::Unknown("victory".to_owned()))
        );
    }

    #[test]
    fn quit_is_terminal() {
        for next in SimulationState::ALL {
            let result = SimulationState::Quit.transition(next);
            if next == SimulationState::Quit {
                assert_eq!(result, Ok(SimulationState::Quit));
            } else {
                assert!(result.is_err(), "quit -> {next} should be rejected");
            }
        }
    }

    #[test]
    fn game_over_cannot_resume_play() {
        assert_eq!(
            SimulationState::GameOver.transition(SimulationState::Play),
            Err(StateError::InvalidTransition {
                from: SimulationState::GameOver,
                to: SimulationState::Play,
            })
        );
    }

    #[test]
    fn glyph_width_counts_characters() {
        assert_eq!(Glyph::new("<-->").width(), 4);
        assert_eq!(Glyph::new("/=\\").width(), 3);
        assert_eq!(Glyph::new("").width(), 1);
    }

    #[test]
    fn span_covers_half_open_range() {
        let span = CellSpan::new(CellCoord::new(4, 2), 3);
        let cells: Vec<_> = span.cells().collect();
        assert_eq!(
            cells,
            vec![CellCoord::new(4, 2), CellCoord::new(5, 2), CellCoord::new(6, 2)]
        );
        assert!(span.contains(CellCoord::new(6, 2)));
        assert!(!span.contains(CellCoord::new(7, 2)));
        assert!(!span.contains(CellCoord::new(5, 3)));
    }

    #[test]
    fn occupancy_view_treats_off_grid_queries_as_empty() {
        let cells = vec![Some(ActorId::new(1)); 6];
        let view = OccupancyView::new(&cells, 3, 2);
        assert_eq!(view.occupant_at(2, 1), Some(ActorId::new(1)));
        assert_eq!(view.occupant_at(-1, 0), None);
        assert_eq!(view.occupant_at(3, 0), None);
        assert_eq!(view.occupant_at(0, 2), None);
    }

    #[derive(Default)]
    struct Recorder {
        game_overs: usize,
        quits: usize,
    }

    impl GameStateHooks for Recorder {
        fn on_player_destroyed(&mut self) {
            self.game_overs += 1;
        }

        fn on_quit_requested(&mut self) {
            self.quits += 1;
        }
    }

    #[test]
    fn dispatch_forwards_each_request_once() {
        let mut recorder = Recorder::default();
        let events = vec![
            Event::TimeAdvanced {
                dt: Duration::from_millis(33),
            },
            Event::PlayerDestroyed {
                actor: ActorId::new(0),
            },
            Event::QuitRequested,
        ];
        dispatch_hooks(&events, &mut recorder);
        assert_eq!(recorder.game_overs, 1);
        assert_eq!(recorder.quits, 1);
    }
}

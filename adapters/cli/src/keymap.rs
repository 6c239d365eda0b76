//! Logical input names and the commands they stand for.

use std::fmt;

use gridfire_core::Command;
use thiserror::Error;

/// Logical inputs understood by the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Input {
    Left,
    Right,
    Up,
    Down,
    DashLeft,
    DashRight,
    Shoot,
    Spawn,
    Quit,
}

/// Raised for script tokens with no binding.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown command `{token}` at tick {tick}")]
pub(crate) struct UnknownCommand {
    pub(crate) tick: usize,
    pub(crate) token: String,
}

const BINDINGS: [(&str, Input); 9] = [
    ("left", Input::Left),
    ("right", Input::Right),
    ("up", Input::Up),
    ("down", Input::Down),
    ("dash-left", Input::DashLeft),
    ("dash-right", Input::DashRight),
    ("shoot", Input::Shoot),
    ("spawn", Input::Spawn),
    ("quit", Input::Quit),
];

const DASH: f32 = 3.0;

impl Input {
    /// Looks up a binding; unbound names yield `None`.
    pub(crate) fn lookup(token: &str) -> Option<Self> {
        BINDINGS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(token))
            .map(|(_, input)| *input)
    }

    /// World command for the input. Spawning is routed through the spawning system.
    pub(crate) fn command(self) -> Option<Command> {
        let (dx, dy) = match self {
            Self::Left => (-1.0, 0.0),
            Self::Right => (1.0, 0.0),
            Self::Up => (0.0, -1.0),
            Self::Down => (0.0, 1.0),
            Self::DashLeft => (-DASH, 0.0),
            Self::DashRight => (DASH, 0.0),
            Self::Shoot => return Some(Command::Shoot),
            Self::Quit => return Some(Command::Quit),
            Self::Spawn => return None,
        };
        Some(Command::Move { dx, dy })
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = BINDINGS
            .iter()
            .find(|(_, input)| input == self)
            .map_or("?", |(name, _)| name);
        f.write_str(name)
    }
}

/// Per-tick input tokens; `.` marks an idle tick.
#[derive(Clone, Debug, Default)]
pub(crate) struct Script {
    ticks: Vec<Option<Input>>,
}

impl Script {
    /// Parses whitespace separated tokens, collecting the unbound ones.
    ///
    /// Unknown tokens still consume their tick so the rest of the script keeps
    /// its timing.
    pub(crate) fn parse(text: &str) -> (Self, Vec<UnknownCommand>) {
        let mut ticks = Vec::new();
        let mut unknown = Vec::new();
        for (tick, token) in text.split_whitespace().enumerate() {
            if token == "." {
                ticks.push(None);
                continue;
            }
            let input = Input::lookup(token);
            if input.is_none() {
                unknown.push(UnknownCommand {
                    tick,
                    token: token.to_owned(),
                });
            }
            ticks.push(input);
        }
        (Self { ticks }, unknown)
    }

    /// Input scheduled for `tick`; ticks past the end are idle.
    pub(crate) fn input_at(&self, tick: usize) -> Option<Input> {
        self.ticks.get(tick).copied().flatten()
    }
}

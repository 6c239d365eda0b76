#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Gridfire session without a display.
//!
//! Input arrives as a script of logical command names, one per tick, and the
//! run ends with a plain-text summary.

mod config;
mod keymap;
mod logging;
mod session;

use std::{path::PathBuf, time::Duration};

use anyhow::{ensure, Result};
use clap::Parser;

use crate::{
    config::FileConfig,
    keymap::Script,
    session::{Pacing, Session, SessionSettings},
};

/// Headless driver for the Gridfire simulation.
#[derive(Debug, Parser)]
#[command(name = "gridfire", author, version, about, long_about = None)]
struct Args {
    /// Grid width in character cells.
    #[arg(long, default_value_t = 80)]
    width: u32,
    /// Grid height in character cells.
    #[arg(long, default_value_t = 24)]
    height: u32,
    /// Stop after this many ticks.
    #[arg(long, default_value_t = 300)]
    ticks: u64,
    /// Seed for enemy behaviour and spawn columns.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Maximum ticks per second.
    #[arg(long, default_value_t = 30)]
    framerate: u32,
    /// Periodic enemy spawn cadence in milliseconds; 0 spawns only on request.
    #[arg(long, default_value_t = 0)]
    spawn_interval_ms: u64,
    /// TOML file overriding world and enemy tuning.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Whitespace separated inputs, one per tick (`.` idles).
    #[arg(long, default_value = "")]
    script: String,
    /// Step with a fixed delta instead of pacing against the wall clock.
    #[arg(long)]
    headless: bool,
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    ensure!(
        args.width > 0 && args.height > 0,
        "grid dimensions must be positive"
    );
    let config = FileConfig::load(args.config.as_deref())?;
    let (script, diagnostics) = Script::parse(&args.script);
    for diagnostic in &diagnostics {
        log::warn!("{diagnostic}");
    }

    let settings = SessionSettings {
        columns: args.width,
        rows: args.height,
        seed: args.seed,
        spawn_interval: Duration::from_millis(args.spawn_interval_ms),
    };
    let pacing = if args.headless {
        Pacing::Headless
    } else {
        Pacing::RealTime
    };

    let mut session = Session::start(&settings, config)?;
    session::run(&mut session, &script, args.ticks, args.framerate, pacing)?;
    print!("{}", session.summary(diagnostics));
    Ok(())
}

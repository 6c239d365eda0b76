#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame pacing for the simulation loop.
//!
//! The pacer never sleeps. Callers poll it with the current instant and only
//! run a tick when it hands back a delta; polls that arrive before a full frame
//! elapsed are skipped.

use std::time::{Duration, Instant};

use thiserror::Error;

/// Rejected pacer configurations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PacerError {
    /// A zero frame rate would never release a tick.
    #[error("frame rate must be positive")]
    ZeroFramerate,
}

/// Gates ticks to at most `framerate_max` per second.
#[derive(Clone, Copy, Debug)]
pub struct FramePacer {
    frame: Duration,
    last: Instant,
}

impl FramePacer {
    /// Creates a pacer whose first frame is measured from `start`.
    pub fn new(framerate_max: u32, start: Instant) -> Result<Self, PacerError> {
        Ok(Self {
            frame: frame_duration(framerate_max)?,
            last: start,
        })
    }

    /// Minimum time between two released ticks.
    #[must_use]
    pub const fn frame(&self) -> Duration {
        self.frame
    }

    /// Returns the elapsed time when strictly more than one frame passed.
    ///
    /// Released deltas are measured from the previous release, so slow polls
    /// produce proportionally larger deltas rather than bursts of ticks.
    pub fn poll(&mut self, now: Instant) -> Option<Duration> {
        let elapsed = now.saturating_duration_since(self.last);
        if elapsed <= self.frame {
            return None;
        }
        self.last = now;
        log::trace!("frame released after {elapsed:?}");
        Some(elapsed)
    }
}

/// Length of one frame at `framerate_max` frames per second.
pub fn frame_duration(framerate_max: u32) -> Result<Duration, PacerError> {
    if framerate_max == 0 {
        return Err(PacerError::ZeroFramerate);
    }
    Ok(Duration::from_secs(1) / framerate_max)
}

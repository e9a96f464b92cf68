//! Error taxonomy for the presentation core.
//!
//! Nothing here is fatal to a running presentation: media and gameplay errors
//! degrade a phase, schedule and config errors surface only while loading.

use thiserror::Error;

use super::types::CueId;

/// An audio cue could not be started.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("playback of cue {0} was blocked by the platform")]
    PlaybackBlocked(CueId),
    #[error("cue {0} failed to load")]
    Unavailable(CueId),
}

/// The gameplay entry point was requested before the renderer behind it exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GameplayError {
    #[error("gameplay entry point is not ready")]
    NotReady,
}

/// A timeline that cannot be scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("timeline has no segments")]
    EmptyTimeline,
    #[error("segment index {index} does not follow {previous}")]
    OutOfOrder { previous: u32, index: u32 },
    #[error("segments need {required_ms} ms but the budget is {budget_ms} ms")]
    OverBudget { required_ms: u64, budget_ms: u64 },
    #[error("segment durations overflow")]
    Overflow,
}

/// A presentation config that failed to load.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed presentation config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid ambient timeline: {0}")]
    Schedule(#[from] ScheduleError),
}

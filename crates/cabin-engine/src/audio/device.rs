//! Audio collaborator contract.

use crate::api::error::MediaError;
use crate::api::types::CueId;

/// Audio playback provided by the host.
pub trait AudioDevice {
    /// Rewind `cue` to its start and play it. A platform rejection (autoplay
    /// policy, missing file) is reported as an error, never as a panic.
    fn play(&mut self, cue: CueId, looping: bool) -> Result<(), MediaError>;

    /// Pause `cue`. Pausing a cue that is not playing is a no-op.
    fn pause(&mut self, cue: CueId);

    /// Set the gain of `cue` in [0, 1].
    fn set_volume(&mut self, cue: CueId, volume: f32);
}

/// What happened when a cue was asked to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    Played,
    /// Playback failed; the caller carries on silently.
    Skipped(MediaError),
}

impl PlayOutcome {
    pub fn is_played(&self) -> bool {
        matches!(self, PlayOutcome::Played)
    }
}

/// Start `cue` and turn any failure into a logged `Skipped` outcome.
pub fn play_cue<A: AudioDevice + ?Sized>(audio: &mut A, cue: CueId, looping: bool) -> PlayOutcome {
    match audio.play(cue, looping) {
        Ok(()) => {
            log::debug!("cue {cue} started");
            PlayOutcome::Played
        }
        Err(err) => {
            log::warn!("{err}; continuing without it");
            PlayOutcome::Skipped(err)
        }
    }
}

//! Ducking mixer for the single background loop.
//!
//! The mixer exclusively owns the loop's gain. Foreground narration lowers it,
//! the end of a clip restores it, and a loop the platform refused to start is
//! treated as absent for the rest of the run.

use crate::api::types::CueId;
use super::device::{AudioDevice, play_cue};

/// Gain while nothing is ducking the loop.
pub const DEFAULT_BASE_GAIN: f32 = 1.0;
/// Gain while foreground narration plays.
pub const DEFAULT_DUCK_GAIN: f32 = 0.5;

/// Playback state of the background loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Configured but not started.
    Idle,
    Playing,
    /// Silenced; `start_loop` may resume it.
    Paused,
    /// No loop configured, or the platform refused it. Terminal.
    Absent,
}

#[derive(Debug, Clone)]
pub struct DuckingMixer {
    cue: Option<CueId>,
    state: LoopState,
    base_gain: f32,
    duck_gain: f32,
    /// Foreground narration active (the duck state).
    foreground: bool,
}

impl DuckingMixer {
    pub fn new(cue: Option<CueId>, base_gain: f32, duck_gain: f32) -> Self {
        Self {
            cue,
            state: if cue.is_some() { LoopState::Idle } else { LoopState::Absent },
            base_gain: base_gain.clamp(0.0, 1.0),
            duck_gain: duck_gain.clamp(0.0, 1.0),
            foreground: false,
        }
    }

    /// A mixer with no background loop at all.
    pub fn silent() -> Self {
        Self::new(None, DEFAULT_BASE_GAIN, DEFAULT_DUCK_GAIN)
    }

    /// Start (or resume) the loop. A refusal marks the loop absent for good.
    pub fn start_loop<A: AudioDevice + ?Sized>(&mut self, audio: &mut A) -> LoopState {
        let cue = match (self.state, self.cue) {
            (LoopState::Idle | LoopState::Paused, Some(cue)) => cue,
            _ => return self.state,
        };
        audio.set_volume(cue, self.gain());
        self.state = if play_cue(audio, cue, true).is_played() {
            log::info!("background loop playing");
            LoopState::Playing
        } else {
            log::info!("background loop unavailable; running without it");
            LoopState::Absent
        };
        self.state
    }

    /// Duck the loop while foreground narration is active.
    pub fn set_foreground<A: AudioDevice + ?Sized>(&mut self, active: bool, audio: &mut A) {
        self.foreground = active;
        if let (LoopState::Playing, Some(cue)) = (self.state, self.cue) {
            audio.set_volume(cue, self.gain());
        }
    }

    /// Restore the pre-duck gain and pause the loop.
    pub fn silence<A: AudioDevice + ?Sized>(&mut self, audio: &mut A) {
        self.foreground = false;
        if let (LoopState::Playing, Some(cue)) = (self.state, self.cue) {
            audio.set_volume(cue, self.base_gain);
            audio.pause(cue);
            self.state = LoopState::Paused;
        }
    }

    /// Gain the loop should currently have.
    pub fn gain(&self) -> f32 {
        if self.foreground { self.duck_gain } else { self.base_gain }
    }

    pub fn is_foreground(&self) -> bool {
        self.foreground
    }

    pub fn state(&self) -> LoopState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::stage::testing::{Call, MockStage};

    const FIRE: CueId = CueId(100);

    #[test]
    fn ducks_and_restores() {
        let mut stage = MockStage::new();
        let mut mixer = DuckingMixer::new(Some(FIRE), 1.0, 0.5);

        assert_eq!(mixer.start_loop(&mut stage), LoopState::Playing);
        mixer.set_foreground(true, &mut stage);
        mixer.set_foreground(false, &mut stage);

        assert_eq!(stage.volumes(FIRE), vec![1.0, 0.5, 1.0]);
        assert!(stage.calls.contains(&Call::Play { cue: FIRE, looping: true }));
    }

    #[test]
    fn refused_loop_stays_absent() {
        let mut stage = MockStage::new();
        stage.block(FIRE);
        let mut mixer = DuckingMixer::new(Some(FIRE), 1.0, 0.5);

        assert_eq!(mixer.start_loop(&mut stage), LoopState::Absent);
        stage.calls.clear();

        mixer.set_foreground(true, &mut stage);
        assert!(mixer.is_foreground());
        mixer.silence(&mut stage);
        assert_eq!(mixer.start_loop(&mut stage), LoopState::Absent);
        assert!(stage.calls.is_empty());
    }

    #[test]
    fn silence_restores_gain_then_pauses() {
        let mut stage = MockStage::new();
        let mut mixer = DuckingMixer::new(Some(FIRE), 0.8, 0.4);
        mixer.start_loop(&mut stage);
        mixer.set_foreground(true, &mut stage);
        stage.calls.clear();

        mixer.silence(&mut stage);
        assert_eq!(stage.calls, vec![Call::Volume(FIRE, 0.8), Call::Pause(FIRE)]);
        assert_eq!(mixer.state(), LoopState::Paused);

        // Second silence is a no-op.
        stage.calls.clear();
        mixer.silence(&mut stage);
        assert!(stage.calls.is_empty());
    }

    #[test]
    fn paused_loop_can_restart() {
        let mut stage = MockStage::new();
        let mut mixer = DuckingMixer::new(Some(FIRE), 1.0, 0.5);
        mixer.start_loop(&mut stage);
        mixer.silence(&mut stage);
        assert_eq!(mixer.start_loop(&mut stage), LoopState::Playing);
    }

    #[test]
    fn silent_mixer_never_touches_audio() {
        let mut stage = MockStage::new();
        let mut mixer = DuckingMixer::silent();
        assert_eq!(mixer.start_loop(&mut stage), LoopState::Absent);
        mixer.set_foreground(true, &mut stage);
        assert!(stage.calls.is_empty());
    }
}

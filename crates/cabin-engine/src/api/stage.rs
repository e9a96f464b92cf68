//! The collaborator contract between the engine and its host.
//!
//! The engine never renders, plays, or boots gameplay itself. Every effect goes
//! through one of the traits below; a browser host implements them by queuing
//! commands for the page (see the `cabin-web` crate).

use crate::api::error::GameplayError;
use crate::api::types::CaptionLayer;
use crate::audio::device::AudioDevice;
use crate::fx::fade::FadeSurface;

/// Text overlays: story lines, title cards, the ambient narration caption.
pub trait CaptionSurface {
    /// Put `text` on `layer` and start its fade-in. Attaches the layer if needed.
    fn show_caption(&mut self, layer: CaptionLayer, text: &str, fade_ms: u64);

    /// Start fading `layer` out. The text stays until the next `show_caption`.
    fn hide_caption(&mut self, layer: CaptionLayer, fade_ms: u64);

    /// Remove `layer` from the page, including any resize/scroll observers it
    /// installed to track the scene.
    fn detach_caption(&mut self, layer: CaptionLayer);
}

/// The gameplay start entry point.
pub trait Gameplay {
    /// Start gameplay. Fails with `NotReady` while the renderer behind it is
    /// still booting; callers retry.
    fn try_start(&mut self) -> Result<(), GameplayError>;
}

/// Everything the presentation needs from its host.
pub trait Stage: AudioDevice + FadeSurface + CaptionSurface + Gameplay {}

impl<T: AudioDevice + FadeSurface + CaptionSurface + Gameplay> Stage for T {}

/// Recording stage for unit tests.
#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashSet;

    use super::*;
    use crate::api::error::MediaError;
    use crate::api::types::CueId;
    use crate::fx::fade::Rect;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Play { cue: CueId, looping: bool },
        Pause(CueId),
        Volume(CueId, f32),
        ClearFade,
        Fill { rect: Rect, alpha: f32 },
        ShowCaption { layer: CaptionLayer, text: String, fade_ms: u64 },
        HideCaption { layer: CaptionLayer, fade_ms: u64 },
        DetachCaption(CaptionLayer),
        StartGameplay,
    }

    pub struct MockStage {
        pub calls: Vec<Call>,
        pub scene: Rect,
        /// `try_start` fails this many times before succeeding (`u32::MAX` = never).
        pub gameplay_ready_after: u32,
        pub start_attempts: u32,
        blocked: HashSet<CueId>,
    }

    impl MockStage {
        pub const DEFAULT_SCENE: Rect = Rect::new(0.0, 0.0, 1280.0, 720.0);

        pub fn new() -> Self {
            Self {
                calls: Vec::new(),
                scene: Self::DEFAULT_SCENE,
                gameplay_ready_after: 0,
                start_attempts: 0,
                blocked: HashSet::new(),
            }
        }

        pub fn block(&mut self, cue: CueId) {
            self.blocked.insert(cue);
        }

        /// Alphas passed to `fill_fade`, in order.
        pub fn fills(&self) -> Vec<f32> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Fill { alpha, .. } => Some(*alpha),
                    _ => None,
                })
                .collect()
        }

        pub fn volumes(&self, cue: CueId) -> Vec<f32> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Volume(id, v) if *id == cue => Some(*v),
                    _ => None,
                })
                .collect()
        }

        /// Non-looping cues that were asked to play.
        pub fn played(&self) -> Vec<CueId> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Play { cue, looping: false } => Some(*cue),
                    _ => None,
                })
                .collect()
        }

        pub fn captions(&self, layer: CaptionLayer) -> Vec<String> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::ShowCaption { layer: l, text, .. } if *l == layer => Some(text.clone()),
                    _ => None,
                })
                .collect()
        }

        pub fn count(&self, call: &Call) -> usize {
            self.calls.iter().filter(|c| *c == call).count()
        }
    }

    impl AudioDevice for MockStage {
        fn play(&mut self, cue: CueId, looping: bool) -> Result<(), MediaError> {
            if self.blocked.contains(&cue) {
                return Err(MediaError::PlaybackBlocked(cue));
            }
            self.calls.push(Call::Play { cue, looping });
            Ok(())
        }

        fn pause(&mut self, cue: CueId) {
            self.calls.push(Call::Pause(cue));
        }

        fn set_volume(&mut self, cue: CueId, volume: f32) {
            self.calls.push(Call::Volume(cue, volume));
        }
    }

    impl FadeSurface for MockStage {
        fn target_rect(&self) -> Rect {
            self.scene
        }

        fn clear_fade(&mut self) {
            self.calls.push(Call::ClearFade);
        }

        fn fill_fade(&mut self, rect: Rect, alpha: f32) {
            self.calls.push(Call::Fill { rect, alpha });
        }
    }

    impl CaptionSurface for MockStage {
        fn show_caption(&mut self, layer: CaptionLayer, text: &str, fade_ms: u64) {
            self.calls.push(Call::ShowCaption { layer, text: text.to_string(), fade_ms });
        }

        fn hide_caption(&mut self, layer: CaptionLayer, fade_ms: u64) {
            self.calls.push(Call::HideCaption { layer, fade_ms });
        }

        fn detach_caption(&mut self, layer: CaptionLayer) {
            self.calls.push(Call::DetachCaption(layer));
        }
    }

    impl Gameplay for MockStage {
        fn try_start(&mut self) -> Result<(), GameplayError> {
            self.start_attempts += 1;
            if self.start_attempts <= self.gameplay_ready_after {
                return Err(GameplayError::NotReady);
            }
            self.calls.push(Call::StartGameplay);
            Ok(())
        }
    }
}

//! `Stage` implementation that queues host commands instead of touching the
//! page directly. The host reports back what the core cannot observe itself:
//! where the scene is, which cues the browser refused, and whether the
//! gameplay renderer exists yet.

use std::collections::HashMap;

use crate::api::error::{GameplayError, MediaError};
use crate::api::stage::{CaptionSurface, Gameplay};
use crate::api::types::{CaptionLayer, CueId};
use crate::audio::device::AudioDevice;
use crate::fx::fade::{FadeSurface, Rect};
use super::protocol::{CommandBuffer, HostCommand};

#[derive(Debug, Default)]
pub struct HostStage {
    commands: CommandBuffer,
    /// Last reported bounds of the scene element; empty when it is missing.
    scene_rect: Rect,
    viewport: Rect,
    failed: HashMap<CueId, MediaError>,
    gameplay_ready: bool,
}

impl HostStage {
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            commands: CommandBuffer::new(),
            viewport: Rect::new(0.0, 0.0, viewport_width, viewport_height),
            ..Self::default()
        }
    }

    pub fn set_scene_rect(&mut self, rect: Rect) {
        self.scene_rect = rect;
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Rect::new(0.0, 0.0, width, height);
    }

    /// The browser's autoplay policy rejected `cue`.
    pub fn report_blocked(&mut self, cue: CueId) {
        self.failed.insert(cue, MediaError::PlaybackBlocked(cue));
    }

    /// `cue` failed to load.
    pub fn report_unavailable(&mut self, cue: CueId) {
        self.failed.insert(cue, MediaError::Unavailable(cue));
    }

    /// Playback of `cue` is allowed again (after a user gesture, say).
    pub fn clear_media_error(&mut self, cue: CueId) {
        self.failed.remove(&cue);
    }

    pub fn set_gameplay_ready(&mut self, ready: bool) {
        self.gameplay_ready = ready;
    }

    pub fn commands(&self) -> &CommandBuffer {
        &self.commands
    }

    pub fn commands_mut(&mut self) -> &mut CommandBuffer {
        &mut self.commands
    }
}

impl AudioDevice for HostStage {
    fn play(&mut self, cue: CueId, looping: bool) -> Result<(), MediaError> {
        if let Some(err) = self.failed.get(&cue) {
            return Err(err.clone());
        }
        self.commands.push(HostCommand::play(cue, looping));
        Ok(())
    }

    fn pause(&mut self, cue: CueId) {
        self.commands.push(HostCommand::pause(cue));
    }

    fn set_volume(&mut self, cue: CueId, volume: f32) {
        self.commands.push(HostCommand::set_volume(cue, volume));
    }
}

impl FadeSurface for HostStage {
    fn target_rect(&self) -> Rect {
        if self.scene_rect.is_empty() {
            self.viewport
        } else {
            self.scene_rect
        }
    }

    fn clear_fade(&mut self) {
        self.commands.push(HostCommand::clear_fade());
    }

    fn fill_fade(&mut self, rect: Rect, alpha: f32) {
        self.commands.push(HostCommand::fill_fade(rect, alpha));
    }
}

impl CaptionSurface for HostStage {
    fn show_caption(&mut self, layer: CaptionLayer, text: &str, fade_ms: u64) {
        self.commands.push_caption(layer, text, fade_ms);
    }

    fn hide_caption(&mut self, layer: CaptionLayer, fade_ms: u64) {
        self.commands.push(HostCommand::hide_caption(layer, fade_ms));
    }

    fn detach_caption(&mut self, layer: CaptionLayer) {
        self.commands.push(HostCommand::detach_caption(layer));
    }
}

impl Gameplay for HostStage {
    fn try_start(&mut self) -> Result<(), GameplayError> {
        if !self.gameplay_ready {
            return Err(GameplayError::NotReady);
        }
        self.commands.push(HostCommand::start_gameplay());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::protocol::CommandKind;

    fn kinds(stage: &HostStage) -> Vec<CommandKind> {
        stage.commands().commands().iter().filter_map(|c| c.command_kind()).collect()
    }

    #[test]
    fn fade_falls_back_to_viewport_without_a_scene() {
        let mut stage = HostStage::new(800.0, 600.0);
        assert_eq!(stage.target_rect(), Rect::new(0.0, 0.0, 800.0, 600.0));

        let scene = Rect::new(40.0, 60.0, 640.0, 360.0);
        stage.set_scene_rect(scene);
        assert_eq!(stage.target_rect(), scene);
    }

    #[test]
    fn reported_media_errors_reject_playback() {
        let mut stage = HostStage::new(800.0, 600.0);
        stage.report_blocked(CueId(3));
        stage.report_unavailable(CueId(4));

        assert_eq!(stage.play(CueId(3), false), Err(MediaError::PlaybackBlocked(CueId(3))));
        assert_eq!(stage.play(CueId(4), true), Err(MediaError::Unavailable(CueId(4))));
        assert!(stage.commands().commands().is_empty());

        stage.clear_media_error(CueId(3));
        assert_eq!(stage.play(CueId(3), false), Ok(()));
        assert_eq!(kinds(&stage), vec![CommandKind::PlayCue]);
    }

    #[test]
    fn gameplay_waits_for_the_host() {
        let mut stage = HostStage::new(800.0, 600.0);
        assert_eq!(stage.try_start(), Err(GameplayError::NotReady));
        stage.set_gameplay_ready(true);
        assert_eq!(stage.try_start(), Ok(()));
        assert_eq!(kinds(&stage), vec![CommandKind::StartGameplay]);
    }

    #[test]
    fn captions_queue_with_their_text() {
        let mut stage = HostStage::new(800.0, 600.0);
        stage.show_caption(CaptionLayer::Title, "CABIN", 600);
        stage.hide_caption(CaptionLayer::Title, 500);
        stage.detach_caption(CaptionLayer::Title);

        assert_eq!(
            kinds(&stage),
            vec![CommandKind::ShowCaption, CommandKind::HideCaption, CommandKind::DetachCaption]
        );
        assert_eq!(stage.commands().caption(0), Some("CABIN"));
    }
}

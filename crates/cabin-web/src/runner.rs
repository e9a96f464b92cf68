use cabin_engine::{
    ConfigError, CueId, HostStage, Phase, PhaseController, PresentationConfig, Rect, Signal,
};
use cabin_engine::bridge::protocol::{HEADER_FLOATS, frame_header};

/// Wires the phase controller to the host page.
///
/// The page creates one runner through `cabin_init`, calls `cabin_tick` from
/// `requestAnimationFrame`, and after each tick reads the header, the command
/// buffer and the signal buffer through the pointer exports.
pub struct PresentationRunner {
    controller: PhaseController,
    stage: HostStage,
    header: [f32; HEADER_FLOATS],
    /// `Signal::code()` of every signal fired during the last tick.
    signal_buffer: Vec<u32>,
}

impl PresentationRunner {
    pub fn new(config: PresentationConfig, viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            controller: PhaseController::new(config),
            stage: HostStage::new(viewport_width, viewport_height),
            header: [0.0; HEADER_FLOATS],
            signal_buffer: Vec::with_capacity(Signal::COUNT),
        }
    }

    pub fn from_json(json: &str, viewport_width: f32, viewport_height: f32) -> Result<Self, ConfigError> {
        let config = PresentationConfig::from_json(json)?;
        Ok(Self::new(config, viewport_width, viewport_height))
    }

    /// Enter the first phase. Its commands are read after the next tick.
    pub fn start(&mut self) {
        self.stage.commands_mut().clear();
        self.controller.start(&mut self.stage);
    }

    /// Run one frame and pack its output for the host.
    pub fn tick(&mut self, dt_ms: f64) {
        // Commands queued by `start` or host inputs since the last tick are
        // kept; they belong to this frame.
        self.controller.tick(dt_ms, &mut self.stage);
        self.flush();
    }

    /// Game logic reported a win.
    pub fn victory(&mut self) {
        self.controller.raise_victory(&mut self.stage);
    }

    /// Fire a signal by its wire name. Returns false for unknown names and for
    /// signals the host is not allowed to raise.
    pub fn signal(&mut self, name: &str) -> bool {
        match Signal::from_name(name) {
            Some(signal) => self.controller.signal(signal, &mut self.stage),
            None => {
                log::warn!("unknown signal '{}'", name);
                false
            }
        }
    }

    pub fn set_scene_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.stage.set_scene_rect(Rect::new(x, y, width, height));
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.stage.set_viewport(width, height);
    }

    pub fn audio_blocked(&mut self, cue: u32) {
        self.stage.report_blocked(CueId(cue));
    }

    pub fn audio_unavailable(&mut self, cue: u32) {
        self.stage.report_unavailable(CueId(cue));
    }

    pub fn audio_allowed(&mut self, cue: u32) {
        self.stage.clear_media_error(CueId(cue));
    }

    pub fn gameplay_ready(&mut self, ready: bool) {
        self.stage.set_gameplay_ready(ready);
    }

    /// Hand the frame's output over and start collecting the next one.
    fn flush(&mut self) {
        self.signal_buffer.clear();
        self.signal_buffer
            .extend(self.controller.drain_signals().into_iter().map(Signal::code));
        self.header = frame_header(
            self.controller.frame(),
            self.controller.phase().code(),
            self.stage.commands().command_count(),
            self.signal_buffer.len() as u32,
            self.controller.fade_alpha(),
            self.controller.now_ms(),
        );
    }

    /// Drop the commands the host has consumed. Called at the top of each
    /// host frame, before any input is forwarded.
    pub fn begin_frame(&mut self) {
        self.stage.commands_mut().clear();
    }

    // ---- Pointer accessors for host reads ----

    pub fn header_ptr(&self) -> *const f32 {
        self.header.as_ptr()
    }

    pub fn commands_ptr(&self) -> *const f32 {
        self.stage.commands().commands_ptr()
    }

    pub fn command_count(&self) -> u32 {
        self.stage.commands().command_count()
    }

    pub fn caption_text(&self, slot: u32) -> Option<String> {
        self.stage.commands().caption(slot as usize).map(str::to_string)
    }

    pub fn signals_ptr(&self) -> *const u32 {
        self.signal_buffer.as_ptr()
    }

    pub fn signals_len(&self) -> u32 {
        self.signal_buffer.len() as u32
    }

    pub fn phase(&self) -> Phase {
        self.controller.phase()
    }

    pub fn prologue_complete(&self) -> bool {
        self.controller.flags().prologue_complete()
    }
}

/// Flat command/event layout shared with the host page.
/// Must stay in sync with TypeScript `protocol.ts`.
///
/// Layout (all values f32 / 4 bytes):
/// ```text
/// [Header: 8 floats]
/// [Commands: command_count × 6 floats]
/// ```
/// Caption text does not fit in floats; a caption command carries a slot index
/// and the host fetches the string for that slot in the same frame.
/// Emitted signals travel in a separate u32 buffer of `Signal::code()` values.

use bytemuck::{Pod, Zeroable};

use crate::api::types::{CaptionLayer, CueId};
use crate::fx::fade::Rect;

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 8;

/// Header field indices.
pub const HEADER_PROTOCOL_VERSION: usize = 0;
pub const HEADER_FRAME_COUNTER: usize = 1;
pub const HEADER_PHASE: usize = 2;
pub const HEADER_COMMAND_COUNT: usize = 3;
pub const HEADER_SIGNAL_COUNT: usize = 4;
pub const HEADER_FADE_ALPHA: usize = 5;
pub const HEADER_NOW_MS: usize = 6;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// What a host command asks the page to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandKind {
    /// a = layer, b = text slot, c = fade-in ms
    ShowCaption = 1,
    /// a = layer, b = fade-out ms
    HideCaption = 2,
    /// a = layer
    DetachCaption = 3,
    ClearFade = 4,
    /// a..d = x, y, width, height; e = alpha
    FillFade = 5,
    /// a = cue, b = 1.0 if looping
    PlayCue = 6,
    /// a = cue
    PauseCue = 7,
    /// a = cue, b = volume
    SetVolume = 8,
    StartGameplay = 9,
}

impl CommandKind {
    pub fn from_code(code: f32) -> Option<Self> {
        Some(match code as u8 {
            1 => Self::ShowCaption,
            2 => Self::HideCaption,
            3 => Self::DetachCaption,
            4 => Self::ClearFade,
            5 => Self::FillFade,
            6 => Self::PlayCue,
            7 => Self::PauseCue,
            8 => Self::SetVolume,
            9 => Self::StartGameplay,
            _ => return None,
        })
    }
}

/// One command for the host: 6 floats = 24 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct HostCommand {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
}

impl HostCommand {
    pub const FLOATS: usize = 6;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    fn new(kind: CommandKind, a: f32, b: f32, c: f32) -> Self {
        Self { kind: kind as u8 as f32, a, b, c, d: 0.0, e: 0.0 }
    }

    pub fn show_caption(layer: CaptionLayer, slot: u32, fade_ms: u64) -> Self {
        Self::new(CommandKind::ShowCaption, layer as u8 as f32, slot as f32, fade_ms as f32)
    }

    pub fn hide_caption(layer: CaptionLayer, fade_ms: u64) -> Self {
        Self::new(CommandKind::HideCaption, layer as u8 as f32, fade_ms as f32, 0.0)
    }

    pub fn detach_caption(layer: CaptionLayer) -> Self {
        Self::new(CommandKind::DetachCaption, layer as u8 as f32, 0.0, 0.0)
    }

    pub fn clear_fade() -> Self {
        Self::new(CommandKind::ClearFade, 0.0, 0.0, 0.0)
    }

    pub fn fill_fade(rect: Rect, alpha: f32) -> Self {
        Self {
            kind: CommandKind::FillFade as u8 as f32,
            a: rect.origin.x,
            b: rect.origin.y,
            c: rect.size.x,
            d: rect.size.y,
            e: alpha,
        }
    }

    pub fn play(cue: CueId, looping: bool) -> Self {
        Self::new(CommandKind::PlayCue, cue.0 as f32, if looping { 1.0 } else { 0.0 }, 0.0)
    }

    pub fn pause(cue: CueId) -> Self {
        Self::new(CommandKind::PauseCue, cue.0 as f32, 0.0, 0.0)
    }

    pub fn set_volume(cue: CueId, volume: f32) -> Self {
        Self::new(CommandKind::SetVolume, cue.0 as f32, volume, 0.0)
    }

    pub fn start_gameplay() -> Self {
        Self::new(CommandKind::StartGameplay, 0.0, 0.0, 0.0)
    }

    pub fn command_kind(&self) -> Option<CommandKind> {
        CommandKind::from_code(self.kind)
    }
}

/// Commands queued during one frame, plus the caption strings they refer to.
#[derive(Debug, Default)]
pub struct CommandBuffer {
    commands: Vec<HostCommand>,
    captions: Vec<String>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self {
            commands: Vec::with_capacity(32),
            captions: Vec::new(),
        }
    }

    /// Drop last frame's commands. Call before each tick.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.captions.clear();
    }

    pub fn push(&mut self, command: HostCommand) {
        self.commands.push(command);
    }

    /// Queue a caption show, storing its text in the next slot.
    pub fn push_caption(&mut self, layer: CaptionLayer, text: &str, fade_ms: u64) {
        let slot = self.captions.len() as u32;
        self.captions.push(text.to_string());
        self.push(HostCommand::show_caption(layer, slot, fade_ms));
    }

    pub fn caption(&self, slot: usize) -> Option<&str> {
        self.captions.get(slot).map(String::as_str)
    }

    pub fn commands(&self) -> &[HostCommand] {
        &self.commands
    }

    pub fn command_count(&self) -> u32 {
        self.commands.len() as u32
    }

    /// Raw pointer to command data for host reads.
    pub fn commands_ptr(&self) -> *const f32 {
        self.commands.as_ptr() as *const f32
    }

    /// Commands as a flat float slice.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.commands)
    }
}

/// Header for the frame just ticked.
pub fn frame_header(frame: u64, phase_code: u32, commands: u32, signals: u32, fade_alpha: f32, now_ms: u64) -> [f32; HEADER_FLOATS] {
    let mut header = [0.0; HEADER_FLOATS];
    header[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
    header[HEADER_FRAME_COUNTER] = frame as f32;
    header[HEADER_PHASE] = phase_code as f32;
    header[HEADER_COMMAND_COUNT] = commands as f32;
    header[HEADER_SIGNAL_COUNT] = signals as f32;
    header[HEADER_FADE_ALPHA] = fade_alpha;
    header[HEADER_NOW_MS] = now_ms as f32;
    header
}

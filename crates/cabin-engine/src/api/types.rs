use std::fmt;

use serde::{Deserialize, Serialize};

/// Handle to an audio cue loaded by the host.
/// The numeric value maps to a presentation-defined clip in the TypeScript SoundManager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CueId(pub u32);

impl fmt::Display for CueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Named one-shot signals exchanged between phases.
/// Each signal fires at most once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    /// The opening narration lines have finished.
    NarrationComplete,
    /// The title cards have finished.
    TitleComplete,
    /// The eyes-opening prologue has finished.
    BlinkComplete,
    /// The ambient narration timeline played to the end.
    TimelineComplete,
    /// Game logic reported that the player won.
    Victory,
    /// The win crossfade has finished.
    FinaleComplete,
}

impl Signal {
    pub const COUNT: usize = 6;

    pub const ALL: [Signal; Self::COUNT] = [
        Self::NarrationComplete,
        Self::TitleComplete,
        Self::BlinkComplete,
        Self::TimelineComplete,
        Self::Victory,
        Self::FinaleComplete,
    ];

    /// Wire name shared with the host page.
    pub fn name(self) -> &'static str {
        match self {
            Signal::NarrationComplete => "story:done",
            Signal::TitleComplete => "title:done",
            Signal::BlinkComplete => "blink:done",
            Signal::TimelineComplete => "wall:done",
            Signal::Victory => "victory",
            Signal::FinaleComplete => "finale:done",
        }
    }

    /// Look a signal up by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    /// Numeric code written into the signal buffer (never 0).
    pub fn code(self) -> u32 {
        self.index() as u32 + 1
    }

    pub fn from_code(code: u32) -> Option<Self> {
        let idx = code.checked_sub(1)? as usize;
        Self::ALL.get(idx).copied()
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Text layers the host renders captions into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CaptionLayer {
    /// Full-screen story lines before the title.
    Story = 0,
    /// Title cards.
    Title = 1,
    /// The prologue's full-screen caption card.
    Prologue = 2,
    /// Ambient narration captions above the scene.
    Wall = 3,
}

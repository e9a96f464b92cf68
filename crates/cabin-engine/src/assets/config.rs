use serde::{Deserialize, Serialize};

use crate::api::error::{ConfigError, ScheduleError};
use crate::api::types::CueId;
use crate::audio::mixer::{DEFAULT_BASE_GAIN, DEFAULT_DUCK_GAIN, DuckingMixer};
use crate::systems::cards::CardSequenceConfig;
use crate::systems::prologue::{PrologueStep, blink_sequence};
use crate::systems::timeline::{DEFAULT_FADE_IN_MS, DEFAULT_FADE_OUT_MS, Segment, Timeline};

/// Everything the presentation needs, loaded from a JSON file at runtime.
/// Every field has a default, so `{}` is a complete (if wordless) config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    /// Opening story lines.
    pub narration: CardSequenceConfig,
    /// Title cards.
    pub title: CardSequenceConfig,
    pub prologue: PrologueConfig,
    /// The seven-minute ambient track.
    pub ambient: AmbientConfig,
    pub controller: ControllerConfig,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            narration: CardSequenceConfig::narration(),
            title: CardSequenceConfig::title(),
            prologue: PrologueConfig::default(),
            ambient: AmbientConfig::default(),
            controller: ControllerConfig::default(),
        }
    }
}

impl PresentationConfig {
    /// Parse a config from a JSON string. A non-empty ambient timeline is
    /// checked here so a bad schedule fails at load, not seven minutes in.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        if !config.ambient.segments.is_empty() {
            config.ambient.timeline()?;
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrologueConfig {
    pub steps: Vec<PrologueStep>,
}

impl Default for PrologueConfig {
    fn default() -> Self {
        Self { steps: blink_sequence() }
    }
}

/// One line of the ambient track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentConfig {
    pub text: String,
    pub cue: CueId,
    /// Overrides `AmbientConfig::default_duration_ms`.
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientConfig {
    pub segments: Vec<SegmentConfig>,
    pub total_budget_ms: u64,
    pub default_duration_ms: u64,
    pub fade_in_ms: u64,
    pub fade_out_ms: u64,
    /// Background loop ducked under the segments.
    pub loop_cue: Option<CueId>,
    pub base_gain: f32,
    pub duck_gain: f32,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            segments: Vec::new(),
            total_budget_ms: 7 * 60 * 1000,
            default_duration_ms: 3000,
            fade_in_ms: DEFAULT_FADE_IN_MS,
            fade_out_ms: DEFAULT_FADE_OUT_MS,
            loop_cue: None,
            base_gain: DEFAULT_BASE_GAIN,
            duck_gain: DEFAULT_DUCK_GAIN,
        }
    }
}

impl AmbientConfig {
    /// Build a fresh timeline; segments are numbered from 1 in file order.
    pub fn timeline(&self) -> Result<Timeline, ScheduleError> {
        let segments = self
            .segments
            .iter()
            .zip(1u32..)
            .map(|(s, sequence_index)| Segment {
                sequence_index,
                display_text: s.text.clone(),
                audio: s.cue,
                fixed_duration_ms: s.duration_ms.unwrap_or(self.default_duration_ms),
            })
            .collect();
        Timeline::new(segments, self.total_budget_ms)
    }

    pub fn mixer(&self) -> DuckingMixer {
        DuckingMixer::new(self.loop_cue, self.base_gain, self.duck_gain)
    }
}

/// Pacing of the hand-offs between phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Frames the cover stays up before gameplay is started.
    pub cover_frames: u32,
    /// Frames rendered after gameplay starts, before the prologue fades in.
    pub settle_frames: u32,
    pub gameplay_retry_ms: u64,
    /// Retries after the first failed gameplay start before giving up.
    pub gameplay_max_retries: u32,
    /// Cover crossfade after a win.
    pub win_fade_ms: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            cover_frames: 4,
            settle_frames: 4,
            gameplay_retry_ms: 50,
            gameplay_max_retries: 200,
            win_fade_ms: 1500,
        }
    }
}

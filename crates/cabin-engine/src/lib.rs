pub mod api;
pub mod core;
pub mod audio;
pub mod fx;
pub mod systems;
pub mod assets;
pub mod bridge;

// Re-export key types at crate root for convenience
pub use api::error::{ConfigError, GameplayError, MediaError, ScheduleError};
pub use api::stage::{CaptionSurface, Gameplay, Stage};
pub use api::types::{CaptionLayer, CueId, Signal};
pub use crate::core::bus::{Delivery, EventBus, ListenerId, SignalFlags};
pub use crate::core::delay::{DelayHandle, DelayStatus, Delays};
pub use crate::core::time::Clock;
pub use audio::{AudioDevice, DuckingMixer, LoopState, PlayOutcome, play_cue};
pub use fx::{Easing, Fade, FadeCompositor, FadeProgress, FadeSurface, Rect, ease, lerp};
pub use systems::cards::{Card, CardSequence, CardSequenceConfig};
pub use systems::phase::{Phase, PhaseController, Trigger, transition};
pub use systems::prologue::{CaptionCard, Prologue, PrologueStep, blink_sequence};
pub use systems::schedule::GapPlan;
pub use systems::timeline::{RunStatus, Segment, Timeline, TimelineRun};
pub use assets::config::{AmbientConfig, ControllerConfig, PresentationConfig, PrologueConfig, SegmentConfig};
pub use bridge::host::HostStage;
pub use bridge::protocol::{CommandBuffer, CommandKind, HostCommand};

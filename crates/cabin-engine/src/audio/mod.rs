pub mod device;
pub mod mixer;

pub use device::{AudioDevice, PlayOutcome, play_cue};
pub use mixer::{DuckingMixer, LoopState};

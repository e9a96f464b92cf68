//! Full-screen cover effects: the prologue's eyes-opening fade, the instant
//! cover between title and gameplay, and the win crossfade.

pub mod easing;
pub mod fade;

pub use easing::{Easing, lerp, ease};
pub use fade::{Fade, FadeCompositor, FadeProgress, FadeSurface, Rect};

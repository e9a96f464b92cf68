//! Fade compositor: draws an opacity ramp over the scene region, one sample per
//! frame. The region's bounds are re-queried on every draw so the cover stays
//! aligned while the page resizes or scrolls.
//!
//! ```ignore
//! let mut fx = FadeCompositor::new();
//! fx.cover_instantly(&mut surface);               // no flash while gameplay boots
//! fx.animate(Fade::open(2000, Easing::QuadInOut)); // black -> scene
//! while fx.tick(dt_ms, &mut surface) == FadeProgress::Running { /* draw */ }
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::easing::{Easing, ease};

/// Axis-aligned screen rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }
}

/// Drawing surface the compositor paints onto (a full-viewport overlay canvas).
pub trait FadeSurface {
    /// Current bounds of the faded region. Falls back to the viewport when the
    /// scene element is missing.
    fn target_rect(&self) -> Rect;

    /// Erase the whole overlay.
    fn clear_fade(&mut self);

    /// Fill `rect` with the cover colour at `alpha` in [0, 1].
    fn fill_fade(&mut self, rect: Rect, alpha: f32);
}

/// One opacity ramp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fade {
    pub from: f32,
    pub to: f32,
    pub duration_ms: u32,
    #[serde(default)]
    pub easing: Easing,
}

impl Fade {
    pub fn new(from: f32, to: f32, duration_ms: u32, easing: Easing) -> Self {
        Self { from, to, duration_ms, easing }
    }

    /// Cover to scene (eyes opening).
    pub fn open(duration_ms: u32, easing: Easing) -> Self {
        Self::new(1.0, 0.0, duration_ms, easing)
    }

    /// Scene to cover (eyes closing).
    pub fn close(duration_ms: u32, easing: Easing) -> Self {
        Self::new(0.0, 1.0, duration_ms, easing)
    }

    /// Normalized progress after `elapsed_ms`. A zero-length fade is always done.
    pub fn progress(&self, elapsed_ms: f64) -> f32 {
        if self.duration_ms == 0 {
            1.0
        } else {
            (elapsed_ms / self.duration_ms as f64).clamp(0.0, 1.0) as f32
        }
    }

    /// Alpha after `elapsed_ms`.
    pub fn alpha_at(&self, elapsed_ms: f64) -> f32 {
        ease(self.from, self.to, self.progress(elapsed_ms), self.easing)
    }
}

/// Result of one compositor frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeProgress {
    /// No fade in flight.
    Idle,
    Running,
    /// The fade drew its final frame this tick.
    Finished,
}

#[derive(Debug, Clone, Copy)]
struct ActiveFade {
    fade: Fade,
    elapsed_ms: f64,
}

#[derive(Debug, Clone, Default)]
pub struct FadeCompositor {
    active: Option<ActiveFade>,
    /// Alpha drawn most recently.
    alpha: f32,
}

impl FadeCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `fade`, replacing any fade in flight. The first sample is drawn on
    /// the next `tick`.
    pub fn animate(&mut self, fade: Fade) {
        self.active = Some(ActiveFade { fade, elapsed_ms: 0.0 });
    }

    /// Advance the fade by one frame and draw it.
    pub fn tick<S: FadeSurface + ?Sized>(&mut self, dt_ms: f64, surface: &mut S) -> FadeProgress {
        let Some(active) = self.active.as_mut() else {
            return FadeProgress::Idle;
        };
        if dt_ms.is_finite() && dt_ms > 0.0 {
            active.elapsed_ms += dt_ms;
        }
        let t = active.fade.progress(active.elapsed_ms);
        let alpha = active.fade.alpha_at(active.elapsed_ms);
        self.draw(alpha, surface);

        if t >= 1.0 {
            self.active = None;
            FadeProgress::Finished
        } else {
            FadeProgress::Running
        }
    }

    /// Draw a full cover immediately, cancelling any fade in flight.
    pub fn cover_instantly<S: FadeSurface + ?Sized>(&mut self, surface: &mut S) {
        self.active = None;
        self.draw(1.0, surface);
    }

    /// Erase the overlay and drop any fade in flight.
    pub fn clear<S: FadeSurface + ?Sized>(&mut self, surface: &mut S) {
        self.active = None;
        self.alpha = 0.0;
        surface.clear_fade();
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }

    fn draw<S: FadeSurface + ?Sized>(&mut self, alpha: f32, surface: &mut S) {
        let alpha = alpha.clamp(0.0, 1.0);
        let rect = surface.target_rect();
        surface.clear_fade();
        surface.fill_fade(rect, alpha);
        self.alpha = alpha;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::stage::testing::{Call, MockStage};

    #[test]
    fn linear_fade_samples_each_frame() {
        let mut stage = MockStage::new();
        let mut fx = FadeCompositor::new();
        fx.animate(Fade::open(100, Easing::Linear));

        assert_eq!(fx.tick(50.0, &mut stage), FadeProgress::Running);
        assert!((fx.alpha() - 0.5).abs() < 1e-6);
        assert_eq!(fx.tick(50.0, &mut stage), FadeProgress::Finished);
        assert_eq!(fx.alpha(), 0.0);
        assert_eq!(fx.tick(50.0, &mut stage), FadeProgress::Idle);
        assert_eq!(stage.fills().len(), 2);
    }

    #[test]
    fn zero_duration_draws_final_state_once() {
        let mut stage = MockStage::new();
        let mut fx = FadeCompositor::new();
        fx.animate(Fade::close(0, Easing::QuadInOut));

        assert_eq!(fx.tick(0.0, &mut stage), FadeProgress::Finished);
        assert_eq!(stage.fills(), vec![1.0]);
    }

    #[test]
    fn bounds_are_requeried_every_frame() {
        let mut stage = MockStage::new();
        let mut fx = FadeCompositor::new();
        fx.animate(Fade::close(100, Easing::Linear));

        fx.tick(10.0, &mut stage);
        stage.scene = Rect::new(10.0, 20.0, 640.0, 360.0);
        fx.tick(10.0, &mut stage);

        let rects: Vec<Rect> = stage
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Fill { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect();
        assert_eq!(rects[0], MockStage::DEFAULT_SCENE);
        assert_eq!(rects[1], Rect::new(10.0, 20.0, 640.0, 360.0));
    }

    #[test]
    fn cover_instantly_cancels_running_fade() {
        let mut stage = MockStage::new();
        let mut fx = FadeCompositor::new();
        fx.animate(Fade::open(1000, Easing::Linear));
        fx.cover_instantly(&mut stage);

        assert!(!fx.is_animating());
        assert_eq!(fx.alpha(), 1.0);
        assert_eq!(stage.calls, vec![
            Call::ClearFade,
            Call::Fill { rect: MockStage::DEFAULT_SCENE, alpha: 1.0 },
        ]);
    }

    #[test]
    fn eased_alpha_stays_in_range() {
        let fade = Fade::new(-0.5, 1.5, 100, Easing::QuadInOut);
        let mut stage = MockStage::new();
        let mut fx = FadeCompositor::new();
        fx.animate(fade);
        while fx.tick(7.0, &mut stage) == FadeProgress::Running {}
        assert!(stage.fills().iter().all(|a| (0.0..=1.0).contains(a)));
    }
}

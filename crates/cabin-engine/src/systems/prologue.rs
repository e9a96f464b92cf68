//! Eyes-opening prologue: a slow fade from black onto the scene, two blinks and
//! a full-screen caption card, then the cover is cleared.

use serde::{Deserialize, Serialize};

use crate::api::stage::CaptionSurface;
use crate::api::types::CaptionLayer;
use crate::core::delay::{DelayHandle, DelayStatus, Delays};
use crate::fx::easing::Easing;
use crate::fx::fade::{Fade, FadeCompositor, FadeProgress, FadeSurface};

/// A caption card drawn over the cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionCard {
    pub text: String,
    pub fade_in_ms: u64,
    pub hold_ms: u64,
    pub fade_out_ms: u64,
    /// Extra wait after the fade-out before the next step.
    #[serde(default)]
    pub settle_ms: u64,
}

/// One step of the prologue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrologueStep {
    Fade(Fade),
    Caption(CaptionCard),
}

/// The default blink: slow open, one blink, a second blink holding on a
/// "where am i?" card, final open.
pub fn blink_sequence() -> Vec<PrologueStep> {
    const BLINK_MS: u32 = 1000;
    const SLOW_OPEN_MS: u32 = 2000;
    let ease = Easing::QuadInOut;
    vec![
        PrologueStep::Fade(Fade::open(SLOW_OPEN_MS, ease)),
        PrologueStep::Fade(Fade::close(BLINK_MS, ease)),
        PrologueStep::Fade(Fade::open(BLINK_MS, ease)),
        PrologueStep::Fade(Fade::close(BLINK_MS, ease)),
        PrologueStep::Caption(CaptionCard {
            text: "where am i?".to_string(),
            fade_in_ms: 1000,
            hold_ms: 1000,
            fade_out_ms: 1000,
            settle_ms: 20,
        }),
        PrologueStep::Fade(Fade::open(BLINK_MS, ease)),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Idle,
    Fading(usize),
    CaptionIn { index: usize, handle: DelayHandle },
    CaptionOut { index: usize, handle: DelayHandle },
    /// Finished, not yet reported by `tick`.
    Done,
    Reported,
}

#[derive(Debug)]
pub struct Prologue {
    steps: Vec<PrologueStep>,
    layer: CaptionLayer,
    delays: Delays,
    step: Step,
}

impl Prologue {
    pub fn new(steps: Vec<PrologueStep>) -> Self {
        Self {
            steps,
            layer: CaptionLayer::Prologue,
            delays: Delays::new(),
            step: Step::Idle,
        }
    }

    /// Begin the first step. Returns false if already started.
    pub fn start<S>(&mut self, now_ms: u64, stage: &mut S, fx: &mut FadeCompositor) -> bool
    where
        S: FadeSurface + CaptionSurface + ?Sized,
    {
        if self.step != Step::Idle {
            return false;
        }
        self.advance(0, now_ms, stage, fx);
        true
    }

    /// Advance by one frame. Returns true on the frame the prologue finishes.
    pub fn tick<S>(&mut self, dt_ms: f64, now_ms: u64, stage: &mut S, fx: &mut FadeCompositor) -> bool
    where
        S: FadeSurface + CaptionSurface + ?Sized,
    {
        match self.step {
            Step::Idle | Step::Reported => false,
            Step::Done => self.report(),
            Step::Fading(index) => match fx.tick(dt_ms, stage) {
                FadeProgress::Running => false,
                FadeProgress::Finished | FadeProgress::Idle => {
                    self.advance(index + 1, now_ms, stage, fx);
                    self.report()
                }
            },
            Step::CaptionIn { index, handle } => {
                if self.delays.poll(handle, now_ms) == DelayStatus::Elapsed {
                    if let Some(PrologueStep::Caption(card)) = self.steps.get(index) {
                        stage.hide_caption(self.layer, card.fade_out_ms);
                        let out = card.fade_out_ms.saturating_add(card.settle_ms);
                        let handle = self.delays.wait(out);
                        self.step = Step::CaptionOut { index, handle };
                    }
                }
                false
            }
            Step::CaptionOut { index, handle } => {
                if self.delays.poll(handle, now_ms) != DelayStatus::Elapsed {
                    return false;
                }
                stage.detach_caption(self.layer);
                self.advance(index + 1, now_ms, stage, fx);
                self.report()
            }
        }
    }

    fn advance<S>(&mut self, index: usize, now_ms: u64, stage: &mut S, fx: &mut FadeCompositor)
    where
        S: FadeSurface + CaptionSurface + ?Sized,
    {
        match self.steps.get(index) {
            Some(PrologueStep::Fade(fade)) => {
                fx.animate(*fade);
                self.step = Step::Fading(index);
            }
            Some(PrologueStep::Caption(card)) => {
                stage.show_caption(self.layer, &card.text, card.fade_in_ms);
                self.delays.rebase(now_ms);
                let handle = self.delays.wait(card.fade_in_ms.saturating_add(card.hold_ms));
                self.step = Step::CaptionIn { index, handle };
            }
            None => {
                fx.clear(stage);
                self.step = Step::Done;
            }
        }
    }

    fn report(&mut self) -> bool {
        if self.step == Step::Done {
            self.step = Step::Reported;
            true
        } else {
            false
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.step, Step::Done | Step::Reported)
    }

    pub fn steps(&self) -> &[PrologueStep] {
        &self.steps
    }
}

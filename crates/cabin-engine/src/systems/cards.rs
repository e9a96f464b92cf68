//! Card sequences: the opening story lines and the title cards.
//!
//! Each card fades in, holds, and fades out on one caption layer; after the last
//! card the layer gets an optional outro before it is detached.

use serde::{Deserialize, Serialize};

use crate::api::stage::CaptionSurface;
use crate::api::types::CaptionLayer;
use crate::core::delay::{DelayHandle, DelayStatus, Delays};

/// One card of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub text: String,
    /// Hold time on top of the sequence's common hold.
    #[serde(default)]
    pub extra_hold_ms: u64,
}

impl Card {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), extra_hold_ms: 0 }
    }

    pub fn with_extra_hold(mut self, ms: u64) -> Self {
        self.extra_hold_ms = ms;
        self
    }
}

/// Timing and copy for a card sequence.
///
/// Missing fields take the story-line defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardSequenceConfig {
    pub cards: Vec<Card>,
    pub fade_in_ms: u64,
    /// Common hold while a card is fully visible.
    pub hold_ms: u64,
    pub fade_out_ms: u64,
    /// Wait after the last card before the layer is detached.
    pub outro_ms: u64,
}

impl CardSequenceConfig {
    /// Story-line timing: 600 ms in, 3 s hold, 500 ms out.
    pub fn narration() -> Self {
        Self {
            cards: Vec::new(),
            fade_in_ms: 600,
            hold_ms: 3000,
            fade_out_ms: 500,
            outro_ms: 0,
        }
    }

    /// Title-card timing: 600 ms in, 2.5 s hold, 500 ms out, 500 ms outro.
    pub fn title() -> Self {
        Self {
            hold_ms: 2500,
            outro_ms: 500,
            ..Self::narration()
        }
    }

    pub fn with_cards(mut self, cards: Vec<Card>) -> Self {
        self.cards = cards;
        self
    }

    /// Total time the sequence takes.
    pub fn duration_ms(&self) -> u64 {
        let per_card: u64 = self
            .cards
            .iter()
            .map(|c| {
                self.fade_in_ms
                    .saturating_add(self.hold_ms)
                    .saturating_add(c.extra_hold_ms)
                    .saturating_add(self.fade_out_ms)
            })
            .fold(0, u64::saturating_add);
        per_card.saturating_add(self.outro_ms)
    }
}

impl Default for CardSequenceConfig {
    fn default() -> Self {
        Self::narration()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Idle,
    /// Card `index` is fading in or holding.
    Showing { index: usize, handle: DelayHandle },
    /// Card `index` is fading out.
    Leaving { index: usize, handle: DelayHandle },
    Outro(DelayHandle),
    Done,
}

#[derive(Debug)]
pub struct CardSequence {
    config: CardSequenceConfig,
    layer: CaptionLayer,
    delays: Delays,
    step: Step,
}

impl CardSequence {
    pub fn new(config: CardSequenceConfig, layer: CaptionLayer) -> Self {
        Self {
            config,
            layer,
            delays: Delays::new(),
            step: Step::Idle,
        }
    }

    /// Show the first card at `now_ms`. Returns false if already started.
    pub fn start<S: CaptionSurface + ?Sized>(&mut self, now_ms: u64, stage: &mut S) -> bool {
        if self.step != Step::Idle {
            return false;
        }
        self.delays.rebase(now_ms);
        self.show(0, stage);
        true
    }

    /// Advance to `now_ms`. Returns true on the tick the sequence finishes.
    pub fn tick<S: CaptionSurface + ?Sized>(&mut self, now_ms: u64, stage: &mut S) -> bool {
        loop {
            let handle = match self.step {
                Step::Showing { handle, .. } | Step::Leaving { handle, .. } | Step::Outro(handle) => handle,
                Step::Idle | Step::Done => return false,
            };
            if self.delays.poll(handle, now_ms) != DelayStatus::Elapsed {
                return false;
            }
            match self.step {
                Step::Showing { index, .. } => {
                    stage.hide_caption(self.layer, self.config.fade_out_ms);
                    let handle = self.delays.wait(self.config.fade_out_ms);
                    self.step = Step::Leaving { index, handle };
                }
                Step::Leaving { index, .. } => self.show(index + 1, stage),
                Step::Outro(_) => {
                    stage.detach_caption(self.layer);
                    self.step = Step::Done;
                    return true;
                }
                Step::Idle | Step::Done => return false,
            }
        }
    }

    fn show<S: CaptionSurface + ?Sized>(&mut self, index: usize, stage: &mut S) {
        match self.config.cards.get(index) {
            Some(card) => {
                stage.show_caption(self.layer, &card.text, self.config.fade_in_ms);
                let hold = self
                    .config
                    .fade_in_ms
                    .saturating_add(self.config.hold_ms)
                    .saturating_add(card.extra_hold_ms);
                let handle = self.delays.wait(hold);
                self.step = Step::Showing { index, handle };
            }
            None => {
                let handle = self.delays.wait(self.config.outro_ms);
                self.step = Step::Outro(handle);
            }
        }
    }

    pub fn is_started(&self) -> bool {
        self.step != Step::Idle
    }

    pub fn is_done(&self) -> bool {
        self.step == Step::Done
    }

    /// Index of the card on screen.
    pub fn current_card(&self) -> Option<usize> {
        match self.step {
            Step::Showing { index, .. } | Step::Leaving { index, .. } => Some(index),
            _ => None,
        }
    }

    pub fn config(&self) -> &CardSequenceConfig {
        &self.config
    }
}

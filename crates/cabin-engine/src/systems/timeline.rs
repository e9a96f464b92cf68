//! Timeline scheduler: plays ordered caption/audio segments inside a fixed
//! wall-clock budget.
//!
//! A run is an explicit state machine. Every suspension point is a `Delays` wait;
//! `stop` cancels them all at once and the run checks its stopped flag after each
//! wait resolves, so nothing further happens once it has been cancelled.

use serde::{Deserialize, Serialize};

use crate::api::error::ScheduleError;
use crate::api::stage::CaptionSurface;
use crate::api::types::{CaptionLayer, CueId};
use crate::audio::device::{AudioDevice, PlayOutcome, play_cue};
use crate::audio::mixer::DuckingMixer;
use crate::core::delay::{DelayHandle, DelayStatus, Delays};
use super::schedule::GapPlan;

/// Default caption fade-in handed to the host.
pub const DEFAULT_FADE_IN_MS: u64 = 600;
/// Default caption fade-out handed to the host.
pub const DEFAULT_FADE_OUT_MS: u64 = 500;

/// One caption paired with its audio cue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub sequence_index: u32,
    pub display_text: String,
    pub audio: CueId,
    pub fixed_duration_ms: u64,
}

/// Ordered segments plus the budget they must fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    segments: Vec<Segment>,
    total_budget_ms: u64,
    plan: GapPlan,
}

impl Timeline {
    /// Validate ordering and plan the gaps.
    pub fn new(segments: Vec<Segment>, total_budget_ms: u64) -> Result<Self, ScheduleError> {
        for pair in segments.windows(2) {
            if pair[1].sequence_index <= pair[0].sequence_index {
                return Err(ScheduleError::OutOfOrder {
                    previous: pair[0].sequence_index,
                    index: pair[1].sequence_index,
                });
            }
        }
        let durations: Vec<u64> = segments.iter().map(|s| s.fixed_duration_ms).collect();
        let plan = GapPlan::new(&durations, total_budget_ms)?;
        Ok(Self { segments, total_budget_ms, plan })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn total_budget_ms(&self) -> u64 {
        self.total_budget_ms
    }

    pub fn plan(&self) -> &GapPlan {
        &self.plan
    }

    /// Sum of the segments' fixed durations.
    pub fn required_ms(&self) -> u64 {
        self.segments
            .iter()
            .fold(0u64, |total, s| total.saturating_add(s.fixed_duration_ms))
    }
}

/// Coarse status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Not armed yet.
    Idle,
    Running,
    Complete,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Idle,
    /// Silence before segment 0.
    InitialGap(DelayHandle),
    /// Segment `index` is on screen and its cue is playing.
    Playing { index: usize, handle: DelayHandle },
    /// Silence before segment `next`.
    Gap { next: usize, handle: DelayHandle },
    Complete,
    Stopped,
}

/// A single, non-restartable playback of a `Timeline`.
#[derive(Debug)]
pub struct TimelineRun {
    timeline: Timeline,
    layer: CaptionLayer,
    fade_in_ms: u64,
    fade_out_ms: u64,
    armed: bool,
    stopped: bool,
    step: Step,
    delays: Delays,
    /// How each segment's cue start went, by sequence index.
    outcomes: Vec<(u32, PlayOutcome)>,
}

impl TimelineRun {
    pub fn new(timeline: Timeline) -> Self {
        Self {
            timeline,
            layer: CaptionLayer::Wall,
            fade_in_ms: DEFAULT_FADE_IN_MS,
            fade_out_ms: DEFAULT_FADE_OUT_MS,
            armed: false,
            stopped: false,
            step: Step::Idle,
            delays: Delays::new(),
            outcomes: Vec::new(),
        }
    }

    pub fn with_layer(mut self, layer: CaptionLayer) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_fades(mut self, fade_in_ms: u64, fade_out_ms: u64) -> Self {
        self.fade_in_ms = fade_in_ms;
        self.fade_out_ms = fade_out_ms;
        self
    }

    /// Arm the run at `now_ms`: start the background loop and the initial gap.
    /// Returns false (and does nothing) if the run was already armed or stopped.
    pub fn run<S>(&mut self, now_ms: u64, stage: &mut S, mixer: &mut DuckingMixer) -> bool
    where
        S: AudioDevice + CaptionSurface + ?Sized,
    {
        if self.armed || self.stopped {
            return false;
        }
        self.armed = true;

        let plan = self.timeline.plan();
        log::debug!(
            "timeline: {} segments, {} ms of clips, {} ms of gaps ({} ms each, +1 ms on the first {})",
            self.timeline.segments.len(),
            self.timeline.required_ms(),
            plan.total_gap_ms(),
            plan.base_gap_ms(),
            plan.remainder()
        );
        let initial_gap = plan.initial_gap();

        mixer.start_loop(stage);
        self.delays.rebase(now_ms);
        self.step = Step::InitialGap(self.delays.wait(initial_gap));
        true
    }

    /// Advance the run to `now_ms`, processing every wait that has elapsed.
    /// Returns true on the one tick where the last segment finishes.
    pub fn tick<S>(&mut self, now_ms: u64, stage: &mut S, mixer: &mut DuckingMixer) -> bool
    where
        S: AudioDevice + CaptionSurface + ?Sized,
    {
        loop {
            let handle = match self.step {
                Step::InitialGap(handle)
                | Step::Playing { handle, .. }
                | Step::Gap { handle, .. } => handle,
                Step::Idle | Step::Complete | Step::Stopped => return false,
            };
            if self.delays.poll(handle, now_ms) != DelayStatus::Elapsed || self.stopped {
                return false;
            }

            match self.step {
                Step::InitialGap(_) => self.begin_segment(0, stage, mixer),
                Step::Gap { next, .. } => self.begin_segment(next, stage, mixer),
                Step::Playing { index, .. } => {
                    mixer.set_foreground(false, stage);
                    stage.hide_caption(self.layer, self.fade_out_ms);
                    match self.timeline.plan.gap_after(index) {
                        Some(gap) => {
                            // The next caption waits for this one to finish fading.
                            let wait = gap.max(self.fade_out_ms);
                            if wait > gap {
                                log::debug!(
                                    "gap after segment {} = {} ms, held to {} ms for the fade-out",
                                    index,
                                    gap,
                                    wait
                                );
                            } else {
                                log::debug!("gap after segment {} = {} ms", index, gap);
                            }
                            let handle = self.delays.wait(wait);
                            self.step = Step::Gap { next: index + 1, handle };
                        }
                        None => {
                            self.step = Step::Complete;
                            log::info!("timeline complete");
                            return true;
                        }
                    }
                }
                Step::Idle | Step::Complete | Step::Stopped => return false,
            }
        }
    }

    fn begin_segment<S>(&mut self, index: usize, stage: &mut S, mixer: &mut DuckingMixer)
    where
        S: AudioDevice + CaptionSurface + ?Sized,
    {
        let segment = &self.timeline.segments[index];
        stage.show_caption(self.layer, &segment.display_text, self.fade_in_ms);
        // A failed cue still holds its full duration on screen.
        let outcome = play_cue(stage, segment.audio, false);
        mixer.set_foreground(true, stage);
        let handle = self.delays.wait(segment.fixed_duration_ms);
        log::debug!(
            "segment {} on screen for {} ms ({})",
            segment.sequence_index,
            segment.fixed_duration_ms,
            if outcome.is_played() { "with audio" } else { "silent" }
        );
        self.outcomes.push((segment.sequence_index, outcome));
        self.step = Step::Playing { index, handle };
    }

    /// Cancel the run: clear pending waits, pause the current cue, silence the
    /// background loop and remove the caption layer. Returns false on repeat calls.
    pub fn stop<S>(&mut self, stage: &mut S, mixer: &mut DuckingMixer) -> bool
    where
        S: AudioDevice + CaptionSurface + ?Sized,
    {
        if self.stopped {
            return false;
        }
        self.stopped = true;

        let cleared = self.delays.cancel_all();
        if let Step::Playing { index, .. } = self.step {
            stage.pause(self.timeline.segments[index].audio);
        }
        mixer.silence(stage);
        if self.armed {
            stage.detach_caption(self.layer);
        }
        self.step = Step::Stopped;
        log::info!("timeline stopped ({} pending waits cancelled)", cleared);
        true
    }

    pub fn status(&self) -> RunStatus {
        match self.step {
            Step::Idle => RunStatus::Idle,
            Step::InitialGap(_) | Step::Playing { .. } | Step::Gap { .. } => RunStatus::Running,
            Step::Complete => RunStatus::Complete,
            Step::Stopped => RunStatus::Stopped,
        }
    }

    /// Index of the segment currently on screen.
    pub fn current_segment(&self) -> Option<usize> {
        match self.step {
            Step::Playing { index, .. } => Some(index),
            _ => None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Waits still outstanding.
    pub fn pending_waits(&self) -> usize {
        self.delays.len()
    }

    pub fn outcomes(&self) -> &[(u32, PlayOutcome)] {
        &self.outcomes
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }
}

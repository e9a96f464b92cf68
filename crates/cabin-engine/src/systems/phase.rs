//! Phase controller: the top-level state machine of the presentation.
//!
//! ```text
//! Narration -> Title -> ScreenCovered -> GameplayInit -> Prologue -> AmbientTimeline -> Finished
//!                                                                         |                |
//!                                                                         +---- victory ---+--> Won
//! ```
//!
//! Every edge is one row of [`transition`]. Signal-gated edges are armed on the
//! bus when the predecessor phase is entered, so a signal that fired before its
//! listener attached is still delivered (immediately, from the durable flag).

use std::collections::HashSet;

use crate::api::stage::Stage;
use crate::api::types::{CaptionLayer, Signal};
use crate::assets::config::PresentationConfig;
use crate::audio::mixer::DuckingMixer;
use crate::core::bus::{Delivery, EventBus, ListenerId, SignalFlags};
use crate::core::delay::{DelayHandle, DelayStatus, Delays};
use crate::core::time::Clock;
use crate::fx::easing::Easing;
use crate::fx::fade::{Fade, FadeCompositor, FadeProgress};
use super::cards::CardSequence;
use super::prologue::Prologue;
use super::timeline::TimelineRun;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Narration,
    Title,
    /// Cover drawn; waiting a few frames before gameplay starts under it.
    ScreenCovered,
    GameplayInit,
    Prologue,
    AmbientTimeline,
    /// The player won; the cover crossfades back in.
    Won,
    /// The ambient track ended; gameplay carries on.
    Finished,
}

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Phase::Narration => "narration",
            Phase::Title => "title",
            Phase::ScreenCovered => "screen-covered",
            Phase::GameplayInit => "gameplay-init",
            Phase::Prologue => "prologue",
            Phase::AmbientTimeline => "ambient-timeline",
            Phase::Won => "won",
            Phase::Finished => "finished",
        }
    }

    /// Numeric code reported to the host.
    pub fn code(self) -> u32 {
        self as u32 + 1
    }
}

/// What moves the controller from one phase to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Signal(Signal),
    /// The cover has been on screen for the configured number of frames.
    FramesElapsed,
    /// Gameplay started (or gave up) and has rendered its settle frames.
    GameplaySettled,
    /// The ambient timeline could not be built.
    TimelineUnavailable,
}

/// The transition table. `None` means the trigger is ignored in `from`.
pub fn transition(from: Phase, trigger: Trigger) -> Option<Phase> {
    match (from, trigger) {
        (Phase::Narration, Trigger::Signal(Signal::NarrationComplete)) => Some(Phase::Title),
        (Phase::Title, Trigger::Signal(Signal::TitleComplete)) => Some(Phase::ScreenCovered),
        (Phase::ScreenCovered, Trigger::FramesElapsed) => Some(Phase::GameplayInit),
        (Phase::GameplayInit, Trigger::GameplaySettled) => Some(Phase::Prologue),
        (Phase::Prologue, Trigger::Signal(Signal::BlinkComplete)) => Some(Phase::AmbientTimeline),
        (Phase::AmbientTimeline, Trigger::Signal(Signal::TimelineComplete)) => Some(Phase::Finished),
        (Phase::AmbientTimeline, Trigger::TimelineUnavailable) => Some(Phase::Finished),
        (Phase::AmbientTimeline | Phase::Finished, Trigger::Signal(Signal::Victory)) => Some(Phase::Won),
        _ => None,
    }
}

/// Gameplay start-up inside `GameplayInit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boot {
    Idle,
    Retrying(DelayHandle),
    Settling,
    Done,
}

pub struct PhaseController {
    config: PresentationConfig,
    clock: Clock,
    /// Handlers are the phase the signal should move us into.
    bus: EventBus<Phase>,
    phase: Phase,
    started: bool,
    entered: HashSet<Phase>,
    fx: FadeCompositor,
    mixer: DuckingMixer,
    narration: CardSequence,
    title: CardSequence,
    prologue: Prologue,
    /// Built fresh when the ambient phase is entered.
    timeline: Option<TimelineRun>,
    completion_listener: Option<ListenerId>,
    delays: Delays,
    boot: Boot,
    gameplay_attempts: u32,
    frames_left: u32,
}

impl PhaseController {
    pub fn new(config: PresentationConfig) -> Self {
        let narration = CardSequence::new(config.narration.clone(), CaptionLayer::Story);
        let title = CardSequence::new(config.title.clone(), CaptionLayer::Title);
        let prologue = Prologue::new(config.prologue.steps.clone());
        let mixer = config.ambient.mixer();
        Self {
            config,
            clock: Clock::new(),
            bus: EventBus::new(),
            phase: Phase::Narration,
            started: false,
            entered: HashSet::new(),
            fx: FadeCompositor::new(),
            mixer,
            narration,
            title,
            prologue,
            timeline: None,
            completion_listener: None,
            delays: Delays::new(),
            boot: Boot::Idle,
            gameplay_attempts: 0,
            frames_left: 0,
        }
    }

    /// Enter the first phase. Returns false if already started.
    pub fn start<S: Stage + ?Sized>(&mut self, stage: &mut S) -> bool {
        if self.started {
            return false;
        }
        self.started = true;
        log::info!("presentation starting");
        self.enter(Phase::Narration, stage);
        true
    }

    /// Advance one rendered frame.
    pub fn tick<S: Stage + ?Sized>(&mut self, dt_ms: f64, stage: &mut S) {
        if !self.started {
            return;
        }
        let now = self.clock.advance(dt_ms);

        match self.phase {
            Phase::Narration => {
                if self.narration.tick(now, stage) {
                    self.emit(Signal::NarrationComplete, stage);
                }
            }
            Phase::Title => {
                if self.title.tick(now, stage) {
                    self.emit(Signal::TitleComplete, stage);
                }
            }
            Phase::ScreenCovered => {
                if self.frame_elapsed() {
                    self.advance(Trigger::FramesElapsed, stage);
                }
            }
            Phase::GameplayInit => self.tick_boot(now, stage),
            Phase::Prologue => {
                if self.prologue.tick(dt_ms, now, stage, &mut self.fx) {
                    self.emit(Signal::BlinkComplete, stage);
                }
            }
            Phase::AmbientTimeline => {
                let complete = match self.timeline.as_mut() {
                    Some(run) => run.tick(now, stage, &mut self.mixer),
                    None => false,
                };
                if complete {
                    self.emit(Signal::TimelineComplete, stage);
                }
            }
            Phase::Won => {
                let progress = self.fx.tick(dt_ms, stage);
                if progress != FadeProgress::Running && !self.bus.has_fired(Signal::FinaleComplete) {
                    self.emit(Signal::FinaleComplete, stage);
                }
            }
            Phase::Finished => {}
        }
    }

    /// Fire a signal on behalf of the host. Only `Victory` is accepted; every
    /// other signal is produced by the phase it completes, after that phase has
    /// torn itself down. Returns false if the signal was refused.
    pub fn signal<S: Stage + ?Sized>(&mut self, signal: Signal, stage: &mut S) -> bool {
        match signal {
            Signal::Victory => {
                self.emit(signal, stage);
                true
            }
            _ => {
                log::warn!("{} can only be fired by its own phase; ignoring", signal.name());
                false
            }
        }
    }

    /// Report a win from game logic. Safe at any time; before the ambient
    /// timeline it is latched and honoured when that phase would begin.
    pub fn raise_victory<S: Stage + ?Sized>(&mut self, stage: &mut S) {
        self.emit(Signal::Victory, stage);
    }

    fn emit<S: Stage + ?Sized>(&mut self, signal: Signal, stage: &mut S) {
        for target in self.bus.emit(signal) {
            self.deliver(signal, target, stage);
        }
    }

    /// Listen for `signal` to move into `target`. A signal that already fired is
    /// delivered before this returns.
    fn arm<S: Stage + ?Sized>(&mut self, signal: Signal, target: Phase, stage: &mut S) -> Option<ListenerId> {
        match self.bus.once_signal(signal, target) {
            Delivery::Queued(id) => Some(id),
            Delivery::Immediate(target) => {
                log::debug!("{} had already fired", signal.name());
                self.deliver(signal, target, stage);
                None
            }
        }
    }

    fn deliver<S: Stage + ?Sized>(&mut self, signal: Signal, target: Phase, stage: &mut S) {
        match transition(self.phase, Trigger::Signal(signal)) {
            Some(next) if next == target => self.enter(next, stage),
            _ => log::debug!("{} ignored in phase {}", signal.name(), self.phase.name()),
        }
    }

    fn advance<S: Stage + ?Sized>(&mut self, trigger: Trigger, stage: &mut S) {
        if let Some(next) = transition(self.phase, trigger) {
            self.enter(next, stage);
        }
    }

    fn enter<S: Stage + ?Sized>(&mut self, phase: Phase, stage: &mut S) {
        if !self.entered.insert(phase) {
            log::debug!("phase {} already entered", phase.name());
            return;
        }
        self.phase = phase;
        log::info!("phase: {}", phase.name());
        let now = self.clock.now_ms();

        match phase {
            Phase::Narration => {
                self.narration.start(now, stage);
                self.arm(Signal::NarrationComplete, Phase::Title, stage);
            }
            Phase::Title => {
                self.title.start(now, stage);
                self.arm(Signal::TitleComplete, Phase::ScreenCovered, stage);
            }
            Phase::ScreenCovered => {
                self.fx.cover_instantly(stage);
                self.frames_left = self.config.controller.cover_frames;
            }
            Phase::GameplayInit => {
                self.delays.rebase(now);
                self.try_gameplay(stage);
            }
            Phase::Prologue => {
                self.prologue.start(now, stage, &mut self.fx);
                self.arm(Signal::BlinkComplete, Phase::AmbientTimeline, stage);
            }
            Phase::AmbientTimeline => {
                self.arm(Signal::Victory, Phase::Won, stage);
                if self.phase != Phase::AmbientTimeline {
                    // A latched victory already moved us on.
                    return;
                }
                match self.config.ambient.timeline() {
                    Ok(timeline) => {
                        let ambient = &self.config.ambient;
                        let mut run = TimelineRun::new(timeline).with_fades(ambient.fade_in_ms, ambient.fade_out_ms);
                        run.run(now, stage, &mut self.mixer);
                        self.timeline = Some(run);
                        self.completion_listener = self.arm(Signal::TimelineComplete, Phase::Finished, stage);
                    }
                    Err(err) => {
                        log::warn!("ambient timeline unavailable: {}", err);
                        self.advance(Trigger::TimelineUnavailable, stage);
                    }
                }
            }
            Phase::Won => {
                if let Some(id) = self.completion_listener.take() {
                    self.bus.cancel(id);
                }
                match self.timeline.as_mut() {
                    Some(run) => {
                        run.stop(stage, &mut self.mixer);
                    }
                    None => self.mixer.silence(stage),
                }
                let fade = Fade::close(self.config.controller.win_fade_ms, Easing::QuadInOut);
                self.fx.animate(fade);
            }
            Phase::Finished => {}
        }
    }

    fn tick_boot<S: Stage + ?Sized>(&mut self, now: u64, stage: &mut S) {
        match self.boot {
            Boot::Retrying(handle) => {
                if self.delays.poll(handle, now) == DelayStatus::Elapsed {
                    self.try_gameplay(stage);
                }
            }
            Boot::Settling => {
                if self.frame_elapsed() {
                    self.boot = Boot::Done;
                    self.advance(Trigger::GameplaySettled, stage);
                }
            }
            Boot::Idle | Boot::Done => {}
        }
    }

    fn try_gameplay<S: Stage + ?Sized>(&mut self, stage: &mut S) {
        let limits = self.config.controller;
        self.gameplay_attempts += 1;
        match stage.try_start() {
            Ok(()) => {
                log::info!("gameplay started (attempt {})", self.gameplay_attempts);
                self.settle();
            }
            Err(err) if self.gameplay_attempts > limits.gameplay_max_retries => {
                log::warn!(
                    "{} after {} attempts; continuing without gameplay",
                    err,
                    self.gameplay_attempts
                );
                self.settle();
            }
            Err(err) => {
                log::debug!("{}; retrying in {} ms", err, limits.gameplay_retry_ms);
                self.boot = Boot::Retrying(self.delays.wait(limits.gameplay_retry_ms));
            }
        }
    }

    fn settle(&mut self) {
        self.frames_left = self.config.controller.settle_frames;
        self.boot = Boot::Settling;
    }

    /// Count one frame off `frames_left`. True once it reaches zero.
    fn frame_elapsed(&mut self) -> bool {
        self.frames_left = self.frames_left.saturating_sub(1);
        self.frames_left == 0
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn has_entered(&self, phase: Phase) -> bool {
        self.entered.contains(&phase)
    }

    pub fn flags(&self) -> &SignalFlags {
        self.bus.flags()
    }

    /// Signals fired since the last call, oldest first.
    pub fn drain_signals(&mut self) -> Vec<Signal> {
        self.bus.drain_emitted().collect()
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn frame(&self) -> u64 {
        self.clock.frame()
    }

    pub fn timeline(&self) -> Option<&TimelineRun> {
        self.timeline.as_ref()
    }

    pub fn mixer(&self) -> &DuckingMixer {
        &self.mixer
    }

    pub fn fade_alpha(&self) -> f32 {
        self.fx.alpha()
    }

    pub fn gameplay_attempts(&self) -> u32 {
        self.gameplay_attempts
    }

    pub fn config(&self) -> &PresentationConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::stage::testing::{Call, MockStage};
    use crate::api::types::CueId;
    use crate::assets::config::SegmentConfig;
    use crate::audio::mixer::LoopState;
    use crate::systems::cards::Card;
    use crate::systems::timeline::RunStatus;

    const FIRE: CueId = CueId(90);
    const FRAME: f64 = 16.0;

    fn config() -> PresentationConfig {
        let mut config = PresentationConfig::default();
        config.narration = config.narration.with_cards(vec![Card::new("it was cold")]);
        config.title = config.title.with_cards(vec![Card::new("CABIN").with_extra_hold(1000)]);
        config.ambient.total_budget_ms = 10_000;
        config.ambient.loop_cue = Some(FIRE);
        config.ambient.segments = vec![
            SegmentConfig { text: "the wall is warm".into(), cue: CueId(1), duration_ms: None },
            SegmentConfig { text: "someone was here".into(), cue: CueId(2), duration_ms: None },
        ];
        config
    }

    /// Tick until `done` holds, recording each phase change.
    fn drive(
        ctrl: &mut PhaseController,
        stage: &mut MockStage,
        done: impl Fn(&PhaseController) -> bool,
    ) -> Vec<Phase> {
        let mut seen = vec![ctrl.phase()];
        for _ in 0..4000 {
            if done(&*ctrl) {
                return seen;
            }
            ctrl.tick(FRAME, stage);
            if seen.last() != Some(&ctrl.phase()) {
                seen.push(ctrl.phase());
            }
        }
        panic!("stuck in {:?}", ctrl.phase());
    }

    #[test]
    fn transition_table() {
        assert_eq!(
            transition(Phase::Narration, Trigger::Signal(Signal::NarrationComplete)),
            Some(Phase::Title)
        );
        assert_eq!(transition(Phase::ScreenCovered, Trigger::FramesElapsed), Some(Phase::GameplayInit));
        assert_eq!(transition(Phase::Finished, Trigger::Signal(Signal::Victory)), Some(Phase::Won));
        assert_eq!(transition(Phase::Prologue, Trigger::Signal(Signal::Victory)), None);
        assert_eq!(transition(Phase::Title, Trigger::Signal(Signal::NarrationComplete)), None);
        assert_eq!(transition(Phase::Won, Trigger::Signal(Signal::TimelineComplete)), None);
    }

    #[test]
    fn phases_run_in_order() {
        let mut stage = MockStage::new();
        let mut ctrl = PhaseController::new(config());
        assert!(ctrl.start(&mut stage));
        assert!(!ctrl.start(&mut stage));

        let seen = drive(&mut ctrl, &mut stage, |c| c.phase() == Phase::Finished);
        assert_eq!(
            seen,
            vec![
                Phase::Narration,
                Phase::Title,
                Phase::ScreenCovered,
                Phase::GameplayInit,
                Phase::Prologue,
                Phase::AmbientTimeline,
                Phase::Finished,
            ]
        );
        assert_eq!(
            ctrl.drain_signals(),
            vec![
                Signal::NarrationComplete,
                Signal::TitleComplete,
                Signal::BlinkComplete,
                Signal::TimelineComplete,
            ]
        );
        assert!(ctrl.flags().prologue_complete());
        assert_eq!(stage.played(), vec![CueId(1), CueId(2)]);
        assert_eq!(ctrl.timeline().map(|t| t.status()), Some(RunStatus::Complete));
    }

    #[test]
    fn cover_holds_before_gameplay_and_gameplay_before_fade() {
        let mut stage = MockStage::new();
        let mut ctrl = PhaseController::new(config());
        ctrl.start(&mut stage);
        drive(&mut ctrl, &mut stage, |c| c.phase() == Phase::ScreenCovered);

        let cover = stage.calls.len() - 1;
        assert_eq!(stage.calls[cover], Call::Fill { rect: MockStage::DEFAULT_SCENE, alpha: 1.0 });

        for _ in 0..3 {
            ctrl.tick(FRAME, &mut stage);
            assert_eq!(ctrl.phase(), Phase::ScreenCovered);
        }
        ctrl.tick(FRAME, &mut stage);
        assert_eq!(ctrl.phase(), Phase::GameplayInit);
        assert_eq!(stage.count(&Call::StartGameplay), 1);
        let fills_at_start = stage.fills().len();

        for _ in 0..4 {
            ctrl.tick(FRAME, &mut stage);
        }
        assert_eq!(ctrl.phase(), Phase::Prologue);
        // Nothing but the cover was drawn while gameplay settled.
        assert_eq!(stage.fills().len(), fills_at_start);

        ctrl.tick(FRAME, &mut stage);
        assert!(stage.fills().len() > fills_at_start);
    }

    #[test]
    fn gameplay_start_is_retried_until_ready() {
        let mut stage = MockStage::new();
        stage.gameplay_ready_after = 3;
        let mut ctrl = PhaseController::new(config());
        ctrl.start(&mut stage);
        drive(&mut ctrl, &mut stage, |c| c.phase() == Phase::GameplayInit);
        let entered_at = ctrl.now_ms();

        drive(&mut ctrl, &mut stage, |c| c.gameplay_attempts() == 4);
        assert_eq!(stage.count(&Call::StartGameplay), 1);
        let waited = ctrl.now_ms() - entered_at;
        assert!((150..170).contains(&waited), "waited {}", waited);

        drive(&mut ctrl, &mut stage, |c| c.phase() == Phase::Prologue);
    }

    #[test]
    fn gameplay_that_never_starts_does_not_block() {
        let mut stage = MockStage::new();
        stage.gameplay_ready_after = u32::MAX;
        let mut ctrl = PhaseController::new(config());
        ctrl.start(&mut stage);

        drive(&mut ctrl, &mut stage, |c| c.phase() == Phase::Prologue);
        // The first call plus 200 retries.
        assert_eq!(stage.start_attempts, 201);
        assert_eq!(stage.count(&Call::StartGameplay), 0);
    }

    #[test]
    fn victory_mid_segment_stops_the_timeline() {
        let mut stage = MockStage::new();
        let mut ctrl = PhaseController::new(config());
        ctrl.start(&mut stage);
        drive(&mut ctrl, &mut stage, |c| {
            c.timeline().and_then(|t| t.current_segment()) == Some(0)
        });
        assert_eq!(ctrl.mixer().state(), LoopState::Playing);
        let before = stage.calls.len();

        ctrl.raise_victory(&mut stage);
        assert_eq!(ctrl.phase(), Phase::Won);
        assert_eq!(ctrl.timeline().map(|t| t.status()), Some(RunStatus::Stopped));
        let after = &stage.calls[before..];
        assert!(after.contains(&Call::Pause(CueId(1))));
        assert!(after.contains(&Call::Volume(FIRE, 1.0)));
        assert!(after.contains(&Call::Pause(FIRE)));
        assert!(after.contains(&Call::DetachCaption(CaptionLayer::Wall)));

        drive(&mut ctrl, &mut stage, |c| c.flags().is_set(Signal::FinaleComplete));
        assert_eq!(ctrl.fade_alpha(), 1.0);
        let signals = ctrl.drain_signals();
        assert!(!signals.contains(&Signal::TimelineComplete));
        assert_eq!(signals.last(), Some(&Signal::FinaleComplete));
        assert_eq!(stage.played(), vec![CueId(1)]);

        // Nothing left running.
        for _ in 0..1000 {
            ctrl.tick(FRAME, &mut stage);
        }
        assert_eq!(ctrl.phase(), Phase::Won);
        assert_eq!(stage.played(), vec![CueId(1)]);
        assert!(ctrl.drain_signals().is_empty());
    }

    #[test]
    fn early_victory_is_honoured_when_the_ambient_phase_begins() {
        let mut stage = MockStage::new();
        let mut ctrl = PhaseController::new(config());
        ctrl.start(&mut stage);
        ctrl.raise_victory(&mut stage);
        assert_eq!(ctrl.phase(), Phase::Narration);

        let seen = drive(&mut ctrl, &mut stage, |c| c.phase() == Phase::Won);
        assert!(seen.ends_with(&[Phase::Prologue, Phase::Won]));
        assert!(ctrl.has_entered(Phase::AmbientTimeline));
        assert!(ctrl.timeline().is_none());
        assert!(stage.played().is_empty());
        assert_eq!(stage.count(&Call::Play { cue: FIRE, looping: true }), 0);
    }

    #[test]
    fn victory_after_the_track_ends_still_wins() {
        let mut stage = MockStage::new();
        let mut ctrl = PhaseController::new(config());
        ctrl.start(&mut stage);
        drive(&mut ctrl, &mut stage, |c| c.phase() == Phase::Finished);

        ctrl.raise_victory(&mut stage);
        assert_eq!(ctrl.phase(), Phase::Won);
        assert_eq!(ctrl.mixer().state(), LoopState::Paused);
    }

    #[test]
    fn repeated_signals_are_ignored() {
        let mut stage = MockStage::new();
        let mut ctrl = PhaseController::new(config());
        ctrl.start(&mut stage);
        drive(&mut ctrl, &mut stage, |c| c.phase() == Phase::Title);

        ctrl.emit(Signal::NarrationComplete, &mut stage);
        assert!(!ctrl.start(&mut stage));
        assert_eq!(ctrl.phase(), Phase::Title);
        assert_eq!(stage.captions(CaptionLayer::Story), vec!["it was cold"]);
    }

    #[test]
    fn host_cannot_complete_a_running_phase() {
        let mut stage = MockStage::new();
        let mut ctrl = PhaseController::new(config());
        ctrl.start(&mut stage);

        assert!(!ctrl.signal(Signal::NarrationComplete, &mut stage));
        assert_eq!(ctrl.phase(), Phase::Narration);
        assert!(!ctrl.flags().is_set(Signal::NarrationComplete));

        // The narration still tears down its own layer before the title shows.
        drive(&mut ctrl, &mut stage, |c| c.phase() == Phase::Title);
        let detached = stage.calls.iter().position(|c| *c == Call::DetachCaption(CaptionLayer::Story));
        let title = stage.calls.iter().position(|c| {
            matches!(c, Call::ShowCaption { layer: CaptionLayer::Title, .. })
        });
        assert!(detached.is_some() && detached < title);
    }

    #[test]
    fn host_cannot_end_the_timeline_mid_segment() {
        let mut stage = MockStage::new();
        let mut ctrl = PhaseController::new(config());
        ctrl.start(&mut stage);
        drive(&mut ctrl, &mut stage, |c| {
            c.timeline().and_then(|t| t.current_segment()) == Some(0)
        });

        assert!(!ctrl.signal(Signal::TimelineComplete, &mut stage));
        assert_eq!(ctrl.phase(), Phase::AmbientTimeline);
        assert!(ctrl.mixer().is_foreground());

        drive(&mut ctrl, &mut stage, |c| c.phase() == Phase::Finished);
        assert_eq!(stage.played(), vec![CueId(1), CueId(2)]);
        assert!(!ctrl.mixer().is_foreground());
        assert_eq!(ctrl.timeline().map(|t| t.status()), Some(RunStatus::Complete));
    }

    #[test]
    fn host_may_raise_victory_by_signal() {
        let mut stage = MockStage::new();
        let mut ctrl = PhaseController::new(config());
        ctrl.start(&mut stage);
        drive(&mut ctrl, &mut stage, |c| c.phase() == Phase::AmbientTimeline);

        assert!(ctrl.signal(Signal::Victory, &mut stage));
        assert_eq!(ctrl.phase(), Phase::Won);
    }

    #[test]
    fn empty_ambient_track_finishes_quietly() {
        let mut config = config();
        config.ambient.segments.clear();
        let mut stage = MockStage::new();
        let mut ctrl = PhaseController::new(config);
        ctrl.start(&mut stage);

        drive(&mut ctrl, &mut stage, |c| c.phase() == Phase::Finished);
        assert!(ctrl.timeline().is_none());
        assert!(!ctrl.drain_signals().contains(&Signal::TimelineComplete));
    }

    #[test]
    fn nothing_happens_before_start() {
        let mut stage = MockStage::new();
        let mut ctrl = PhaseController::new(config());
        ctrl.tick(FRAME, &mut stage);
        assert!(stage.calls.is_empty());
        assert!(!ctrl.has_entered(Phase::Narration));
    }
}

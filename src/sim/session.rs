//! Exercise session controller
//!
//! Owns the [`SessionState`] and drives the lifecycle:
//! Idle → Countdown(3,2,1) → Running ⇄ Paused → Stopped.
//!
//! The controller never touches a real clock or timer. Every entry point
//! takes the host's monotonic time and returns the [`Effect`]s the host must
//! carry out (draw, request a frame, hand a batch to storage). Between calls
//! the host wakes the controller at [`SessionController::next_deadline`].

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::difficulty::DifficultyProfile;
use super::scoring::ClickScore;
use super::state::{SessionMode, SessionPhase, SessionState, Trial, TrialRecord, TrialStage};
use super::tick::{self, FrameEvent};
use super::timer::Deadline;
use super::trajectory::{Arena, Trajectory};
use crate::consts::*;
use crate::persistence::PersistenceError;
use crate::renderer::DrawCommand;
use crate::renderer::scene;
use crate::{round_non_negative, rounded_mean};

/// Host-side action requested by the controller
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Replay these commands onto the canvas (in order, after earlier draws)
    Draw(Vec<DrawCommand>),
    /// Schedule one animation frame, then call `frame`
    RequestFrame,
    /// Drop any outstanding animation frame
    CancelFrame,
    /// Hand the finished session to the store
    Persist(SessionBatch),
}

/// A finished session's records, handed to persistence exactly once
#[derive(Debug, Clone, PartialEq)]
pub struct SessionBatch {
    pub records: Vec<TrialRecord>,
    pub mean_precision: u32,
}

impl SessionBatch {
    fn new(records: Vec<TrialRecord>) -> Self {
        let mean_precision = rounded_mean(records.iter().map(|r| r.precision as u32));
        Self {
            records,
            mean_precision,
        }
    }

    /// Transient message for the outcome of submitting this batch
    pub fn notice(&self, result: &Result<(), PersistenceError>) -> Notice {
        match result {
            Ok(()) => Notice {
                kind: NoticeKind::Success,
                message: format!(
                    "¡Sesión guardada! Precisión promedio: {}%",
                    self.mean_precision
                ),
            },
            Err(e) => Notice {
                kind: NoticeKind::Error,
                message: format!("No se pudieron guardar los datos del entrenamiento ({e})"),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Short-lived message shown under the canvas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// Result of a click
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// Not awaiting a click; dropped
    Ignored,
    Scored { record: TrialRecord, hit: bool },
}

/// Runs training sessions on one canvas
#[derive(Debug, Clone)]
pub struct SessionController {
    state: SessionState,
    arena: Arena,
    rng: Pcg32,
}

impl SessionController {
    pub fn new(arena: Arena, seed: u64) -> Self {
        Self {
            state: SessionState::default(),
            arena,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn arena(&self) -> Arena {
        self.arena
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    /// Earliest time (ms) at which `wake` has work to do
    pub fn next_deadline(&self) -> Option<f64> {
        self.state.next_deadline()
    }

    /// Placeholder to draw before any session has run
    pub fn idle_scene(&self) -> Vec<DrawCommand> {
        scene::idle_placeholder(self.arena)
    }

    /// Begin a new session: reset everything and start the countdown.
    ///
    /// Ignored while a session is already live.
    pub fn start(&mut self, mode: SessionMode, level: u8, now: f64) -> Vec<Effect> {
        if self.state.phase.is_live() {
            log::debug!("Start ignored, session already live");
            return Vec::new();
        }
        // Panics on an invalid level before any state is touched
        DifficultyProfile::for_level(level);

        self.state = SessionState::begin(mode, level);
        self.state.second_timer = Some(Deadline::after(now, SECOND_MS));
        log::info!("Session starting: {:?}, level {}", mode, level);

        vec![Effect::Draw(scene::countdown(self.arena, COUNTDOWN_SECS))]
    }

    /// Process every timer that is due at `now`
    pub fn wake(&mut self, now: f64) -> Vec<Effect> {
        let mut effects = Vec::new();
        loop {
            let second_due = self.state.second_timer.filter(|d| d.is_due(now));
            let pacing_due = self.state.pacing.filter(|d| d.is_due(now));
            let (second_at, pacing_at) = (
                second_due.and_then(|d| d.due_at()),
                pacing_due.and_then(|d| d.due_at()),
            );

            match (second_at, pacing_at) {
                (Some(s), Some(p)) if p < s => self.on_pacing(p, &mut effects),
                (Some(s), _) => self.on_second(s, &mut effects),
                (None, Some(p)) => self.on_pacing(p, &mut effects),
                (None, None) => break,
            }
        }
        effects
    }

    /// One animation frame
    pub fn frame(&mut self, now: f64) -> Vec<Effect> {
        self.state.frame_requested = false;
        let view = self.state.snapshot();
        let Some(trial) = self.state.trial.as_mut() else {
            return Vec::new();
        };

        let out = tick::frame(trial, &view, now);
        let mut effects = Vec::new();
        if !out.commands.is_empty() {
            effects.push(Effect::Draw(out.commands));
        }

        match out.event {
            FrameEvent::Hidden { landing } => {
                log::debug!(
                    "Trial {} hidden at x={:.1}, landing ({:.1}, {:.1})",
                    trial.number,
                    trial.pos.x,
                    landing.x,
                    landing.y
                );
            }
            FrameEvent::Abandoned => {
                log::warn!("Trial {} left the canvas without hiding", trial.number);
                self.schedule_pacing(now, NEXT_TRIAL_DELAY_MS);
            }
            FrameEvent::Moved | FrameEvent::Skipped => {}
        }

        if out.rearm {
            self.request_frame(&mut effects);
        }
        effects
    }

    /// A click/tap in canvas coordinates.
    ///
    /// `now` is the monotonic clock, `epoch_ms` the wall clock used as the
    /// record id. Scoring works while paused too.
    pub fn click(&mut self, point: Vec2, now: f64, epoch_ms: i64) -> (ClickOutcome, Vec<Effect>) {
        if !self.state.phase.is_active() {
            log::trace!("Click ignored: no active session");
            return (ClickOutcome::Ignored, Vec::new());
        }
        let zone_width = self.state.profile().target_zone_width;
        let Some(trial) = self.state.trial.as_mut() else {
            return (ClickOutcome::Ignored, Vec::new());
        };
        let TrialStage::AwaitingClick { hidden_at, landing } = trial.stage else {
            log::trace!("Click ignored: trial {} not awaiting", trial.number);
            return (ClickOutcome::Ignored, Vec::new());
        };

        let score = ClickScore::evaluate(point, landing, zone_width);
        trial.stage = TrialStage::Feedback { score };
        let trial_number = trial.number;

        let record = TrialRecord {
            id: self.state.next_record_id(epoch_ms),
            exercise_type: EXERCISE_LABEL.to_string(),
            response_time_ms: round_non_negative(now - hidden_at),
            precision: score.precision,
        };
        self.state.trials.push(record.clone());
        self.state.done_reps += 1;
        if score.hit {
            self.state.consecutive_hits += 1;
        } else {
            self.state.consecutive_hits = 0;
        }
        log::debug!(
            "Trial {} scored {} ({}) in {} ms",
            trial_number,
            record.precision,
            if score.hit { "hit" } else { "miss" },
            record.response_time_ms
        );

        self.schedule_pacing(now, REVEAL_DELAY_MS);
        let effects = vec![Effect::Draw(vec![scene::click_marker(point, score.hit)])];
        (
            ClickOutcome::Scored {
                record,
                hit: score.hit,
            },
            effects,
        )
    }

    /// Toggle between running and paused
    pub fn toggle_pause(&mut self, now: f64) -> Vec<Effect> {
        let mut effects = Vec::new();
        match self.state.phase {
            SessionPhase::Running => {
                self.state.phase = SessionPhase::Paused;
                self.for_each_timer(|d| d.freeze(now));
                log::info!("Session paused");
            }
            SessionPhase::Paused => {
                self.state.phase = SessionPhase::Running;
                self.for_each_timer(|d| d.thaw(now));
                if self.state.trial.as_ref().is_some_and(Trial::is_visible) {
                    self.request_frame(&mut effects);
                }
                log::info!("Session resumed");
            }
            _ => {}
        }
        effects
    }

    /// End the session. Idempotent: only the first call submits the batch.
    pub fn stop(&mut self) -> Vec<Effect> {
        if !self.state.phase.is_live() {
            return Vec::new();
        }

        self.state.phase = SessionPhase::Stopped;
        self.state.trial = None;
        self.state.second_timer = None;
        self.state.pacing = None;
        self.state.frame_requested = false;

        let mut effects = vec![Effect::CancelFrame];
        let records = std::mem::take(&mut self.state.trials);
        log::info!("Session stopped after {} trials", records.len());
        if !records.is_empty() {
            effects.push(Effect::Persist(SessionBatch::new(records)));
        }
        effects.push(Effect::Draw(scene::idle_placeholder(self.arena)));
        effects
    }

    fn on_second(&mut self, due: f64, effects: &mut Vec<Effect>) {
        match self.state.phase {
            SessionPhase::Countdown { remaining } if remaining > 1 => {
                let remaining = remaining - 1;
                self.state.phase = SessionPhase::Countdown { remaining };
                self.state.second_timer = Some(Deadline::after(due, SECOND_MS));
                effects.push(Effect::Draw(scene::countdown(self.arena, remaining)));
            }
            SessionPhase::Countdown { .. } => {
                self.state.phase = SessionPhase::Running;
                self.state.second_timer = match self.state.mode {
                    SessionMode::ByTime { .. } => Some(Deadline::after(due, SECOND_MS)),
                    SessionMode::ByReps { .. } => None,
                };
                log::info!("Countdown finished, session running");
                self.launch_trial(effects);
            }
            SessionPhase::Running => {
                self.state.remaining_secs = self.state.remaining_secs.saturating_sub(1);
                if self.state.remaining_secs == 0 {
                    log::info!("Time is up");
                    effects.extend(self.stop());
                } else {
                    self.state.second_timer = Some(Deadline::after(due, SECOND_MS));
                }
            }
            _ => self.state.second_timer = None,
        }
    }

    fn on_pacing(&mut self, due: f64, effects: &mut Vec<Effect>) {
        self.state.pacing = None;
        let Some(trial) = self.state.trial.as_mut() else {
            return;
        };
        let stage = trial.stage;
        match stage {
            TrialStage::Feedback { score } => {
                trial.stage = TrialStage::Revealed { score };
                let radius = trial.trajectory.radius;
                self.schedule_pacing(due, NEXT_TRIAL_DELAY_MS);
                effects.push(Effect::Draw(vec![scene::reveal_marker(score.target, radius)]));
            }
            TrialStage::Revealed { .. } | TrialStage::Abandoned => {
                let reps_done = self
                    .state
                    .reps_target()
                    .is_some_and(|target| self.state.done_reps >= target);
                if reps_done {
                    log::info!("All {} repetitions done", self.state.done_reps);
                    effects.extend(self.stop());
                } else {
                    self.launch_trial(effects);
                }
            }
            TrialStage::Flying | TrialStage::AwaitingClick { .. } => {}
        }
    }

    fn launch_trial(&mut self, effects: &mut Vec<Effect>) {
        let profile = self.state.profile();
        let trajectory = Trajectory::launch(profile, self.arena, &mut self.rng);
        self.state.launched += 1;
        log::debug!(
            "Trial {} launched: {} at {:.2} px/frame",
            self.state.launched,
            trajectory.shape.as_str(),
            trajectory.speed
        );
        self.state.trial = Some(Trial::new(self.state.launched, trajectory));
        if self.state.phase == SessionPhase::Running {
            self.request_frame(effects);
        }
    }

    fn schedule_pacing(&mut self, now: f64, delay_ms: f64) {
        let mut deadline = Deadline::after(now, delay_ms);
        if self.state.phase == SessionPhase::Paused {
            deadline.freeze(now);
        }
        self.state.pacing = Some(deadline);
    }

    fn request_frame(&mut self, effects: &mut Vec<Effect>) {
        if !self.state.frame_requested {
            self.state.frame_requested = true;
            effects.push(Effect::RequestFrame);
        }
    }

    fn for_each_timer(&mut self, mut f: impl FnMut(&mut Deadline)) {
        for deadline in [&mut self.state.second_timer, &mut self.state.pacing]
            .into_iter()
            .flatten()
        {
            f(deadline);
        }
    }
}

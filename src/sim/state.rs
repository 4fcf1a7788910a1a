//! Session state and core simulation types
//!
//! Everything the session controller owns lives here. The render loop only
//! ever sees a [`FrameView`] snapshot.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::difficulty::DifficultyProfile;
use super::scoring::ClickScore;
use super::timer::Deadline;
use super::trajectory::Trajectory;
use crate::consts::COUNTDOWN_SECS;
use crate::rounded_mean;

/// One scored trial, the unit handed to persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialRecord {
    /// Creation time (Unix ms); unique within a session and sortable
    pub id: i64,
    pub exercise_type: String,
    /// Time between the ball disappearing and the click
    pub response_time_ms: u32,
    /// 0-100
    pub precision: u8,
}

/// How a session ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// Stop after this many seconds of running time
    ByTime { seconds: u32 },
    /// Stop after this many resolved trials
    ByReps { target: u32 },
}

impl Default for SessionMode {
    fn default() -> Self {
        SessionMode::ByTime { seconds: 60 }
    }
}

/// Lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Nothing started yet
    Idle,
    /// Counting down to the first launch
    Countdown { remaining: u8 },
    /// Trials in progress
    Running,
    /// Frozen; an awaiting-click trial stays awaiting
    Paused,
    /// Ended (manually or by time/reps)
    Stopped,
}

impl SessionPhase {
    /// Running or paused - a trial may be in flight
    pub fn is_active(&self) -> bool {
        matches!(self, SessionPhase::Running | SessionPhase::Paused)
    }

    /// Anything between start and stop
    pub fn is_live(&self) -> bool {
        self.is_active() || matches!(self, SessionPhase::Countdown { .. })
    }
}

/// Where a trial is in its launch-to-next-trial cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrialStage {
    /// Ball visible and moving
    Flying,
    /// Ball hidden; landing point frozen, waiting for the user
    AwaitingClick { hidden_at: f64, landing: Vec2 },
    /// Click marker shown, landing point not yet revealed
    Feedback { score: ClickScore },
    /// Landing point revealed, waiting before the next launch
    Revealed { score: ClickScore },
    /// Left the canvas without ever being hidden; produces no record
    Abandoned,
}

/// A single ball launch
#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    /// 1-based launch counter within the session
    pub number: u32,
    pub trajectory: Trajectory,
    pub pos: Vec2,
    pub stage: TrialStage,
}

impl Trial {
    pub fn new(number: u32, trajectory: Trajectory) -> Self {
        Self {
            number,
            trajectory,
            pos: trajectory.start,
            stage: TrialStage::Flying,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.stage == TrialStage::Flying
    }

    pub fn is_awaiting_click(&self) -> bool {
        matches!(self.stage, TrialStage::AwaitingClick { .. })
    }

    /// Frozen landing point, once hidden
    pub fn landing(&self) -> Option<Vec2> {
        match self.stage {
            TrialStage::AwaitingClick { landing, .. } => Some(landing),
            TrialStage::Feedback { score } | TrialStage::Revealed { score } => Some(score.target),
            TrialStage::Flying | TrialStage::Abandoned => None,
        }
    }
}

/// Read-only snapshot the render loop takes at the top of every frame
#[derive(Debug, Clone, Copy)]
pub struct FrameView {
    pub active: bool,
    pub paused: bool,
    pub profile: &'static DifficultyProfile,
}

/// Live statistics for the HUD
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Sum of precision over all trials
    pub total_score: u32,
    pub avg_response_ms: u32,
    /// Mean precision
    pub accuracy: u32,
    pub consecutive_hits: u32,
}

/// Complete session state, owned by the session controller
#[derive(Debug, Clone)]
pub struct SessionState {
    pub mode: SessionMode,
    pub level: u8,
    pub phase: SessionPhase,
    /// Records in completion order
    pub trials: Vec<TrialRecord>,
    pub consecutive_hits: u32,
    /// By-time: seconds left
    pub remaining_secs: u32,
    /// Resolved trials this session
    pub done_reps: u32,
    /// The trial in flight (at most one)
    pub trial: Option<Trial>,
    /// Trials launched this session
    pub launched: u32,
    /// Countdown / by-time ticking
    pub(crate) second_timer: Option<Deadline>,
    /// Feedback pacing for the current trial
    pub(crate) pacing: Option<Deadline>,
    /// A frame callback is outstanding with the host
    pub(crate) frame_requested: bool,
    last_record_id: i64,
}

impl SessionState {
    pub fn new(mode: SessionMode, level: u8) -> Self {
        let remaining_secs = match mode {
            SessionMode::ByTime { seconds } => seconds,
            SessionMode::ByReps { .. } => 0,
        };
        Self {
            mode,
            level,
            phase: SessionPhase::Idle,
            trials: Vec::new(),
            consecutive_hits: 0,
            remaining_secs,
            done_reps: 0,
            trial: None,
            launched: 0,
            second_timer: None,
            pacing: None,
            frame_requested: false,
            last_record_id: i64::MIN,
        }
    }

    /// Fresh state for a new run, entering the countdown
    pub fn begin(mode: SessionMode, level: u8) -> Self {
        let mut state = Self::new(mode, level);
        state.phase = SessionPhase::Countdown {
            remaining: COUNTDOWN_SECS,
        };
        state
    }

    pub fn profile(&self) -> &'static DifficultyProfile {
        DifficultyProfile::for_level(self.level)
    }

    pub fn snapshot(&self) -> FrameView {
        FrameView {
            active: self.phase.is_active(),
            paused: self.phase == SessionPhase::Paused,
            profile: self.profile(),
        }
    }

    /// Record id for a trial created at `epoch_ms`, strictly increasing
    pub(crate) fn next_record_id(&mut self, epoch_ms: i64) -> i64 {
        let id = epoch_ms.max(self.last_record_id.saturating_add(1));
        self.last_record_id = id;
        id
    }

    /// Earliest time the host needs to wake the controller
    pub fn next_deadline(&self) -> Option<f64> {
        [self.second_timer, self.pacing]
            .into_iter()
            .flatten()
            .filter_map(|d| d.due_at())
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Target count for by-reps sessions
    pub fn reps_target(&self) -> Option<u32> {
        match self.mode {
            SessionMode::ByReps { target } => Some(target),
            SessionMode::ByTime { .. } => None,
        }
    }

    /// Fraction of the session completed (0-1) for the progress bar
    pub fn completion(&self) -> f32 {
        match self.mode {
            SessionMode::ByTime { seconds } if seconds > 0 => {
                1.0 - self.remaining_secs as f32 / seconds as f32
            }
            SessionMode::ByReps { target } if target > 0 => {
                (self.done_reps as f32 / target as f32).min(1.0)
            }
            _ => 0.0,
        }
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            total_score: self.trials.iter().map(|t| t.precision as u32).sum(),
            avg_response_ms: rounded_mean(self.trials.iter().map(|t| t.response_time_ms)),
            accuracy: rounded_mean(self.trials.iter().map(|t| t.precision as u32)),
            consecutive_hits: self.consecutive_hits,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(SessionMode::default(), super::difficulty::DEFAULT_LEVEL)
    }
}

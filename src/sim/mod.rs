//! Deterministic simulation module
//!
//! All training logic lives here. This module must be pure and deterministic:
//! - Time is passed in by the host, never read
//! - Seeded RNG only
//! - One trial in flight at a time
//! - No rendering backend or platform dependencies

pub mod difficulty;
pub mod scoring;
pub mod session;
pub mod state;
pub mod tick;
pub mod timer;
pub mod trajectory;

pub use difficulty::{DEFAULT_LEVEL, DifficultyProfile, MAX_LEVEL, MIN_LEVEL, TrajectoryShape};
pub use scoring::{ClickScore, is_hit, precision};
pub use session::{ClickOutcome, Effect, Notice, NoticeKind, SessionBatch, SessionController};
pub use state::{
    FrameView, SessionMode, SessionPhase, SessionState, SessionStats, Trial, TrialRecord,
    TrialStage,
};
pub use tick::{FrameEvent, FrameOutput, frame};
pub use timer::Deadline;
pub use trajectory::{Arena, Trajectory};

//! Difficulty profile table
//!
//! Static per-level simulation parameters. Levels run 1 (easiest) to 5.

use serde::{Deserialize, Serialize};

/// Lowest and highest selectable difficulty level
pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 5;

/// Default level for a fresh install
pub const DEFAULT_LEVEL: u8 = 3;

/// Trajectory families the ball can follow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrajectoryShape {
    /// Flat line at the start height
    Horizontal,
    /// Straight line rising toward the target zone
    DiagonalUp,
    /// Straight line falling toward the target zone
    DiagonalDown,
    /// Eased rise (sine profile)
    CurvedUp,
    /// Eased descent (cosine profile)
    CurvedDown,
}

impl TrajectoryShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrajectoryShape::Horizontal => "horizontal",
            TrajectoryShape::DiagonalUp => "diagonal_up",
            TrajectoryShape::DiagonalDown => "diagonal_down",
            TrajectoryShape::CurvedUp => "curved_up",
            TrajectoryShape::CurvedDown => "curved_down",
        }
    }

    /// Linear shapes extrapolate by time of flight; eased shapes re-evaluate the closed form
    pub fn is_linear(&self) -> bool {
        matches!(
            self,
            TrajectoryShape::Horizontal | TrajectoryShape::DiagonalUp | TrajectoryShape::DiagonalDown
        )
    }
}

/// Simulation parameters for one difficulty level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyProfile {
    pub level: u8,
    /// Display name shown in the canvas corner
    pub label: &'static str,
    /// Horizontal speed range in px/frame (min, max)
    pub ball_speed: (f32, f32),
    /// Fraction of canvas width at which the ball is hidden
    pub hide_fraction: f32,
    pub shapes: &'static [TrajectoryShape],
    pub ball_radius: f32,
    pub target_zone_width: f32,
}

use TrajectoryShape::*;

static PROFILES: [DifficultyProfile; 5] = [
    DifficultyProfile {
        level: 1,
        label: "Principiante",
        ball_speed: (2.0, 3.0),
        hide_fraction: 0.5,
        shapes: &[Horizontal],
        ball_radius: 15.0,
        target_zone_width: 60.0,
    },
    DifficultyProfile {
        level: 2,
        label: "Básico",
        ball_speed: (2.5, 4.0),
        hide_fraction: 0.45,
        shapes: &[Horizontal, DiagonalUp, DiagonalDown],
        ball_radius: 13.0,
        target_zone_width: 50.0,
    },
    DifficultyProfile {
        level: 3,
        label: "Intermedio",
        ball_speed: (3.0, 5.0),
        hide_fraction: 0.4,
        shapes: &[Horizontal, DiagonalUp, DiagonalDown],
        ball_radius: 12.0,
        target_zone_width: 40.0,
    },
    DifficultyProfile {
        level: 4,
        label: "Avanzado",
        ball_speed: (4.0, 6.5),
        hide_fraction: 0.35,
        shapes: &[Horizontal, DiagonalUp, DiagonalDown, CurvedUp, CurvedDown],
        ball_radius: 10.0,
        target_zone_width: 35.0,
    },
    DifficultyProfile {
        level: 5,
        label: "Élite",
        ball_speed: (5.0, 8.0),
        hide_fraction: 0.3,
        shapes: &[CurvedUp, CurvedDown, DiagonalUp, DiagonalDown],
        ball_radius: 8.0,
        target_zone_width: 30.0,
    },
];

impl DifficultyProfile {
    /// Look up the profile for a level.
    ///
    /// # Panics
    /// If `level` is outside `MIN_LEVEL..=MAX_LEVEL`. Levels come from a fixed
    /// selector, so an out-of-range value is a programming error.
    pub fn for_level(level: u8) -> &'static DifficultyProfile {
        assert!(
            is_valid_level(level),
            "difficulty level {level} outside {MIN_LEVEL}..={MAX_LEVEL}"
        );
        &PROFILES[(level - MIN_LEVEL) as usize]
    }

    /// All profiles in level order
    pub fn all() -> &'static [DifficultyProfile] {
        &PROFILES
    }
}

#[inline]
pub fn is_valid_level(level: u8) -> bool {
    (MIN_LEVEL..=MAX_LEVEL).contains(&level)
}

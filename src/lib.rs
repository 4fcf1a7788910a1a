//! Trajectory Trainer - predict where the hidden ball lands
//!
//! Core modules:
//! - `sim`: Deterministic simulation (trajectories, scoring, session lifecycle)
//! - `renderer`: Draw command generation and the Canvas 2D backend
//! - `platform`: Browser/native platform abstraction (clocks, coordinates)
//! - `persistence`: Trial history sink/source
//! - `progress`: Historical trial aggregation for the progress view

pub mod persistence;
pub mod platform;
pub mod progress;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use progress::ProgressReport;
pub use settings::Settings;

/// Training configuration constants
pub mod consts {
    /// Logical canvas size (the drawing buffer, not the CSS box)
    pub const CANVAS_WIDTH: f32 = 1000.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;

    /// Target zone starts this far from the right edge
    pub const TARGET_ZONE_INSET: f32 = 50.0;

    /// Minimum precision that counts as a hit (and keeps the streak alive)
    pub const HIT_THRESHOLD: u8 = 75;

    /// Delay between the click marker and revealing the true landing point
    pub const REVEAL_DELAY_MS: f64 = 500.0;
    /// Delay between the reveal and the next launch (or session end)
    pub const NEXT_TRIAL_DELAY_MS: f64 = 1500.0;

    /// Countdown before the first launch
    pub const COUNTDOWN_SECS: u8 = 3;
    /// Coarse session timer period
    pub const SECOND_MS: f64 = 1000.0;

    /// Radius of the hit/miss marker drawn at the click point
    pub const FEEDBACK_MARKER_RADIUS: f32 = 20.0;

    /// How long transient notices stay on screen
    pub const NOTICE_DURATION_MS: u32 = 3000;

    /// Label stored with every trial record
    pub const EXERCISE_LABEL: &str = "Anticipación de Trayectoria";

    /// Session length choices
    pub const TIME_OPTIONS_SECS: [u32; 3] = [30, 60, 90];
    pub const REPS_OPTIONS: [u32; 3] = [10, 20, 30];
}

/// Round a non-negative float to the nearest integer, saturating at zero
#[inline]
pub fn round_non_negative(value: f64) -> u32 {
    if value.is_nan() || value <= 0.0 {
        0
    } else {
        value.round().min(u32::MAX as f64) as u32
    }
}

/// Integer mean of a sequence, rounded to nearest (0 for an empty sequence)
pub fn rounded_mean<I>(values: I) -> u32
where
    I: IntoIterator<Item = u32>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0u64, 0u64), |(sum, count), v| (sum + v as u64, count + 1));
    if count == 0 {
        0
    } else {
        round_non_negative(sum as f64 / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_non_negative() {
        assert_eq!(round_non_negative(-3.2), 0);
        assert_eq!(round_non_negative(f64::NAN), 0);
        assert_eq!(round_non_negative(2.5), 3);
        assert_eq!(round_non_negative(2.49), 2);
    }

    #[test]
    fn test_rounded_mean() {
        assert_eq!(rounded_mean(Vec::<u32>::new()), 0);
        assert_eq!(rounded_mean([100, 50]), 75);
        assert_eq!(rounded_mean([1, 2]), 2);
    }
}

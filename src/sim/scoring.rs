//! Click scoring
//!
//! Turns a click/tap against the frozen landing point into a 0-100 precision.

use glam::Vec2;

use crate::consts::HIT_THRESHOLD;

/// Precision for a click `distance` px from the landing point.
///
/// Falls linearly from 100 at the exact point to 0 at twice the target zone
/// width, then stays at 0.
pub fn precision(distance: f32, target_zone_width: f32) -> u8 {
    let tolerance = 2.0 * target_zone_width;
    if tolerance <= 0.0 {
        return if distance <= 0.0 { 100 } else { 0 };
    }
    let raw = 100.0 - (distance / tolerance) * 100.0;
    raw.clamp(0.0, 100.0).round() as u8
}

/// Whether a precision counts as a hit
#[inline]
pub fn is_hit(precision: u8) -> bool {
    precision >= HIT_THRESHOLD
}

/// Scored click before it becomes a record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickScore {
    pub click: Vec2,
    pub target: Vec2,
    pub distance: f32,
    pub precision: u8,
    pub hit: bool,
}

impl ClickScore {
    pub fn evaluate(click: Vec2, target: Vec2, target_zone_width: f32) -> Self {
        let distance = click.distance(target);
        let precision = precision(distance, target_zone_width);
        Self {
            click,
            target,
            distance,
            precision,
            hit: is_hit(precision),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_exact_click_is_perfect() {
        assert_eq!(precision(0.0, 40.0), 100);
        assert!(is_hit(precision(0.0, 40.0)));
    }

    #[test]
    fn test_two_zone_widths_is_zero() {
        assert_eq!(precision(80.0, 40.0), 0);
        assert_eq!(precision(500.0, 40.0), 0);
        assert!(!is_hit(0));
    }

    #[test]
    fn test_threshold_boundary() {
        // 25% of the tolerance away -> exactly 75
        assert_eq!(precision(20.0, 40.0), 75);
        assert!(is_hit(75));
        assert!(!is_hit(74));
    }

    #[test]
    fn test_rounding() {
        // 100 - 12.5 = 87.5 rounds away from zero
        assert_eq!(precision(10.0, 40.0), 88);
    }

    #[test]
    fn test_evaluate() {
        let score = ClickScore::evaluate(Vec2::new(970.0, 330.0), Vec2::new(970.0, 300.0), 60.0);
        assert_eq!(score.distance, 30.0);
        assert_eq!(score.precision, 75);
        assert!(score.hit);
    }

    proptest! {
        #[test]
        fn precision_is_monotonic(a in 0.0f32..1000.0, b in 0.0f32..1000.0, zone in 10.0f32..100.0) {
            let (near, far) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(precision(near, zone) >= precision(far, zone));
        }

        #[test]
        fn precision_is_bounded(d in 0.0f32..10_000.0, zone in 1.0f32..200.0) {
            prop_assert!(precision(d, zone) <= 100);
        }

        #[test]
        fn beyond_tolerance_scores_zero(extra in 0.0f32..1000.0, zone in 1.0f32..200.0) {
            prop_assert_eq!(precision(2.0 * zone + extra, zone), 0);
        }
    }
}

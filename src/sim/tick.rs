//! Per-frame render loop step
//!
//! Called once per display frame while a ball is visible. Advances the ball,
//! detects the occlusion transition and builds the frame's draw list.

use glam::Vec2;

use super::state::{FrameView, Trial, TrialStage};
use crate::renderer::DrawCommand;
use crate::renderer::scene;

/// What happened to the trial this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameEvent {
    /// Session paused/inactive or no ball in flight; nothing drawn
    Skipped,
    /// Ball moved and is still visible
    Moved,
    /// Ball crossed the hide point; landing point frozen
    Hidden { landing: Vec2 },
    /// Ball left the canvas while still visible
    Abandoned,
}

/// Result of one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    pub commands: Vec<DrawCommand>,
    pub event: FrameEvent,
    /// Whether another frame should be requested
    pub rearm: bool,
}

impl FrameOutput {
    fn skipped() -> Self {
        Self {
            commands: Vec::new(),
            event: FrameEvent::Skipped,
            rearm: false,
        }
    }
}

/// Advance `trial` by one frame.
///
/// `now` is the monotonic clock (ms) used to timestamp the hide transition.
pub fn frame(trial: &mut Trial, view: &FrameView, now: f64) -> FrameOutput {
    // Pause and stop are honoured before anything is drawn
    if !view.active || view.paused || !trial.is_visible() {
        return FrameOutput::skipped();
    }

    let trajectory = trial.trajectory;
    let mut commands = scene::trial_backdrop(trajectory.arena, view.profile);

    trial.pos = trajectory.step(trial.pos.x);

    let mut event = FrameEvent::Moved;
    if trajectory.is_past_hide_point(trial.pos.x) {
        let landing = trajectory.predict_landing(trial.pos);
        trial.stage = TrialStage::AwaitingClick {
            hidden_at: now,
            landing,
        };
        event = FrameEvent::Hidden { landing };
    } else if trajectory.is_out_of_bounds(trial.pos.x) {
        trial.stage = TrialStage::Abandoned;
        event = FrameEvent::Abandoned;
    }

    let visible = trial.is_visible();
    if visible {
        commands.push(scene::ball(trial.pos, trajectory.radius));
    }

    FrameOutput {
        commands,
        event,
        rearm: visible,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::difficulty::{DifficultyProfile, TrajectoryShape};
    use crate::sim::trajectory::{Arena, Trajectory};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn view(level: u8) -> FrameView {
        FrameView {
            active: true,
            paused: false,
            profile: DifficultyProfile::for_level(level),
        }
    }

    fn trial(level: u8, shape: TrajectoryShape, start_y: f32, end_y: f32, speed: f32) -> Trial {
        let profile = DifficultyProfile::for_level(level);
        Trial::new(1, Trajectory::new(shape, start_y, end_y, speed, profile, Arena::default()))
    }

    /// Run frames until the loop stops re-arming
    fn run(trial: &mut Trial, view: &FrameView) -> Vec<FrameOutput> {
        let mut outputs = Vec::new();
        for i in 0..10_000 {
            let out = frame(trial, view, i as f64 * 16.0);
            let rearm = out.rearm;
            outputs.push(out);
            if !rearm {
                break;
            }
        }
        outputs
    }

    fn hidden_count(outputs: &[FrameOutput]) -> usize {
        outputs
            .iter()
            .filter(|o| matches!(o.event, FrameEvent::Hidden { .. }))
            .count()
    }

    #[test]
    fn test_first_frame_draws_backdrop_and_ball() {
        let mut t = trial(3, TrajectoryShape::Horizontal, 300.0, 300.0, 4.0);
        let out = frame(&mut t, &view(3), 0.0);
        assert_eq!(out.event, FrameEvent::Moved);
        assert!(out.rearm);
        assert!(out.commands.last().is_some_and(DrawCommand::is_ball));
        assert_eq!(t.pos.x, 12.0 + 4.0);
    }

    #[test]
    fn test_paused_frame_does_nothing() {
        let mut t = trial(3, TrajectoryShape::Horizontal, 300.0, 300.0, 4.0);
        let mut v = view(3);
        v.paused = true;
        let out = frame(&mut t, &v, 0.0);
        assert_eq!(out, FrameOutput::skipped());
        assert_eq!(t.pos, t.trajectory.start);

        v.paused = false;
        v.active = false;
        assert!(!frame(&mut t, &v, 0.0).rearm);
    }

    #[test]
    fn test_hides_once_at_first_frame_past_hide_point() {
        let mut t = trial(2, TrajectoryShape::DiagonalUp, 500.0, 150.0, 3.0);
        let hide_x = t.trajectory.hide_x;
        let outputs = run(&mut t, &view(2));

        let last = outputs.last().unwrap();
        assert!(matches!(last.event, FrameEvent::Hidden { .. }));
        assert!(!last.rearm);
        assert!(!last.commands.iter().any(DrawCommand::is_ball));
        assert_eq!(hidden_count(&outputs), 1);
        assert!(t.pos.x >= hide_x && t.pos.x - t.trajectory.speed < hide_x);
        assert!(t.is_awaiting_click());

        // Hidden ball is never advanced again
        let out = frame(&mut t, &view(2), 99_999.0);
        assert_eq!(out.event, FrameEvent::Skipped);
        assert!(t.is_awaiting_click());
    }

    #[test]
    fn test_hidden_at_timestamp_recorded() {
        let mut t = trial(1, TrajectoryShape::Horizontal, 250.0, 250.0, 3.0);
        run(&mut t, &view(1));
        match t.stage {
            TrialStage::AwaitingClick { hidden_at, landing } => {
                assert!(hidden_at > 0.0);
                assert_eq!(landing.y, 250.0);
            }
            other => panic!("unexpected stage {other:?}"),
        }
    }

    #[test]
    fn test_out_of_bounds_abandons() {
        let mut t = trial(3, TrajectoryShape::Horizontal, 300.0, 300.0, 4.0);
        // Push the hide point past the canvas to exercise the guard
        t.trajectory.hide_x = 5000.0;
        let outputs = run(&mut t, &view(3));
        assert_eq!(outputs.last().unwrap().event, FrameEvent::Abandoned);
        assert_eq!(t.stage, TrialStage::Abandoned);
        assert_eq!(hidden_count(&outputs), 0);
        assert_eq!(t.landing(), None);
    }

    proptest! {
        #[test]
        fn every_launch_hides_exactly_once(seed in any::<u64>(), level in 1u8..=5) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let profile = DifficultyProfile::for_level(level);
            let mut t = Trial::new(1, Trajectory::launch(profile, Arena::default(), &mut rng));
            let hide_x = t.trajectory.hide_x;
            let outputs = run(&mut t, &view(level));
            prop_assert_eq!(hidden_count(&outputs), 1);
            prop_assert!(t.pos.x >= hide_x);
            prop_assert!(t.pos.x - t.trajectory.speed < hide_x);
        }

        #[test]
        fn horizontal_height_never_changes(start_y in 180.0f32..420.0, speed in 2.0f32..8.0) {
            let mut t = trial(4, TrajectoryShape::Horizontal, start_y, start_y, speed);
            for i in 0..10_000 {
                let out = frame(&mut t, &view(4), i as f64);
                prop_assert!((t.pos.y - start_y).abs() < 1e-4);
                if !out.rearm {
                    break;
                }
            }
        }

        #[test]
        fn diagonal_prediction_matches_unoccluded_law(
            start_y in 120.0f32..540.0,
            end_y in 120.0f32..540.0,
            speed in 2.5f32..8.0,
            up in any::<bool>(),
        ) {
            let shape = if up { TrajectoryShape::DiagonalUp } else { TrajectoryShape::DiagonalDown };
            let mut occluded = trial(5, shape, start_y, end_y, speed);
            run(&mut occluded, &view(5));
            let predicted = occluded.landing().unwrap();

            // Ground truth: same trajectory flown without ever hiding
            let mut open = trial(5, shape, start_y, end_y, speed);
            open.trajectory.hide_x = f32::INFINITY;
            let tr = open.trajectory;
            let mut pos = tr.start;
            while pos.x + tr.speed < tr.destination_x {
                pos = tr.step(pos.x);
            }
            let remaining = (tr.destination_x - pos.x) / tr.speed;
            let truth = (pos.y + tr.velocity_y * remaining).clamp(tr.radius, tr.arena.height - tr.radius);
            prop_assert!((predicted.y - truth).abs() < 1e-2, "{} vs {}", predicted.y, truth);
        }
    }
}

//! Scene generation: turns simulation state into draw command lists

use glam::Vec2;

use super::commands::{DrawCommand, TextAlign, colors, fonts};
use crate::consts::FEEDBACK_MARKER_RADIUS;
use crate::sim::{Arena, DifficultyProfile};

const IDLE_MESSAGE: &str = "Presiona \"Iniciar Entrenamiento\" para comenzar";

/// Dash pattern for the target zone outline
const ZONE_DASH: [f32; 2] = [10.0, 5.0];

/// Placeholder shown whenever no session is running
pub fn idle_placeholder(arena: Arena) -> Vec<DrawCommand> {
    vec![
        DrawCommand::Clear { size: size(arena) },
        DrawCommand::Text {
            text: IDLE_MESSAGE.to_string(),
            pos: Vec2::new(arena.width / 2.0, arena.height / 2.0),
            font: fonts::PLACEHOLDER,
            color: colors::ACCENT,
            align: TextAlign::Center,
        },
    ]
}

/// Big countdown digit over a blank canvas
pub fn countdown(arena: Arena, remaining: u8) -> Vec<DrawCommand> {
    vec![
        DrawCommand::Clear { size: size(arena) },
        DrawCommand::Text {
            text: remaining.to_string(),
            pos: Vec2::new(arena.width / 2.0, arena.height / 2.0),
            font: fonts::COUNTDOWN,
            color: colors::LABEL,
            align: TextAlign::Center,
        },
    ]
}

/// Per-frame backdrop: cleared canvas, dashed target zone, level label
pub fn trial_backdrop(arena: Arena, profile: &DifficultyProfile) -> Vec<DrawCommand> {
    vec![
        DrawCommand::Clear { size: size(arena) },
        DrawCommand::DashedRect {
            origin: Vec2::new(arena.target_zone_x(), 0.0),
            size: Vec2::new(profile.target_zone_width, arena.height),
            color: colors::ACCENT,
            line_width: 2.0,
            dash: ZONE_DASH,
        },
        DrawCommand::Text {
            text: level_label(profile),
            pos: Vec2::new(20.0, 30.0),
            font: fonts::LABEL,
            color: colors::LABEL,
            align: TextAlign::Left,
        },
    ]
}

pub fn ball(center: Vec2, radius: f32) -> DrawCommand {
    DrawCommand::Ball { center, radius }
}

/// Translucent hit/miss marker at the click point
pub fn click_marker(click: Vec2, hit: bool) -> DrawCommand {
    DrawCommand::Disc {
        center: click,
        radius: FEEDBACK_MARKER_RADIUS,
        color: if hit { colors::HIT } else { colors::MISS },
    }
}

/// True landing point, drawn after the click resolves
pub fn reveal_marker(landing: Vec2, radius: f32) -> DrawCommand {
    DrawCommand::Disc {
        center: landing,
        radius,
        color: colors::REVEAL,
    }
}

pub fn level_label(profile: &DifficultyProfile) -> String {
    format!("Nivel {} · {}", profile.level, profile.label)
}

fn size(arena: Arena) -> Vec2 {
    Vec2::new(arena.width, arena.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backdrop_outlines_target_zone() {
        let arena = Arena::default();
        let profile = DifficultyProfile::for_level(2);
        let cmds = trial_backdrop(arena, profile);
        assert!(matches!(cmds[0], DrawCommand::Clear { .. }));
        match &cmds[1] {
            DrawCommand::DashedRect { origin, size, .. } => {
                assert_eq!(*origin, Vec2::new(950.0, 0.0));
                assert_eq!(*size, Vec2::new(50.0, 600.0));
            }
            other => panic!("expected zone outline, got {other:?}"),
        }
        assert!(!cmds.iter().any(DrawCommand::is_ball));
    }

    #[test]
    fn test_click_marker_color() {
        let hit = click_marker(Vec2::ZERO, true);
        let miss = click_marker(Vec2::ZERO, false);
        assert_ne!(hit, miss);
        assert!(matches!(hit, DrawCommand::Disc { radius, .. } if radius == FEEDBACK_MARKER_RADIUS));
    }

    #[test]
    fn test_level_label() {
        assert_eq!(level_label(DifficultyProfile::for_level(5)), "Nivel 5 · Élite");
    }
}

//! Draw commands for the 2D canvas

use glam::Vec2;

/// Horizontal text anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
        }
    }
}

/// A single immediate-mode drawing operation.
///
/// Scenes are built as command lists so the simulation can be tested without
/// a browser; the canvas backend replays them in order.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Wipe the whole drawing buffer
    Clear { size: Vec2 },
    /// Dashed rectangle outline
    DashedRect {
        origin: Vec2,
        size: Vec2,
        color: &'static str,
        line_width: f32,
        dash: [f32; 2],
    },
    Text {
        text: String,
        pos: Vec2,
        font: &'static str,
        color: &'static str,
        align: TextAlign,
    },
    /// The moving ball (radial gradient, lit from the upper left)
    Ball { center: Vec2, radius: f32 },
    /// Flat filled circle
    Disc {
        center: Vec2,
        radius: f32,
        color: &'static str,
    },
}

impl DrawCommand {
    pub fn is_ball(&self) -> bool {
        matches!(self, DrawCommand::Ball { .. })
    }
}

/// Colors for canvas elements (CSS strings)
pub mod colors {
    pub const ACCENT: &str = "#667eea";
    pub const LABEL: &str = "#ffffff";
    pub const BALL_HIGHLIGHT: &str = "#ff6b6b";
    pub const BALL_SHADOW: &str = "#e53e3e";
    pub const REVEAL: &str = "#ff6b6b";
    pub const HIT: &str = "rgba(72, 187, 120, 0.4)";
    pub const MISS: &str = "rgba(245, 101, 101, 0.4)";
}

/// Fonts for canvas text
pub mod fonts {
    pub const PLACEHOLDER: &str = "24px Inter, sans-serif";
    pub const LABEL: &str = "bold 16px Inter, sans-serif";
    pub const COUNTDOWN: &str = "bold 120px Inter, sans-serif";
}

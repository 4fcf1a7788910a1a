//! Canvas 2D rendering module
//!
//! Scenes are produced as [`DrawCommand`] lists by `scene`; the `canvas`
//! backend (wasm only) replays them onto a `CanvasRenderingContext2d`.

pub mod commands;
pub mod scene;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

pub use commands::{DrawCommand, TextAlign};

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasPainter;

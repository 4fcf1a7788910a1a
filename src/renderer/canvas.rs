//! Canvas 2D backend

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::commands::{DrawCommand, colors};

/// Replays draw commands onto an HTML canvas
pub struct CanvasPainter {
    ctx: CanvasRenderingContext2d,
}

impl CanvasPainter {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, String> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|_| "canvas: get_context threw".to_string())?
            .ok_or("canvas: missing 2d context".to_string())?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| "canvas: context is not 2d".to_string())?;
        Ok(Self { ctx })
    }

    pub fn paint(&self, commands: &[DrawCommand]) {
        for cmd in commands {
            if let Err(e) = self.paint_one(cmd) {
                log::warn!("Draw error: {:?}", e);
            }
        }
    }

    fn paint_one(&self, cmd: &DrawCommand) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        match cmd {
            DrawCommand::Clear { size } => {
                ctx.clear_rect(0.0, 0.0, size.x as f64, size.y as f64);
            }
            DrawCommand::DashedRect {
                origin,
                size,
                color,
                line_width,
                dash,
            } => {
                ctx.set_stroke_style_str(color);
                ctx.set_line_width(*line_width as f64);
                let pattern = js_sys::Array::of2(
                    &JsValue::from_f64(dash[0] as f64),
                    &JsValue::from_f64(dash[1] as f64),
                );
                ctx.set_line_dash(&pattern)?;
                ctx.stroke_rect(origin.x as f64, origin.y as f64, size.x as f64, size.y as f64);
                ctx.set_line_dash(&js_sys::Array::new())?;
            }
            DrawCommand::Text {
                text,
                pos,
                font,
                color,
                align,
            } => {
                ctx.set_fill_style_str(color);
                ctx.set_font(font);
                ctx.set_text_align(align.as_str());
                ctx.fill_text(text, pos.x as f64, pos.y as f64)?;
            }
            DrawCommand::Ball { center, radius } => {
                let (x, y, r) = (center.x as f64, center.y as f64, *radius as f64);
                let grad = ctx.create_radial_gradient(x - 3.0, y - 3.0, 0.0, x, y, r)?;
                grad.add_color_stop(0.0, colors::BALL_HIGHLIGHT)?;
                grad.add_color_stop(1.0, colors::BALL_SHADOW)?;
                ctx.set_fill_style_canvas_gradient(&grad);
                ctx.begin_path();
                ctx.arc(x, y, r, 0.0, std::f64::consts::TAU)?;
                ctx.fill();
            }
            DrawCommand::Disc {
                center,
                radius,
                color,
            } => {
                ctx.set_fill_style_str(color);
                ctx.begin_path();
                ctx.arc(
                    center.x as f64,
                    center.y as f64,
                    *radius as f64,
                    0.0,
                    std::f64::consts::TAU,
                )?;
                ctx.fill();
            }
        }
        Ok(())
    }
}

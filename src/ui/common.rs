//! # UI Common Components
//!
//! Colors and the painter-backed [`Canvas`] shared by the host shell.
//!
//! The session hands shapes in surface coordinates, which are egui points
//! here: the scene is built from `ctx.screen_rect()`, so no scaling is needed
//! between the two.

use eframe::egui::{self, Color32, Painter, Stroke};

use crate::controller::{Circle, Rgb};
use crate::session::{Canvas, DrawStyle};

/// Dark theme palette of the host shell
pub struct UiColors;

impl UiColors {
    /// Background behind all controls (RGB: 30, 30, 30)
    pub const MAIN_BG: Color32 = Color32::from_rgb(30, 30, 30);

    /// Status text (RGB: 160, 160, 160)
    pub const TEXT: Color32 = Color32::from_rgb(160, 160, 160);

    /// Transport accepting frames (RGB: 50, 200, 20)
    pub const ACTIVE: Color32 = Color32::from_rgb(50, 200, 20);

    /// Transport not ready (RGB: 200, 50, 20)
    pub const INACTIVE: Color32 = Color32::from_rgb(200, 50, 20);
}

/// Stroke width of outlined controls, in points
const STROKE_WIDTH: f32 = 3.0;

pub fn to_color32(color: Rgb) -> Color32 {
    Color32::from_rgb(color.0, color.1, color.2)
}

fn to_pos2(circle: &Circle) -> egui::Pos2 {
    egui::pos2(circle.x as f32, circle.y as f32)
}

/// Canvas drawing onto an egui layer
pub struct EguiCanvas<'a> {
    painter: &'a Painter,
}

impl<'a> EguiCanvas<'a> {
    pub fn new(painter: &'a Painter) -> Self {
        Self { painter }
    }
}

impl Canvas for EguiCanvas<'_> {
    fn draw_circle(&mut self, circle: Circle, style: DrawStyle) {
        let center = to_pos2(&circle);
        let radius = circle.r as f32;
        match style {
            DrawStyle::Fill(color) => {
                self.painter.circle_filled(center, radius, to_color32(color));
            }
            DrawStyle::Stroke(color) => {
                self.painter
                    .circle_stroke(center, radius, Stroke::new(STROKE_WIDTH, to_color32(color)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_conversion() {
        assert_eq!(to_color32(Rgb(1, 2, 3)), Color32::from_rgb(1, 2, 3));
        assert_eq!(to_pos2(&Circle::new(10.5, 20.0, 3.0)), egui::pos2(10.5, 20.0));
    }
}

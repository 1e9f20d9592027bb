//! Drawing seam between the session and whatever presents it
//!
//! The session never knows how circles reach the screen. The egui host paints
//! them with a `Painter`, the headless loop discards them.

use crate::controller::{Circle, Rgb};

/// How a circle is painted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawStyle {
    Stroke(Rgb),
    Fill(Rgb),
}

/// Draw callback receiving shapes plus state, nothing else
pub trait Canvas {
    fn draw_circle(&mut self, circle: Circle, style: DrawStyle);
}

/// Canvas that drops every shape
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCanvas;

impl Canvas for NullCanvas {
    fn draw_circle(&mut self, _circle: Circle, _style: DrawStyle) {}
}

/// Canvas that keeps every shape, in draw order
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    pub shapes: Vec<(Circle, DrawStyle)>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filled(&self) -> impl Iterator<Item = &Circle> {
        self.shapes.iter().filter_map(|(circle, style)| match style {
            DrawStyle::Fill(_) => Some(circle),
            DrawStyle::Stroke(_) => None,
        })
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
    }
}

impl Canvas for RecordingCanvas {
    fn draw_circle(&mut self, circle: Circle, style: DrawStyle) {
        self.shapes.push((circle, style));
    }
}

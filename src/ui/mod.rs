//! # TouchController Host Shell
//!
//! ## Why This Module Exists
//! The session engine only knows circles and contacts. This module gives it a
//! real surface: an eframe window that feeds touches in, paints controls out
//! and ticks the engine once per presented frame.
//!
//! ## Frame Processing
//! Every `update`:
//! 1. Rebuild the scene if the screen rect changed
//! 2. Translate this frame's touch events into phase batches
//! 3. Paint the background, then tick the engine with an [`EguiCanvas`]
//! 4. Request a repaint, so ticks keep following the display refresh
//!
//! Ticks are therefore driven by the display, not by a timer. The headless
//! [`SessionHandle`](crate::session::SessionHandle) covers the timer case.

pub mod common;
pub mod touch_input;

use eframe::egui::{self, Align2, FontId, LayerId};
use tracing::{info, warn};

use crate::controller::ControlError;
use crate::persistence::AppConfig;
use crate::session::SessionEngine;
use crate::transport::Transport;

use self::common::{EguiCanvas, UiColors};
use self::touch_input::TouchInput;

pub struct TouchControllerUI {
    engine: SessionEngine,
    input: TouchInput,
    viewport: (f64, f64),
}

impl TouchControllerUI {
    /// Builds the engine for the configured initial viewport.
    ///
    /// The real size arrives with the first frame and triggers a resize.
    pub fn new(config: &AppConfig, transport: Box<dyn Transport>) -> Result<Self, ControlError> {
        let viewport = (config.session.initial_width, config.session.initial_height);
        let engine = SessionEngine::new(config.layout.clone(), viewport.0, viewport.1, transport)?;

        info!(
            "Touch controller UI ready (mouse emulation: {})",
            config.session.emulate_touch_with_mouse
        );

        Ok(Self {
            engine,
            input: TouchInput::new(config.session.emulate_touch_with_mouse),
            viewport,
        })
    }

    fn apply_viewport(&mut self, rect: egui::Rect) {
        let viewport = (f64::from(rect.width()), f64::from(rect.height()));
        if viewport == self.viewport {
            return;
        }

        // Remember the size even on failure, so a bad rect is reported once
        self.viewport = viewport;
        if let Err(e) = self.engine.resize(viewport.0, viewport.1) {
            warn!("Keeping previous layout: {}", e);
        }
    }

    fn paint_status(&self, painter: &egui::Painter, rect: egui::Rect, delivered: bool) {
        let stats = self.engine.stats();
        let color = if delivered {
            UiColors::ACTIVE
        } else {
            UiColors::INACTIVE
        };

        painter.circle_filled(rect.left_top() + egui::vec2(14.0, 14.0), 5.0, color);
        painter.text(
            rect.left_top() + egui::vec2(26.0, 6.0),
            Align2::LEFT_TOP,
            format!(
                "{}  sent {}  dropped {}",
                self.engine.transport_name(),
                stats.frames_sent,
                stats.frames_dropped
            ),
            FontId::proportional(14.0),
            UiColors::TEXT,
        );
    }
}

impl eframe::App for TouchControllerUI {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let rect = ctx.screen_rect();
        self.apply_viewport(rect);

        let events = ctx.input(|i| i.events.clone());
        for batch in self.input.translate(&events) {
            self.engine.handle_touch(&batch);
        }

        let painter = ctx.layer_painter(LayerId::background());
        painter.rect_filled(rect, 0.0, UiColors::MAIN_BG);

        let tick = {
            let mut canvas = EguiCanvas::new(&painter);
            self.engine.tick(&mut canvas)
        };
        self.paint_status(&painter, rect, tick.delivered);

        ctx.request_repaint();
    }
}

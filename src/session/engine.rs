//! Session engine: touch notifications in, one frame per tick out
//!
//! The engine is plain synchronous state. Whoever owns it decides when ticks
//! happen: the egui host ticks once per presented frame, [`SessionLoop`]
//! ticks on a timer.
//!
//! [`SessionLoop`]: super::handle::SessionLoop

use chrono::{DateTime, Local};
use tracing::{debug, info, trace, warn};

use crate::controller::{Contact, ContactId, ControlError, InputFrame, TouchRegistry};
use crate::transport::Transport;

use super::canvas::Canvas;
use super::scene::{LayoutSettings, Scene, SceneConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    /// Gesture aborted by the platform, handled exactly like `End`
    Cancel,
}

/// One notification batch: every contact that changed in the same phase
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    pub contacts: Vec<Contact>,
}

impl TouchEvent {
    pub fn new(phase: TouchPhase, contacts: Vec<Contact>) -> Self {
        Self { phase, contacts }
    }

    pub fn start(contacts: Vec<Contact>) -> Self {
        Self::new(TouchPhase::Start, contacts)
    }

    pub fn moved(contacts: Vec<Contact>) -> Self {
        Self::new(TouchPhase::Move, contacts)
    }

    pub fn end(contacts: Vec<Contact>) -> Self {
        Self::new(TouchPhase::End, contacts)
    }
}

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub frame: InputFrame,
    /// Whether the transport accepted the frame
    pub delivered: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStats {
    pub ticks: u64,
    pub frames_sent: u64,
    /// Ticks whose frame was skipped or rejected by the transport
    pub frames_dropped: u64,
    pub last_sent_at: Option<DateTime<Local>>,
}

pub struct SessionEngine {
    layout: LayoutSettings,
    registry: TouchRegistry,
    scene: Scene,
    transport: Box<dyn Transport>,
    stats: SessionStats,
}

impl SessionEngine {
    /// Builds the first scene for the initial viewport.
    pub fn new(
        layout: LayoutSettings,
        width: f64,
        height: f64,
        transport: Box<dyn Transport>,
    ) -> Result<Self, ControlError> {
        let scene = Scene::build(&SceneConfig::for_viewport(width, height, &layout)?)?;
        info!(
            "Session created for {:.0}x{:.0} using transport {}",
            width,
            height,
            transport.name()
        );

        Ok(Self {
            layout,
            registry: TouchRegistry::new(),
            scene,
            transport,
            stats: SessionStats::default(),
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn registry(&self) -> &TouchRegistry {
        &self.registry
    }

    pub fn layout(&self) -> &LayoutSettings {
        &self.layout
    }

    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Applies one notification batch to the registry and the sticks.
    ///
    /// The whole batch is applied before returning, so the next tick observes
    /// all of it or none of it.
    pub fn handle_touch(&mut self, event: &TouchEvent) {
        debug!("{:?} batch with {} contact(s)", event.phase, event.contacts.len());

        match event.phase {
            TouchPhase::Start => {
                for contact in &event.contacts {
                    self.registry.upsert(contact.id, contact.x, contact.y);
                }
                for index in 0..self.scene.sticks().len() {
                    let free: Vec<Contact> = event
                        .contacts
                        .iter()
                        .filter(|c| !self.is_bound(c.id))
                        .copied()
                        .collect();
                    self.scene.sticks_mut()[index].on_touch_start(&free);
                }
            }
            TouchPhase::Move => {
                for contact in &event.contacts {
                    self.registry.upsert(contact.id, contact.x, contact.y);
                }
                for stick in self.scene.sticks_mut() {
                    stick.on_touch_move(&event.contacts);
                }
            }
            TouchPhase::End | TouchPhase::Cancel => {
                for contact in &event.contacts {
                    self.registry.remove(contact.id);
                }
                for stick in self.scene.sticks_mut() {
                    stick.on_touch_end(&event.contacts);
                }
            }
        }
    }

    fn is_bound(&self, id: ContactId) -> bool {
        self.scene.sticks().iter().any(|s| s.bound_contact() == Some(id))
    }

    /// Rebuilds the scene for a new viewport.
    ///
    /// Stick bindings do not survive a resize; contacts stay in the registry
    /// and keep pressing buttons they land on. On error the current scene is
    /// kept untouched.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<(), ControlError> {
        let config = SceneConfig::for_viewport(width, height, &self.layout)?;
        let scene = Scene::build(&config)?;

        info!("Viewport changed to {:.0}x{:.0}, scene rebuilt", width, height);
        self.scene = scene;
        Ok(())
    }

    /// Frame from the current control state, without sampling or sending
    pub fn frame(&self) -> InputFrame {
        InputFrame::assemble(self.scene.sticks(), self.scene.groups())
    }

    /// Samples buttons, draws, and hands the frame to the transport if ready.
    ///
    /// A frame the transport is not ready for is dropped; the next tick
    /// supersedes it.
    pub fn tick(&mut self, canvas: &mut dyn Canvas) -> Tick {
        for group in self.scene.groups_mut() {
            group.sample(&self.registry);
        }

        self.scene.render(canvas);

        let frame = self.frame();
        self.stats.ticks += 1;

        let delivered = if self.transport.is_ready() {
            match self.transport.send(&frame) {
                Ok(()) => {
                    trace!("Frame sent via {}: {:?}", self.transport.name(), frame);
                    self.stats.frames_sent += 1;
                    self.stats.last_sent_at = Some(Local::now());
                    true
                }
                Err(e) => {
                    warn!("Dropping frame, {} rejected it: {}", self.transport.name(), e);
                    self.stats.frames_dropped += 1;
                    false
                }
            }
        } else {
            self.stats.frames_dropped += 1;
            false
        };

        Tick { frame, delivered }
    }
}

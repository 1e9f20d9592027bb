//! Headless session loop with statum state machine
//!
//! Runs a [`SessionEngine`] in its own tokio task, ticking it on a fixed
//! cadence and feeding it touch and resize events from a channel.
//!
//! This driver is for hosts without a frame-presentation signal: tests,
//! scripted replays and display-less setups. The interval stands in for that
//! signal. The window host in `ui` never spawns it and ticks the engine once
//! per presented frame from `eframe::App::update` instead.
//!
//! # State Machine
//!
//! ```text
//! Configured ──► Active ──► Stopped
//!                  │
//!            (ticks + events
//!             until shutdown)
//! ```
//!
//! Shutdown stops ticking at once. The frame of the interrupted tick is not
//! flushed.

use std::time::Duration;

use statum::{machine, state};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::controller::ControlError;

use super::canvas::NullCanvas;
use super::engine::{SessionEngine, SessionStats, TouchEvent};

const EVENT_CHANNEL_CAPACITY: usize = 100;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Control error: {0}")]
    Control(#[from] ControlError),

    #[error("Frame rate must be at least 1 Hz, got {0}")]
    InvalidFrameRate(u32),

    #[error("Channel error: {0}")]
    ChannelError(String),

    #[error("Session task failed: {0}")]
    ThreadError(String),

    #[error("Session already stopped")]
    AlreadyStopped,
}

/// Input for a running session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Touch(TouchEvent),
    Resize { width: f64, height: f64 },
}

/// States of the session loop lifecycle
#[state]
#[derive(Debug, Clone)]
pub enum SessionLoopState {
    Configured, // Engine and cadence set, not ticking yet
    Active,     // Ticking and handling events
    Stopped,    // Loop left, engine can be inspected
}

#[machine]
pub struct SessionLoop<S: SessionLoopState> {
    engine: SessionEngine,
    events: mpsc::Receiver<SessionEvent>,
    frame_interval: Duration,
}

impl<S: SessionLoopState> SessionLoop<S> {
    pub fn engine(&self) -> &SessionEngine {
        &self.engine
    }
}

impl SessionLoop<Configured> {
    pub fn create(
        engine: SessionEngine,
        events: mpsc::Receiver<SessionEvent>,
        frame_rate_hz: u32,
    ) -> Result<Self, SessionError> {
        if frame_rate_hz == 0 {
            return Err(SessionError::InvalidFrameRate(frame_rate_hz));
        }

        let frame_interval = Duration::from_secs_f64(1.0 / f64::from(frame_rate_hz));
        debug!("Session loop configured with {:?} frame interval", frame_interval);
        Ok(Self::new(engine, events, frame_interval))
    }

    pub fn activate(self) -> SessionLoop<Active> {
        info!("Activating session loop on {}", self.engine.transport_name());
        self.transition()
    }
}

impl SessionLoop<Active> {
    fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Touch(touch) => self.engine.handle_touch(&touch),
            SessionEvent::Resize { width, height } => {
                if let Err(e) = self.engine.resize(width, height) {
                    warn!("Ignoring resize: {}", e);
                }
            }
        }
    }

    /// Main loop, runs until the shutdown signal fires or its sender is dropped.
    ///
    /// Pending events are handled before a due tick, so every batch received
    /// so far is visible to the next frame.
    pub async fn run_until_shutdown(mut self, mut shutdown_rx: oneshot::Receiver<()>) -> SessionLoop<Stopped> {
        info!("Starting session loop");

        let mut ticker = tokio::time::interval(self.frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut canvas = NullCanvas;
        let mut events_open = true;

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown_rx => {
                    info!("Shutdown signal received for session loop");
                    break;
                }

                event = self.events.recv(), if events_open => {
                    match event {
                        Some(event) => self.handle_event(event),
                        None => {
                            debug!("All event senders dropped, ticking on");
                            events_open = false;
                        }
                    }
                }

                _ = ticker.tick() => {
                    self.engine.tick(&mut canvas);
                }
            }
        }

        self.transition()
    }
}

impl SessionLoop<Stopped> {
    pub fn into_stats(self) -> SessionStats {
        self.engine.stats().clone()
    }
}

/// Handle for a session loop running in a tokio task
#[derive(Debug)]
pub struct SessionHandle {
    events: mpsc::Sender<SessionEvent>,
    task_handle: Option<JoinHandle<SessionStats>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl SessionHandle {
    /// Spawns the loop for `engine`, ticking `frame_rate_hz` times a second.
    ///
    /// The configured rate lives in `SessionSettings::frame_rate_hz`.
    pub fn spawn(engine: SessionEngine, frame_rate_hz: u32) -> Result<Self, SessionError> {
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let active = SessionLoop::create(engine, events_rx, frame_rate_hz)?.activate();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task_handle = tokio::spawn(async move {
            let stopped = active.run_until_shutdown(shutdown_rx).await;
            stopped.into_stats()
        });

        Ok(Self {
            events: events_tx,
            task_handle: Some(task_handle),
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Sender for feeding events from other tasks
    pub fn events(&self) -> mpsc::Sender<SessionEvent> {
        self.events.clone()
    }

    pub async fn send(&self, event: SessionEvent) -> Result<(), SessionError> {
        self.events
            .send(event)
            .await
            .map_err(|e| SessionError::ChannelError(format!("Failed to send session event: {}", e)))
    }

    /// Stops the loop and waits for the task, returning the final counters
    pub async fn shutdown(&mut self) -> Result<SessionStats, SessionError> {
        debug!("Sending shutdown signal to session loop");

        if let Some(tx) = self.shutdown_tx.take() {
            if tx.send(()).is_err() {
                warn!("Session task already terminated");
            }
        }

        let Some(handle) = self.task_handle.take() else {
            return Err(SessionError::AlreadyStopped);
        };

        match handle.await {
            Ok(stats) => {
                info!(
                    "Session stopped after {} ticks, {} frames sent",
                    stats.ticks, stats.frames_sent
                );
                Ok(stats)
            }
            Err(e) => {
                error!("Session task panicked: {}", e);
                Err(SessionError::ThreadError(format!("Session task panicked: {}", e)))
            }
        }
    }
}

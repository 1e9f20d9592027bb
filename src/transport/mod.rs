//! # Transport Module
//!
//! ## Why This Module Exists
//! The session produces one [`InputFrame`] per tick but has no opinion on where
//! it goes. This module is the seam between the two: a small synchronous
//! [`Transport`] trait the session can poll for readiness and hand frames to
//! without ever awaiting.
//!
//! ## Module Architecture
//!
//! ```text
//! transport/
//! ├── mod.rs          - Transport trait, errors, in-process channel transport
//! ├── config.rs       - Broker settings persisted with the app config
//! └── mqtt_handler.rs - rumqttc client with a background event loop task
//! ```
//!
//! ## Delivery Semantics
//! Frames are fire-and-forget. A transport that is not ready is simply skipped
//! for that tick; the next tick carries a fresher frame anyway.

pub mod config;
pub mod mqtt_handler;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::trace;

use crate::controller::{FrameError, InputFrame};

pub use config::MqttConfig;
pub use mqtt_handler::{ConnectionState, MqttTransport};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid broker address: {0}")]
    InvalidAddress(String),

    #[error("Invalid MQTT client id: {0:?}")]
    InvalidClientId(String),

    #[error("Failed to encode frame: {0}")]
    Encode(#[from] FrameError),

    #[error("Transport channel is full")]
    ChannelFull,

    #[error("Transport channel is closed")]
    ChannelClosed,

    #[error("MQTT client error: {0}")]
    Client(#[from] rumqttc::ClientError),
}

/// Sink for input frames
///
/// Both methods are called from the session tick and must not block.
pub trait Transport: Send {
    /// Human readable name for logs
    fn name(&self) -> &str;

    /// Whether a frame handed over now would be accepted
    fn is_ready(&self) -> bool;

    /// Hands over one frame without waiting for delivery
    fn send(&mut self, frame: &InputFrame) -> Result<(), TransportError>;
}

/// In-process transport backed by a bounded tokio channel
///
/// Ready while the receiver is alive and the channel has free capacity.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    sender: mpsc::Sender<InputFrame>,
}

impl ChannelTransport {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<InputFrame>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }
}

impl Transport for ChannelTransport {
    fn name(&self) -> &str {
        "channel"
    }

    fn is_ready(&self) -> bool {
        !self.sender.is_closed() && self.sender.capacity() > 0
    }

    fn send(&mut self, frame: &InputFrame) -> Result<(), TransportError> {
        trace!("Forwarding frame over channel: {:?}", frame);
        self.sender.try_send(*frame).map_err(|e| match e {
            TrySendError::Full(_) => TransportError::ChannelFull,
            TrySendError::Closed(_) => TransportError::ChannelClosed,
        })
    }
}

//! Session subsystem: layout, tick cycle and lifecycle
//!
//! 1. [`scene`] - Pure layout factory and the live controls built from it
//! 2. [`engine`] - Applies touch batches and emits one frame per tick
//! 3. [`handle`] - Headless tokio loop driving the engine on a timer
//! 4. [`canvas`] - Drawing seam used on every tick
//!
//! # Architecture
//!
//! ```text
//! TouchEvent ──► SessionEngine ──► Scene (sticks, button groups)
//!                     │
//!            tick ────┼──► Canvas (draw)
//!                     └──► Transport (if ready)
//! ```

pub mod canvas;
pub mod engine;
pub mod handle;
pub mod scene;

pub use canvas::{Canvas, DrawStyle, NullCanvas, RecordingCanvas};
pub use engine::{SessionEngine, SessionStats, Tick, TouchEvent, TouchPhase};
pub use handle::{SessionError, SessionEvent, SessionHandle, SessionLoop};
pub use scene::{LayoutSettings, Scene, SceneConfig};

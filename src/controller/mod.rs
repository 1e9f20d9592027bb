//! Controller subsystem: touch contacts in, controller state out
//!
//! Implements the input model of the virtual pad:
//!
//! 1. [`touch_registry`] - Authoritative set of active contacts
//! 2. [`analog_stick`] / [`button_group`] - Controls interpreting those contacts
//! 3. [`frame`] - Aggregation of all controls into the wire record
//!
//! # Architecture
//!
//! ```text
//! Touch notifications ──► TouchRegistry ──► ButtonGroup::sample ──┐
//!          │                                                      ├──► InputFrame
//!          └─────────────► AnalogStick (bound contact) ───────────┘
//! ```
//!
//! Sticks react to notification batches directly and bind one contact each.
//! Button groups have no binding and are sampled from the registry once per
//! tick. Everything here is synchronous and owned by a single session.

pub mod analog_stick;
pub mod button_group;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod touch_registry;

pub use analog_stick::{AnalogStick, StickState, AXIS_MAX, AXIS_MIN};
pub use button_group::{Button, ButtonGroup, ButtonSpec, Rgb};
pub use error::{ControlError, FrameError};
pub use frame::{Buttons, InputFrame};
pub use geometry::{map_range, project_onto_boundary, Circle, Point};
pub use touch_registry::{Contact, ContactId, TouchRegistry};

//! Virtual analog stick driven by a single touch contact
//!
//! # State Machine
//!
//! ```text
//!             start inside ring
//! Released ────────────────────────► Engaged { contact }
//!    ▲                                   │  move: knob follows,
//!    │        end of bound contact       │  clamped to the ring
//!    └───────────────────────────────────┘
//! ```
//!
//! The knob rests at the pivot center while released. While engaged it follows
//! the bound contact and never leaves the outer ring, even when the finger does.

use tracing::{debug, trace};

use super::error::{ensure_positive, ControlError};
use super::geometry::{map_range, project_onto_boundary, Circle, Point};
use super::touch_registry::{Contact, ContactId};

/// Lower wire bound of a stick axis.
///
/// One below `i16::MIN`; together with [`AXIS_MAX`] this reproduces the range
/// the receiving side has always been fed. Kept for wire compatibility.
pub const AXIS_MIN: i32 = -32769;

/// Upper wire bound of a stick axis (one above `i16::MAX`)
pub const AXIS_MAX: i32 = 32768;

/// Binding state of a stick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StickState {
    /// No contact bound, knob at rest
    #[default]
    Released,
    /// Bound to exactly one contact
    Engaged { contact: ContactId },
}

/// Two-axis virtual control bound to at most one contact
#[derive(Debug, Clone, PartialEq)]
pub struct AnalogStick {
    ring: Circle,
    knob_radius: f64,
    state: StickState,
    knob: Point,
}

impl AnalogStick {
    /// Creates a released stick.
    ///
    /// The knob radius is `outer_radius / knob_divisor`. Both values must be
    /// positive and finite, otherwise the axis mapping would divide by zero.
    pub fn new(center: Point, outer_radius: f64, knob_divisor: f64) -> Result<Self, ControlError> {
        ensure_positive("analog stick", "outer radius", outer_radius)?;
        ensure_positive("analog stick", "knob divisor", knob_divisor)?;

        Ok(Self {
            ring: Circle::centered_at(center, outer_radius),
            knob_radius: outer_radius / knob_divisor,
            state: StickState::Released,
            knob: center,
        })
    }

    pub fn state(&self) -> StickState {
        self.state
    }

    pub fn is_engaged(&self) -> bool {
        matches!(self.state, StickState::Engaged { .. })
    }

    pub fn bound_contact(&self) -> Option<ContactId> {
        match self.state {
            StickState::Engaged { contact } => Some(contact),
            StickState::Released => None,
        }
    }

    /// Outer ring, for hit-testing and drawing
    pub fn ring(&self) -> Circle {
        self.ring
    }

    /// Knob circle at its current position
    pub fn knob(&self) -> Circle {
        Circle::centered_at(self.knob, self.knob_radius)
    }

    pub fn knob_position(&self) -> Point {
        self.knob
    }

    /// Binds the first contact of the batch that lands inside the ring.
    ///
    /// Ignored while engaged. The knob jumps to the raw contact position.
    /// Returns `true` when this call bound a contact.
    pub fn on_touch_start(&mut self, contacts: &[Contact]) -> bool {
        if self.is_engaged() {
            return false;
        }

        let Some(contact) = contacts
            .iter()
            .find(|c| c.position().is_finite() && self.ring.contains(c.position()))
        else {
            return false;
        };

        debug!("Stick at ({:.0}, {:.0}) bound to contact {}", self.ring.x, self.ring.y, contact.id);
        self.state = StickState::Engaged { contact: contact.id };
        self.knob = contact.position();
        true
    }

    /// Moves the knob with the bound contact, clamping it onto the ring.
    ///
    /// Batches that do not carry the bound contact leave the stick untouched,
    /// as do non-finite positions.
    pub fn on_touch_move(&mut self, contacts: &[Contact]) {
        let Some(bound) = self.bound_contact() else {
            return;
        };

        let Some(contact) = contacts.iter().find(|c| c.id == bound) else {
            return;
        };

        let position = contact.position();
        if !position.is_finite() {
            trace!("Ignoring non-finite move of contact {}", contact.id);
            return;
        }
        self.knob = if self.ring.contains(position) {
            position
        } else {
            project_onto_boundary(self.ring.center(), self.ring.r, position)
        };
    }

    /// Releases the stick when its bound contact is among the ended ones.
    ///
    /// Returns `true` when this call released the stick.
    pub fn on_touch_end(&mut self, contacts: &[Contact]) -> bool {
        let Some(bound) = self.bound_contact() else {
            return false;
        };

        if !contacts.iter().any(|c| c.id == bound) {
            return false;
        }

        debug!("Stick at ({:.0}, {:.0}) released contact {}", self.ring.x, self.ring.y, bound);
        self.state = StickState::Released;
        self.knob = self.ring.center();
        true
    }

    /// Normalized `[x, y]` axis values, y pointing up
    pub fn value(&self) -> [i32; 2] {
        let r = self.ring.r;
        let x = map_range(self.knob.x - self.ring.x, -r, r, AXIS_MIN, AXIS_MAX);
        let y = map_range(self.ring.y - self.knob.y, -r, r, AXIS_MIN, AXIS_MAX);
        [x, y]
    }
}

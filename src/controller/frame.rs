//! Wire record emitted once per session tick
//!
//! A frame is the complete controller state at one instant. It is built fresh
//! every tick from the controls and never retained.
//!
//! # Wire Format
//!
//! JSON object with exactly these fields:
//!
//! ```json
//! { "buttons": 4096, "left_trigger": 0, "right_trigger": 0,
//!   "left_thumbstick": [13107, 0], "right_thumbstick": [0, 0] }
//! ```
//!
//! `buttons` is the raw 16-bit mask of [`Buttons`].

use bitflags::bitflags;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::analog_stick::{AnalogStick, AXIS_MAX, AXIS_MIN};
use super::button_group::ButtonGroup;
use super::error::FrameError;

bitflags! {
    /// Digital button bits of an Xbox 360 style pad report.
    ///
    /// Bits 0x0400 and 0x0800 are not assigned and are rejected when decoding.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Buttons: u16 {
        const DPAD_UP        = 0x0001;
        const DPAD_DOWN      = 0x0002;
        const DPAD_LEFT      = 0x0004;
        const DPAD_RIGHT     = 0x0008;
        const START          = 0x0010;
        const BACK           = 0x0020;
        const LEFT_THUMB     = 0x0040;
        const RIGHT_THUMB    = 0x0080;
        const LEFT_SHOULDER  = 0x0100;
        const RIGHT_SHOULDER = 0x0200;
        const A              = 0x1000;
        const B              = 0x2000;
        const X              = 0x4000;
        const Y              = 0x8000;
    }
}

impl Default for Buttons {
    fn default() -> Self {
        Buttons::empty()
    }
}

impl Serialize for Buttons {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.bits())
    }
}

impl<'de> Deserialize<'de> for Buttons {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u16::deserialize(deserializer)?;
        Buttons::from_bits(bits)
            .ok_or_else(|| D::Error::custom(format!("Invalid button bits {:#06x}", bits)))
    }
}

/// Controller state handed to the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputFrame {
    pub buttons: Buttons,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub left_thumbstick: [i32; 2],
    pub right_thumbstick: [i32; 2],
}

impl InputFrame {
    /// Aggregates the controls into one frame.
    ///
    /// The first stick feeds the left thumbstick and the second one the right
    /// thumbstick; a missing stick reports `[0, 0]`. Group masks are OR-ed as
    /// sampled, bit uniqueness across groups is checked when the scene is built.
    /// Triggers are always released since no control drives them.
    pub fn assemble(sticks: &[AnalogStick], groups: &[ButtonGroup]) -> Self {
        let buttons = groups
            .iter()
            .fold(Buttons::empty(), |acc, group| acc | group.pressed_mask());

        Self {
            buttons,
            left_trigger: 0,
            right_trigger: 0,
            left_thumbstick: sticks.first().map_or([0, 0], AnalogStick::value),
            right_thumbstick: sticks.get(1).map_or([0, 0], AnalogStick::value),
        }
    }

    /// Serializes the frame into its JSON wire form
    pub fn encode(&self) -> Result<Vec<u8>, FrameError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parses and validates a frame received from a peer.
    ///
    /// Rejects unassigned button bits and thumbstick values outside the axis
    /// range a stick can produce.
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        let frame: InputFrame = serde_json::from_slice(bytes)?;

        let axes = [
            ("left_thumbstick", frame.left_thumbstick),
            ("right_thumbstick", frame.right_thumbstick),
        ];
        for (field, values) in axes {
            if let Some(&value) = values.iter().find(|v| !(AXIS_MIN..=AXIS_MAX).contains(*v)) {
                return Err(FrameError::OutOfRange { field, value });
            }
        }

        Ok(frame)
    }

    /// Saturates an axis pair into the signed 16-bit range of a pad report
    pub fn thumbstick_i16(axes: [i32; 2]) -> [i16; 2] {
        axes.map(|v| v.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16)
    }
}

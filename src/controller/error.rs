//! Error definitions for the controller module

use thiserror::Error;

/// Construction-time failures of controls and layouts
///
/// Steady-state touch handling never fails; everything that can go wrong is
/// rejected while a control or scene is being built.
#[derive(Debug, Error, PartialEq)]
pub enum ControlError {
    /// A radius or divisor is zero, negative or not finite
    #[error("Degenerate geometry for {control}: {detail}")]
    DegenerateGeometry { control: &'static str, detail: String },

    /// The viewport has no usable area
    #[error("Invalid viewport {width}x{height}")]
    InvalidViewport { width: f64, height: f64 },

    /// Two button groups claim the same bit
    #[error("Button bits {0:#06x} are assigned to more than one group")]
    OverlappingButtonBits(u16),
}

/// Failures when decoding a wire frame received from a peer
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Thumbstick value {value} outside [-32769, 32768] on {field}")]
    OutOfRange { field: &'static str, value: i32 },
}

/// Checks that a length is strictly positive and finite
pub(crate) fn ensure_positive(
    control: &'static str,
    name: &str,
    value: f64,
) -> Result<(), ControlError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ControlError::DegenerateGeometry {
            control,
            detail: format!("{} must be positive, got {}", name, value),
        })
    }
}

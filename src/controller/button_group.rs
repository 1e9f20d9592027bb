//! Cluster of four digital buttons arranged around a pivot
//!
//! Buttons are not bound to contacts. Every sample looks at the whole registry
//! and a button counts as pressed while any active contact lies inside it.

use tracing::trace;

use super::error::{ensure_positive, ControlError};
use super::frame::Buttons;
use super::geometry::Circle;
use super::touch_registry::TouchRegistry;

/// Color tag of a button, passed through to the drawing layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const GREEN: Rgb = Rgb(96, 184, 72);
    pub const RED: Rgb = Rgb(214, 64, 56);
    pub const BLUE: Rgb = Rgb(64, 120, 214);
    pub const YELLOW: Rgb = Rgb(232, 196, 48);
    pub const GREY: Rgb = Rgb(150, 150, 150);
    pub const WHITE: Rgb = Rgb(235, 235, 235);
}

/// Color and bit of one button, as handed to [`ButtonGroup::new`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonSpec {
    pub color: Rgb,
    pub flag: Buttons,
}

impl ButtonSpec {
    pub const fn new(color: Rgb, flag: Buttons) -> Self {
        Self { color, flag }
    }
}

/// One circular hit zone carrying a single bit flag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Button {
    pub circle: Circle,
    pub flag: Buttons,
    pub color: Rgb,
}

/// Four buttons in the order north, east, west, south
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonGroup {
    pivot: Circle,
    buttons: [Button; 4],
    pressed: Buttons,
}

impl ButtonGroup {
    /// Lays out four buttons around `pivot`.
    ///
    /// `specs` are taken in the order north, east, west, south. Each button is
    /// centered `pivot.r + button_radius` away from the pivot center, so
    /// neighbouring buttons touch the pivot circle without covering it.
    pub fn new(pivot: Circle, button_radius: f64, specs: [ButtonSpec; 4]) -> Result<Self, ControlError> {
        ensure_positive("button group", "button radius", button_radius)?;
        if !(pivot.r.is_finite() && pivot.r >= 0.0) {
            return Err(ControlError::DegenerateGeometry {
                control: "button group",
                detail: format!("pivot radius must not be negative, got {}", pivot.r),
            });
        }

        let offset = pivot.r + button_radius;
        // Surface y grows downward, so north sits above the pivot
        let [north, east, west, south] = specs;
        let place = |spec: ButtonSpec, dx: f64, dy: f64| Button {
            circle: Circle::new(pivot.x + dx, pivot.y + dy, button_radius),
            flag: spec.flag,
            color: spec.color,
        };

        Ok(Self {
            pivot,
            buttons: [
                place(north, 0.0, -offset),
                place(east, offset, 0.0),
                place(west, -offset, 0.0),
                place(south, 0.0, offset),
            ],
            pressed: Buttons::empty(),
        })
    }

    pub fn pivot(&self) -> Circle {
        self.pivot
    }

    pub fn buttons(&self) -> &[Button; 4] {
        &self.buttons
    }

    /// Union of all flags this group can produce
    pub fn all_flags(&self) -> Buttons {
        self.buttons.iter().fold(Buttons::empty(), |acc, b| acc | b.flag)
    }

    /// Mask computed by the last [`sample`](Self::sample)
    pub fn pressed_mask(&self) -> Buttons {
        self.pressed
    }

    pub fn is_pressed(&self, button: &Button) -> bool {
        self.pressed.contains(button.flag)
    }

    /// Recomputes the pressed mask from every active contact.
    ///
    /// Two contacts on the same button still set its bit once.
    pub fn sample(&mut self, registry: &TouchRegistry) -> Buttons {
        let mut mask = Buttons::empty();
        for button in &self.buttons {
            if registry.all().any(|c| button.circle.contains(c.position())) {
                mask |= button.flag;
            }
        }

        if mask != self.pressed {
            trace!("Button mask changed {:#06x} -> {:#06x}", self.pressed.bits(), mask.bits());
        }
        self.pressed = mask;
        mask
    }

    /// Clears the pressed mask without looking at contacts
    pub fn reset(&mut self) {
        self.pressed = Buttons::empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::touch_registry::ContactId;

    fn face_specs() -> [ButtonSpec; 4] {
        [
            ButtonSpec::new(Rgb::YELLOW, Buttons::Y),
            ButtonSpec::new(Rgb::RED, Buttons::B),
            ButtonSpec::new(Rgb::BLUE, Buttons::X),
            ButtonSpec::new(Rgb::GREEN, Buttons::A),
        ]
    }

    #[test]
    fn test_layout_positions() {
        let group = ButtonGroup::new(Circle::new(200.0, 200.0, 20.0), 10.0, face_specs()).unwrap();
        let [north, east, west, south] = group.buttons();

        assert_eq!(north.circle, Circle::new(200.0, 170.0, 10.0));
        assert_eq!(east.circle, Circle::new(230.0, 200.0, 10.0));
        assert_eq!(west.circle, Circle::new(170.0, 200.0, 10.0));
        assert_eq!(south.circle, Circle::new(200.0, 230.0, 10.0));

        assert_eq!(north.flag, Buttons::Y);
        assert_eq!(south.flag, Buttons::A);
        assert_eq!(group.all_flags(), Buttons::A | Buttons::B | Buttons::X | Buttons::Y);
    }

    #[test]
    fn test_two_contacts_on_one_button_set_bit_once() {
        // East button ends up centered at (500, 500) with radius 30
        let mut group = ButtonGroup::new(Circle::new(440.0, 500.0, 30.0), 30.0, face_specs()).unwrap();
        assert_eq!(group.buttons()[1].circle, Circle::new(500.0, 500.0, 30.0));

        let mut registry = TouchRegistry::new();
        registry.upsert(ContactId::new(1), 505.0, 505.0);
        registry.upsert(ContactId::new(2), 10.0, 10.0);
        assert_eq!(group.sample(&registry), Buttons::B);

        registry.upsert(ContactId::new(3), 498.0, 510.0);
        assert_eq!(group.sample(&registry), Buttons::B);
        assert_eq!(group.pressed_mask().bits(), 0x2000);
    }

    #[test]
    fn test_sample_is_level_triggered() {
        let mut group = ButtonGroup::new(Circle::new(100.0, 100.0, 10.0), 10.0, face_specs()).unwrap();
        let mut registry = TouchRegistry::new();

        registry.upsert(ContactId::new(1), 100.0, 80.0);
        registry.upsert(ContactId::new(2), 100.0, 120.0);
        assert_eq!(group.sample(&registry), Buttons::Y | Buttons::A);

        registry.remove(ContactId::new(1));
        assert_eq!(group.sample(&registry), Buttons::A);

        registry.clear();
        assert!(group.sample(&registry).is_empty());
    }

    #[test]
    fn test_boundary_contact_presses() {
        let mut group = ButtonGroup::new(Circle::new(0.0, 0.0, 10.0), 5.0, face_specs()).unwrap();
        let mut registry = TouchRegistry::new();

        // West button is centered at (-15, 0); its left edge is x = -20
        registry.upsert(ContactId::new(1), -20.0, 0.0);
        assert_eq!(group.sample(&registry), Buttons::X);
    }

    #[test]
    fn test_degenerate_radius_rejected() {
        let result = ButtonGroup::new(Circle::new(0.0, 0.0, 10.0), 0.0, face_specs());
        assert!(matches!(result, Err(ControlError::DegenerateGeometry { .. })));

        let result = ButtonGroup::new(Circle::new(0.0, 0.0, -1.0), 5.0, face_specs());
        assert!(result.is_err());
    }

    #[test]
    fn test_reset_clears_mask() {
        let mut group = ButtonGroup::new(Circle::new(0.0, 0.0, 10.0), 5.0, face_specs()).unwrap();
        let mut registry = TouchRegistry::new();
        registry.upsert(ContactId::new(1), 15.0, 0.0);

        group.sample(&registry);
        assert!(!group.pressed_mask().is_empty());
        group.reset();
        assert!(group.pressed_mask().is_empty());
    }
}

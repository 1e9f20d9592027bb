//! Layout of the controls for a given viewport
//!
//! [`SceneConfig::for_viewport`] is a pure factory: same viewport and settings,
//! same positions. [`Scene::build`] turns the description into live controls.
//! On every resize the session builds a new scene and swaps it in whole.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::controller::{
    AnalogStick, ButtonGroup, ButtonSpec, Buttons, Circle, ControlError, Point, Rgb,
};

use super::canvas::{Canvas, DrawStyle};

/// Proportions of the control layout, relative to the viewport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Two sticks plus a d-pad cluster instead of one stick
    pub dual_stick: bool,
    /// Outer stick radius as a fraction of the shorter viewport side
    pub stick_radius_ratio: f64,
    /// Outer radius divided by this gives the knob radius
    pub knob_divisor: f64,
    /// Button radius as a fraction of the outer stick radius
    pub button_radius_ratio: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            dual_stick: true,
            stick_radius_ratio: 0.18,
            knob_divisor: 3.0,
            button_radius_ratio: 0.35,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StickConfig {
    pub center: Point,
    pub outer_radius: f64,
    pub knob_divisor: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupConfig {
    pub pivot: Circle,
    pub button_radius: f64,
    pub specs: [ButtonSpec; 4],
}

/// Positions and sizes of every control, without any state
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub width: f64,
    pub height: f64,
    /// Left stick first, optional right stick second
    pub sticks: Vec<StickConfig>,
    pub groups: Vec<GroupConfig>,
}

/// Face buttons: Y north, B east, X west, A south
pub fn face_buttons() -> [ButtonSpec; 4] {
    [
        ButtonSpec::new(Rgb::YELLOW, Buttons::Y),
        ButtonSpec::new(Rgb::RED, Buttons::B),
        ButtonSpec::new(Rgb::BLUE, Buttons::X),
        ButtonSpec::new(Rgb::GREEN, Buttons::A),
    ]
}

/// Secondary cluster mapped onto the d-pad bits
pub fn dpad_buttons() -> [ButtonSpec; 4] {
    [
        ButtonSpec::new(Rgb::GREY, Buttons::DPAD_UP),
        ButtonSpec::new(Rgb::GREY, Buttons::DPAD_RIGHT),
        ButtonSpec::new(Rgb::GREY, Buttons::DPAD_LEFT),
        ButtonSpec::new(Rgb::GREY, Buttons::DPAD_DOWN),
    ]
}

impl SceneConfig {
    /// Computes the layout for a `width` x `height` viewport.
    ///
    /// Single stick: stick on the left half, face buttons on the right half.
    /// Dual stick: sticks in the lower corners, d-pad above the left stick,
    /// face buttons above the right stick.
    pub fn for_viewport(width: f64, height: f64, settings: &LayoutSettings) -> Result<Self, ControlError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ControlError::InvalidViewport { width, height });
        }

        let unit = width.min(height);
        let outer_radius = unit * settings.stick_radius_ratio;
        let button_radius = outer_radius * settings.button_radius_ratio;

        let stick = |fx: f64, fy: f64| StickConfig {
            center: Point::new(width * fx, height * fy),
            outer_radius,
            knob_divisor: settings.knob_divisor,
        };
        let group = |fx: f64, fy: f64, specs: [ButtonSpec; 4]| GroupConfig {
            pivot: Circle::new(width * fx, height * fy, button_radius),
            button_radius,
            specs,
        };

        let (sticks, groups) = if settings.dual_stick {
            (
                vec![stick(0.15, 0.7), stick(0.85, 0.7)],
                vec![group(0.85, 0.3, face_buttons()), group(0.15, 0.3, dpad_buttons())],
            )
        } else {
            (vec![stick(0.25, 0.5)], vec![group(0.75, 0.5, face_buttons())])
        };

        Ok(Self {
            width,
            height,
            sticks,
            groups,
        })
    }
}

/// Live controls of one layout generation
#[derive(Debug, Clone)]
pub struct Scene {
    width: f64,
    height: f64,
    sticks: Vec<AnalogStick>,
    groups: Vec<ButtonGroup>,
}

impl Scene {
    /// Builds released controls from a layout.
    ///
    /// Fails when a control has degenerate geometry or when two groups share a
    /// button bit, since the OR in the frame would merge them silently.
    pub fn build(config: &SceneConfig) -> Result<Self, ControlError> {
        let sticks = config
            .sticks
            .iter()
            .map(|s| AnalogStick::new(s.center, s.outer_radius, s.knob_divisor))
            .collect::<Result<Vec<_>, _>>()?;

        let groups = config
            .groups
            .iter()
            .map(|g| ButtonGroup::new(g.pivot, g.button_radius, g.specs))
            .collect::<Result<Vec<_>, _>>()?;

        let mut claimed = Buttons::empty();
        for group in &groups {
            for button in group.buttons() {
                let overlap = claimed & button.flag;
                if !overlap.is_empty() {
                    return Err(ControlError::OverlappingButtonBits(overlap.bits()));
                }
                claimed |= button.flag;
            }
        }

        debug!(
            "Scene built for {:.0}x{:.0}: {} stick(s), {} button group(s)",
            config.width,
            config.height,
            sticks.len(),
            groups.len()
        );

        Ok(Self {
            width: config.width,
            height: config.height,
            sticks,
            groups,
        })
    }

    pub fn viewport(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn sticks(&self) -> &[AnalogStick] {
        &self.sticks
    }

    pub fn sticks_mut(&mut self) -> &mut [AnalogStick] {
        &mut self.sticks
    }

    pub fn groups(&self) -> &[ButtonGroup] {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut [ButtonGroup] {
        &mut self.groups
    }

    /// Hands every control shape to the canvas.
    ///
    /// Rings are stroked and knobs filled. Buttons are filled while pressed.
    pub fn render(&self, canvas: &mut dyn Canvas) {
        for stick in &self.sticks {
            canvas.draw_circle(stick.ring(), DrawStyle::Stroke(Rgb::WHITE));
            canvas.draw_circle(stick.knob(), DrawStyle::Fill(Rgb::WHITE));
        }

        for group in &self.groups {
            for button in group.buttons() {
                let style = if group.is_pressed(button) {
                    DrawStyle::Fill(button.color)
                } else {
                    DrawStyle::Stroke(button.color)
                };
                canvas.draw_circle(button.circle, style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{ContactId, TouchRegistry};
    use crate::session::canvas::RecordingCanvas;

    fn single_stick() -> LayoutSettings {
        LayoutSettings {
            dual_stick: false,
            ..LayoutSettings::default()
        }
    }

    #[test]
    fn test_single_stick_layout() {
        let config = SceneConfig::for_viewport(1000.0, 500.0, &single_stick()).unwrap();

        assert_eq!(config.sticks.len(), 1);
        assert_eq!(config.groups.len(), 1);
        assert_eq!(config.sticks[0].center, Point::new(250.0, 250.0));
        assert!((config.sticks[0].outer_radius - 90.0).abs() < 1e-9);
        assert_eq!(config.groups[0].pivot.center(), Point::new(750.0, 250.0));
        assert!((config.groups[0].button_radius - 31.5).abs() < 1e-9);
    }

    #[test]
    fn test_dual_stick_layout_keeps_controls_on_screen() {
        let config = SceneConfig::for_viewport(800.0, 480.0, &LayoutSettings::default()).unwrap();
        assert_eq!(config.sticks.len(), 2);
        assert_eq!(config.groups.len(), 2);

        for stick in &config.sticks {
            let r = stick.outer_radius;
            assert!(stick.center.x - r >= 0.0 && stick.center.x + r <= 800.0);
            assert!(stick.center.y - r >= 0.0 && stick.center.y + r <= 480.0);
        }

        let scene = Scene::build(&config).unwrap();
        for group in scene.groups() {
            for button in group.buttons() {
                let c = button.circle;
                assert!(c.x - c.r >= 0.0 && c.x + c.r <= 800.0, "{c:?}");
                assert!(c.y - c.r >= 0.0 && c.y + c.r <= 480.0, "{c:?}");
            }
        }
    }

    #[test]
    fn test_for_viewport_is_deterministic() {
        let settings = LayoutSettings::default();
        assert_eq!(
            SceneConfig::for_viewport(640.0, 360.0, &settings).unwrap(),
            SceneConfig::for_viewport(640.0, 360.0, &settings).unwrap()
        );
    }

    #[test]
    fn test_invalid_viewport_rejected() {
        let settings = LayoutSettings::default();
        assert_eq!(
            SceneConfig::for_viewport(0.0, 480.0, &settings),
            Err(ControlError::InvalidViewport {
                width: 0.0,
                height: 480.0
            })
        );
        assert!(SceneConfig::for_viewport(800.0, -1.0, &settings).is_err());
        assert!(SceneConfig::for_viewport(f64::INFINITY, 480.0, &settings).is_err());
    }

    #[test]
    fn test_degenerate_settings_rejected_at_build() {
        let settings = LayoutSettings {
            knob_divisor: 0.0,
            ..LayoutSettings::default()
        };
        let config = SceneConfig::for_viewport(800.0, 480.0, &settings).unwrap();
        assert!(matches!(
            Scene::build(&config),
            Err(ControlError::DegenerateGeometry { .. })
        ));
    }

    #[test]
    fn test_overlapping_bits_rejected() {
        let mut config = SceneConfig::for_viewport(800.0, 480.0, &LayoutSettings::default()).unwrap();
        config.groups[1].specs = face_buttons();

        assert_eq!(
            Scene::build(&config).err(),
            Some(ControlError::OverlappingButtonBits(Buttons::Y.bits()))
        );
    }

    #[test]
    fn test_render_fills_pressed_buttons_and_knobs() {
        let config = SceneConfig::for_viewport(1000.0, 500.0, &single_stick()).unwrap();
        let mut scene = Scene::build(&config).unwrap();

        let south = scene.groups()[0].buttons()[3].circle;
        let mut registry = TouchRegistry::new();
        registry.upsert(ContactId::new(1), south.x, south.y);
        scene.groups_mut()[0].sample(&registry);

        let mut canvas = RecordingCanvas::new();
        scene.render(&mut canvas);

        // ring + knob + four buttons
        assert_eq!(canvas.shapes.len(), 6);
        let filled: Vec<Circle> = canvas.filled().copied().collect();
        assert_eq!(filled, vec![scene.sticks()[0].knob(), south]);
    }
}

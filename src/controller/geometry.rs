//! Geometry primitives for hit-testing touch contacts against controls
//!
//! All coordinates are surface coordinates as delivered by the host (x grows
//! to the right, y grows downwards).

/// A position on the touch surface
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Circular hit-test region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

impl Circle {
    pub const fn new(x: f64, y: f64, r: f64) -> Self {
        Self { x, y, r }
    }

    pub fn centered_at(center: Point, r: f64) -> Self {
        Self::new(center.x, center.y, r)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Inclusive containment test: a point exactly on the boundary is inside.
    ///
    /// Compares squared distances so no square root is taken on the hot path.
    pub fn contains(&self, point: Point) -> bool {
        let dx = point.x - self.x;
        let dy = point.y - self.y;
        dx * dx + dy * dy <= self.r * self.r
    }
}

/// Affine rescale of `value` from `[in_lo, in_hi]` onto `[out_lo, out_hi]`.
///
/// Computes `out_lo + round((value - in_lo) * (out_hi - out_lo) / (in_hi - in_lo))`
/// with ties rounding towards positive infinity.
///
/// `in_lo == in_hi` divides by zero. Controls reject zero radii when they are
/// built, so callers inside this crate never reach that case.
pub fn map_range(value: f64, in_lo: f64, in_hi: f64, out_lo: i32, out_hi: i32) -> i32 {
    debug_assert!(in_lo != in_hi, "map_range called with an empty input range");

    let scaled = (value - in_lo) * f64::from(out_hi - out_lo) / (in_hi - in_lo);
    out_lo + (scaled + 0.5).floor() as i32
}

/// Point on the boundary of the circle around `center` with `radius`,
/// along the ray from `center` through `point`.
///
/// Returns `center` itself when `point` coincides with it, since the ray has
/// no direction there.
pub fn project_onto_boundary(center: Point, radius: f64, point: Point) -> Point {
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    let distance = dx.hypot(dy);

    if distance == 0.0 {
        return center;
    }

    let scale = radius / distance;
    Point::new(center.x + dx * scale, center.y + dy * scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_point_is_finite() {
        assert!(Point::new(1.0, -2.0).is_finite());
        assert!(!Point::new(f64::INFINITY, 0.0).is_finite());
        assert!(!Point::new(0.0, f64::NAN).is_finite());
    }

    #[test]
    fn test_contains_inside_and_outside() {
        let circle = Circle::new(100.0, 100.0, 50.0);

        assert!(circle.contains(Point::new(100.0, 100.0)));
        assert!(circle.contains(Point::new(120.0, 130.0)));
        assert!(!circle.contains(Point::new(151.0, 100.0)));
        assert!(!circle.contains(Point::new(140.0, 140.0)));
    }

    #[test]
    fn test_contains_boundary_is_inclusive() {
        let circle = Circle::new(0.0, 0.0, 5.0);

        assert!(circle.contains(Point::new(5.0, 0.0)));
        assert!(circle.contains(Point::new(0.0, -5.0)));
        assert!(circle.contains(Point::new(3.0, 4.0)));
    }

    #[test]
    fn test_map_range_stick_bounds() {
        assert_eq!(map_range(-50.0, -50.0, 50.0, -32769, 32768), -32769);
        assert_eq!(map_range(50.0, -50.0, 50.0, -32769, 32768), 32768);
        assert_eq!(map_range(20.0, -50.0, 50.0, -32769, 32768), 13107);
    }

    #[test]
    fn test_map_range_center_rounds_half_up() {
        // 50 * 65537 / 100 = 32768.5 exactly, which rounds up to 32769
        assert_eq!(map_range(0.0, -50.0, 50.0, -32769, 32768), 0);
    }

    #[test]
    fn test_map_range_simple_scale() {
        assert_eq!(map_range(5.0, 0.0, 10.0, 0, 100), 50);
        assert_eq!(map_range(0.25, 0.0, 1.0, 0, 10), 3);
    }

    #[test]
    fn test_project_onto_boundary_axis() {
        let projected = project_onto_boundary(Point::new(100.0, 100.0), 50.0, Point::new(300.0, 100.0));
        assert_eq!(projected, Point::new(150.0, 100.0));

        let projected = project_onto_boundary(Point::new(100.0, 100.0), 50.0, Point::new(100.0, -20.0));
        assert_eq!(projected, Point::new(100.0, 50.0));
    }

    #[test]
    fn test_project_onto_boundary_at_center() {
        let center = Point::new(10.0, 20.0);
        assert_eq!(project_onto_boundary(center, 7.0, center), center);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        /// Any projected point lies on the boundary (within float tolerance).
        #[test]
        fn prop_projection_lands_on_boundary(
            cx in -1000.0f64..1000.0,
            cy in -1000.0f64..1000.0,
            r in 1.0f64..500.0,
            px in -5000.0f64..5000.0,
            py in -5000.0f64..5000.0,
        ) {
            let center = Point::new(cx, cy);
            let point = Point::new(px, py);
            prop_assume!(center.distance(point) > 1e-6);

            let projected = project_onto_boundary(center, r, point);
            let error = (projected.distance(center) - r).abs();
            prop_assert!(error < 1e-6 * r.max(1.0), "distance error {error}");
        }

        /// Projection preserves direction: the projected point sits on the same
        /// side of the center as the input on both axes.
        #[test]
        fn prop_projection_preserves_direction(
            r in 1.0f64..500.0,
            px in -5000.0f64..5000.0,
            py in -5000.0f64..5000.0,
        ) {
            let projected = project_onto_boundary(Point::default(), r, Point::new(px, py));
            prop_assert!(projected.x * px >= 0.0);
            prop_assert!(projected.y * py >= 0.0);
        }

        /// Mapping a value inside the input range never leaves the output range.
        #[test]
        fn prop_map_range_stays_in_bounds(r in 1.0f64..1000.0, t in 0.0f64..=1.0) {
            let value = -r + 2.0 * r * t;
            let mapped = map_range(value, -r, r, -32769, 32768);
            prop_assert!((-32769..=32768).contains(&mapped));
        }
    }
}

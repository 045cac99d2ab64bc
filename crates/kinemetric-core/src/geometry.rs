//! Geometry kernel
//!
//! Pure vector primitives over pose coordinates. None of these functions
//! fail: degenerate or non-finite input maps to a documented neutral value
//! so a single bad frame cannot abort an analysis.
//!
//! Coordinate convention follows the pose estimator: `x` grows to the
//! subject's image-right, `y` grows downward, `z` grows away from camera.

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// Neutral values returned for degenerate geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryDefaults {
    /// Angle reported when a ray has zero length or input is not finite
    pub degenerate_angle: f64,
    /// Distance reported for non-finite input
    pub degenerate_distance: f64,
    /// Tilt reported when the horizontal projection is empty
    pub flat_tilt: f64,
}

/// The fixed defaults used by every kernel function
pub const GEOMETRY_DEFAULTS: GeometryDefaults = GeometryDefaults {
    degenerate_angle: 180.0,
    degenerate_distance: 0.0,
    flat_tilt: 0.0,
};

impl Default for GeometryDefaults {
    fn default() -> Self {
        GEOMETRY_DEFAULTS
    }
}

/// 3D point in pose units
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const ORIGIN: Point3 = Point3 { x: 0.0, y: 0.0, z: 0.0 };

    /// "Not a number" sentinel; callers treat it as absent
    pub const NAN: Point3 = Point3 {
        x: f64::NAN,
        y: f64::NAN,
        z: f64::NAN,
    };

    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    #[inline]
    pub fn dot(&self, other: &Point3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Projection onto the frontal (image) plane
    #[inline]
    pub fn frontal(&self) -> Point3 {
        Point3::new(self.x, self.y, 0.0)
    }

    /// Linear interpolation
    pub fn lerp(&self, other: &Point3, t: f64) -> Point3 {
        Point3::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
            self.z + (other.z - self.z) * t,
        )
    }
}

impl Add for Point3 {
    type Output = Point3;

    fn add(self, rhs: Point3) -> Point3 {
        Point3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3 {
    type Output = Point3;

    fn sub(self, rhs: Point3) -> Point3 {
        Point3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Point3 {
    type Output = Point3;

    fn mul(self, rhs: f64) -> Point3 {
        Point3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Angle at vertex `b` between rays `b→a` and `b→c`, in degrees.
///
/// Always in `[0, 180]`. Zero-length rays and non-finite input yield
/// [`GeometryDefaults::degenerate_angle`].
pub fn angle(a: Point3, b: Point3, c: Point3) -> f64 {
    let ba = a - b;
    let bc = c - b;
    let n1 = ba.norm();
    let n2 = bc.norm();
    if !(n1.is_finite() && n2.is_finite()) || n1 == 0.0 || n2 == 0.0 {
        return GEOMETRY_DEFAULTS.degenerate_angle;
    }

    let cos = (ba.dot(&bc) / (n1 * n2)).clamp(-1.0, 1.0);
    let deg = cos.acos().to_degrees();
    if deg.is_finite() {
        deg.clamp(0.0, 180.0)
    } else {
        GEOMETRY_DEFAULTS.degenerate_angle
    }
}

/// Euclidean distance; 0.0 for non-finite input
pub fn distance(a: Point3, b: Point3) -> f64 {
    let d = (a - b).norm();
    if d.is_finite() {
        d
    } else {
        GEOMETRY_DEFAULTS.degenerate_distance
    }
}

/// Elementwise average; [`Point3::NAN`] if either input is not finite
pub fn midpoint(a: Point3, b: Point3) -> Point3 {
    if !(a.is_finite() && b.is_finite()) {
        return Point3::NAN;
    }
    a.lerp(&b, 0.5)
}

/// Signed tilt of the left→right segment from horizontal, in degrees.
///
/// Positive means the right-side point is lower. Returns
/// [`GeometryDefaults::flat_tilt`] when the horizontal projection is empty.
pub fn horizontal_tilt(left: Point3, right: Point3) -> f64 {
    let dy = right.y - left.y;
    let horizontal = (right.x - left.x).hypot(right.z - left.z);
    if !(dy.is_finite() && horizontal.is_finite()) || horizontal == 0.0 {
        return GEOMETRY_DEFAULTS.flat_tilt;
    }
    dy.atan2(horizontal).to_degrees()
}

/// Lean of the hip→shoulder segment away from vertical, in degrees.
///
/// 0 when the shoulder sits straight above the hip.
pub fn lean_from_vertical(shoulder: Point3, hip: Point3) -> f64 {
    let below = hip + Point3::new(0.0, 1.0, 0.0);
    180.0 - angle(shoulder, hip, below)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_right_angle() {
        let a = Point3::new(1.0, 0.0, 0.0);
        let b = Point3::ORIGIN;
        let c = Point3::new(0.0, 1.0, 0.0);
        assert!((angle(a, b, c) - 90.0).abs() < EPS);
    }

    #[test]
    fn test_collinear_is_straight() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(0.3, 0.4, 0.1);
        let c = Point3::new(0.6, 0.8, 0.2);
        assert!((angle(a, b, c) - 180.0).abs() < 1e-4);
    }

    #[test]
    fn test_zero_length_ray() {
        let p = Point3::new(0.5, 0.5, 0.5);
        assert_eq!(angle(p, p, Point3::ORIGIN), 180.0);
        assert_eq!(angle(Point3::NAN, p, Point3::ORIGIN), 180.0);
    }

    #[test]
    fn test_distance_degenerate() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(distance(p, p), 0.0);
        assert_eq!(distance(p, Point3::NAN), 0.0);
        assert!((distance(Point3::ORIGIN, Point3::new(3.0, 4.0, 0.0)) - 5.0).abs() < EPS);
    }

    #[test]
    fn test_midpoint_sentinel() {
        let m = midpoint(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 4.0, 6.0));
        assert_eq!(m, Point3::new(1.0, 2.0, 3.0));
        assert!(!midpoint(Point3::NAN, Point3::ORIGIN).is_finite());
    }

    #[test]
    fn test_tilt_sign() {
        // right side lower (larger y) is positive
        let left = Point3::new(0.0, 0.0, 0.0);
        let right = Point3::new(1.0, 1.0, 0.0);
        assert!((horizontal_tilt(left, right) - 45.0).abs() < EPS);
        assert!((horizontal_tilt(right, left) + 45.0).abs() < EPS);
        assert_eq!(horizontal_tilt(left, Point3::new(0.0, 1.0, 0.0)), 0.0);
    }

    #[test]
    fn test_lean_from_vertical() {
        let hip = Point3::new(0.5, 0.6, 0.0);
        assert!(lean_from_vertical(Point3::new(0.5, 0.2, 0.0), hip).abs() < 1e-6);
        let lean = lean_from_vertical(Point3::new(0.9, 0.2, 0.0), hip);
        assert!((lean - 45.0).abs() < 1e-6);
    }
}

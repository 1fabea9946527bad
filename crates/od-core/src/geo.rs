//! World-frame vector and angle utilities.
//!
//! The road document is authored in a right-handed planar frame `(x, y)` with
//! headings measured counter-clockwise from +x.  The world frame used by the
//! host application is y-up: a document point `(x, y)` at elevation `h` maps
//! to the world point `(x, h, -y)`.  Headings are kept in the document
//! convention (radians, CCW from +x) on both sides of the boundary.

use std::f64::consts::{PI, TAU};

/// A position in the y-up world frame, double precision.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Map a document-frame planar point plus elevation into the world frame.
    #[inline]
    pub fn from_document(x: f64, y: f64, elevation: f64) -> Self {
        Self { x, y: elevation, z: -y }
    }

    /// Inverse of [`from_document`](Self::from_document): `(x, y)` in the
    /// document plane.
    #[inline]
    pub fn to_document(self) -> (f64, f64) {
        (self.x, -self.z)
    }

    pub fn distance(self, other: Vec3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Distance in the ground plane, ignoring elevation.
    pub fn planar_distance(self, other: Vec3) -> f64 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }

    pub fn lerp(self, other: Vec3, t: f64) -> Vec3 {
        Vec3 {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }
}

impl std::fmt::Display for Vec3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

/// Normalize an angle in radians into `(-π, π]`.
pub fn normalize_angle(rad: f64) -> f64 {
    let mut a = rad.rem_euclid(TAU);
    if a > PI {
        a -= TAU;
    }
    a
}

/// Absolute difference between two headings (radians), in degrees within
/// `[0, 180]`.
pub fn heading_diff_deg(a: f64, b: f64) -> f64 {
    normalize_angle(a - b).abs().to_degrees()
}

/// Linear ramp that is `1.0` at or below `full_at`, `0.0` at or above
/// `zero_at`, and linear in between.
///
/// Requires `full_at < zero_at`.  Monotonically non-increasing in `value`.
pub fn ramp(value: f64, full_at: f64, zero_at: f64) -> f64 {
    debug_assert!(full_at < zero_at);
    if value <= full_at {
        1.0
    } else if value >= zero_at {
        0.0
    } else {
        (zero_at - value) / (zero_at - full_at)
    }
}

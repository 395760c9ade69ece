//! # Assembly Geometry
//!
//! Small geometric vocabulary shared by the resolver, the semantic feature
//! catalog and the build pipeline: vectors, principal axes, rigid placements
//! and axis-aligned boxes.
//!
//! ## Assembly Frame
//!
//! ```text
//!   Y (column axis, base at 0)
//!   |
//!   |     beam ---> +Z
//!   |____ X (across flange width)
//! ```
//!
//! The origin lies on the column web centreline at the column base.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// Geometric tolerance in millimetres.
pub const GEOM_TOL: f64 = 1e-6;

/// A point or direction in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const X: Vec3 = Vec3 { x: 1.0, y: 0.0, z: 0.0 };
    pub const Y: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };
    pub const Z: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 1.0 };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vec3 { x, y, z }
    }

    pub fn component(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    pub fn dot(&self, other: &Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn distance_to(&self, other: &Vec3) -> f64 {
        (*self - *other).length()
    }

    /// Component-wise comparison within [`GEOM_TOL`].
    pub fn approx_eq(&self, other: &Vec3) -> bool {
        (self.x - other.x).abs() <= GEOM_TOL
            && (self.y - other.y).abs() <= GEOM_TOL
            && (self.z - other.z).abs() <= GEOM_TOL
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl std::fmt::Display for Vec3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

/// Principal axis of a part or of the assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(&self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}

/// Principal plane used for datum planes, named by the two axes it contains.
///
/// The offset of a datum plane is measured along the plane's normal axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrincipalPlane {
    XY,
    YZ,
    XZ,
}

impl PrincipalPlane {
    pub fn normal_axis(&self) -> Axis {
        match self {
            PrincipalPlane::XY => Axis::Z,
            PrincipalPlane::YZ => Axis::X,
            PrincipalPlane::XZ => Axis::Y,
        }
    }
}

/// Rotation about an axis through the origin, in degrees (right-hand rule).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub axis: Axis,
    pub angle_deg: f64,
}

impl Rotation {
    pub fn apply(&self, p: Vec3) -> Vec3 {
        let (s, c) = self.angle_deg.to_radians().sin_cos();
        // Snap quarter turns so rotated faces stay exactly axis-aligned.
        let snap = |v: f64| if v.abs() < 1e-12 { 0.0 } else { v };
        let (s, c) = (snap(s), snap(c));
        match self.axis {
            Axis::X => Vec3::new(p.x, c * p.y - s * p.z, s * p.y + c * p.z),
            Axis::Y => Vec3::new(c * p.x + s * p.z, p.y, -s * p.x + c * p.z),
            Axis::Z => Vec3::new(c * p.x - s * p.y, s * p.x + c * p.y, p.z),
        }
    }
}

/// Rigid placement of a part instance: optional rotation, then translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub rotation: Option<Rotation>,
    pub translation: Vec3,
}

impl Placement {
    pub fn translation(translation: Vec3) -> Self {
        Placement {
            rotation: None,
            translation,
        }
    }

    pub fn rotated(rotation: Rotation, translation: Vec3) -> Self {
        Placement {
            rotation: Some(rotation),
            translation,
        }
    }

    /// Map a part-local point into the assembly frame.
    pub fn apply(&self, local: Vec3) -> Vec3 {
        let rotated = match &self.rotation {
            Some(r) => r.apply(local),
            None => local,
        };
        rotated + self.translation
    }

    /// Map a part-local direction into the assembly frame.
    pub fn apply_direction(&self, local: Vec3) -> Vec3 {
        match &self.rotation {
            Some(r) => r.apply(local),
            None => local,
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Aabb { min, max }
    }

    pub fn from_points(points: &[Vec3]) -> Self {
        let mut bb = Aabb::new(
            Vec3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            Vec3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        );
        for p in points {
            bb.min = Vec3::new(bb.min.x.min(p.x), bb.min.y.min(p.y), bb.min.z.min(p.z));
            bb.max = Vec3::new(bb.max.x.max(p.x), bb.max.y.max(p.y), bb.max.z.max(p.z));
        }
        bb
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// Bounding box of this (part-local) box after a placement.
    pub fn placed(&self, placement: &Placement) -> Aabb {
        let corners: Vec<Vec3> = self.corners().iter().map(|c| placement.apply(*c)).collect();
        Aabb::from_points(&corners)
    }

    /// Signed overlap along one axis: positive is interpenetration, zero is
    /// face contact, negative is a gap.
    pub fn overlap_along(&self, other: &Aabb, axis: Axis) -> f64 {
        let hi = self.max.component(axis).min(other.max.component(axis));
        let lo = self.min.component(axis).max(other.min.component(axis));
        hi - lo
    }

    pub fn extent(&self, axis: Axis) -> f64 {
        self.max.component(axis) - self.min.component(axis)
    }

    pub fn contains(&self, p: &Vec3) -> bool {
        p.x >= self.min.x - GEOM_TOL
            && p.x <= self.max.x + GEOM_TOL
            && p.y >= self.min.y - GEOM_TOL
            && p.y <= self.max.y + GEOM_TOL
            && p.z >= self.min.z - GEOM_TOL
            && p.z <= self.max.z + GEOM_TOL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quarter_turn_about_x() {
        let r = Rotation { axis: Axis::X, angle_deg: 90.0 };
        // y' = -z, z' = y for a positive quarter turn.
        let p = r.apply(Vec3::new(1.0, 2.0, 3.0));
        assert!(p.approx_eq(&Vec3::new(1.0, -3.0, 2.0)));
    }

    #[test]
    fn test_placement_rotates_then_translates() {
        let placement = Placement::rotated(
            Rotation { axis: Axis::X, angle_deg: 90.0 },
            Vec3::new(0.0, 1500.0, 0.0),
        );
        // Far end of a 1500 mm extrusion lands on the origin plane.
        assert!(placement.apply(Vec3::new(0.0, 0.0, 1500.0)).approx_eq(&Vec3::ZERO));
        assert!(placement
            .apply(Vec3::new(0.0, 0.0, 0.0))
            .approx_eq(&Vec3::new(0.0, 1500.0, 0.0)));
    }

    #[test]
    fn test_overlap_along_axis() {
        let a = Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        let touching = Aabb::new(Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 1.0, 2.0));
        let gap = Aabb::new(Vec3::new(0.0, 0.0, 1.5), Vec3::new(1.0, 1.0, 2.0));
        let penetrating = Aabb::new(Vec3::new(0.0, 0.0, 0.75), Vec3::new(1.0, 1.0, 2.0));

        assert!(a.overlap_along(&touching, Axis::Z).abs() < GEOM_TOL);
        assert!(a.overlap_along(&gap, Axis::Z) < 0.0);
        assert!((a.overlap_along(&penetrating, Axis::Z) - 0.25).abs() < GEOM_TOL);
    }

    #[test]
    fn test_placed_box() {
        let column = Aabb::new(Vec3::new(-60.0, -120.0, 0.0), Vec3::new(60.0, 120.0, 1500.0));
        let placed = column.placed(&Placement::rotated(
            Rotation { axis: Axis::X, angle_deg: 90.0 },
            Vec3::new(0.0, 1500.0, 0.0),
        ));
        assert!(placed.min.approx_eq(&Vec3::new(-60.0, 0.0, -120.0)));
        assert!(placed.max.approx_eq(&Vec3::new(60.0, 1500.0, 120.0)));
    }
}

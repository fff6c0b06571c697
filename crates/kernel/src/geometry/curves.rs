use serde::{Deserialize, Serialize};

use super::point::Point3d;
use super::vector::Vec3;

/// An infinite line defined by a point and a unit direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Line3d {
    pub origin: Point3d,
    pub direction: Vec3,
}

impl Line3d {
    /// The direction is normalized; a zero direction is kept as zero.
    pub fn new(origin: Point3d, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn from_points(a: Point3d, b: Point3d) -> Self {
        Self::new(a, b - a)
    }

    pub fn evaluate(&self, t: f64) -> Point3d {
        self.origin + self.direction * t
    }

    pub fn closest_point(&self, p: &Point3d) -> (Point3d, f64) {
        let v = *p - self.origin;
        let t = v.dot(&self.direction);
        (self.evaluate(t), t)
    }

    /// Orthogonal projection of `p` onto the line.
    pub fn project_point(&self, p: &Point3d) -> Point3d {
        self.closest_point(p).0
    }
}

/// A half-infinite ray used for picking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Point3d,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Point3d, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f64) -> Point3d {
        self.origin + self.direction * t
    }
}

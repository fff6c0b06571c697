use approx::AbsDiffEq;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

use super::vector::Vec3;

/// A point in 3D Euclidean space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3d {
    pub const ORIGIN: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance_to(&self, other: &Self) -> f64 {
        self.distance_squared_to(other).sqrt()
    }

    pub fn distance_squared_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    pub fn midpoint(&self, other: &Self) -> Self {
        Self {
            x: (self.x + other.x) * 0.5,
            y: (self.y + other.y) * 0.5,
            z: (self.z + other.z) * 0.5,
        }
    }

    pub fn to_vec3(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn from_vec3(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }

    /// Snaps every coordinate that is within `epsilon` of an integer.
    pub fn correct(&self, epsilon: f64) -> Self {
        Self::from_vec3(self.to_vec3().correct(epsilon))
    }

    /// Arithmetic mean of a non-empty set of points; `None` when empty.
    pub fn average<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3d>,
    {
        let mut sum = Vec3::ZERO;
        let mut count = 0usize;
        for p in points {
            sum += p.to_vec3();
            count += 1;
        }
        (count > 0).then(|| Self::from_vec3(sum / count as f64))
    }
}

impl Add<Vec3> for Point3d {
    type Output = Point3d;
    fn add(self, rhs: Vec3) -> Self::Output {
        Point3d::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3d {
    type Output = Vec3;
    fn sub(self, rhs: Self) -> Self::Output {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Sub<Vec3> for Point3d {
    type Output = Point3d;
    fn sub(self, rhs: Vec3) -> Self::Output {
        Point3d::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl AbsDiffEq for Point3d {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.to_vec3().abs_diff_eq(&other.to_vec3(), epsilon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_point_distance() {
        let a = Point3d::new(1.0, 0.0, 0.0);
        let b = Point3d::new(4.0, 0.0, 0.0);
        assert!((a.distance_to(&b) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_point_sub_gives_vector() {
        let v = Point3d::new(3.0, 4.0, 5.0) - Point3d::new(1.0, 1.0, 1.0);
        assert_abs_diff_eq!(v, Vec3::new(2.0, 3.0, 4.0), epsilon = 1e-12);
    }

    #[test]
    fn test_point_add_vector() {
        let result = Point3d::new(1.0, 2.0, 3.0) + Vec3::new(10.0, 20.0, 30.0);
        assert_abs_diff_eq!(result, Point3d::new(11.0, 22.0, 33.0), epsilon = 1e-12);
    }

    #[test]
    fn test_average() {
        let c = Point3d::average([
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(2.0, 0.0, 0.0),
            Point3d::new(2.0, 2.0, 0.0),
            Point3d::new(0.0, 2.0, 0.0),
        ])
        .unwrap();
        assert_abs_diff_eq!(c, Point3d::new(1.0, 1.0, 0.0), epsilon = 1e-12);
        assert!(Point3d::average(std::iter::empty()).is_none());
    }
}

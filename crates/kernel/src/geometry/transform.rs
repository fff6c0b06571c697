use serde::{Deserialize, Serialize};
use std::ops::Mul;

use super::point::Point3d;
use super::vector::Vec3;

/// A 4x4 affine transformation matrix stored in column-major order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Column-major 4x4 matrix entries.
    pub m: [f64; 16],
}

impl Transform {
    pub fn identity() -> Self {
        Self::scaling(1.0, 1.0, 1.0)
    }

    /// Build from row-major rows, which reads naturally in source.
    pub fn from_rows(rows: [[f64; 4]; 4]) -> Self {
        let mut m = [0.0; 16];
        for (row, values) in rows.iter().enumerate() {
            for (col, value) in values.iter().enumerate() {
                m[col * 4 + row] = *value;
            }
        }
        Self { m }
    }

    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        #[rustfmt::skip]
        let m = [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            dx,  dy,  dz,  1.0,
        ];
        Self { m }
    }

    pub fn from_translation_vec(v: Vec3) -> Self {
        Self::translation(v.x, v.y, v.z)
    }

    pub fn scaling(sx: f64, sy: f64, sz: f64) -> Self {
        #[rustfmt::skip]
        let m = [
            sx,  0.0, 0.0, 0.0,
            0.0, sy,  0.0, 0.0,
            0.0, 0.0, sz,  0.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        Self { m }
    }

    /// Rotation around an arbitrary axis by `angle` radians (Rodrigues' formula).
    /// Returns the identity for a zero-length axis.
    pub fn rotation_axis_angle(axis: Vec3, angle: f64) -> Self {
        let Some(axis) = axis.normalized() else {
            return Self::identity();
        };
        let c = angle.cos();
        let s = angle.sin();
        let t = 1.0 - c;
        let (x, y, z) = (axis.x, axis.y, axis.z);

        #[rustfmt::skip]
        let m = [
            t*x*x + c,     t*x*y + s*z,   t*x*z - s*y,   0.0,
            t*x*y - s*z,   t*y*y + c,     t*y*z + s*x,   0.0,
            t*x*z + s*y,   t*y*z - s*x,   t*z*z + c,     0.0,
            0.0,           0.0,           0.0,           1.0,
        ];
        Self { m }
    }

    /// Matrix whose columns are the given axes and origin: maps local coordinates of
    /// that frame into world coordinates.
    pub fn coordinate_system(x_axis: Vec3, y_axis: Vec3, z_axis: Vec3, origin: Point3d) -> Self {
        Self::from_rows([
            [x_axis.x, y_axis.x, z_axis.x, origin.x],
            [x_axis.y, y_axis.y, z_axis.y, origin.y],
            [x_axis.z, y_axis.z, z_axis.z, origin.z],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Discards the Z coordinate of whatever it is applied to.
    pub fn zero_out_z() -> Self {
        Self::scaling(1.0, 1.0, 0.0)
    }

    /// Matrix element access (row, col), 0-indexed.
    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.m[col * 4 + row]
    }

    /// The same matrix without its translation column.
    pub fn strip_translation(&self) -> Self {
        let mut m = self.m;
        m[12] = 0.0;
        m[13] = 0.0;
        m[14] = 0.0;
        Self { m }
    }

    /// Transform a point (applies translation).
    pub fn transform_point(&self, p: &Point3d) -> Point3d {
        let x = self.at(0, 0) * p.x + self.at(0, 1) * p.y + self.at(0, 2) * p.z + self.at(0, 3);
        let y = self.at(1, 0) * p.x + self.at(1, 1) * p.y + self.at(1, 2) * p.z + self.at(1, 3);
        let z = self.at(2, 0) * p.x + self.at(2, 1) * p.y + self.at(2, 2) * p.z + self.at(2, 3);
        Point3d::new(x, y, z)
    }

    /// Transform a vector (no translation).
    pub fn transform_vector(&self, v: &Vec3) -> Vec3 {
        let x = self.at(0, 0) * v.x + self.at(0, 1) * v.y + self.at(0, 2) * v.z;
        let y = self.at(1, 0) * v.x + self.at(1, 1) * v.y + self.at(1, 2) * v.z;
        let z = self.at(2, 0) * v.x + self.at(2, 1) * v.y + self.at(2, 2) * v.z;
        Vec3::new(x, y, z)
    }

    /// Transform a covector such as a plane normal by the inverse transpose of the
    /// linear part. Returns None if the linear part is singular.
    pub fn transform_covector(&self, v: &Vec3) -> Option<Vec3> {
        let inv = self.strip_translation().inverse()?;
        Some(Vec3::new(
            inv.at(0, 0) * v.x + inv.at(1, 0) * v.y + inv.at(2, 0) * v.z,
            inv.at(0, 1) * v.x + inv.at(1, 1) * v.y + inv.at(2, 1) * v.z,
            inv.at(0, 2) * v.x + inv.at(1, 2) * v.y + inv.at(2, 2) * v.z,
        ))
    }

    /// Compose two transforms: self * other.
    pub fn then(&self, other: &Transform) -> Transform {
        let mut result = [0.0f64; 16];
        for col in 0..4 {
            for row in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += self.at(row, k) * other.at(k, col);
                }
                result[col * 4 + row] = sum;
            }
        }
        Transform { m: result }
    }

    /// Compute the inverse transform. Returns None if the matrix is singular.
    pub fn inverse(&self) -> Option<Self> {
        let matrix = nalgebra::Matrix4::from_column_slice(&self.m);
        if matrix.determinant().abs() < 1e-15 {
            return None;
        }
        let inverse = matrix.try_inverse()?;
        let mut m = [0.0; 16];
        m.copy_from_slice(inverse.as_slice());
        Some(Self { m })
    }

    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.m
            .iter()
            .zip(other.m.iter())
            .all(|(a, b)| (a - b).abs() < epsilon)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Transform {
    type Output = Transform;
    fn mul(self, rhs: Transform) -> Self::Output {
        self.then(&rhs)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3d,
    pub max: Point3d,
}

impl BoundingBox {
    pub fn new(min: Point3d, max: Point3d) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Point3d::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3d::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points(points: &[Point3d]) -> Self {
        let mut bb = Self::empty();
        for p in points {
            bb.expand_to_include(p);
        }
        bb
    }

    pub fn expand_to_include(&mut self, p: &Point3d) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    pub fn contains_point(&self, p: &Point3d) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    pub fn center(&self) -> Point3d {
        self.min.midpoint(&self.max)
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_identity_transform() {
        let p = Point3d::new(1.0, 2.0, 3.0);
        assert_abs_diff_eq!(Transform::identity().transform_point(&p), p, epsilon = 1e-12);
    }

    #[test]
    fn test_translation() {
        let t = Transform::translation(10.0, 20.0, 30.0);
        let result = t.transform_point(&Point3d::new(1.0, 2.0, 3.0));
        assert_abs_diff_eq!(result, Point3d::new(11.0, 22.0, 33.0), epsilon = 1e-12);
        assert_abs_diff_eq!(
            t.transform_vector(&Vec3::X),
            Vec3::X,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_rotation_about_z() {
        let t = Transform::rotation_axis_angle(Vec3::Z, FRAC_PI_2);
        let result = t.transform_point(&Point3d::new(1.0, 0.0, 0.0));
        assert_abs_diff_eq!(result, Point3d::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_from_rows_matches_translation() {
        let rows = Transform::from_rows([
            [1.0, 0.0, 0.0, 5.0],
            [0.0, 1.0, 0.0, 6.0],
            [0.0, 0.0, 1.0, 7.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        assert_eq!(rows, Transform::translation(5.0, 6.0, 7.0));
    }

    #[test]
    fn test_compose_transforms() {
        let combined = Transform::translation(1.0, 0.0, 0.0) * Transform::translation(0.0, 2.0, 0.0);
        let result = combined.transform_point(&Point3d::ORIGIN);
        assert_abs_diff_eq!(result, Point3d::new(1.0, 2.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_inverse() {
        let t = Transform::translation(5.0, -3.0, 7.0)
            * Transform::rotation_axis_angle(Vec3::new(1.0, 1.0, 0.0), 0.3);
        let inv = t.inverse().unwrap();
        let p = Point3d::new(1.0, 2.0, 3.0);
        let round_trip = inv.transform_point(&t.transform_point(&p));
        assert_abs_diff_eq!(round_trip, p, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_has_no_inverse() {
        assert!(Transform::zero_out_z().inverse().is_none());
    }

    #[test]
    fn test_covector_stays_perpendicular() {
        let stretch = Transform::scaling(2.0, 1.0, 1.0);
        let normal = Vec3::new(1.0, 1.0, 0.0);
        let image = stretch.transform_covector(&normal).unwrap();
        assert_abs_diff_eq!(image, Vec3::new(0.5, 1.0, 0.0), epsilon = 1e-12);

        // a direction lying in the plane stays in the transformed plane
        let tangent = stretch.transform_vector(&Vec3::new(1.0, -1.0, 0.0));
        assert!(image.dot(&tangent).abs() < 1e-12);

        assert!(Transform::zero_out_z().transform_covector(&Vec3::Z).is_none());
    }

    #[test]
    fn test_coordinate_system_maps_local_axes() {
        let frame = Transform::coordinate_system(Vec3::Y, Vec3::Z, Vec3::X, Point3d::new(0.0, 0.0, 4.0));
        let p = frame.transform_point(&Point3d::new(1.0, 0.0, 0.0));
        assert_abs_diff_eq!(p, Point3d::new(0.0, 1.0, 4.0), epsilon = 1e-12);
    }

    #[test]
    fn test_strip_translation() {
        let t = Transform::translation(3.0, 4.0, 5.0).strip_translation();
        assert!(t.approx_eq(&Transform::identity(), 1e-12));
    }

    #[test]
    fn test_bounding_box() {
        let bb = BoundingBox::from_points(&[
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 2.0, 3.0),
            Point3d::new(-1.0, 0.5, 1.0),
        ]);
        assert!((bb.min.x - (-1.0)).abs() < 1e-12);
        assert!((bb.max.y - 2.0).abs() < 1e-12);
        assert_abs_diff_eq!(bb.center(), Point3d::new(0.0, 1.0, 1.5), epsilon = 1e-12);
    }
}

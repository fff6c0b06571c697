use serde::{Deserialize, Serialize};

use super::curves::Line3d;
use super::point::Point3d;
use super::transform::Transform;
use super::vector::{Axis, Vec3};

/// An oriented plane in Hessian normal form: all points `p` with
/// `dot(normal, p) == distance`. The normal is a unit vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f64,
}

impl Plane {
    pub fn new(normal: Vec3, distance: f64) -> Self {
        Self { normal, distance }
    }

    pub fn from_point_normal(anchor: Point3d, normal: Vec3) -> Self {
        Self {
            normal,
            distance: normal.dot(&anchor.to_vec3()),
        }
    }

    /// Derive the plane through three points. The normal is
    /// `normalize(cross(p2 - p0, p1 - p0))`, so the points wind clockwise when
    /// viewed from the front side.
    ///
    /// Returns `None` if the points are collinear or coincident, judged by the sine
    /// of the angle between the two edge vectors against `colinear_epsilon`.
    pub fn from_points(p0: &Point3d, p1: &Point3d, p2: &Point3d, colinear_epsilon: f64) -> Option<Self> {
        let v1 = *p2 - *p0;
        let v2 = *p1 - *p0;
        let normal = v1.cross(&v2);
        let sin_theta = (normal.length() / (v1.length() * v2.length())).abs();
        if !sin_theta.is_finite() || sin_theta < colinear_epsilon {
            return None;
        }
        let normal = normal.normalized()?;
        Some(Self::from_point_normal(*p0, normal))
    }

    /// The point on the plane closest to the origin.
    pub fn anchor(&self) -> Point3d {
        Point3d::from_vec3(self.normal * self.distance)
    }

    /// Signed distance of `p` from the plane, positive on the front side.
    pub fn point_distance(&self, p: &Point3d) -> f64 {
        self.normal.dot(&p.to_vec3()) - self.distance
    }

    /// Orthogonal projection of `p` onto the plane.
    pub fn project_point(&self, p: &Point3d) -> Point3d {
        *p - self.normal * self.point_distance(p)
    }

    /// Projection of `p` onto the plane along `direction`. Falls back to the
    /// orthogonal projection if `direction` is parallel to the plane.
    pub fn project_point_along(&self, p: &Point3d, direction: &Vec3) -> Point3d {
        let cos = direction.dot(&self.normal);
        if cos.abs() < 1e-12 {
            return self.project_point(p);
        }
        *p - *direction * (self.point_distance(p) / cos)
    }

    /// The same plane facing the other way.
    pub fn flip(&self) -> Self {
        Self {
            normal: -self.normal,
            distance: -self.distance,
        }
    }

    /// Apply an affine transform. Normals are carried by the inverse transpose so
    /// that non-uniform scaling keeps them perpendicular to the plane.
    pub fn transform(&self, transform: &Transform) -> Self {
        let normal = transform
            .transform_covector(&self.normal)
            .unwrap_or_else(|| transform.transform_vector(&self.normal));
        let normal = normal.normalized().unwrap_or(self.normal);
        let anchor = transform.transform_point(&self.anchor());
        Self::from_point_normal(anchor, normal)
    }

    /// The line along which this plane meets `other`, or `None` if they are parallel.
    /// The line's origin is the point of the seam closest to the world origin.
    pub fn intersect(&self, other: &Plane) -> Option<Line3d> {
        let direction = self.normal.cross(&other.normal);
        if direction.length() < 1e-12 {
            return None;
        }
        let c = self.normal.dot(&other.normal);
        let det = 1.0 - c * c;
        let a = (self.distance - other.distance * c) / det;
        let b = (other.distance - self.distance * c) / det;
        let origin = Point3d::from_vec3(self.normal * a + other.normal * b);
        Some(Line3d::new(origin, direction))
    }

    /// A world-to-plane matrix: after applying it, points on the plane have `z == 0`,
    /// `x`/`y` span the plane and `z` runs along `direction`.
    pub fn projection_matrix(&self, direction: &Vec3) -> Option<Transform> {
        let reference = match self.normal.abs_max_axis() {
            Axis::X => Vec3::Z,
            _ => Vec3::X,
        };
        let x_axis = self.normal.cross(&reference).normalized()?;
        let y_axis = self.normal.cross(&x_axis).normalized()?;
        Transform::coordinate_system(x_axis, y_axis, *direction, self.anchor()).inverse()
    }
}

use std::f64::consts::PI;

use nalgebra::{Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use super::paraxial::{rotated_axes, ParaxialUvCoordSystem};
use super::{invariant_offset, project_uv, UvCoordSystem, WrapStyle};
use crate::default_tolerance;
use crate::geometry::plane::Plane;
use crate::geometry::point::Point3d;
use crate::geometry::transform::Transform;
use crate::geometry::vector::{Vec2, Vec3};
use crate::model::attributes::BrushFaceAttributes;

/// UV projection with free U and V axes. The rotation attribute is informational
/// here: the axes already carry it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelUvCoordSystem {
    u_axis: Vec3,
    v_axis: Vec3,
}

impl ParallelUvCoordSystem {
    pub fn new(u_axis: Vec3, v_axis: Vec3) -> Self {
        Self { u_axis, v_axis }
    }

    /// Axes for a fresh face: the paraxial base axes made to lie in the face plane,
    /// turned by the rotation attribute.
    pub fn from_points(p0: &Point3d, p1: &Point3d, p2: &Point3d, attributes: &BrushFaceAttributes) -> Self {
        let normal = (*p2 - *p0).cross(&(*p1 - *p0)).normalize_or_zero();
        let (u_axis, v_axis) = initial_axes(&normal);
        let mut system = Self::new(u_axis, v_axis);
        system.set_rotation(0.0, attributes.rotation());
        system
    }

    /// A parallel system that maps exactly like the paraxial system of the face.
    pub fn from_paraxial(
        p0: &Point3d,
        p1: &Point3d,
        p2: &Point3d,
        attributes: &BrushFaceAttributes,
    ) -> (UvCoordSystem, BrushFaceAttributes) {
        let paraxial = ParaxialUvCoordSystem::from_points(p0, p1, p2, attributes);
        let system = Self::new(paraxial.u_axis(), paraxial.v_axis());
        (UvCoordSystem::Parallel(system), attributes.clone())
    }

    pub fn u_axis(&self) -> Vec3 {
        self.u_axis
    }

    pub fn v_axis(&self) -> Vec3 {
        self.v_axis
    }

    pub fn z_axis(&self) -> Vec3 {
        self.u_axis.cross(&self.v_axis).normalize_or_zero()
    }

    pub fn set_axes(&mut self, u_axis: Vec3, v_axis: Vec3) {
        self.u_axis = u_axis;
        self.v_axis = v_axis;
    }

    /// Nothing is derived from the face points, so there is nothing to refresh.
    pub fn reset_cache(&mut self, _p0: &Point3d, _p1: &Point3d, _p2: &Point3d, _attributes: &BrushFaceAttributes) {}

    pub fn reset(&mut self, normal: &Vec3) {
        let (u_axis, v_axis) = initial_axes(normal);
        self.set_axes(u_axis, v_axis);
    }

    /// Adopt the axes a paraxial system would use for `normal` at `angle` degrees.
    pub fn reset_to_paraxial(&mut self, normal: &Vec3, angle: f64) {
        let index = ParaxialUvCoordSystem::plane_normal_index(normal);
        let (u_axis, v_axis) = rotated_axes(index, angle);
        self.set_axes(u_axis, v_axis);
    }

    /// Turns both axes by `new_angle - old_angle` degrees about `cross(v, u)`.
    pub fn set_rotation(&mut self, old_angle: f64, new_angle: f64) {
        let delta = new_angle - old_angle;
        if delta == 0.0 {
            return;
        }
        let Some(axis) = self.v_axis.cross(&self.u_axis).normalized() else {
            return;
        };
        let rotation = UnitQuaternion::from_axis_angle(&Unit::new_normalize(Vector3::from(axis)), delta.to_radians());
        self.rotate_axes(&rotation);
    }

    pub fn set_normal(
        &mut self,
        old_normal: &Vec3,
        new_normal: &Vec3,
        attributes: &BrushFaceAttributes,
        wrap_style: WrapStyle,
    ) {
        match wrap_style {
            WrapStyle::Rotation => {
                let from = Vector3::from(*old_normal);
                let to = Vector3::from(*new_normal);
                let rotation = UnitQuaternion::rotation_between(&from, &to)
                    .unwrap_or_else(|| half_turn_about_perpendicular(old_normal));
                self.rotate_axes(&rotation);
            }
            WrapStyle::Projection => {
                // axes parallel to the new face would project it onto a line
                if new_normal.dot(&self.z_axis()).abs() < default_tolerance().almost_zero {
                    self.reset(new_normal);
                    self.set_rotation(0.0, attributes.rotation());
                }
            }
        }
    }

    /// `u' = u + f.y * v`, `v' = f.x * u + v`.
    pub fn shear(&mut self, _normal: &Vec3, factors: Vec2) {
        let u_axis = self.u_axis + self.v_axis * factors.y;
        let v_axis = self.u_axis * factors.x + self.v_axis;
        self.set_axes(u_axis, v_axis);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn transform(
        &mut self,
        old_plane: &Plane,
        new_plane: &Plane,
        transform: &Transform,
        attributes: &mut BrushFaceAttributes,
        texture_size: Vec2,
        lock_alignment: bool,
        invariant: &Point3d,
    ) {
        let scale = attributes.scale();
        if scale.x == 0.0 || scale.y == 0.0 {
            return;
        }

        let unlocked = |system: &mut Self, attributes: &BrushFaceAttributes| {
            system.set_normal(&old_plane.normal, &new_plane.normal, attributes, WrapStyle::Projection);
        };
        if !lock_alignment {
            unlocked(self, attributes);
            return;
        }

        // The axes act as gradients, so they follow the inverse transpose. Their
        // length is kept and the change folds into the scale.
        let (Some(u_image), Some(v_image)) = (
            transform.transform_covector(&self.u_axis),
            transform.transform_covector(&self.v_axis),
        ) else {
            unlocked(self, attributes);
            return;
        };

        let old_coords = project_uv(&self.u_axis, &self.v_axis, invariant, scale) + attributes.offset();

        let (u_axis, x_scale) = carry_axis(&self.u_axis, &u_image, scale.x);
        let (v_axis, y_scale) = carry_axis(&self.v_axis, &v_image, scale.y);
        let new_scale = Vec2::new(x_scale, y_scale);
        self.set_axes(u_axis, v_axis);
        attributes.set_scale(new_scale);

        let new_invariant = transform.transform_point(invariant);
        let new_coords = project_uv(&self.u_axis, &self.v_axis, &new_invariant, new_scale);
        attributes.set_offset(invariant_offset(old_coords, new_coords, attributes, texture_size));
    }

    fn rotate_axes(&mut self, rotation: &UnitQuaternion<f64>) {
        self.u_axis = Vec3::from(rotation * Vector3::from(self.u_axis));
        self.v_axis = Vec3::from(rotation * Vector3::from(self.v_axis));
    }
}

/// The paraxial base axes of `normal` made orthonormal within its plane.
fn initial_axes(normal: &Vec3) -> (Vec3, Vec3) {
    let index = ParaxialUvCoordSystem::plane_normal_index(normal);
    let (base_u, base_v, _) = ParaxialUvCoordSystem::base_axes(index);
    let u_axis = base_u.reject(normal).normalize_or_zero();
    let v_axis = base_v.reject(normal).reject(&u_axis).normalize_or_zero();
    (u_axis, v_axis)
}

fn half_turn_about_perpendicular(normal: &Vec3) -> UnitQuaternion<f64> {
    let axis = normal
        .cross(&Vec3::X)
        .normalized()
        .or_else(|| normal.cross(&Vec3::Y).normalized())
        .unwrap_or(Vec3::Z);
    UnitQuaternion::from_axis_angle(&Unit::new_normalize(Vector3::from(axis)), PI)
}

/// Rescales the transformed axis back to the original length and returns the
/// scale that keeps `axis / scale` equal to `image / old_scale`.
fn carry_axis(axis: &Vec3, image: &Vec3, scale: f64) -> (Vec3, f64) {
    let image_length = image.length();
    if image_length < 1e-12 {
        return (*axis, scale);
    }
    let ratio = axis.length() / image_length;
    (*image * ratio, scale * ratio)
}

//! UV coordinate systems map world-space points on a face to texture coordinates.
//!
//! Two variants exist. The paraxial system derives its axes from the face normal
//! snapped to the closest world axis plane and stores rotation and scale purely as
//! face attributes. The parallel system stores its own U and V axes, which may take
//! any direction.

pub mod parallel;
pub mod paraxial;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::default_tolerance;
use crate::geometry::plane::Plane;
use crate::geometry::point::Point3d;
use crate::geometry::scalar;
use crate::geometry::transform::Transform;
use crate::geometry::vector::{Vec2, Vec3};
use crate::model::attributes::BrushFaceAttributes;

pub use parallel::ParallelUvCoordSystem;
pub use paraxial::ParaxialUvCoordSystem;

/// How the axes of a parallel system follow a change of the face normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WrapStyle {
    /// Keep projecting with the current axes unless they become unusable.
    Projection,
    /// Rotate the axes along with the normal.
    Rotation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UvCoordSystem {
    Paraxial(ParaxialUvCoordSystem),
    Parallel(ParallelUvCoordSystem),
}

/// Saved axes of a parallel system, used to copy alignment between faces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UvCoordSystemSnapshot {
    u_axis: Vec3,
    v_axis: Vec3,
}

impl UvCoordSystemSnapshot {
    pub fn restore(&self, target: &mut UvCoordSystem) {
        match target {
            UvCoordSystem::Parallel(parallel) => parallel.set_axes(self.u_axis, self.v_axis),
            UvCoordSystem::Paraxial(_) => {
                warn!("ignoring parallel UV snapshot restored into a paraxial system");
            }
        }
    }
}

impl UvCoordSystem {
    pub fn paraxial_from_points(
        p0: &Point3d,
        p1: &Point3d,
        p2: &Point3d,
        attributes: &BrushFaceAttributes,
    ) -> Self {
        UvCoordSystem::Paraxial(ParaxialUvCoordSystem::from_points(p0, p1, p2, attributes))
    }

    pub fn parallel_from_points(
        p0: &Point3d,
        p1: &Point3d,
        p2: &Point3d,
        attributes: &BrushFaceAttributes,
    ) -> Self {
        UvCoordSystem::Parallel(ParallelUvCoordSystem::from_points(p0, p1, p2, attributes))
    }

    pub fn is_parallel(&self) -> bool {
        matches!(self, UvCoordSystem::Parallel(_))
    }

    pub fn u_axis(&self) -> Vec3 {
        match self {
            UvCoordSystem::Paraxial(s) => s.u_axis(),
            UvCoordSystem::Parallel(s) => s.u_axis(),
        }
    }

    pub fn v_axis(&self) -> Vec3 {
        match self {
            UvCoordSystem::Paraxial(s) => s.v_axis(),
            UvCoordSystem::Parallel(s) => s.v_axis(),
        }
    }

    /// The direction along which the texture is projected onto the face.
    pub fn z_axis(&self) -> Vec3 {
        match self {
            UvCoordSystem::Paraxial(s) => s.z_axis(),
            UvCoordSystem::Parallel(s) => s.z_axis(),
        }
    }

    pub fn take_snapshot(&self) -> Option<UvCoordSystemSnapshot> {
        match self {
            UvCoordSystem::Paraxial(_) => None,
            UvCoordSystem::Parallel(s) => Some(UvCoordSystemSnapshot {
                u_axis: s.u_axis(),
                v_axis: s.v_axis(),
            }),
        }
    }

    /// Texture coordinates of `point` before the offset is applied.
    pub fn compute_uv_coords(&self, point: &Point3d, scale: Vec2) -> Vec2 {
        project_uv(&self.u_axis(), &self.v_axis(), point, scale)
    }

    /// Texture coordinates of `point`, normalized by the texture size.
    pub fn uv_coords(&self, point: &Point3d, attributes: &BrushFaceAttributes, texture_size: Vec2) -> Vec2 {
        (self.compute_uv_coords(point, attributes.scale()) + attributes.offset()).div_components(&texture_size)
    }

    /// World to texture space. The z row is the projection axis.
    pub fn to_matrix(&self, offset: Vec2, scale: Vec2) -> Transform {
        let tol = default_tolerance();
        let x = self.u_axis() / scalar::safe_scale(scale.x, tol.almost_zero);
        let y = self.v_axis() / scalar::safe_scale(scale.y, tol.almost_zero);
        let z = self.z_axis();
        Transform::from_rows([
            [x.x, x.y, x.z, offset.x],
            [y.x, y.y, y.z, offset.y],
            [z.x, z.y, z.z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Texture to world space; the inverse of [`Self::to_matrix`].
    pub fn from_matrix(&self, offset: Vec2, scale: Vec2) -> Transform {
        self.to_matrix(offset, scale).inverse().unwrap_or_else(|| {
            warn!("UV axes are degenerate, texture matrix has no inverse");
            Transform::identity()
        })
    }

    /// Recomputes cached axes from the face points.
    pub fn reset_cache(&mut self, p0: &Point3d, p1: &Point3d, p2: &Point3d, attributes: &BrushFaceAttributes) {
        match self {
            UvCoordSystem::Paraxial(s) => s.reset_cache(p0, p1, p2, attributes),
            UvCoordSystem::Parallel(s) => s.reset_cache(p0, p1, p2, attributes),
        }
    }

    pub fn reset(&mut self, normal: &Vec3) {
        if let UvCoordSystem::Parallel(s) = self {
            s.reset(normal);
        }
    }

    pub fn reset_to_paraxial(&mut self, normal: &Vec3, angle: f64) {
        if let UvCoordSystem::Parallel(s) = self {
            s.reset_to_paraxial(normal, angle);
        }
    }

    pub fn set_normal(
        &mut self,
        old_normal: &Vec3,
        new_normal: &Vec3,
        attributes: &BrushFaceAttributes,
        wrap_style: WrapStyle,
    ) {
        match self {
            UvCoordSystem::Paraxial(s) => s.set_normal(new_normal, attributes),
            UvCoordSystem::Parallel(s) => s.set_normal(old_normal, new_normal, attributes, wrap_style),
        }
    }

    /// Re-derives the axes after the rotation attribute changed from `old_angle` to
    /// `new_angle` degrees.
    pub fn set_rotation(&mut self, normal: &Vec3, old_angle: f64, new_angle: f64) {
        match self {
            UvCoordSystem::Paraxial(s) => s.set_rotation(normal, new_angle),
            UvCoordSystem::Parallel(s) => s.set_rotation(old_angle, new_angle),
        }
    }

    /// Turns the texture counter-clockwise about `normal` by `angle` degrees by
    /// updating the rotation attribute. The axes follow once the caller applies
    /// [`Self::set_rotation`].
    pub fn rotate(&self, normal: &Vec3, angle: f64, attributes: &mut BrushFaceAttributes) {
        let rotation_axis = self.v_axis().cross(&self.u_axis());
        let angle = if rotation_axis.dot(normal) < 0.0 { -angle } else { angle };
        attributes.set_rotation(attributes.rotation() + angle);
    }

    pub fn shear(&mut self, normal: &Vec3, factors: Vec2) {
        if let UvCoordSystem::Parallel(s) = self {
            s.shear(normal, factors);
        }
    }

    /// Moves the texture by `offset` in camera-relative terms: `offset.x` along the
    /// camera's `right` direction and `offset.y` along its `up` direction.
    pub fn translate(&self, normal: &Vec3, up: &Vec3, right: &Vec3, offset: Vec2, attributes: &mut BrushFaceAttributes) {
        let tex_x = self.u_axis().reject(normal).normalize_or_zero();
        let tex_y = self.v_axis().reject(normal).normalize_or_zero();

        // Use the texture axis closer to the XY plane for horizontal movement, then the
        // one closer to the camera's right axis, then the one further from its up axis.
        let x_is_horizontal = if tex_x.z.abs() < tex_y.z.abs() {
            true
        } else if tex_y.z.abs() < tex_x.z.abs() {
            false
        } else if right.dot(&tex_x).abs() > right.dot(&tex_y).abs() {
            true
        } else if right.dot(&tex_y).abs() > right.dot(&tex_x).abs() {
            false
        } else if up.dot(&tex_y).abs() > up.dot(&tex_x).abs() {
            true
        } else if up.dot(&tex_x).abs() > up.dot(&tex_y).abs() {
            false
        } else {
            return;
        };

        let (h_axis, v_axis) = if x_is_horizontal { (tex_x, tex_y) } else { (tex_y, tex_x) };
        let h = if right.dot(&h_axis) >= 0.0 { -offset.x } else { offset.x };
        let v = if up.dot(&v_axis) >= 0.0 { -offset.y } else { offset.y };
        let delta = if x_is_horizontal { Vec2::new(h, v) } else { Vec2::new(v, h) };
        attributes.set_offset(attributes.offset() + delta);
    }

    /// Adapts the system to `transform` moving the face from `old_plane` to
    /// `new_plane`. With `lock_alignment` the texture sticks to the moved face,
    /// pivoting around `invariant` (a point of the face before the transform).
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
        match self {
            UvCoordSystem::Paraxial(s) => s.transform(
                old_plane,
                new_plane,
                transform,
                attributes,
                texture_size,
                lock_alignment,
                invariant,
            ),
            UvCoordSystem::Parallel(s) => s.transform(
                old_plane,
                new_plane,
                transform,
                attributes,
                texture_size,
                lock_alignment,
                invariant,
            ),
        }
    }

    /// Angle in degrees, counter-clockwise from the texture's X axis, of the
    /// direction from `center` to `point` in UV space.
    pub fn measure_angle(&self, current_angle: f64, center: Vec2, point: Vec2) -> f64 {
        let d = point - center;
        let d = match self {
            UvCoordSystem::Paraxial(_) => {
                let (sin, cos) = (-current_angle.to_radians()).sin_cos();
                Vec2::new(cos * d.x - sin * d.y, sin * d.x + cos * d.y)
            }
            UvCoordSystem::Parallel(_) => d,
        };
        scalar::normalize_degrees(d.y.atan2(d.x).to_degrees())
    }

    /// An equivalent paraxial system together with the attributes it needs.
    pub fn to_paraxial(
        &self,
        p0: &Point3d,
        p1: &Point3d,
        p2: &Point3d,
        attributes: &BrushFaceAttributes,
    ) -> (UvCoordSystem, BrushFaceAttributes) {
        match self {
            UvCoordSystem::Paraxial(_) => (self.clone(), attributes.clone()),
            UvCoordSystem::Parallel(s) => {
                ParaxialUvCoordSystem::from_parallel(p0, p1, p2, attributes, &s.u_axis(), &s.v_axis())
            }
        }
    }

    /// An equivalent parallel system together with the attributes it needs.
    pub fn to_parallel(
        &self,
        p0: &Point3d,
        p1: &Point3d,
        p2: &Point3d,
        attributes: &BrushFaceAttributes,
    ) -> (UvCoordSystem, BrushFaceAttributes) {
        match self {
            UvCoordSystem::Paraxial(_) => ParallelUvCoordSystem::from_paraxial(p0, p1, p2, attributes),
            UvCoordSystem::Parallel(_) => (self.clone(), attributes.clone()),
        }
    }
}

pub(crate) fn project_uv(u_axis: &Vec3, v_axis: &Vec3, point: &Point3d, scale: Vec2) -> Vec2 {
    let tol = default_tolerance();
    let p = point.to_vec3();
    Vec2::new(
        p.dot(&(*u_axis / scalar::safe_scale(scale.x, tol.almost_zero))),
        p.dot(&(*v_axis / scalar::safe_scale(scale.y, tol.almost_zero))),
    )
}

/// Offset that keeps `invariant`'s texture coordinates after a locked transform,
/// wrapped into the texture and rounded to four decimals.
pub(crate) fn invariant_offset(
    old_invariant_coords: Vec2,
    new_invariant_coords: Vec2,
    attributes: &BrushFaceAttributes,
    texture_size: Vec2,
) -> Vec2 {
    attributes
        .mod_offset(old_invariant_coords - new_invariant_coords, texture_size)
        .round_to(4)
}

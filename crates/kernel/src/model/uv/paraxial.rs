use approx::AbsDiffEq;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{invariant_offset, project_uv, UvCoordSystem};
use crate::default_tolerance;
use crate::geometry::plane::Plane;
use crate::geometry::point::Point3d;
use crate::geometry::scalar;
use crate::geometry::transform::Transform;
use crate::geometry::vector::{Vec2, Vec3};
use crate::model::attributes::BrushFaceAttributes;

/// (projection normal, base U axis, base V axis) for each of the six world axis
/// planes. Floor and ceiling come first so they win ties.
const BASE_AXES: [[Vec3; 3]; 6] = [
    [Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, -1.0, 0.0)],
    [Vec3::new(0.0, 0.0, -1.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, -1.0, 0.0)],
    [Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, -1.0)],
    [Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, -1.0)],
    [Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0)],
    [Vec3::new(0.0, -1.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0)],
];

/// Axis-aligned UV projection. The axes are fully determined by the face normal
/// and the rotation attribute; they are cached here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParaxialUvCoordSystem {
    index: usize,
    u_axis: Vec3,
    v_axis: Vec3,
}

impl ParaxialUvCoordSystem {
    pub fn new(normal: &Vec3, attributes: &BrushFaceAttributes) -> Self {
        let mut system = Self {
            index: 0,
            u_axis: BASE_AXES[0][1],
            v_axis: BASE_AXES[0][2],
        };
        system.set_rotation(normal, attributes.rotation());
        system
    }

    pub fn from_points(p0: &Point3d, p1: &Point3d, p2: &Point3d, attributes: &BrushFaceAttributes) -> Self {
        let mut system = Self::new(&Vec3::Z, attributes);
        system.reset_cache(p0, p1, p2, attributes);
        system
    }

    /// Index of the axis plane whose normal is closest to `normal`.
    pub fn plane_normal_index(normal: &Vec3) -> usize {
        let mut best_index = 0;
        let mut best_dot = 0.0;
        for (index, axes) in BASE_AXES.iter().enumerate() {
            let dot = normal.dot(&axes[0]);
            if dot > best_dot {
                best_dot = dot;
                best_index = index;
            }
        }
        best_index
    }

    /// (U, V, projection normal) of the given axis plane.
    pub fn base_axes(index: usize) -> (Vec3, Vec3, Vec3) {
        let [normal, u, v] = BASE_AXES[index];
        (u, v, normal)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn u_axis(&self) -> Vec3 {
        self.u_axis
    }

    pub fn v_axis(&self) -> Vec3 {
        self.v_axis
    }

    pub fn z_axis(&self) -> Vec3 {
        BASE_AXES[self.index][0]
    }

    pub fn reset_cache(&mut self, p0: &Point3d, p1: &Point3d, p2: &Point3d, attributes: &BrushFaceAttributes) {
        let normal = (*p2 - *p0).cross(&(*p1 - *p0)).normalize_or_zero();
        self.set_rotation(&normal, attributes.rotation());
    }

    /// Picks the axis plane for `normal` and rotates its base axes by `angle` degrees.
    pub fn set_rotation(&mut self, normal: &Vec3, angle: f64) {
        self.index = Self::plane_normal_index(normal);
        let (u_axis, v_axis) = rotated_axes(self.index, angle);
        self.u_axis = u_axis;
        self.v_axis = v_axis;
    }

    pub fn set_normal(&mut self, new_normal: &Vec3, attributes: &BrushFaceAttributes) {
        if Self::plane_normal_index(new_normal) != self.index {
            self.set_rotation(new_normal, attributes.rotation());
        }
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
        let tol = default_tolerance();
        let mut new_normal = new_plane.normal;
        if (new_normal - old_plane.normal).is_zero(tol.normal_snap) {
            new_normal = old_plane.normal;
        }

        let scale = attributes.scale();
        if !lock_alignment || tol.is_zero(scale.x) || tol.is_zero(scale.y) {
            self.set_rotation(&new_normal, attributes.rotation());
            return;
        }

        let old_coords = project_uv(&self.u_axis, &self.v_axis, invariant, scale) + attributes.offset();

        // Project the scaled axes onto the old face plane along the projection axis,
        // then carry them through the transform.
        let (u_axis, v_axis) = exact_axes(self.index, attributes.rotation());
        let z_axis = self.z_axis();
        let origin = old_plane.project_point_along(&Point3d::ORIGIN, &z_axis);
        let x_axis = old_plane.project_point_along(&Point3d::from_vec3(u_axis * scale.x), &z_axis) - origin;
        let y_axis = old_plane.project_point_along(&Point3d::from_vec3(v_axis * scale.y), &z_axis) - origin;
        let linear = transform.strip_translation();
        let x_axis = linear.transform_vector(&x_axis);
        let y_axis = linear.transform_vector(&y_axis);

        // Read rotation and scale back off the transformed axes, expressed in the
        // base axes of the new axis plane.
        let index = Self::plane_normal_index(&new_normal);
        let (base_u, base_v, _) = Self::base_axes(index);
        let dx = Vec2::new(x_axis.dot(&base_u), x_axis.dot(&base_v));
        let dy = Vec2::new(y_axis.dot(&base_u), y_axis.dot(&base_v));
        let mirrored = scale.x < 0.0;
        let radians = if mirrored { dx.y.atan2(-dx.x) } else { (-dx.y).atan2(dx.x) };
        let rotation = scalar::correct(scalar::normalize_degrees(radians.to_degrees()), 4, tol.correct);
        let (sin, cos) = rotation.to_radians().sin_cos();
        let x_scale = if mirrored { -dx.length() } else { dx.length() };
        let y_scale = dy.dot(&Vec2::new(sin, cos));
        let new_scale = Vec2::new(x_scale, y_scale).correct(4, tol.correct);

        self.set_rotation(&new_normal, rotation);
        attributes.set_rotation(rotation);
        attributes.set_scale(new_scale);

        let new_invariant = transform.transform_point(invariant);
        let new_coords = project_uv(&self.u_axis, &self.v_axis, &new_invariant, new_scale);
        attributes.set_offset(invariant_offset(old_coords, new_coords, attributes, texture_size));
    }

    /// Derive the paraxial attributes that reproduce a parallel mapping on the face
    /// plane through the three points. Parallel mappings with shear cannot be
    /// represented and are approximated by their U axis.
    pub fn from_parallel(
        p0: &Point3d,
        p1: &Point3d,
        p2: &Point3d,
        attributes: &BrushFaceAttributes,
        u_axis: &Vec3,
        v_axis: &Vec3,
    ) -> (UvCoordSystem, BrushFaceAttributes) {
        let tol = default_tolerance();
        let Some(plane) = Plane::from_points(p0, p1, p2, tol.colinear) else {
            debug!("degenerate face points, keeping parallel attributes");
            return (
                UvCoordSystem::Paraxial(Self::new(&Vec3::Z, attributes)),
                attributes.clone(),
            );
        };

        let index = Self::plane_normal_index(&plane.normal);
        let (current_u, current_v) = rotated_axes(index, attributes.rotation());
        if u_axis.abs_diff_eq(&current_u, 1e-9) && v_axis.abs_diff_eq(&current_v, 1e-9) {
            let system = Self {
                index,
                u_axis: current_u,
                v_axis: current_v,
            };
            return (UvCoordSystem::Paraxial(system), attributes.clone());
        }

        // Sample the parallel mapping at the plane points with paraxial coordinates
        // (0, 0), (1, 0) and (0, 1). Both mappings are affine in those coordinates.
        let (base_u, base_v, normal_axis) = Self::base_axes(index);
        let on_plane = |s: f64, t: f64| {
            let p = base_u * s + base_v * t;
            let w = (plane.distance - plane.normal.dot(&p)) / plane.normal.dot(&normal_axis);
            Point3d::from_vec3(p + normal_axis * w)
        };
        let parallel_uv = |p: Point3d| project_uv(u_axis, v_axis, &p, attributes.scale()) + attributes.offset();
        let origin = parallel_uv(on_plane(0.0, 0.0));
        let ds = parallel_uv(on_plane(1.0, 0.0)) - origin;
        let dt = parallel_uv(on_plane(0.0, 1.0)) - origin;

        // u = (cos s - sin t) / sx + ox, v = (sin s + cos t) / sy + oy
        let rotation = scalar::normalize_degrees((-dt.x).atan2(ds.x).to_degrees());
        let (sin, cos) = rotation.to_radians().sin_cos();
        let u_gradient = Vec2::new(ds.x, dt.x).length();
        let v_gradient = ds.y * sin + dt.y * cos;
        let x_scale = if tol.is_zero(u_gradient) { 1.0 } else { 1.0 / u_gradient };
        let y_scale = if v_gradient.abs() < 1e-12 { 1.0 } else { 1.0 / v_gradient };

        let mut new_attributes = attributes.clone();
        new_attributes.set_rotation(rotation);
        new_attributes.set_scale(Vec2::new(x_scale, y_scale));
        new_attributes.set_offset(origin);

        let system = Self::new(&plane.normal, &new_attributes);
        (UvCoordSystem::Paraxial(system), new_attributes)
    }
}

/// Base axes of `index` rotated by `angle` degrees about `cross(v, u)`.
fn exact_axes(index: usize, angle: f64) -> (Vec3, Vec3) {
    let (u, v, _) = ParaxialUvCoordSystem::base_axes(index);
    let (sin, cos) = angle.to_radians().sin_cos();
    (u * cos - v * sin, u * sin + v * cos)
}

/// Like [`exact_axes`], snapped to integers where they come close.
pub(super) fn rotated_axes(index: usize, angle: f64) -> (Vec3, Vec3) {
    let eps = default_tolerance().correct;
    let (u, v) = exact_axes(index, angle);
    (u.correct(eps), v.correct(eps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_plane_normal_index() {
        assert_eq!(ParaxialUvCoordSystem::plane_normal_index(&Vec3::Z), 0);
        assert_eq!(ParaxialUvCoordSystem::plane_normal_index(&-Vec3::Z), 1);
        assert_eq!(ParaxialUvCoordSystem::plane_normal_index(&Vec3::X), 2);
        assert_eq!(ParaxialUvCoordSystem::plane_normal_index(&-Vec3::X), 3);
        assert_eq!(ParaxialUvCoordSystem::plane_normal_index(&Vec3::Y), 4);
        assert_eq!(ParaxialUvCoordSystem::plane_normal_index(&-Vec3::Y), 5);
        // a 45 degree slope between floor and wall counts as floor
        let slope = Vec3::new(1.0, 0.0, 1.0).normalized().unwrap();
        assert_eq!(ParaxialUvCoordSystem::plane_normal_index(&slope), 0);
    }

    #[test]
    fn test_rotation_rotates_about_cross_of_v_and_u() {
        let mut attrs = BrushFaceAttributes::default();
        attrs.set_rotation(90.0);
        let system = ParaxialUvCoordSystem::new(&Vec3::Z, &attrs);
        // rotation axis is +Z for the floor, so +X turns into +Y
        assert_abs_diff_eq!(system.u_axis(), Vec3::Y, epsilon = 1e-12);
        assert_abs_diff_eq!(system.v_axis(), Vec3::X, epsilon = 1e-12);
    }

    #[test]
    fn test_axes_are_corrected() {
        let mut attrs = BrushFaceAttributes::default();
        attrs.set_rotation(180.0);
        let system = ParaxialUvCoordSystem::new(&Vec3::X, &attrs);
        assert_eq!(system.u_axis(), -Vec3::Y);
        assert_eq!(system.v_axis(), Vec3::Z);
    }

    #[test]
    fn test_set_normal_only_changes_axes_across_planes() {
        let attrs = BrushFaceAttributes::default();
        let mut system = ParaxialUvCoordSystem::new(&Vec3::Z, &attrs);
        system.set_normal(&Vec3::new(0.1, 0.0, 0.9).normalized().unwrap(), &attrs);
        assert_eq!(system.index(), 0);
        system.set_normal(&Vec3::X, &attrs);
        assert_eq!(system.index(), 2);
        assert_eq!(system.u_axis(), Vec3::Y);
    }

    #[test]
    fn test_locked_translation_keeps_uvs() {
        let attrs_before = {
            let mut a = BrushFaceAttributes::default();
            a.set_rotation(30.0);
            a.set_scale(Vec2::new(0.5, 2.0));
            a
        };
        let plane = Plane::new(Vec3::Z, 0.0);
        let mut system = ParaxialUvCoordSystem::new(&Vec3::Z, &attrs_before);
        let before = system.clone();
        let mut attrs = attrs_before.clone();
        let shift = Transform::translation(5.0, 3.0, 0.0);
        system.transform(&plane, &plane, &shift, &mut attrs, Vec2::new(64.0, 64.0), true, &Point3d::ORIGIN);

        assert!((attrs.rotation() - 30.0).abs() < 1e-9);
        for p in [Point3d::new(0.0, 0.0, 0.0), Point3d::new(10.0, -7.0, 0.0)] {
            let old = project_uv(&before.u_axis(), &before.v_axis(), &p, attrs_before.scale()) + attrs_before.offset();
            let moved = shift.transform_point(&p);
            let new = project_uv(&system.u_axis(), &system.v_axis(), &moved, attrs.scale()) + attrs.offset();
            let diff = old - new;
            // equal up to whole texture repeats
            assert!((diff.x / 64.0 - (diff.x / 64.0).round()).abs() < 1e-6);
            assert!((diff.y / 64.0 - (diff.y / 64.0).round()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_locked_rotation_about_normal() {
        let mut attrs = BrushFaceAttributes::default();
        let plane = Plane::new(Vec3::Z, 0.0);
        let mut system = ParaxialUvCoordSystem::new(&Vec3::Z, &attrs);
        let quarter = Transform::rotation_axis_angle(Vec3::Z, std::f64::consts::FRAC_PI_2);
        system.transform(&plane, &plane, &quarter, &mut attrs, Vec2::ONE, true, &Point3d::ORIGIN);
        assert!((attrs.rotation() - 90.0).abs() < 1e-9);
        assert!((attrs.x_scale() - 1.0).abs() < 1e-9);
        assert!((attrs.y_scale() - 1.0).abs() < 1e-9);
        assert_abs_diff_eq!(system.u_axis(), Vec3::Y, epsilon = 1e-12);
    }

    #[test]
    fn test_unlocked_transform_keeps_attributes() {
        let mut attrs = BrushFaceAttributes::default();
        attrs.set_rotation(15.0);
        let old_plane = Plane::new(Vec3::Z, 0.0);
        let new_plane = Plane::new(Vec3::X, 0.0);
        let mut system = ParaxialUvCoordSystem::new(&Vec3::Z, &attrs);
        let turn = Transform::rotation_axis_angle(Vec3::Y, std::f64::consts::FRAC_PI_2);
        system.transform(&old_plane, &new_plane, &turn, &mut attrs, Vec2::ONE, false, &Point3d::ORIGIN);
        assert_eq!(attrs.rotation(), 15.0);
        assert_eq!(system.index(), 2);
    }

    #[test]
    fn test_from_parallel_reproduces_rotated_mapping() {
        let p0 = Point3d::new(0.0, 0.0, 0.0);
        let p1 = Point3d::new(0.0, 1.0, 0.5);
        let p2 = Point3d::new(1.0, 0.0, 0.0);
        let (u_axis, v_axis) = exact_axes(0, 30.0);
        let mut attrs = BrushFaceAttributes::default();
        attrs.set_scale(Vec2::new(0.5, -2.0));
        attrs.set_offset(Vec2::new(3.0, 7.0));

        let (system, converted) = ParaxialUvCoordSystem::from_parallel(&p0, &p1, &p2, &attrs, &u_axis, &v_axis);
        assert!(!system.is_parallel());
        let plane = Plane::from_points(&p0, &p1, &p2, 1e-5).unwrap();
        for q in [Point3d::new(4.0, 9.0, 0.0), Point3d::new(-13.0, 2.0, 5.0)] {
            let on_plane = plane.project_point(&q);
            let expected = project_uv(&u_axis, &v_axis, &on_plane, attrs.scale()) + attrs.offset();
            let actual = system.uv_coords(&on_plane, &converted, Vec2::ONE);
            assert_abs_diff_eq!(actual, expected, epsilon = 1e-6);
        }
    }
}

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use super::attributes::{BrushFaceAttributes, Color};
use super::map_format::MapFormat;
use super::material::{EmbeddedDefaults, Material, Texture};
use super::tags::{SmartTag, TagMask, TagMatcher};
use super::uv::{ParallelUvCoordSystem, ParaxialUvCoordSystem, UvCoordSystem, UvCoordSystemSnapshot, WrapStyle};
use crate::default_tolerance;
use crate::error::{KernelError, Result};
use crate::geometry::curves::Ray;
use crate::geometry::intersection;
use crate::geometry::plane::Plane;
use crate::geometry::point::Point3d;
use crate::geometry::transform::{BoundingBox, Transform};
use crate::geometry::vector::{Axis, Vec2, Vec3};
use crate::topology::brep::{BrushGeometry, FaceId};

/// Camera-relative direction of a [`BrushFace::flip_uv`] request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipDirection {
    Left,
    Right,
    Up,
    Down,
}

/// One bounding plane of a brush, defined by three points, together with its
/// texture alignment.
///
/// The plane normal is `normalize(cross(p2 - p0, p1 - p0))` and points out of the
/// brush. `geometry` is a handle into the owning brush's boundary representation;
/// it is `None` until the brush attaches the face, and queries that walk the
/// boundary panic without it.
#[derive(Debug, Clone)]
pub struct BrushFace {
    points: [Point3d; 3],
    boundary: Plane,
    attributes: BrushFaceAttributes,
    material: Option<Arc<Material>>,
    uv_coord_system: UvCoordSystem,
    geometry: Option<FaceId>,
    line_number: usize,
    line_count: usize,
    selected: bool,
    tags: TagMask,
}

// ─── Construction ───────────────────────────────────────────────────────────

impl BrushFace {
    /// Creates a face whose UV system variant is chosen by `map_format`.
    #[instrument(skip(attributes))]
    pub fn create(
        p0: Point3d,
        p1: Point3d,
        p2: Point3d,
        attributes: &BrushFaceAttributes,
        map_format: MapFormat,
    ) -> Result<Self> {
        let uv_coord_system = if map_format.is_parallel_uv_coord_system() {
            UvCoordSystem::parallel_from_points(&p0, &p1, &p2, attributes)
        } else {
            UvCoordSystem::paraxial_from_points(&p0, &p1, &p2, attributes)
        };
        Self::create_with_uv_coord_system(p0, p1, p2, attributes.clone(), uv_coord_system)
    }

    /// Creates a face from attributes written in the paraxial convention, converting
    /// them if `map_format` uses parallel UV systems.
    #[instrument(skip(attributes))]
    pub fn create_from_standard(
        p0: Point3d,
        p1: Point3d,
        p2: Point3d,
        attributes: &BrushFaceAttributes,
        map_format: MapFormat,
    ) -> Result<Self> {
        let (uv_coord_system, attributes) = if map_format.is_parallel_uv_coord_system() {
            ParallelUvCoordSystem::from_paraxial(&p0, &p1, &p2, attributes)
        } else {
            (
                UvCoordSystem::paraxial_from_points(&p0, &p1, &p2, attributes),
                attributes.clone(),
            )
        };
        Self::create_with_uv_coord_system(p0, p1, p2, attributes, uv_coord_system)
    }

    /// Creates a face from attributes and explicit axes written in the parallel
    /// convention, converting them if `map_format` uses paraxial UV systems.
    #[instrument(skip(attributes))]
    pub fn create_from_valve(
        p0: Point3d,
        p1: Point3d,
        p2: Point3d,
        attributes: &BrushFaceAttributes,
        u_axis: Vec3,
        v_axis: Vec3,
        map_format: MapFormat,
    ) -> Result<Self> {
        let (uv_coord_system, attributes) = if map_format.is_parallel_uv_coord_system() {
            (
                UvCoordSystem::Parallel(ParallelUvCoordSystem::new(u_axis, v_axis)),
                attributes.clone(),
            )
        } else {
            ParaxialUvCoordSystem::from_parallel(&p0, &p1, &p2, attributes, &u_axis, &v_axis)
        };
        Self::create_with_uv_coord_system(p0, p1, p2, attributes, uv_coord_system)
    }

    pub fn create_with_uv_coord_system(
        p0: Point3d,
        p1: Point3d,
        p2: Point3d,
        attributes: BrushFaceAttributes,
        uv_coord_system: UvCoordSystem,
    ) -> Result<Self> {
        let (points, boundary) = checked_plane(p0, p1, p2)?;
        Ok(Self {
            points,
            boundary,
            attributes,
            material: None,
            uv_coord_system,
            geometry: None,
            line_number: 0,
            line_count: 0,
            selected: false,
            tags: TagMask::EMPTY,
        })
    }

    /// Orders faces by normal, then by plane distance. Brushes are built from faces
    /// in this order so the result does not depend on the input order.
    pub fn sort_faces(faces: &mut [BrushFace]) {
        faces.sort_by(|lhs, rhs| {
            lhs.boundary
                .normal
                .lexicographic_cmp(&rhs.boundary.normal)
                .then_with(|| lhs.boundary.distance.total_cmp(&rhs.boundary.distance))
        });
    }
}

/// Snaps the points and derives their plane.
fn checked_plane(p0: Point3d, p1: Point3d, p2: Point3d) -> Result<([Point3d; 3], Plane)> {
    let tol = default_tolerance();
    let points = [p0.correct(tol.correct), p1.correct(tol.correct), p2.correct(tol.correct)];
    match Plane::from_points(&points[0], &points[1], &points[2], tol.colinear) {
        Some(plane) => Ok((points, plane)),
        None => {
            debug!(?points, "face points do not span a plane");
            Err(KernelError::InvalidFace { points })
        }
    }
}

// ─── Accessors ──────────────────────────────────────────────────────────────

impl BrushFace {
    pub fn points(&self) -> &[Point3d; 3] {
        &self.points
    }

    pub fn boundary(&self) -> &Plane {
        &self.boundary
    }

    pub fn normal(&self) -> Vec3 {
        self.boundary.normal
    }

    pub fn attributes(&self) -> &BrushFaceAttributes {
        &self.attributes
    }

    pub fn uv_coord_system(&self) -> &UvCoordSystem {
        &self.uv_coord_system
    }

    pub fn material(&self) -> Option<&Material> {
        self.material.as_deref()
    }

    pub fn geometry(&self) -> Option<FaceId> {
        self.geometry
    }

    /// Attaches the face to (or, with `None`, detaches it from) a face of the owning
    /// brush's boundary representation.
    pub fn set_geometry(&mut self, geometry: Option<FaceId>) {
        self.geometry = geometry;
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub fn set_file_position(&mut self, line_number: usize, line_count: usize) {
        self.line_number = line_number;
        self.line_count = line_count;
    }

    pub fn selected(&self) -> bool {
        self.selected
    }

    pub fn select(&mut self) {
        debug_assert!(!self.selected, "face is already selected");
        self.selected = true;
    }

    pub fn deselect(&mut self) {
        debug_assert!(self.selected, "face is not selected");
        self.selected = false;
    }

    fn geometry_face(&self) -> FaceId {
        match self.geometry {
            Some(face) => face,
            None => panic!("geometry is null"),
        }
    }
}

// ─── Boundary Queries ───────────────────────────────────────────────────────

impl BrushFace {
    pub fn vertex_count(&self, geometry: &BrushGeometry) -> usize {
        geometry.boundary(self.geometry_face()).count()
    }

    pub fn vertex_positions(&self, geometry: &BrushGeometry) -> Vec<Point3d> {
        geometry.vertex_positions(self.geometry_face())
    }

    pub fn has_vertices(&self, geometry: &BrushGeometry, positions: &[Point3d], epsilon: f64) -> bool {
        geometry.has_vertex_positions(self.geometry_face(), positions, epsilon)
    }

    /// The boundary polygon, counter-clockwise about the normal.
    pub fn polygon(&self, geometry: &BrushGeometry) -> Vec<Point3d> {
        self.vertex_positions(geometry)
    }

    /// Average of the boundary vertices.
    pub fn center(&self, geometry: &BrushGeometry) -> Point3d {
        Point3d::average(self.vertex_positions(geometry)).unwrap_or_else(|| self.boundary.anchor())
    }

    /// Center of the boundary's bounding rectangle measured within the face plane.
    pub fn bounds_center(&self, geometry: &BrushGeometry) -> Point3d {
        let positions = self.vertex_positions(geometry);
        let to_plane = self.boundary.projection_matrix(&self.boundary.normal);
        let from_plane = to_plane.and_then(|m| m.inverse());
        let (Some(to_plane), Some(from_plane)) = (to_plane, from_plane) else {
            return self.center(geometry);
        };
        if positions.is_empty() {
            return self.boundary.anchor();
        }
        let projected: Vec<Point3d> = positions.iter().map(|p| to_plane.transform_point(p)).collect();
        from_plane.transform_point(&BoundingBox::from_points(&projected).center())
    }

    /// Area of the boundary after dropping the `axis` coordinate.
    pub fn projected_area(&self, geometry: &BrushGeometry, axis: Axis) -> f64 {
        let positions = self.vertex_positions(geometry);
        let (mut c1, mut c2) = (0.0, 0.0);
        for (i, origin) in positions.iter().enumerate() {
            let destination = positions[(i + 1) % positions.len()];
            let origin = origin.to_vec3().swizzle(axis);
            let destination = destination.to_vec3().swizzle(axis);
            c1 += origin.x * destination.y;
            c2 += origin.y * destination.x;
        }
        ((c1 - c2) / 2.0).abs()
    }

    pub fn area(&self, geometry: &BrushGeometry) -> f64 {
        let positions = self.vertex_positions(geometry);
        let Some((first, rest)) = positions.split_first() else {
            return 0.0;
        };
        let doubled: f64 = rest
            .windows(2)
            .map(|pair| (pair[0] - *first).cross(&(pair[1] - *first)).length())
            .sum();
        doubled / 2.0
    }

    /// Whether the face lies in `plane`: its center is on the plane and the normals
    /// agree.
    pub fn coplanar_with(&self, geometry: &BrushGeometry, plane: &Plane) -> bool {
        let tol = default_tolerance();
        if plane.point_distance(&self.center(geometry)).abs() >= tol.almost_zero * 10.0 {
            return false;
        }
        1.0 - self.boundary.normal.dot(&plane.normal) < tol.colinear
    }

    /// Distance along `ray` to the face. Only front faces are hit.
    pub fn intersect_with_ray(&self, geometry: &BrushGeometry, ray: &Ray) -> Option<f64> {
        let positions = self.vertex_positions(geometry);
        if self.boundary.normal.dot(&ray.direction) >= 0.0 {
            return None;
        }
        intersection::ray_polygon(ray, &self.boundary, &positions)
    }
}

// ─── Attributes and Material ────────────────────────────────────────────────

impl BrushFace {
    /// Replaces the attributes. The UV axes follow a change of rotation.
    pub fn set_attributes(&mut self, attributes: BrushFaceAttributes) {
        let old_rotation = self.attributes.rotation();
        self.attributes = attributes;
        self.uv_coord_system
            .set_rotation(&self.boundary.normal, old_rotation, self.attributes.rotation());
    }

    /// Copies material name, offsets, rotation, scales and surface properties from
    /// `other`. Returns whether anything changed.
    pub fn set_attributes_from(&mut self, other: &BrushFace) -> bool {
        let source = &other.attributes;
        let mut changed = false;
        changed |= self.attributes.set_material_name(source.material_name());
        changed |= self.attributes.set_x_offset(source.x_offset());
        changed |= self.attributes.set_y_offset(source.y_offset());
        changed |= self.attributes.set_rotation(source.rotation());
        changed |= self.attributes.set_x_scale(source.x_scale());
        changed |= self.attributes.set_y_scale(source.y_scale());
        changed |= self.attributes.set_surface_contents(source.surface_contents());
        changed |= self.attributes.set_surface_flags(source.surface_flags());
        changed |= self.attributes.set_surface_value(source.surface_value());
        changed
    }

    /// Assigns a shared material. Returns `false` if it is already assigned.
    pub fn set_material(&mut self, material: Option<Arc<Material>>) -> bool {
        let unchanged = match (&self.material, &material) {
            (Some(current), Some(new)) => Arc::ptr_eq(current, new),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return false;
        }
        self.material = material;
        true
    }

    /// Size of the material's texture, at least one texel in each direction.
    pub fn texture_size(&self) -> Vec2 {
        self.material()
            .and_then(Material::texture)
            .map_or(Vec2::ONE, |texture| texture.size().max(&Vec2::ONE))
    }

    pub fn mod_offset(&self, offset: Vec2) -> Vec2 {
        self.attributes.mod_offset(offset, self.texture_size())
    }

    pub fn resolved_surface_contents(&self) -> i32 {
        self.attributes
            .surface_contents()
            .unwrap_or_else(|| self.default_surface_data().contents)
    }

    pub fn resolved_surface_flags(&self) -> i32 {
        self.attributes
            .surface_flags()
            .unwrap_or_else(|| self.default_surface_data().flags)
    }

    pub fn resolved_surface_value(&self) -> f32 {
        self.attributes
            .surface_value()
            .unwrap_or_else(|| self.default_surface_data().value)
    }

    pub fn resolved_color(&self) -> Color {
        self.attributes.color().unwrap_or_default()
    }

    fn default_surface_data(&self) -> SurfaceData {
        let defaults = self
            .material()
            .and_then(Material::texture)
            .map(Texture::embedded_defaults);
        match defaults {
            Some(EmbeddedDefaults::Quake2 { contents, flags, value }) => SurfaceData {
                contents: *contents,
                flags: *flags,
                value: *value as f32,
            },
            _ => SurfaceData::default(),
        }
    }
}

#[derive(Debug, Default)]
struct SurfaceData {
    contents: i32,
    flags: i32,
    value: f32,
}

// ─── UV Coordinate System ───────────────────────────────────────────────────

impl BrushFace {
    pub fn u_axis(&self) -> Vec3 {
        self.uv_coord_system.u_axis()
    }

    pub fn v_axis(&self) -> Vec3 {
        self.uv_coord_system.v_axis()
    }

    /// Texture coordinates of `point`, normalized by the texture size.
    pub fn uv_coords(&self, point: &Point3d) -> Vec2 {
        self.uv_coord_system
            .uv_coords(point, &self.attributes, self.texture_size())
    }

    pub fn reset_uv_coord_system_cache(&mut self) {
        let [p0, p1, p2] = self.points;
        self.uv_coord_system.reset_cache(&p0, &p1, &p2, &self.attributes);
    }

    pub fn reset_uv_axes(&mut self) {
        self.uv_coord_system.reset(&self.boundary.normal);
    }

    pub fn reset_uv_axes_to_paraxial(&mut self) {
        self.uv_coord_system.reset_to_paraxial(&self.boundary.normal, 0.0);
    }

    pub fn take_uv_coord_system_snapshot(&self) -> Option<UvCoordSystemSnapshot> {
        self.uv_coord_system.take_snapshot()
    }

    pub fn restore_uv_coord_system_snapshot(&mut self, snapshot: &UvCoordSystemSnapshot) {
        snapshot.restore(&mut self.uv_coord_system);
    }

    /// Aligns this face's texture with a donor face so that the texture runs on
    /// across the seam where the two planes meet.
    ///
    /// `snapshot` and `attributes` describe the donor's UV system, `source_plane` is
    /// the donor's plane. If the planes are parallel there is no seam and only the
    /// axes are adopted.
    #[instrument(skip(self, geometry, snapshot, attributes))]
    pub fn copy_uv_coord_system_from_face(
        &mut self,
        geometry: &BrushGeometry,
        snapshot: Option<&UvCoordSystemSnapshot>,
        attributes: &BrushFaceAttributes,
        source_plane: &Plane,
        wrap_style: WrapStyle,
    ) {
        let reference = source_plane
            .intersect(&self.boundary)
            .map(|seam| seam.project_point(&self.center(geometry)));

        if let Some(snapshot) = snapshot {
            snapshot.restore(&mut self.uv_coord_system);
        }
        let desired = reference.map(|point| self.uv_coord_system.uv_coords(&point, attributes, Vec2::ONE));

        self.uv_coord_system.set_normal(
            &source_plane.normal,
            &self.boundary.normal,
            &self.attributes,
            wrap_style,
        );

        match (reference, desired) {
            (Some(point), Some(desired)) => {
                let current = self.uv_coord_system.uv_coords(&point, &self.attributes, Vec2::ONE);
                self.shift_offset(desired - current);
            }
            _ => debug!("source plane is parallel, no seam to align along"),
        }
    }

    #[instrument(skip(self))]
    pub fn convert_to_paraxial(&mut self) {
        let [p0, p1, p2] = self.points;
        let (uv_coord_system, attributes) = self.uv_coord_system.to_paraxial(&p0, &p1, &p2, &self.attributes);
        self.uv_coord_system = uv_coord_system;
        self.attributes = attributes;
    }

    #[instrument(skip(self))]
    pub fn convert_to_parallel(&mut self) {
        let [p0, p1, p2] = self.points;
        let (uv_coord_system, attributes) = self.uv_coord_system.to_parallel(&p0, &p1, &p2, &self.attributes);
        self.uv_coord_system = uv_coord_system;
        self.attributes = attributes;
    }

    /// Moves the texture by `offset`, given in the camera's right and up directions.
    pub fn move_uv(&mut self, up: &Vec3, right: &Vec3, offset: Vec2) {
        self.uv_coord_system
            .translate(&self.boundary.normal, up, right, offset, &mut self.attributes);
    }

    /// Turns the texture counter-clockwise about the normal by `angle` degrees.
    pub fn rotate_uv(&mut self, angle: f64) {
        let old_rotation = self.attributes.rotation();
        self.uv_coord_system
            .rotate(&self.boundary.normal, angle, &mut self.attributes);
        self.uv_coord_system
            .set_rotation(&self.boundary.normal, old_rotation, self.attributes.rotation());
    }

    pub fn shear_uv(&mut self, factors: Vec2) {
        self.uv_coord_system.shear(&self.boundary.normal, factors);
    }

    /// Mirrors the texture horizontally (`Left`/`Right`) or vertically (`Up`/`Down`)
    /// as seen by the camera, by negating the scale of whichever texture axis the
    /// camera's right direction runs closer to.
    pub fn flip_uv(&mut self, _camera_up: &Vec3, camera_right: &Vec3, direction: FlipDirection) {
        let to_world = self.uv_coord_system.from_matrix(Vec2::ZERO, Vec2::ONE);
        let u_in_world = to_world.transform_vector(&Vec3::X).normalize_or_zero();
        let v_in_world = to_world.transform_vector(&Vec3::Y).normalize_or_zero();

        // cosine of the angle between camera right and each axis line
        let u_cos = u_in_world.dot(camera_right).max((-u_in_world).dot(camera_right));
        let v_cos = v_in_world.dot(camera_right).max((-v_in_world).dot(camera_right));

        let mut flip_u = matches!(direction, FlipDirection::Left | FlipDirection::Right);
        if v_cos > u_cos {
            flip_u = !flip_u;
        }

        if flip_u {
            self.attributes.set_x_scale(-self.attributes.x_scale());
        } else {
            self.attributes.set_y_scale(-self.attributes.y_scale());
        }
    }

    /// Matrix that projects world points onto the face plane along the texture's
    /// projection axis.
    pub fn project_to_boundary_matrix(&self) -> Transform {
        let projection_axis = self
            .uv_coord_system
            .from_matrix(Vec2::ZERO, Vec2::ONE)
            .transform_vector(&Vec3::Z);
        let to_plane = self.boundary.projection_matrix(&projection_axis);
        match to_plane.and_then(|to_plane| Some((to_plane, to_plane.inverse()?))) {
            Some((to_plane, from_plane)) => from_plane * Transform::zero_out_z() * to_plane,
            None => {
                warn!("texture projection axis lies in the face plane");
                Transform::identity()
            }
        }
    }

    pub fn to_uv_coord_system_matrix(&self, offset: Vec2, scale: Vec2, project: bool) -> Transform {
        let matrix = self.uv_coord_system.to_matrix(offset, scale);
        if project {
            Transform::zero_out_z() * matrix
        } else {
            matrix
        }
    }

    pub fn from_uv_coord_system_matrix(&self, offset: Vec2, scale: Vec2, project: bool) -> Transform {
        let matrix = self.uv_coord_system.from_matrix(offset, scale);
        if project {
            self.project_to_boundary_matrix() * matrix
        } else {
            matrix
        }
    }

    pub fn measure_uv_angle(&self, center: Vec2, point: Vec2) -> f64 {
        self.uv_coord_system
            .measure_angle(self.attributes.rotation(), center, point)
    }

    /// Adds `delta` to the offset, wrapped into the texture and rounded to four
    /// decimals.
    fn shift_offset(&mut self, delta: Vec2) {
        let offset = self
            .mod_offset(self.attributes.offset() + delta)
            .round_to(4);
        self.attributes.set_offset(offset);
    }
}

// ─── Geometric Edits ────────────────────────────────────────────────────────

impl BrushFace {
    /// Replaces the defining points. On failure the face is left unchanged.
    pub fn set_points(&mut self, p0: Point3d, p1: Point3d, p2: Point3d) -> Result<()> {
        let (points, boundary) = checked_plane(p0, p1, p2)?;
        self.points = points;
        self.boundary = boundary;
        Ok(())
    }

    /// Applies `transform` to the face. A mirroring transform keeps the normal
    /// pointing outward. With `lock_alignment` the texture moves with the face,
    /// pivoting about the face center if `geometry` is given and the face is
    /// attached, or about the plane anchor otherwise.
    #[instrument(skip(self, transform, geometry))]
    pub fn transform(
        &mut self,
        transform: &Transform,
        lock_alignment: bool,
        geometry: Option<&BrushGeometry>,
    ) -> Result<()> {
        let invariant = match (self.geometry, geometry) {
            (Some(_), Some(geometry)) => self.center(geometry),
            _ => self.boundary.anchor(),
        };
        let old_boundary = self.boundary;
        let new_boundary = old_boundary.transform(transform);

        let mut points = self.points.map(|p| transform.transform_point(&p));
        if (points[2] - points[0])
            .cross(&(points[1] - points[0]))
            .dot(&new_boundary.normal)
            < 0.0
        {
            points.swap(1, 2);
        }
        self.set_points(points[0], points[1], points[2])?;

        let texture_size = self.texture_size();
        self.uv_coord_system.transform(
            &old_boundary,
            &self.boundary,
            transform,
            &mut self.attributes,
            texture_size,
            lock_alignment,
            &invariant,
        );
        Ok(())
    }

    /// Turns the face inside out.
    pub fn invert(&mut self) {
        self.boundary = self.boundary.flip();
        self.points.swap(1, 2);
    }

    /// Re-derives the points from the boundary after the geometry was edited, and
    /// shifts the offset so the texture stays put along the seam between the old
    /// and the new plane.
    #[instrument(skip(self, geometry))]
    pub fn update_points_from_vertices(&mut self, geometry: &BrushGeometry) -> Result<()> {
        let positions = self.vertex_positions(geometry);
        let [first, second, .., last] = positions.as_slice() else {
            return Err(KernelError::IncompleteBrush {
                reason: format!("face boundary has {} vertices", positions.len()),
            });
        };

        let old_plane = self.boundary;
        self.set_points(*second, *first, *last)?;

        let Some(seam) = old_plane.intersect(&self.boundary) else {
            return Ok(());
        };
        let reference = seam.project_point(&self.center(geometry));
        let desired = self.uv_coord_system.uv_coords(&reference, &self.attributes, Vec2::ONE);
        self.uv_coord_system.set_normal(
            &old_plane.normal,
            &self.boundary.normal,
            &self.attributes,
            WrapStyle::Projection,
        );
        let current = self.uv_coord_system.uv_coords(&reference, &self.attributes, Vec2::ONE);
        self.shift_offset(desired - current);
        Ok(())
    }
}

// ─── Tags ───────────────────────────────────────────────────────────────────

impl BrushFace {
    pub fn matches(&self, matcher: &TagMatcher) -> bool {
        matcher.matches(self)
    }

    /// Recomputes the tag mask from scratch against `tags`.
    pub fn update_tags(&mut self, tags: &[SmartTag]) {
        let mut mask = TagMask::EMPTY;
        for tag in tags.iter().filter(|tag| tag.matcher.matches(self)) {
            mask.insert(tag.mask());
        }
        self.tags = mask;
    }

    pub fn has_tag(&self, tag: &SmartTag) -> bool {
        self.tags.contains(tag.mask())
    }

    pub fn tags(&self) -> TagMask {
        self.tags
    }
}

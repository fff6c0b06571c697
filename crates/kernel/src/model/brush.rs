use tracing::{debug, instrument};

use super::attributes::BrushFaceAttributes;
use super::face::BrushFace;
use super::map_format::MapFormat;
use crate::default_tolerance;
use crate::error::{KernelError, Result};
use crate::geometry::curves::Ray;
use crate::geometry::plane::Plane;
use crate::geometry::point::Point3d;
use crate::geometry::transform::{BoundingBox, Transform};
use crate::geometry::vector::Vec3;
use crate::topology::brep::BrushGeometry;

/// A convex solid: the faces bounding it and the boundary representation built
/// from their planes. Every face is attached to a face of `geometry`.
///
/// Edits are all-or-nothing. They work on copies of the faces and only replace
/// the brush contents once the new geometry has been built.
#[derive(Debug, Clone)]
pub struct Brush {
    faces: Vec<BrushFace>,
    geometry: BrushGeometry,
}

impl Brush {
    #[instrument(skip(faces), fields(face_count = faces.len()))]
    pub fn create(faces: Vec<BrushFace>) -> Result<Self> {
        let (faces, geometry) = build(faces)?;
        Ok(Self { faces, geometry })
    }

    /// An axis-aligned box spanning `bounds`, all faces sharing `attributes`.
    pub fn cuboid(bounds: &BoundingBox, attributes: &BrushFaceAttributes, map_format: MapFormat) -> Result<Self> {
        let (min, max) = (bounds.min, bounds.max);
        // (anchor, first step, second step); the outward normal is second x first
        let corners = [
            (Point3d::new(min.x, min.y, max.z), Vec3::Y, Vec3::X),
            (min, Vec3::X, Vec3::Y),
            (Point3d::new(max.x, min.y, min.z), Vec3::Z, Vec3::Y),
            (min, Vec3::Y, Vec3::Z),
            (Point3d::new(min.x, max.y, min.z), Vec3::X, Vec3::Z),
            (min, Vec3::Z, Vec3::X),
        ];
        let faces = corners
            .into_iter()
            .map(|(anchor, first, second)| {
                BrushFace::create(anchor, anchor + first, anchor + second, attributes, map_format)
            })
            .collect::<Result<Vec<_>>>()?;
        Self::create(faces)
    }

    pub fn faces(&self) -> &[BrushFace] {
        &self.faces
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn face(&self, index: usize) -> Result<&BrushFace> {
        let count = self.faces.len();
        self.faces
            .get(index)
            .ok_or(KernelError::FaceIndexOutOfRange { index, count })
    }

    /// Mutable access for attribute and UV edits. Changing a face's points this way
    /// leaves the geometry stale until the next rebuild.
    pub fn face_mut(&mut self, index: usize) -> Result<&mut BrushFace> {
        let count = self.faces.len();
        self.faces
            .get_mut(index)
            .ok_or(KernelError::FaceIndexOutOfRange { index, count })
    }

    pub fn geometry(&self) -> &BrushGeometry {
        &self.geometry
    }

    pub fn bounds(&self) -> BoundingBox {
        self.geometry.bounds()
    }

    /// Index of the face whose normal matches `normal`.
    pub fn find_face(&self, normal: &Vec3) -> Option<usize> {
        let tol = default_tolerance();
        self.faces
            .iter()
            .position(|face| tol.normals_parallel(&face.normal(), normal))
    }

    /// The face `ray` hits first, with the distance along the ray.
    pub fn pick(&self, ray: &Ray) -> Option<(usize, f64)> {
        self.faces
            .iter()
            .enumerate()
            .filter_map(|(index, face)| face.intersect_with_ray(&self.geometry, ray).map(|t| (index, t)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Transforms every face and rebuilds the geometry.
    #[instrument(skip(self, transform))]
    pub fn transform(&mut self, transform: &Transform, lock_alignment: bool) -> Result<()> {
        let mut faces = self.faces.clone();
        for face in &mut faces {
            face.transform(transform, lock_alignment, Some(&self.geometry))?;
        }
        self.replace_faces(faces)
    }

    /// Cuts the brush with `face`, keeping the part behind it. Faces that end up
    /// outside the new solid are discarded. Fails with [`KernelError::EmptyBrush`]
    /// if no volume would remain, including when the plane only touches the brush.
    #[instrument(skip(self, face), fields(normal = ?face.normal()))]
    pub fn clip(&mut self, face: BrushFace) -> Result<()> {
        let tol = default_tolerance();
        let plane = *face.boundary();
        let keeps_volume = self
            .geometry
            .vertices
            .values()
            .any(|vertex| plane.point_distance(&vertex.position) < -tol.point_status);
        if !keeps_volume {
            debug!("clip plane leaves nothing behind it");
            return Err(KernelError::EmptyBrush);
        }

        let mut faces = self.faces.clone();
        faces.push(face);
        self.replace_faces(faces)
    }

    /// Drags the face at `index` by `delta` and rebuilds the geometry.
    #[instrument(skip(self))]
    pub fn move_boundary(&mut self, index: usize, delta: Vec3, lock_alignment: bool) -> Result<()> {
        self.face(index)?;
        let mut faces = self.faces.clone();
        faces[index].transform(&Transform::from_translation_vec(delta), lock_alignment, Some(&self.geometry))?;
        self.replace_faces(faces)
    }

    /// Moves the vertices directly and re-derives the faces from them.
    #[instrument(skip(self, transform))]
    pub fn transform_vertices(&mut self, transform: &Transform) -> Result<()> {
        let mut geometry = self.geometry.clone();
        geometry.transform_vertices(transform);
        let faces = faces_from_geometry(&self.faces, &geometry)?;
        self.faces = faces;
        self.geometry = geometry;
        Ok(())
    }

    /// Re-derives every face's points from the current geometry.
    pub fn update_faces_from_geometry(&mut self) -> Result<()> {
        self.faces = faces_from_geometry(&self.faces, &self.geometry)?;
        Ok(())
    }

    fn replace_faces(&mut self, faces: Vec<BrushFace>) -> Result<()> {
        let (faces, geometry) = build(faces)?;
        self.faces = faces;
        self.geometry = geometry;
        Ok(())
    }
}

/// Sorts the faces, builds the geometry from their planes and attaches each face
/// to its geometry face. Faces that do not touch the solid are dropped.
fn build(mut faces: Vec<BrushFace>) -> Result<(Vec<BrushFace>, BrushGeometry)> {
    if faces.is_empty() {
        return Err(KernelError::EmptyBrush);
    }
    BrushFace::sort_faces(&mut faces);
    let planes: Vec<Plane> = faces.iter().map(|face| *face.boundary()).collect();
    let (geometry, face_ids) = BrushGeometry::from_planes(&planes, &default_tolerance())?;

    let faces: Vec<BrushFace> = faces
        .into_iter()
        .zip(face_ids)
        .filter_map(|(mut face, id)| match id {
            Some(id) => {
                face.set_geometry(Some(id));
                Some(face)
            }
            None => {
                debug!(normal = ?face.normal(), distance = face.boundary().distance, "dropping face");
                None
            }
        })
        .collect();
    Ok((faces, geometry))
}

fn faces_from_geometry(faces: &[BrushFace], geometry: &BrushGeometry) -> Result<Vec<BrushFace>> {
    let mut faces = faces.to_vec();
    for face in &mut faces {
        face.update_points_from_vertices(geometry)?;
    }
    Ok(faces)
}

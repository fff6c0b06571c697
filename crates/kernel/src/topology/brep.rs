use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use std::collections::HashSet;
use tracing::{debug, instrument};

use crate::geometry::plane::Plane;
use crate::geometry::point::Point3d;
use crate::geometry::transform::{BoundingBox, Transform};
use crate::geometry::vector::Vec3;

// ─── Entity Keys ─────────────────────────────────────────────────────────────

new_key_type! {
    pub struct VertexId;
    pub struct HalfEdgeId;
    pub struct EdgeId;
    pub struct FaceId;
}

// ─── Topological Entities ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Point3d,
    /// Any half-edge whose origin is this vertex.
    pub leaving: HalfEdgeId,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HalfEdge {
    pub origin: VertexId,
    pub twin: HalfEdgeId,
    pub next: HalfEdgeId,
    pub prev: HalfEdgeId,
    pub face: FaceId,
    pub edge: EdgeId,
}

/// An undirected edge: the pair of half-edges running along it in opposite
/// directions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Edge {
    pub first: HalfEdgeId,
    pub second: HalfEdgeId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Face {
    /// First half-edge of the boundary loop. The loop runs counter-clockwise when
    /// viewed from outside the solid.
    pub boundary: HalfEdgeId,
    pub plane: Plane,
}

// ─── Boundary Representation ────────────────────────────────────────────────

/// Arena-based half-edge representation of a convex polyhedron's boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrushGeometry {
    pub vertices: SlotMap<VertexId, Vertex>,
    pub half_edges: SlotMap<HalfEdgeId, HalfEdge>,
    pub edges: SlotMap<EdgeId, Edge>,
    pub faces: SlotMap<FaceId, Face>,
}

/// Cyclic walk over the half-edges of one face loop.
pub struct Boundary<'a> {
    geometry: &'a BrushGeometry,
    first: HalfEdgeId,
    current: Option<HalfEdgeId>,
    remaining: usize,
}

impl Iterator for Boundary<'_> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let next = self.geometry.half_edges.get(current).map(|he| he.next);
        self.current = next.filter(|&n| n != self.first);
        Some(current)
    }
}

impl BrushGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn face(&self, face: FaceId) -> Option<&Face> {
        self.faces.get(face)
    }

    /// The half-edges bounding `face`, in loop order starting at its first half-edge.
    /// Empty for an unknown face.
    pub fn boundary(&self, face: FaceId) -> Boundary<'_> {
        let first = self.faces.get(face).map(|f| f.boundary);
        Boundary {
            geometry: self,
            first: first.unwrap_or_default(),
            current: first.filter(|he| self.half_edges.contains_key(*he)),
            // a corrupted loop must not spin forever
            remaining: self.half_edges.len(),
        }
    }

    /// The vertex a half-edge points to.
    pub fn destination(&self, he: HalfEdgeId) -> VertexId {
        let next = self.half_edges[he].next;
        self.half_edges[next].origin
    }

    pub fn origin_position(&self, he: HalfEdgeId) -> Point3d {
        self.vertices[self.half_edges[he].origin].position
    }

    pub fn vertex_positions(&self, face: FaceId) -> Vec<Point3d> {
        self.boundary(face).map(|he| self.origin_position(he)).collect()
    }

    /// Whether the loop of `face` visits exactly `positions` in the same cyclic order,
    /// each within `epsilon`.
    pub fn has_vertex_positions(&self, face: FaceId, positions: &[Point3d], epsilon: f64) -> bool {
        let own = self.vertex_positions(face);
        if own.len() != positions.len() || own.is_empty() {
            return false;
        }
        let n = own.len();
        (0..n).any(|shift| {
            (0..n).all(|i| own[(i + shift) % n].distance_to(&positions[i]) <= epsilon)
        })
    }

    pub fn bounds(&self) -> BoundingBox {
        let mut bb = BoundingBox::empty();
        for vertex in self.vertices.values() {
            bb.expand_to_include(&vertex.position);
        }
        bb
    }

    /// Moves every vertex by `transform` and re-derives the face planes from the
    /// moved loops. A mirroring transform reverses every loop so that faces keep
    /// facing outward.
    pub fn transform_vertices(&mut self, transform: &Transform) {
        for vertex in self.vertices.values_mut() {
            vertex.position = transform.transform_point(&vertex.position);
        }
        let linear = transform.strip_translation();
        let det = Vec3::new(linear.at(0, 0), linear.at(1, 0), linear.at(2, 0)).triple(
            &Vec3::new(linear.at(0, 1), linear.at(1, 1), linear.at(2, 1)),
            &Vec3::new(linear.at(0, 2), linear.at(1, 2), linear.at(2, 2)),
        );
        if det < 0.0 {
            self.reverse_loops();
        }
        self.update_planes();
    }

    /// Recomputes every face plane from its loop with Newell's method.
    pub fn update_planes(&mut self) {
        let ids: Vec<FaceId> = self.faces.keys().collect();
        for face in ids {
            if let Some(plane) = self.loop_plane(face) {
                self.faces[face].plane = plane;
            }
        }
    }

    fn loop_plane(&self, face: FaceId) -> Option<Plane> {
        let points = self.vertex_positions(face);
        let center = Point3d::average(points.iter().copied())?;
        let mut normal = Vec3::ZERO;
        for (i, a) in points.iter().enumerate() {
            let b = points[(i + 1) % points.len()];
            normal += Vec3::new(
                (a.y - b.y) * (a.z + b.z),
                (a.z - b.z) * (a.x + b.x),
                (a.x - b.x) * (a.y + b.y),
            );
        }
        Some(Plane::from_point_normal(center, normal.normalized()?))
    }

    fn reverse_loops(&mut self) {
        let destinations: Vec<(HalfEdgeId, VertexId)> = self
            .half_edges
            .keys()
            .map(|he| (he, self.destination(he)))
            .collect();
        let leaving: Vec<(VertexId, HalfEdgeId)> = self
            .vertices
            .iter()
            .map(|(v, vertex)| (v, self.half_edges[vertex.leaving].prev))
            .collect();
        for (he, destination) in destinations {
            let half_edge = &mut self.half_edges[he];
            half_edge.origin = destination;
            std::mem::swap(&mut half_edge.next, &mut half_edge.prev);
        }
        for (v, he) in leaving {
            self.vertices[v].leaving = he;
        }
    }

    /// Check the structural invariants of the half-edge graph.
    #[instrument(skip(self))]
    pub fn audit(&self, plane_epsilon: f64) -> TopologyAudit {
        let mut errors = Vec::new();

        for (he_id, he) in &self.half_edges {
            let consistent = self
                .half_edges
                .get(he.twin)
                .is_some_and(|twin| twin.twin == he_id && twin.origin == self.destination(he_id));
            if !consistent {
                errors.push(TopologyError::HalfEdgeTwinMismatch { half_edge: he_id });
            }
        }
        let twins_consistent = errors.is_empty();

        let mut loops_closed = true;
        let mut faces_planar = true;
        let mut visited = HashSet::new();
        for (face_id, face) in &self.faces {
            let walk: Vec<HalfEdgeId> = self.boundary(face_id).collect();
            let closed = walk.len() >= 3
                && walk
                    .last()
                    .is_some_and(|&last| self.half_edges[last].next == face.boundary)
                && walk.iter().all(|&he| self.half_edges[he].face == face_id);
            if !closed {
                loops_closed = false;
                errors.push(TopologyError::OpenLoop { face: face_id });
            }
            visited.extend(walk.iter().copied());

            for &he in &walk {
                let distance = face.plane.point_distance(&self.origin_position(he));
                if distance.abs() > plane_epsilon {
                    faces_planar = false;
                    errors.push(TopologyError::VertexOffPlane {
                        face: face_id,
                        vertex: self.half_edges[he].origin,
                        distance,
                    });
                }
            }
        }
        if visited.len() != self.half_edges.len() {
            loops_closed = false;
        }

        let (v, e, f) = (self.vertex_count(), self.edge_count(), self.face_count());
        let chi = v as i64 - e as i64 + f as i64;
        let euler_valid = chi == 2;
        if !euler_valid {
            errors.push(TopologyError::EulerViolation { v, e, f, actual_chi: chi });
        }

        debug!(
            euler_valid,
            twins_consistent,
            loops_closed,
            faces_planar,
            error_count = errors.len(),
            "topology audit complete"
        );
        TopologyAudit {
            euler_valid,
            twins_consistent,
            loops_closed,
            faces_planar,
            errors,
        }
    }
}

// ─── Topology Audit ─────────────────────────────────────────────────────────

/// Result of a topological consistency check.
#[derive(Debug, Clone)]
pub struct TopologyAudit {
    pub euler_valid: bool,
    pub twins_consistent: bool,
    pub loops_closed: bool,
    pub faces_planar: bool,
    pub errors: Vec<TopologyError>,
}

#[derive(Debug, Clone)]
pub enum TopologyError {
    EulerViolation {
        v: usize,
        e: usize,
        f: usize,
        actual_chi: i64,
    },
    OpenLoop {
        face: FaceId,
    },
    HalfEdgeTwinMismatch {
        half_edge: HalfEdgeId,
    },
    VertexOffPlane {
        face: FaceId,
        vertex: VertexId,
        distance: f64,
    },
}

impl TopologyAudit {
    pub fn all_valid(&self) -> bool {
        self.euler_valid && self.twins_consistent && self.loops_closed && self.faces_planar
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube() -> (BrushGeometry, Vec<Option<FaceId>>) {
        let planes = [
            Plane::new(Vec3::X, 1.0),
            Plane::new(-Vec3::X, 1.0),
            Plane::new(Vec3::Y, 1.0),
            Plane::new(-Vec3::Y, 1.0),
            Plane::new(Vec3::Z, 1.0),
            Plane::new(-Vec3::Z, 1.0),
        ];
        BrushGeometry::from_planes(&planes, &crate::default_tolerance()).unwrap()
    }

    #[test]
    fn test_boundary_walk_is_cyclic() {
        let (geometry, faces) = cube();
        let top = faces[4].unwrap();
        let walk: Vec<HalfEdgeId> = geometry.boundary(top).collect();
        assert_eq!(walk.len(), 4);
        for pair in walk.windows(2) {
            assert_eq!(geometry.half_edges[pair[0]].next, pair[1]);
        }
        assert_eq!(geometry.half_edges[walk[3]].next, walk[0]);
    }

    #[test]
    fn test_destination_matches_twin_origin() {
        let (geometry, _) = cube();
        for (he_id, he) in &geometry.half_edges {
            assert_eq!(geometry.destination(he_id), geometry.half_edges[he.twin].origin);
        }
    }

    #[test]
    fn test_has_vertex_positions_any_rotation() {
        let (geometry, faces) = cube();
        let top = faces[4].unwrap();
        let mut positions = geometry.vertex_positions(top);
        positions.rotate_left(2);
        assert!(geometry.has_vertex_positions(top, &positions, 1e-9));
        positions.reverse();
        assert!(!geometry.has_vertex_positions(top, &positions, 1e-9));
    }

    #[test]
    fn test_bounds() {
        let (geometry, _) = cube();
        let bb = geometry.bounds();
        assert_eq!(bb.min, Point3d::new(-1.0, -1.0, -1.0));
        assert_eq!(bb.max, Point3d::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_audit_cube_is_valid() {
        let (geometry, _) = cube();
        let audit = geometry.audit(1e-6);
        assert!(audit.all_valid(), "{:?}", audit.errors);
    }

    #[test]
    fn test_transform_vertices_mirror_keeps_outward_loops() {
        let (mut geometry, faces) = cube();
        geometry.transform_vertices(&Transform::scaling(-1.0, 1.0, 1.0));
        let audit = geometry.audit(1e-6);
        assert!(audit.all_valid(), "{:?}", audit.errors);
        // the former +X face now sits at x = -1 and must face -X
        let plane = geometry.faces[faces[0].unwrap()].plane;
        assert!((plane.normal.x + 1.0).abs() < 1e-9);
        assert!((plane.distance - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_transform_vertices_translation() {
        let (mut geometry, faces) = cube();
        geometry.transform_vertices(&Transform::translation(0.0, 0.0, 3.0));
        let plane = geometry.faces[faces[4].unwrap()].plane;
        assert!((plane.normal.z - 1.0).abs() < 1e-9);
        assert!((plane.distance - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_boundary_of_unknown_face_is_empty() {
        let (geometry, _) = cube();
        assert_eq!(geometry.boundary(FaceId::default()).count(), 0);
    }
}

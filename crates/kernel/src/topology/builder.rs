use std::collections::HashMap;
use tracing::{debug, instrument, warn};

use super::brep::*;
use crate::error::{KernelError, Result};
use crate::geometry::plane::Plane;
use crate::geometry::point::Point3d;
use crate::geometry::vector::Vec3;
use crate::Tolerance;

impl BrushGeometry {
    /// Build the boundary of the convex solid bounded by `planes`. Each plane keeps
    /// its front side outside the solid.
    ///
    /// Returns the geometry together with the face created for each input plane, or
    /// `None` for planes that touch the solid in fewer than three vertices or repeat
    /// an earlier plane.
    #[instrument(skip(planes, tol), fields(plane_count = planes.len()))]
    pub fn from_planes(planes: &[Plane], tol: &Tolerance) -> Result<(Self, Vec<Option<FaceId>>)> {
        let points = solid_vertices(planes, tol);
        if points.len() < 4 {
            return Err(KernelError::IncompleteBrush {
                reason: format!("planes meet in only {} vertices", points.len()),
            });
        }

        let mut geometry = BrushGeometry::new();
        let vertex_ids: Vec<VertexId> = points
            .iter()
            .map(|p| {
                geometry.vertices.insert(Vertex {
                    position: *p,
                    leaving: HalfEdgeId::default(),
                })
            })
            .collect();

        let mut face_ids = Vec::with_capacity(planes.len());
        // directed edge (from, to) -> half-edge, used for twin linking
        let mut directed: HashMap<(VertexId, VertexId), HalfEdgeId> = HashMap::new();

        for (index, plane) in planes.iter().enumerate() {
            let duplicate = planes[..index].iter().any(|earlier| {
                tol.normals_parallel(&earlier.normal, &plane.normal)
                    && (earlier.distance - plane.distance).abs() < tol.point_status
            });
            if duplicate {
                warn!(index, "dropping face with repeated plane");
                face_ids.push(None);
                continue;
            }

            let mut on_plane: Vec<usize> = (0..points.len())
                .filter(|&i| plane.point_distance(&points[i]).abs() <= tol.point_status)
                .collect();
            if on_plane.len() < 3 {
                debug!(index, vertices = on_plane.len(), "plane does not bound the solid");
                face_ids.push(None);
                continue;
            }
            sort_by_winding(&points, &mut on_plane, &plane.normal);

            let face_id = geometry.faces.insert(Face {
                boundary: HalfEdgeId::default(),
                plane: *plane,
            });
            let loop_ids: Vec<HalfEdgeId> = on_plane
                .iter()
                .map(|&i| {
                    geometry.half_edges.insert(HalfEdge {
                        origin: vertex_ids[i],
                        twin: HalfEdgeId::default(),
                        next: HalfEdgeId::default(),
                        prev: HalfEdgeId::default(),
                        face: face_id,
                        edge: EdgeId::default(),
                    })
                })
                .collect();

            let n = loop_ids.len();
            for i in 0..n {
                let he = loop_ids[i];
                let next = loop_ids[(i + 1) % n];
                let prev = loop_ids[(i + n - 1) % n];
                geometry.half_edges[he].next = next;
                geometry.half_edges[he].prev = prev;
                let from = vertex_ids[on_plane[i]];
                let to = vertex_ids[on_plane[(i + 1) % n]];
                geometry.vertices[from].leaving = he;
                if directed.insert((from, to), he).is_some() {
                    return Err(KernelError::IncompleteBrush {
                        reason: format!("edge shared by more than two faces at plane {index}"),
                    });
                }
            }
            geometry.faces[face_id].boundary = loop_ids[0];
            face_ids.push(Some(face_id));
        }

        link_twins(&mut geometry, &directed)?;

        debug!(
            vertices = geometry.vertex_count(),
            edges = geometry.edge_count(),
            faces = geometry.face_count(),
            "brush geometry built"
        );
        Ok((geometry, face_ids))
    }
}

fn link_twins(geometry: &mut BrushGeometry, directed: &HashMap<(VertexId, VertexId), HalfEdgeId>) -> Result<()> {
    for (&(from, to), &he) in directed {
        let Some(&twin) = directed.get(&(to, from)) else {
            return Err(KernelError::IncompleteBrush {
                reason: "boundary is not closed".to_string(),
            });
        };
        geometry.half_edges[he].twin = twin;
        if geometry.half_edges[he].edge == EdgeId::default() {
            let edge = geometry.edges.insert(Edge { first: he, second: twin });
            geometry.half_edges[he].edge = edge;
            geometry.half_edges[twin].edge = edge;
        }
    }
    Ok(())
}

/// Solve the intersection of three planes. Returns None if degenerate.
fn plane_triple_intersection(a: &Plane, b: &Plane, c: &Plane) -> Option<Point3d> {
    let bc = b.normal.cross(&c.normal);
    let det = a.normal.dot(&bc);
    if det.abs() < 1e-9 {
        return None;
    }
    let ca = c.normal.cross(&a.normal);
    let ab = a.normal.cross(&b.normal);
    Some(Point3d::from_vec3(
        (bc * a.distance + ca * b.distance + ab * c.distance) / det,
    ))
}

/// Every point where three planes meet that lies behind or on all planes, with
/// coincident points welded together.
fn solid_vertices(planes: &[Plane], tol: &Tolerance) -> Vec<Point3d> {
    let mut points: Vec<Point3d> = Vec::new();
    let n = planes.len();
    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                let Some(point) = plane_triple_intersection(&planes[i], &planes[j], &planes[k]) else {
                    continue;
                };
                let inside = planes.iter().all(|p| p.point_distance(&point) <= tol.point_status);
                if inside && !points.iter().any(|q| tol.points_coincident(q, &point)) {
                    points.push(point);
                }
            }
        }
    }
    points
}

/// Orders `indices` counter-clockwise around `normal`.
fn sort_by_winding(points: &[Point3d], indices: &mut [usize], normal: &Vec3) {
    let Some(center) = Point3d::average(indices.iter().map(|&i| points[i])) else {
        return;
    };
    let u_axis = (points[indices[0]] - center).reject(normal).normalize_or_zero();
    let v_axis = normal.cross(&u_axis);
    let angle = |i: usize| {
        let d = points[i] - center;
        d.dot(&v_axis).atan2(d.dot(&u_axis))
    };
    indices.sort_by(|&a, &b| angle(a).total_cmp(&angle(b)));
}

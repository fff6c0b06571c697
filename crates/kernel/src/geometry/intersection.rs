use super::curves::Ray;
use super::plane::Plane;
use super::point::Point3d;

// ─── Ray-Plane Intersection ─────────────────────────────────────────────────

/// Distance along `ray` at which it meets `plane`, or `None` if the ray is parallel
/// to the plane or the plane lies behind the ray origin.
pub fn ray_plane(ray: &Ray, plane: &Plane) -> Option<f64> {
    let denom = ray.direction.dot(&plane.normal);
    if denom.abs() < 1e-15 {
        return None;
    }
    let t = -plane.point_distance(&ray.origin) / denom;
    if t < 0.0 {
        return None;
    }
    Some(t)
}

// ─── Ray-Polygon Intersection ───────────────────────────────────────────────

/// Distance along `ray` to the convex or concave planar polygon `vertices` lying in
/// `plane`, or `None` if the ray misses it.
pub fn ray_polygon(ray: &Ray, plane: &Plane, vertices: &[Point3d]) -> Option<f64> {
    let t = ray_plane(ray, plane)?;
    let hit = ray.at(t);
    polygon_contains_point(&hit, plane, vertices).then_some(t)
}

/// Whether `point` (assumed to lie on `plane`) is inside the polygon. Projects onto
/// the coordinate plane that drops the normal's dominant axis and runs a crossing
/// test. Points on an edge count as inside.
pub fn polygon_contains_point(point: &Point3d, plane: &Plane, vertices: &[Point3d]) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let axis = plane.normal.abs_max_axis();
    let project = |p: &Point3d| {
        let s = p.to_vec3().swizzle(axis);
        (s.x, s.y)
    };
    let (px, py) = project(point);

    let mut inside = false;
    let n = vertices.len();
    for i in 0..n {
        let (ax, ay) = project(&vertices[i]);
        let (bx, by) = project(&vertices[(i + 1) % n]);

        if on_segment(px, py, ax, ay, bx, by) {
            return true;
        }
        if (ay > py) != (by > py) {
            let x_cross = ax + (py - ay) * (bx - ax) / (by - ay);
            if px < x_cross {
                inside = !inside;
            }
        }
    }
    inside
}

fn on_segment(px: f64, py: f64, ax: f64, ay: f64, bx: f64, by: f64) -> bool {
    const EPS: f64 = 1e-9;
    let cross = (bx - ax) * (py - ay) - (by - ay) * (px - ax);
    if cross.abs() > EPS * ((bx - ax).abs() + (by - ay).abs()).max(1.0) {
        return false;
    }
    px >= ax.min(bx) - EPS && px <= ax.max(bx) + EPS && py >= ay.min(by) - EPS && py <= ay.max(by) + EPS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::vector::Vec3;

    fn unit_square() -> Vec<Point3d> {
        vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(1.0, 1.0, 0.0),
            Point3d::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_ray_plane_hit_and_miss() {
        let plane = Plane::new(Vec3::Z, 0.0);
        let down = Ray::new(Point3d::new(0.0, 0.0, 5.0), -Vec3::Z);
        assert!((ray_plane(&down, &plane).unwrap() - 5.0).abs() < 1e-12);

        let up = Ray::new(Point3d::new(0.0, 0.0, 5.0), Vec3::Z);
        assert!(ray_plane(&up, &plane).is_none());

        let sideways = Ray::new(Point3d::new(0.0, 0.0, 5.0), Vec3::X);
        assert!(ray_plane(&sideways, &plane).is_none());
    }

    #[test]
    fn test_ray_polygon() {
        let plane = Plane::new(Vec3::Z, 0.0);
        let square = unit_square();
        let hit = Ray::new(Point3d::new(0.5, 0.5, 2.0), -Vec3::Z);
        assert!((ray_polygon(&hit, &plane, &square).unwrap() - 2.0).abs() < 1e-12);

        let miss = Ray::new(Point3d::new(1.5, 0.5, 2.0), -Vec3::Z);
        assert!(ray_polygon(&miss, &plane, &square).is_none());
    }

    #[test]
    fn test_contains_point_on_edge() {
        let plane = Plane::new(Vec3::Z, 0.0);
        assert!(polygon_contains_point(&Point3d::new(1.0, 0.5, 0.0), &plane, &unit_square()));
        assert!(polygon_contains_point(&Point3d::new(0.0, 0.0, 0.0), &plane, &unit_square()));
    }

    #[test]
    fn test_contains_point_vertical_polygon() {
        let plane = Plane::new(Vec3::X, 2.0);
        let square = vec![
            Point3d::new(2.0, 0.0, 0.0),
            Point3d::new(2.0, 1.0, 0.0),
            Point3d::new(2.0, 1.0, 1.0),
            Point3d::new(2.0, 0.0, 1.0),
        ];
        assert!(polygon_contains_point(&Point3d::new(2.0, 0.25, 0.75), &plane, &square));
        assert!(!polygon_contains_point(&Point3d::new(2.0, 1.25, 0.75), &plane, &square));
    }
}

//! Property-based tests for face and UV system invariants using the `proptest` crate.

use proptest::prelude::*;

use brush_kernel::geometry::point::Point3d;
use brush_kernel::geometry::transform::{BoundingBox, Transform};
use brush_kernel::geometry::vector::{Vec2, Vec3};
use brush_kernel::{Brush, BrushFace, BrushFaceAttributes, FlipDirection, KernelError, MapFormat};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

/// Arbitrary 3D coordinate tuple in a reasonable floating-point range.
fn arb_point() -> impl Strategy<Value = (f64, f64, f64)> {
    (-1000.0f64..1000.0, -1000.0f64..1000.0, -1000.0f64..1000.0)
}

/// Arbitrary translation offsets.
fn arb_translation() -> impl Strategy<Value = (f64, f64, f64)> {
    (-1000.0f64..1000.0, -1000.0f64..1000.0, -1000.0f64..1000.0)
}

/// Arbitrary positive dimension suitable for box extents (avoids degenerate zero-size).
fn arb_positive_dim() -> impl Strategy<Value = f64> {
    1.0f64..256.0
}

/// Small integer coordinates, so that derived points stay exactly representable.
fn arb_grid_point() -> impl Strategy<Value = (i32, i32, i32)> {
    (-100i32..100, -100i32..100, -100i32..100)
}

/// Texture attributes on the grid the editor snaps them to: whole degrees,
/// quarter scales and sixteenth offsets.
fn arb_attributes() -> impl Strategy<Value = BrushFaceAttributes> {
    (
        -179i32..=180,
        1i32..=16,
        any::<bool>(),
        1i32..=16,
        any::<bool>(),
        -256i32..256,
        -256i32..256,
    )
        .prop_map(|(rotation, sx, flip_x, sy, flip_y, ox, oy)| {
            let sign = |flip: bool| if flip { -1.0 } else { 1.0 };
            let mut attributes = BrushFaceAttributes::new("base/wall");
            attributes.set_rotation(f64::from(rotation));
            attributes.set_scale(Vec2::new(
                sign(flip_x) * f64::from(sx) / 4.0,
                sign(flip_y) * f64::from(sy) / 4.0,
            ));
            attributes.set_offset(Vec2::new(f64::from(ox) / 16.0, f64::from(oy) / 16.0));
            attributes
        })
}

fn arb_format() -> impl Strategy<Value = MapFormat> {
    prop_oneof![
        Just(MapFormat::Standard),
        Just(MapFormat::Quake2),
        Just(MapFormat::Valve),
        Just(MapFormat::Quake3Valve),
    ]
}

fn arb_direction() -> impl Strategy<Value = FlipDirection> {
    prop_oneof![
        Just(FlipDirection::Left),
        Just(FlipDirection::Right),
        Just(FlipDirection::Up),
        Just(FlipDirection::Down),
    ]
}

fn arb_unit_vector() -> impl Strategy<Value = Vec3> {
    (-1.0f64..1.0, -1.0f64..1.0, -1.0f64..1.0)
        .prop_filter_map("zero vector", |(x, y, z)| Vec3::new(x, y, z).normalized())
}

fn arb_box() -> impl Strategy<Value = BoundingBox> {
    (arb_point(), arb_positive_dim(), arb_positive_dim(), arb_positive_dim()).prop_map(
        |((ox, oy, oz), dx, dy, dz)| {
            BoundingBox::new(Point3d::new(ox, oy, oz), Point3d::new(ox + dx, oy + dy, oz + dz))
        },
    )
}

/// Distance between two texture coordinates once whole texture repeats are ignored.
fn wrapped_distance(a: Vec2, b: Vec2) -> f64 {
    let d = a - b;
    (d.x - d.x.round()).abs().max((d.y - d.y.round()).abs())
}

fn spans_plane(p0: &Point3d, p1: &Point3d, p2: &Point3d) -> bool {
    let a = *p2 - *p0;
    let b = *p1 - *p0;
    a.length() > 1.0 && b.length() > 1.0 && a.cross(&b).length() / (a.length() * b.length()) > 1e-2
}

const TOL: f64 = 1e-6;

// ---------------------------------------------------------------------------
// 1. Plane from points: unit normal from the winding, all points on the plane
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn plane_from_points_contains_points(
        (ax, ay, az) in arb_point(),
        (bx, by, bz) in arb_point(),
        (cx, cy, cz) in arb_point(),
        format in arb_format(),
    ) {
        let (p0, p1, p2) = (Point3d::new(ax, ay, az), Point3d::new(bx, by, bz), Point3d::new(cx, cy, cz));
        prop_assume!(spans_plane(&p0, &p1, &p2));

        let face = BrushFace::create(p0, p1, p2, &BrushFaceAttributes::default(), format).unwrap();
        let [q0, q1, q2] = *face.points();
        let expected = (q2 - q0).cross(&(q1 - q0)).normalized().unwrap();

        prop_assert!((face.normal().length() - 1.0).abs() < TOL);
        prop_assert!((face.normal() - expected).length() < TOL,
            "normal {:?} != {:?}", face.normal(), expected);
        for q in [q0, q1, q2] {
            let d = face.boundary().point_distance(&q);
            prop_assert!(d.abs() < TOL, "point {:?} is {} off the plane", q, d);
        }
    }
}

// ---------------------------------------------------------------------------
// 2. Collinear or coincident points never make a face
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn collinear_points_are_rejected(
        (x, y, z) in arb_grid_point(),
        (dx, dy, dz) in (-10i32..10, -10i32..10, -10i32..10),
        t1 in -10i32..10,
        t2 in -10i32..10,
        format in arb_format(),
    ) {
        let p0 = Point3d::new(f64::from(x), f64::from(y), f64::from(z));
        let d = Vec3::new(f64::from(dx), f64::from(dy), f64::from(dz));
        let p1 = p0 + d * f64::from(t1);
        let p2 = p0 + d * f64::from(t2);

        let result = BrushFace::create(p0, p1, p2, &BrushFaceAttributes::default(), format);
        prop_assert!(matches!(result, Err(KernelError::InvalidFace { .. })), "{:?}", result);
    }
}

// ---------------------------------------------------------------------------
// 3. Paraxial -> parallel -> paraxial keeps every vertex's texture coordinates
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn paraxial_parallel_round_trip(
        bounds in arb_box(),
        attributes in arb_attributes(),
    ) {
        let brush = Brush::cuboid(&bounds, &attributes, MapFormat::Standard).unwrap();
        for face in brush.faces() {
            let vertices = face.vertex_positions(brush.geometry());

            let mut parallel = face.clone();
            parallel.convert_to_parallel();
            prop_assert!(parallel.uv_coord_system().is_parallel());

            let mut paraxial = parallel.clone();
            paraxial.convert_to_paraxial();
            prop_assert!(!paraxial.uv_coord_system().is_parallel());

            for vertex in &vertices {
                let original = face.uv_coords(vertex);
                prop_assert!(wrapped_distance(original, parallel.uv_coords(vertex)) < TOL);
                prop_assert!(wrapped_distance(original, paraxial.uv_coords(vertex)) < TOL);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// 4. The identity transform changes neither the plane nor the texture
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn identity_transform_is_a_no_op(
        (ax, ay, az) in arb_point(),
        (bx, by, bz) in arb_point(),
        (cx, cy, cz) in arb_point(),
        attributes in arb_attributes(),
        format in arb_format(),
        lock_alignment in any::<bool>(),
    ) {
        let (p0, p1, p2) = (Point3d::new(ax, ay, az), Point3d::new(bx, by, bz), Point3d::new(cx, cy, cz));
        prop_assume!(spans_plane(&p0, &p1, &p2));

        let face = BrushFace::create(p0, p1, p2, &attributes, format).unwrap();
        let mut moved = face.clone();
        moved.transform(&Transform::identity(), lock_alignment, None).unwrap();

        prop_assert_eq!(moved.points(), face.points());
        prop_assert!((moved.normal() - face.normal()).length() < TOL);
        for q in face.points() {
            let (before, after) = (face.uv_coords(q), moved.uv_coords(q));
            prop_assert!(wrapped_distance(before, after) < TOL,
                "uv at {:?} moved from {:?} to {:?}", q, before, after);
        }
    }
}

// ---------------------------------------------------------------------------
// 5. Flipping twice in the same direction restores the attributes
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn flip_is_an_involution(
        bounds in arb_box(),
        attributes in arb_attributes(),
        format in arb_format(),
        camera_right in arb_unit_vector(),
        direction in arb_direction(),
    ) {
        let brush = Brush::cuboid(&bounds, &attributes, format).unwrap();
        let camera_up = Vec3::Z;
        for face in brush.faces() {
            let mut flipped = face.clone();
            flipped.flip_uv(&camera_up, &camera_right, direction);
            prop_assert_ne!(flipped.attributes().scale(), face.attributes().scale());
            flipped.flip_uv(&camera_up, &camera_right, direction);
            prop_assert_eq!(flipped.attributes(), face.attributes());
        }
    }
}

// ---------------------------------------------------------------------------
// 6. Resetting the UV cache is idempotent
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn uv_cache_reset_is_idempotent(
        (ax, ay, az) in arb_point(),
        (bx, by, bz) in arb_point(),
        (cx, cy, cz) in arb_point(),
        attributes in arb_attributes(),
        format in arb_format(),
    ) {
        let (p0, p1, p2) = (Point3d::new(ax, ay, az), Point3d::new(bx, by, bz), Point3d::new(cx, cy, cz));
        prop_assume!(spans_plane(&p0, &p1, &p2));

        let mut face = BrushFace::create(p0, p1, p2, &attributes, format).unwrap();
        face.reset_uv_coord_system_cache();
        let once = face.uv_coord_system().clone();
        face.reset_uv_coord_system_cache();
        prop_assert_eq!(face.uv_coord_system(), &once);
    }
}

// ---------------------------------------------------------------------------
// 7. Translating a box with locked alignment keeps the texture on its vertices
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn locked_translation_keeps_vertex_uvs(
        bounds in arb_box(),
        attributes in arb_attributes(),
        format in arb_format(),
        (tx, ty, tz) in arb_translation(),
    ) {
        let before = Brush::cuboid(&bounds, &attributes, format).unwrap();
        let mut after = before.clone();
        let translation = Transform::translation(tx, ty, tz);
        after.transform(&translation, true).unwrap();

        for face in before.faces() {
            let index = after.find_face(&face.normal()).unwrap();
            let moved = &after.faces()[index];
            for vertex in face.vertex_positions(before.geometry()) {
                let (old, new) = (face.uv_coords(&vertex), moved.uv_coords(&translation.transform_point(&vertex)));
                // offsets are stored to four decimals
                prop_assert!(wrapped_distance(old, new) < 1e-4,
                    "uv at {:?} moved from {:?} to {:?}", vertex, old, new);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// 8. Box brushes are closed solids: V - E + F = 2
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn box_euler_formula(
        bounds in arb_box(),
        format in arb_format(),
    ) {
        let brush = Brush::cuboid(&bounds, &BrushFaceAttributes::default(), format).unwrap();
        let geometry = brush.geometry();
        let (v, e, f) = (geometry.vertex_count(), geometry.edge_count(), geometry.face_count());

        prop_assert_eq!(v, 8, "expected 8 vertices, got {}", v);
        prop_assert_eq!(e, 12, "expected 12 edges, got {}", e);
        prop_assert_eq!(f, 6, "expected 6 faces, got {}", f);
        prop_assert!(geometry.audit(TOL).all_valid());

        // face points snap to integers within a thousandth
        let bb = brush.bounds();
        prop_assert!((bb.min - bounds.min).length() < 2e-3);
        prop_assert!((bb.max - bounds.max).length() < 2e-3);
    }
}

// ---------------------------------------------------------------------------
// 9. Every attached face is coplanar with its own plane
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn face_is_coplanar_with_own_plane(
        bounds in arb_box(),
        format in arb_format(),
        (nx, ny, nz) in (-1.0f64..1.0, -1.0f64..1.0, -1.0f64..1.0),
    ) {
        let mut brush = Brush::cuboid(&bounds, &BrushFaceAttributes::default(), format).unwrap();

        // cut a corner off so that some faces are not axis-aligned
        let normal = Vec3::new(nx, ny, nz);
        prop_assume!(normal.length() > 0.1);
        let normal = normal.normalized().unwrap();
        let helper = if normal.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
        let u = normal.cross(&helper).normalized().unwrap();
        let v = normal.cross(&u);
        let anchor = bounds.center();
        let cut = BrushFace::create(anchor, anchor + v, anchor + u, &BrushFaceAttributes::default(), format);
        prop_assume!(cut.is_ok());
        prop_assume!(brush.clip(cut.unwrap()).is_ok());

        for face in brush.faces() {
            prop_assert!(face.coplanar_with(brush.geometry(), face.boundary()));
        }
    }
}

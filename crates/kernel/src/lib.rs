pub mod error;
pub mod geometry;
pub mod model;
pub mod topology;

// Re-export the types most callers need at crate root for convenience.
pub use error::{KernelError, Result};
pub use geometry::curves::Ray;
pub use geometry::plane::Plane;
pub use geometry::point::Point3d;
pub use geometry::transform::{BoundingBox, Transform};
pub use geometry::vector::{Vec2, Vec3};
pub use model::attributes::{BrushFaceAttributes, Color};
pub use model::brush::Brush;
pub use model::face::{BrushFace, FlipDirection};
pub use model::map_format::MapFormat;
pub use model::marks::RenderMarks;
pub use model::material::{EmbeddedDefaults, Material, Texture};
pub use model::tags::{SmartTag, TagMask, TagMatcher};
pub use model::uv::{UvCoordSystem, UvCoordSystemSnapshot, WrapStyle};
pub use topology::brep::{BrushGeometry, FaceId};

/// Global tolerance configuration for geometric comparisons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Values below this are treated as zero (scales, seam directions, offsets).
    pub almost_zero: f64,
    /// Sine of the smallest angle two edge vectors may enclose before they are
    /// considered collinear.
    pub colinear: f64,
    /// Distance from an integer within which coordinates snap to it.
    pub correct: f64,
    /// Half-thickness of a plane when classifying points as on, above or below it.
    pub point_status: f64,
    /// Tolerance used when snapping normals to a world axis.
    pub normal_snap: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            almost_zero: 1e-3,
            colinear: 1e-5,
            correct: 1e-3,
            point_status: 1e-3,
            normal_snap: 0.01,
        }
    }
}

impl Tolerance {
    pub fn points_coincident(&self, a: &Point3d, b: &Point3d) -> bool {
        a.distance_to(b) < self.point_status
    }

    pub fn is_zero(&self, value: f64) -> bool {
        value.abs() < self.almost_zero
    }

    /// Whether two unit normals point the same way within the colinearity tolerance.
    pub fn normals_parallel(&self, a: &Vec3, b: &Vec3) -> bool {
        1.0 - a.dot(b) < self.colinear
    }
}

/// Thread-local default tolerance.
pub fn default_tolerance() -> Tolerance {
    Tolerance::default()
}

use crate::geometry::point::Point3d;

/// Recoverable failures of brush and face construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KernelError {
    #[error("brush has invalid face: points {points:?} are collinear")]
    InvalidFace { points: [Point3d; 3] },

    #[error("brush is incomplete: {reason}")]
    IncompleteBrush { reason: String },

    #[error("brush is empty: every face was clipped away")]
    EmptyBrush,

    #[error("face index {index} out of range (brush has {count} faces)")]
    FaceIndexOutOfRange { index: usize, count: usize },
}

pub type Result<T, E = KernelError> = std::result::Result<T, E>;

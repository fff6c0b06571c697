pub mod curves;
pub mod intersection;
pub mod plane;
pub mod point;
pub mod scalar;
pub mod transform;
pub mod vector;

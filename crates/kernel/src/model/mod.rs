pub mod attributes;
pub mod brush;
pub mod face;
pub mod map_format;
pub mod marks;
pub mod material;
pub mod tags;
pub mod uv;

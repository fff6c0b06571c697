use serde::{Deserialize, Serialize};

use crate::geometry::scalar;
use crate::geometry::vector::Vec2;

/// An RGBA color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Per-face texturing and surface attributes.
///
/// Every setter reports whether the stored value actually changed so that callers
/// can skip redundant work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrushFaceAttributes {
    material_name: String,
    offset: Vec2,
    scale: Vec2,
    rotation: f64,
    surface_contents: Option<i32>,
    surface_flags: Option<i32>,
    surface_value: Option<f32>,
    color: Option<Color>,
}

impl Default for BrushFaceAttributes {
    fn default() -> Self {
        Self::new(Self::NO_MATERIAL_NAME)
    }
}

impl BrushFaceAttributes {
    pub const NO_MATERIAL_NAME: &'static str = "__TB_empty";

    pub fn new(material_name: impl Into<String>) -> Self {
        Self {
            material_name: material_name.into(),
            offset: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.0,
            surface_contents: None,
            surface_flags: None,
            surface_value: None,
            color: None,
        }
    }

    /// Copies everything except the material name.
    pub fn with_material_name(&self, material_name: impl Into<String>) -> Self {
        Self {
            material_name: material_name.into(),
            ..self.clone()
        }
    }

    pub fn material_name(&self) -> &str {
        &self.material_name
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn x_offset(&self) -> f64 {
        self.offset.x
    }

    pub fn y_offset(&self) -> f64 {
        self.offset.y
    }

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn x_scale(&self) -> f64 {
        self.scale.x
    }

    pub fn y_scale(&self) -> f64 {
        self.scale.y
    }

    /// Rotation in degrees.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn surface_contents(&self) -> Option<i32> {
        self.surface_contents
    }

    pub fn surface_flags(&self) -> Option<i32> {
        self.surface_flags
    }

    pub fn surface_value(&self) -> Option<f32> {
        self.surface_value
    }

    pub fn has_surface_attributes(&self) -> bool {
        self.surface_contents.is_some() || self.surface_flags.is_some() || self.surface_value.is_some()
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Wraps each component of `offset` into `[0, size)`.
    pub fn mod_offset(&self, offset: Vec2, size: Vec2) -> Vec2 {
        Vec2::new(
            offset.x - scalar::snap_down(offset.x, size.x),
            offset.y - scalar::snap_down(offset.y, size.y),
        )
    }

    pub fn set_material_name(&mut self, material_name: &str) -> bool {
        replace(&mut self.material_name, material_name.to_string())
    }

    pub fn set_offset(&mut self, offset: Vec2) -> bool {
        replace(&mut self.offset, offset)
    }

    pub fn set_x_offset(&mut self, x_offset: f64) -> bool {
        replace(&mut self.offset.x, x_offset)
    }

    pub fn set_y_offset(&mut self, y_offset: f64) -> bool {
        replace(&mut self.offset.y, y_offset)
    }

    pub fn set_scale(&mut self, scale: Vec2) -> bool {
        replace(&mut self.scale, scale)
    }

    pub fn set_x_scale(&mut self, x_scale: f64) -> bool {
        replace(&mut self.scale.x, x_scale)
    }

    pub fn set_y_scale(&mut self, y_scale: f64) -> bool {
        replace(&mut self.scale.y, y_scale)
    }

    pub fn set_rotation(&mut self, rotation: f64) -> bool {
        replace(&mut self.rotation, rotation)
    }

    pub fn set_surface_contents(&mut self, contents: Option<i32>) -> bool {
        replace(&mut self.surface_contents, contents)
    }

    pub fn set_surface_flags(&mut self, flags: Option<i32>) -> bool {
        replace(&mut self.surface_flags, flags)
    }

    pub fn set_surface_value(&mut self, value: Option<f32>) -> bool {
        replace(&mut self.surface_value, value)
    }

    pub fn set_color(&mut self, color: Option<Color>) -> bool {
        replace(&mut self.color, color)
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

use std::collections::BTreeSet;

use crate::geometry::vector::Vec2;

/// Surface defaults some engines embed in their texture files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbeddedDefaults {
    #[default]
    None,
    Quake2 { contents: i32, flags: i32, value: i32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    width: usize,
    height: usize,
    embedded_defaults: EmbeddedDefaults,
}

impl Texture {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            embedded_defaults: EmbeddedDefaults::None,
        }
    }

    pub fn with_embedded_defaults(mut self, defaults: EmbeddedDefaults) -> Self {
        self.embedded_defaults = defaults;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f64, self.height as f64)
    }

    pub fn embedded_defaults(&self) -> &EmbeddedDefaults {
        &self.embedded_defaults
    }
}

/// A named material, shared between faces through `Arc`. Loading and caching
/// materials is the asset manager's job.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    name: String,
    texture: Option<Texture>,
    surface_parms: BTreeSet<String>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            texture: None,
            surface_parms: BTreeSet::new(),
        }
    }

    pub fn with_texture(mut self, texture: Texture) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn with_surface_parms<I, S>(mut self, parms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.surface_parms = parms.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }

    pub fn surface_parms(&self) -> &BTreeSet<String> {
        &self.surface_parms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_size() {
        let texture = Texture::new(64, 32);
        assert_eq!(texture.size(), Vec2::new(64.0, 32.0));
        assert_eq!(texture.embedded_defaults(), &EmbeddedDefaults::None);
    }

    #[test]
    fn test_material_builder() {
        let material = Material::new("e1u1/water")
            .with_texture(Texture::new(16, 16).with_embedded_defaults(EmbeddedDefaults::Quake2 {
                contents: 32,
                flags: 0,
                value: 0,
            }))
            .with_surface_parms(["water", "trans"]);
        assert_eq!(material.name(), "e1u1/water");
        assert!(material.surface_parms().contains("water"));
        assert!(matches!(
            material.texture().map(Texture::embedded_defaults),
            Some(EmbeddedDefaults::Quake2 { contents: 32, .. })
        ));
    }
}

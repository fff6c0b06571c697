use serde::{Deserialize, Serialize};

/// The map file dialect a brush is edited for. Only matters to this crate
/// insofar as it decides which UV coordinate system new faces get.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapFormat {
    Unknown,
    Standard,
    Quake2,
    Quake2Valve,
    Quake3,
    Quake3Valve,
    Quake3Legacy,
    Valve,
    Hexen2,
    Daikatana,
}

impl MapFormat {
    pub const ALL: [MapFormat; 10] = [
        MapFormat::Unknown,
        MapFormat::Standard,
        MapFormat::Quake2,
        MapFormat::Quake2Valve,
        MapFormat::Quake3,
        MapFormat::Quake3Valve,
        MapFormat::Quake3Legacy,
        MapFormat::Valve,
        MapFormat::Hexen2,
        MapFormat::Daikatana,
    ];

    /// Whether faces in this format store explicit UV axes.
    pub fn is_parallel_uv_coord_system(self) -> bool {
        matches!(self, MapFormat::Valve | MapFormat::Quake2Valve | MapFormat::Quake3Valve)
    }

    pub fn name(self) -> &'static str {
        match self {
            MapFormat::Unknown => "Unknown",
            MapFormat::Standard => "Standard",
            MapFormat::Quake2 => "Quake2",
            MapFormat::Quake2Valve => "Quake2 (Valve)",
            MapFormat::Quake3 => "Quake3",
            MapFormat::Quake3Valve => "Quake3 (Valve)",
            MapFormat::Quake3Legacy => "Quake3 (legacy)",
            MapFormat::Valve => "Valve",
            MapFormat::Hexen2 => "Hexen2",
            MapFormat::Daikatana => "Daikatana",
        }
    }

    pub fn from_name(name: &str) -> MapFormat {
        Self::ALL
            .into_iter()
            .find(|format| format.name() == name)
            .unwrap_or(MapFormat::Unknown)
    }
}

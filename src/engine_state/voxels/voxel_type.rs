//! # Voxel Types
//!
//! A voxel is a single `u8` type id. Zero is air; every other id is a material
//! and counts as non-empty for face culling. This module names the known
//! materials and maps ids to the colors the mesher writes into vertices.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

/// The raw type id stored for every voxel.
pub type Voxel = u8;

/// The empty voxel.
pub const AIR: Voxel = 0;

/// RGBA color written into mesh vertices.
pub type Color = [f32; 4];

/// Color used for ids the palette does not know about.
pub const FALLBACK_COLOR: Color = [1.0, 0.41, 0.71, 1.0];

/// Enumerates the materials the built-in terrain fill produces.
///
/// The discriminants are the stored voxel ids, so `VoxelType::Stone as Voxel`
/// is what ends up in a chunk's array.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum VoxelType {
    /// Empty space.
    Air = 0,
    /// Topsoil below the surface.
    Dirt = 1,
    /// Bedrock below the dirt layer.
    Stone = 2,
    /// The surface layer.
    Grass = 3,
    /// Fills space below sea level above the surface.
    Water = 4,
}

impl VoxelType {
    /// Every known type, in id order.
    pub const ALL: [VoxelType; 5] = [
        VoxelType::Air,
        VoxelType::Dirt,
        VoxelType::Stone,
        VoxelType::Grass,
        VoxelType::Water,
    ];

    /// Decodes a stored id. Returns `None` for ids without a named type.
    pub fn from_voxel(voxel: Voxel) -> Option<Self> {
        FromPrimitive::from_u8(voxel)
    }

    /// The id stored in chunk arrays for this type.
    pub fn voxel(self) -> Voxel {
        self as Voxel
    }

    /// Human readable name.
    pub fn name(self) -> &'static str {
        match self {
            VoxelType::Air => "Air",
            VoxelType::Dirt => "Dirt",
            VoxelType::Stone => "Stone",
            VoxelType::Grass => "Grass",
            VoxelType::Water => "Water",
        }
    }

    /// Default vertex color for this type.
    pub fn color(self) -> Color {
        match self {
            VoxelType::Air => [0.0, 0.0, 0.0, 0.0],
            VoxelType::Dirt => [0.54, 0.27, 0.07, 1.0],
            VoxelType::Stone => [0.5, 0.5, 0.5, 1.0],
            VoxelType::Grass => [0.3, 0.6, 0.2, 1.0],
            VoxelType::Water => [0.2, 0.4, 0.8, 1.0],
        }
    }
}

/// Maps voxel ids to vertex colors.
///
/// Indexed directly by id; ids past the end of the table resolve to
/// [`FALLBACK_COLOR`].
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            colors: VoxelType::ALL.iter().map(|t| t.color()).collect(),
        }
    }
}

impl Palette {
    /// Builds a palette from an explicit table, indexed by voxel id.
    pub fn from_colors(colors: Vec<Color>) -> Self {
        Palette { colors }
    }

    /// Color for a voxel id.
    pub fn color(&self, voxel: Voxel) -> Color {
        self.colors
            .get(voxel as usize)
            .copied()
            .unwrap_or(FALLBACK_COLOR)
    }
}

//! # Terrain Fill
//!
//! Fills a chunk's voxels from two sampling functions:
//!
//! * a 2D height field, sampled once per (x, z) column, giving the surface height
//! * a 3D cavity field, sampled per voxel, carving caves where it exceeds a threshold
//!
//! Both are plain `noise::NoiseFn` trait objects, so any noise source (or a
//! `noise::Constant` in tests) can stand in for the defaults built by
//! [`TerrainGenerator::from_config`].

use cgmath::Point3;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use crate::config::TerrainConfig;

use super::chunk::{coords, CHUNK_DIMENSION};
use super::voxel_type::{Voxel, VoxelType};

/// A 2D surface sampler.
pub type HeightField = Box<dyn NoiseFn<f64, 2> + Send + Sync>;
/// A 3D cave sampler.
pub type CavityField = Box<dyn NoiseFn<f64, 3> + Send + Sync>;

/// Generates the voxel contents of a chunk from its grid coordinate.
///
/// Shared read-only by every worker; filling a chunk never mutates the generator.
pub struct TerrainGenerator {
    height_field: HeightField,
    cavity_field: CavityField,
    config: TerrainConfig,
}

impl TerrainGenerator {
    /// Builds a generator from explicit sampling functions.
    pub fn new(height_field: HeightField, cavity_field: CavityField, config: TerrainConfig) -> Self {
        TerrainGenerator {
            height_field,
            cavity_field,
            config,
        }
    }

    /// Fractal Perlin height field and Perlin cavity field, seeded from `config`.
    pub fn from_config(config: &TerrainConfig) -> Self {
        let height = Fbm::<Perlin>::new(config.seed)
            .set_octaves(config.octaves.max(1))
            .set_lacunarity(2.0)
            .set_persistence(0.5);
        let cavity = Perlin::new(config.seed.wrapping_add(1));
        Self::new(Box::new(height), Box::new(cavity), config.clone())
    }

    /// The parameters this generator was built with.
    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Surface height of the world column at (`world_x`, `world_z`).
    pub fn surface_height(&self, world_x: i32, world_z: i32) -> i32 {
        let scale = self.config.world_scale;
        let sample = self
            .height_field
            .get([world_x as f64 * scale, world_z as f64 * scale]);
        self.config.sea_level + (sample * self.config.terrain_amplitude) as i32
    }

    /// Material of a single world voxel, given its column's surface height.
    pub fn voxel_at(&self, world: Point3<i32>, surface_height: i32) -> Voxel {
        let scale = self.config.world_scale;
        let cavity = self.cavity_field.get([
            world.x as f64 * scale,
            world.y as f64 * scale,
            world.z as f64 * scale,
        ]);
        if cavity > self.config.cave_threshold {
            return VoxelType::Air.voxel();
        }

        let voxel_type = if world.y > surface_height {
            if world.y <= self.config.sea_level {
                VoxelType::Water
            } else {
                VoxelType::Air
            }
        } else if world.y == surface_height {
            VoxelType::Grass
        } else if world.y > surface_height - self.config.dirt_depth {
            VoxelType::Dirt
        } else {
            VoxelType::Stone
        };
        voxel_type.voxel()
    }

    /// Fills a chunk's voxel array (x-fastest layout) for the chunk at `position`.
    pub fn fill_chunk(&self, position: Point3<i32>, voxels: &mut [Voxel]) {
        for z in 0..CHUNK_DIMENSION {
            for x in 0..CHUNK_DIMENSION {
                let column = coords::to_world(position, x, 0, z);
                let surface_height = self.surface_height(column.x, column.z);
                for y in 0..CHUNK_DIMENSION {
                    let world = coords::to_world(position, x, y, z);
                    voxels[coords::local_index(x, y, z)] = self.voxel_at(world, surface_height);
                }
            }
        }
    }
}

//! # World Module
//!
//! This module provides the `World` struct: the shared chunk store that the
//! owning thread edits and the meshing workers read.
//!
//! ## Architecture
//!
//! The world is a sparse map from chunk grid coordinate to chunk, wrapped in an
//! [`MtResource`]. `World` itself is a cheap handle: cloning it shares the map,
//! which is how the worker pool gets access to the same chunks as the owner.
//!
//! ## Locking
//!
//! Every operation here holds at most one lock at a time. The map lock is held
//! only long enough to clone a chunk's handle, and the chunk lock is taken after
//! the map lock is released. Building a padded buffer visits the chunk and its
//! neighbors one after another rather than holding their guards together, so a
//! writer queued on one chunk can never wait on a reader that is itself waiting
//! on another chunk.

use cgmath::Point3;

use crate::core::MtResource;

use super::chunk::padded::PaddedVoxelBuffer;
use super::chunk::{coords, Chunk, ChunkMap, CHUNK_DIMENSION};
use super::terrain::TerrainGenerator;
use super::voxel_type::{Voxel, AIR};

/// Represents a voxel world composed of multiple chunks.
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use voxel_mesh_engine::World;
///
/// let world = World::new();
/// world.add_chunk_at(Point3::new(0, 0, 0));
/// assert!(world.set_world_voxel(Point3::new(3, 4, 5), 2));
/// assert_eq!(world.get_world_voxel(Point3::new(3, 4, 5)), 2);
/// ```
#[derive(Clone)]
pub struct World {
    chunks: MtResource<ChunkMap>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Creates a new, empty world.
    pub fn new() -> Self {
        World {
            chunks: MtResource::new(ChunkMap::new()),
        }
    }

    /// Adds an all-air, not yet generated chunk at the given chunk coordinates.
    ///
    /// If a chunk already exists at the specified position, this method does nothing.
    ///
    /// # Returns
    /// `true` if a chunk was inserted.
    pub fn add_chunk_at(&self, position: Point3<i32>) -> bool {
        let mut chunks = self.chunks.get_mut();
        if chunks.contains_key(&position) {
            return false;
        }
        let chunk = Chunk::new(self.chunks.downgrade(), position);
        chunks.insert(position, MtResource::new(chunk));
        true
    }

    /// Removes the chunk at the given position.
    ///
    /// Workers that already cloned the chunk's handle finish with it; new lookups
    /// treat the position as unloaded.
    ///
    /// # Returns
    /// `true` if a chunk was removed.
    pub fn remove_chunk_at(&self, position: Point3<i32>) -> bool {
        self.chunks.get_mut().remove(&position).is_some()
    }

    /// Retrieves a handle to the chunk at the specified chunk coordinates.
    pub fn get_chunk_at(&self, position: Point3<i32>) -> Option<MtResource<Chunk>> {
        self.chunks.get().get(&position).cloned()
    }

    /// Whether a chunk is loaded at `position`.
    pub fn contains(&self, position: Point3<i32>) -> bool {
        self.chunks.get().contains_key(&position)
    }

    /// Number of loaded chunks.
    pub fn len(&self) -> usize {
        self.chunks.get().len()
    }

    /// Whether no chunks are loaded.
    pub fn is_empty(&self) -> bool {
        self.chunks.get().is_empty()
    }

    /// Positions of every loaded chunk, sorted by (x, y, z).
    pub fn positions(&self) -> Vec<Point3<i32>> {
        let mut positions: Vec<_> = self.chunks.get().keys().copied().collect();
        positions.sort_by_key(|p| (p.x, p.y, p.z));
        positions
    }

    /// Reads a voxel addressed relative to a chunk. Local coordinates may lie
    /// outside the chunk, in which case the owning neighbor is read; voxels in
    /// chunks that are not loaded read as air.
    pub fn get_voxel(&self, chunk: Point3<i32>, x: i32, y: i32, z: i32) -> Voxel {
        self.get_world_voxel(coords::to_world(chunk, x, y, z))
    }

    /// Writes a voxel addressed relative to a chunk. Returns `false` when the
    /// owning chunk is not loaded.
    pub fn set_voxel(&self, chunk: Point3<i32>, x: i32, y: i32, z: i32, voxel: Voxel) -> bool {
        self.set_world_voxel(coords::to_world(chunk, x, y, z), voxel)
    }

    /// Reads a voxel by world voxel coordinate.
    pub fn get_world_voxel(&self, world: Point3<i32>) -> Voxel {
        match self.get_chunk_at(coords::chunk_of(world)) {
            Some(chunk) => chunk.get().get_local(coords::local_of(world)),
            None => AIR,
        }
    }

    /// Writes a voxel by world voxel coordinate. Returns `false` when the owning
    /// chunk is not loaded.
    pub fn set_world_voxel(&self, world: Point3<i32>, voxel: Voxel) -> bool {
        let Some(chunk) = self.get_chunk_at(coords::chunk_of(world)) else {
            return false;
        };
        let local = coords::local_of(world);
        chunk.get_mut().set_voxel(local.x, local.y, local.z, voxel);
        true
    }

    /// Runs the terrain fill for a chunk if it has not run yet.
    ///
    /// # Returns
    /// `None` if the chunk is not loaded, otherwise whether this call generated it.
    pub fn prepare_chunk(&self, position: Point3<i32>, terrain: &TerrainGenerator) -> Option<bool> {
        let chunk = self.get_chunk_at(position)?;
        let generated = chunk.get_mut().prepare(terrain);
        Some(generated)
    }

    /// Copies a chunk and a one voxel halo from its 26 neighbors into a padded buffer.
    ///
    /// Halo cells whose chunk is not loaded are air.
    ///
    /// # Returns
    /// `None` if the chunk itself is not loaded.
    pub fn build_padded_buffer(&self, position: Point3<i32>) -> Option<PaddedVoxelBuffer> {
        let center = self.get_chunk_at(position)?;
        let mut buffer = PaddedVoxelBuffer::new(CHUNK_DIMENSION as usize);

        {
            let chunk = center.get();
            for z in 0..CHUNK_DIMENSION {
                for y in 0..CHUNK_DIMENSION {
                    for x in 0..CHUNK_DIMENSION {
                        buffer.set(x, y, z, chunk.get_local(Point3::new(x, y, z)));
                    }
                }
            }
        }

        for dz in -1..=1 {
            for dy in -1..=1 {
                for dx in -1..=1 {
                    if (dx, dy, dz) == (0, 0, 0) {
                        continue;
                    }
                    let neighbor_position = Point3::new(position.x + dx, position.y + dy, position.z + dz);
                    let Some(neighbor) = self.get_chunk_at(neighbor_position) else {
                        continue;
                    };
                    let neighbor = neighbor.get();
                    for z in halo_range(dz) {
                        for y in halo_range(dy) {
                            for x in halo_range(dx) {
                                let local = Point3::new(
                                    x.rem_euclid(CHUNK_DIMENSION),
                                    y.rem_euclid(CHUNK_DIMENSION),
                                    z.rem_euclid(CHUNK_DIMENSION),
                                );
                                buffer.set(x, y, z, neighbor.get_local(local));
                            }
                        }
                    }
                }
            }
        }

        Some(buffer)
    }
}

/// The padded coordinates along one axis that a neighbor at offset `d` covers.
fn halo_range(d: i32) -> std::ops::Range<i32> {
    match d {
        -1 => -1..0,
        0 => 0..CHUNK_DIMENSION,
        _ => CHUNK_DIMENSION..CHUNK_DIMENSION + 1,
    }
}

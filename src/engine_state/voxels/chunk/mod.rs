//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a fixed-size cube of voxel ids
//! addressed by a chunk grid coordinate.
//!
//! ## Storage
//!
//! Each chunk stores `CHUNK_SIZE` voxel ids in one flat array. X varies fastest,
//! then Y, then Z (see [`coords::local_index`]). Every chunk is the same size, so
//! there is no per-chunk header beyond the position and the generation flag.
//!
//! ## Neighbor Lookups
//!
//! A chunk keeps a weak handle to the chunk map it lives in. Reading a local
//! coordinate outside `[0, CHUNK_DIMENSION)` resolves the owning neighbor through
//! that handle and reads from it; a neighbor that is not loaded reads as air.
//! The handle is weak so a chunk never keeps its own map alive.

use std::collections::HashMap;

use cgmath::Point3;

use crate::core::{MtResource, WeakMtResource};

use super::terrain::TerrainGenerator;
use super::voxel_type::{Voxel, AIR};

pub mod coords;
pub mod padded;

/// The dimension (width, height, depth) of a chunk in voxels.
pub const CHUNK_DIMENSION: i32 = 32;
/// The number of voxels in a single 2D plane of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: i32 = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of voxels in a chunk (CHUNK_DIMENSION³).
pub const CHUNK_SIZE: i32 = CHUNK_PLANE_SIZE * CHUNK_DIMENSION;

/// The shared chunk map every chunk resolves its neighbors through.
pub type ChunkMap = HashMap<Point3<i32>, MtResource<Chunk>>;

/// A `CHUNK_DIMENSION³` cube of voxels in the world.
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not voxel coordinates).
    pub position: Point3<i32>,

    /// Voxel ids, x-fastest.
    voxels: Box<[Voxel]>,

    /// Set once the terrain fill has run, so it never runs twice.
    data_generated: bool,

    /// The map this chunk was inserted into.
    world: WeakMtResource<ChunkMap>,
}

impl Chunk {
    /// Creates an all-air chunk attached to a chunk map.
    ///
    /// # Arguments
    /// * `world` - Weak handle to the map the chunk will be stored in
    /// * `position` - The chunk coordinates of the new chunk
    pub fn new(world: WeakMtResource<ChunkMap>, position: Point3<i32>) -> Self {
        Chunk {
            position,
            voxels: vec![AIR; CHUNK_SIZE as usize].into_boxed_slice(),
            data_generated: false,
            world,
        }
    }

    /// Creates an all-air chunk that belongs to no map.
    ///
    /// Out-of-range reads on a detached chunk always return air.
    pub fn detached(position: Point3<i32>) -> Self {
        Self::new(WeakMtResource::dangling(), position)
    }

    /// Whether the terrain fill has already run (or the chunk was marked as filled).
    pub fn is_data_generated(&self) -> bool {
        self.data_generated
    }

    /// Marks the chunk's contents as final so [`Chunk::prepare`] leaves them alone.
    pub fn mark_data_generated(&mut self) {
        self.data_generated = true;
    }

    /// Fills the chunk's terrain if that has not happened yet.
    ///
    /// # Arguments
    /// * `terrain` - The generator to fill from
    ///
    /// # Returns
    /// `true` if this call generated the data, `false` if it was already present.
    pub fn prepare(&mut self, terrain: &TerrainGenerator) -> bool {
        if self.data_generated {
            return false;
        }
        terrain.fill_chunk(self.position, &mut self.voxels);
        self.data_generated = true;
        true
    }

    /// Reads a voxel by chunk-local coordinate.
    ///
    /// Coordinates outside the chunk are resolved through the owning map: the
    /// voxel is read from whichever neighbor owns that world position, or is air
    /// when that neighbor is not loaded.
    ///
    /// The caller's borrow of this chunk is held while the neighbor is read.
    /// Workers building mesh input go through
    /// [`World::build_padded_buffer`](super::world::World::build_padded_buffer)
    /// instead, which never holds two chunk locks at once.
    pub fn get_voxel(&self, x: i32, y: i32, z: i32) -> Voxel {
        if coords::in_bounds(x, y, z) {
            return self.voxels[coords::local_index(x, y, z)];
        }

        let world = coords::to_world(self.position, x, y, z);
        let owner = coords::chunk_of(world);
        let local = coords::local_of(world);

        let Some(map) = self.world.upgrade() else {
            return AIR;
        };
        let neighbor = map.get().get(&owner).cloned();
        match neighbor {
            Some(neighbor) => neighbor.get().get_local(local),
            None => AIR,
        }
    }

    /// Writes a voxel by chunk-local coordinate. The coordinate must be in range.
    pub fn set_voxel(&mut self, x: i32, y: i32, z: i32, voxel: Voxel) {
        debug_assert!(
            coords::in_bounds(x, y, z),
            "set_voxel({x}, {y}, {z}) outside chunk {:?}",
            self.position
        );
        self.voxels[coords::local_index(x, y, z)] = voxel;
    }

    /// Reads an in-range local coordinate without neighbor resolution.
    #[inline]
    pub fn get_local(&self, local: Point3<i32>) -> Voxel {
        self.voxels[coords::local_index(local.x, local.y, local.z)]
    }

    /// Sets every voxel in the chunk to `voxel`.
    pub fn fill(&mut self, voxel: Voxel) {
        self.voxels.fill(voxel);
    }

    /// Number of non-air voxels.
    pub fn solid_count(&self) -> usize {
        self.voxels.iter().filter(|&&v| v != AIR).count()
    }
}

//! Job that generates mesh data for chunks in a background thread.
//!
//! This module contains the `ChunkMeshGenerationTask`, the processor the worker
//! pool runs for every dirty chunk. It keeps the owning thread responsive while
//! terrain fill and greedy meshing run in parallel.

use std::sync::Arc;
use std::time::Duration;

use cgmath::Point3;
use log::debug;
use web_time::Instant;

use crate::engine_state::rendering::meshing::{greedy_mesh, MeshData};
use crate::engine_state::task_management::JobProcessor;
use crate::engine_state::voxels::terrain::TerrainGenerator;
use crate::engine_state::voxels::voxel_type::Palette;
use crate::engine_state::voxels::world::World;
use crate::error::JobError;

/// Generates a chunk's mesh on a worker thread.
///
/// For each position this processor:
/// 1. Fills the chunk's terrain if that has not happened yet
/// 2. Copies the chunk and its one voxel halo into a padded buffer
/// 3. Runs the greedy mesher on the buffer
pub struct ChunkMeshGenerationTask {
    /// Shared handle to the chunk store
    world: World,
    /// Terrain used for lazy fills
    terrain: Arc<TerrainGenerator>,
    /// Vertex colors by voxel id
    palette: Palette,
}

/// The product of one successful mesh job.
#[derive(Debug)]
pub struct ChunkMeshGenerationResult {
    /// The chunk's geometry in chunk-local space
    pub mesh: MeshData,
    /// Whether this job ran the chunk's terrain fill
    pub generated: bool,
    /// Wall time spent in the mesher
    pub mesh_time: Duration,
}

impl ChunkMeshGenerationTask {
    /// Creates a new chunk mesh generation processor.
    ///
    /// # Arguments
    /// * `world` - Handle to the chunk store the jobs read from
    /// * `terrain` - Generator used for chunks whose data is not filled yet
    /// * `palette` - Colors written into the vertices
    pub fn new(world: World, terrain: Arc<TerrainGenerator>, palette: Palette) -> Self {
        ChunkMeshGenerationTask {
            world,
            terrain,
            palette,
        }
    }
}

impl JobProcessor for ChunkMeshGenerationTask {
    type Output = ChunkMeshGenerationResult;

    /// Runs on a worker thread. A chunk removed before or during the job is
    /// reported as [`JobError::ChunkNotLoaded`].
    fn process(&self, position: Point3<i32>) -> Result<ChunkMeshGenerationResult, JobError> {
        let generated = self
            .world
            .prepare_chunk(position, &self.terrain)
            .ok_or(JobError::ChunkNotLoaded(position))?;

        let buffer = self
            .world
            .build_padded_buffer(position)
            .ok_or(JobError::ChunkNotLoaded(position))?;

        let start = Instant::now();
        let mesh = greedy_mesh(&buffer, &self.palette);
        let mesh_time = start.elapsed();

        debug!(
            "Meshed chunk {:?}: {} quads in {:?}{}",
            position,
            mesh.quad_count(),
            mesh_time,
            if generated { " (terrain filled)" } else { "" }
        );

        Ok(ChunkMeshGenerationResult {
            mesh,
            generated,
            mesh_time,
        })
    }
}

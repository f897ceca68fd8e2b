//! # Engine State Module
//!
//! The core engine module that ties voxel storage, meshing and scheduling together.
//!
//! ## Key Components
//!
//! * `EngineState` - The owning-thread facade over every subsystem
//! * `voxels` - Voxel types, chunks, the shared world and the terrain fill
//! * `rendering` - The greedy mesher, the mesh job and the render adapter contract
//! * `task_management` - The worker pool that runs mesh jobs
//! * `scheduler` - The dirty-chunk queue and per-chunk meshing state
//!
//! ## Architecture
//!
//! `EngineState` is driven by one thread. Edits and new chunks mark chunks dirty
//! in the scheduler; each `tick` dispatches the nearest dirty chunks to the
//! worker pool and hands finished meshes to a [`RenderAdapter`]. Workers share
//! the world through a cloned [`World`] handle and never mutate anything but a
//! chunk's first terrain fill.

use std::sync::Arc;

use cgmath::Point3;
use log::{debug, info};
use web_time::Instant;

use crate::config::EngineConfig;
use crate::error::EngineError;

use rendering::tasks::ChunkMeshGenerationTask;
use rendering::RenderAdapter;
use scheduler::{face_neighbors, BoundaryFlags, MeshScheduler, TickReport};
use task_management::WorkerPool;
use viewpoint::ViewpointProvider;
use voxels::chunk::coords;
use voxels::terrain::TerrainGenerator;
use voxels::voxel_type::{Palette, Voxel};
use voxels::world::World;

pub mod rendering;
pub mod scheduler;
pub mod task_management;
pub mod viewpoint;
pub mod voxels;

/// The main state container for the voxel engine.
///
/// # Examples
///
/// ```no_run
/// use cgmath::Point3;
/// use voxel_mesh_engine::{ChunkMeshRegistry, EngineConfig, EngineState};
///
/// let mut engine = EngineState::new(EngineConfig::default()).unwrap();
/// engine.populate(1, 1);
///
/// let mut registry = ChunkMeshRegistry::new();
/// while !engine.is_idle() {
///     engine.tick(&Point3::new(0.0, 0.0, 0.0), &mut registry);
/// }
/// ```
pub struct EngineState {
    /// Settings the engine was created with
    config: EngineConfig,
    /// The voxel world containing all chunk data
    world: World,
    /// Terrain used for lazy fills, shared with the workers
    terrain: Arc<TerrainGenerator>,
    /// Worker pool running mesh jobs
    pool: WorkerPool<ChunkMeshGenerationTask>,
    /// Dirty queue and per-chunk meshing state
    scheduler: MeshScheduler,
}

impl EngineState {
    /// Creates an engine with the default terrain for `config`.
    ///
    /// # Errors
    /// Returns [`EngineError::WorkerSpawn`] if a worker thread cannot be started.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let terrain = TerrainGenerator::from_config(&config.terrain);
        Self::with_terrain(config, terrain)
    }

    /// Creates an engine that fills chunks from a custom terrain generator.
    pub fn with_terrain(config: EngineConfig, terrain: TerrainGenerator) -> Result<Self, EngineError> {
        let world = World::new();
        let terrain = Arc::new(terrain);
        let workers = config.resolved_worker_count();
        let task = ChunkMeshGenerationTask::new(world.clone(), Arc::clone(&terrain), Palette::default());
        let pool = WorkerPool::new(workers, task)?;
        let scheduler = MeshScheduler::new(config.scheduler.clone());

        info!(
            "Engine ready: {} workers, dispatch {} / apply {} per tick, {} outstanding max",
            pool.worker_count(),
            config.scheduler.dispatch_per_tick,
            config.scheduler.apply_per_tick,
            config.scheduler.max_outstanding_jobs
        );

        Ok(EngineState {
            config,
            world,
            terrain,
            pool,
            scheduler,
        })
    }

    /// The configuration the engine was created with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Shared handle to the world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The scheduler, for inspecting chunk states and statistics.
    pub fn scheduler(&self) -> &MeshScheduler {
        &self.scheduler
    }

    /// Adds a chunk and queues it for meshing. Its terrain is filled by the
    /// worker that meshes it.
    ///
    /// # Returns
    /// `false` if a chunk already existed at `coord`.
    pub fn add_chunk(&mut self, coord: Point3<i32>) -> bool {
        if !self.world.add_chunk_at(coord) {
            return false;
        }
        self.scheduler.mark_dirty(coord);
        true
    }

    /// Adds every chunk within `radius` horizontally and `vertical_radius`
    /// vertically of the origin chunk (inclusive), and queues them.
    ///
    /// # Returns
    /// The number of chunks added.
    pub fn populate(&mut self, radius: i32, vertical_radius: i32) -> usize {
        let start = Instant::now();
        let mut added = 0;
        for x in -radius..=radius {
            for y in -vertical_radius..=vertical_radius {
                for z in -radius..=radius {
                    if self.add_chunk(Point3::new(x, y, z)) {
                        added += 1;
                    }
                }
            }
        }
        info!("Populated {added} chunks in {:?}", start.elapsed());
        added
    }

    /// [`EngineState::populate`] with the radii from the configuration.
    pub fn populate_from_config(&mut self) -> usize {
        self.populate(self.config.world_radius, self.config.vertical_radius)
    }

    /// Removes a chunk, tells the adapter to drop its mesh, and queues its
    /// neighbors so their faces along the now-open boundary appear.
    ///
    /// # Returns
    /// `false` if no chunk existed at `coord`.
    pub fn remove_chunk(&mut self, coord: Point3<i32>, adapter: &mut dyn RenderAdapter) -> bool {
        if !self.world.remove_chunk_at(coord) {
            return false;
        }
        self.scheduler.forget(coord);
        adapter.remove_chunk(coord);
        for neighbor in face_neighbors(coord) {
            if self.world.contains(neighbor) {
                self.scheduler.mark_dirty(neighbor);
            }
        }
        true
    }

    /// Queues a chunk for remeshing. No-op while it is already queued or in flight.
    pub fn mark_dirty(&mut self, coord: Point3<i32>) -> bool {
        self.world.contains(coord) && self.scheduler.mark_dirty(coord)
    }

    /// Writes one voxel by world coordinate and queues every chunk whose mesh
    /// can change: the owning chunk, plus each face neighbor whose halo
    /// contains the voxel.
    ///
    /// The owning chunk's terrain is filled first if needed, so the edit is
    /// not overwritten by a later lazy fill. That fill runs here, on the calling
    /// thread, and costs a full O(N³) terrain pass for a chunk no job has
    /// touched yet; later edits to the same chunk skip it.
    ///
    /// # Returns
    /// `false` if the owning chunk is not loaded.
    pub fn edit_voxel(&mut self, world_position: Point3<i32>, voxel: Voxel) -> bool {
        let coord = coords::chunk_of(world_position);
        if self.world.prepare_chunk(coord, &self.terrain).is_none() {
            return false;
        }
        self.world.set_world_voxel(world_position, voxel);

        self.scheduler.mark_dirty(coord);
        let boundary = BoundaryFlags::from_local(coords::local_of(world_position));
        for neighbor in boundary.affected_neighbors(coord) {
            if self.world.contains(neighbor) {
                self.scheduler.mark_dirty(neighbor);
            }
        }
        debug!("Edited voxel {world_position:?} in chunk {coord:?}");
        true
    }

    /// Runs one scheduling tick.
    ///
    /// # Arguments
    /// * `viewpoint` - Read once; nearer chunks are dispatched first
    /// * `adapter` - Receives every mesh applied this tick
    pub fn tick(&mut self, viewpoint: &impl ViewpointProvider, adapter: &mut dyn RenderAdapter) -> TickReport {
        let viewpoint = viewpoint.viewpoint();
        self.scheduler
            .tick(&self.world, &mut self.pool, viewpoint, adapter)
    }

    /// Whether no chunk is queued, dispatched, or awaiting application.
    pub fn is_idle(&self) -> bool {
        self.scheduler.queued() == 0 && self.scheduler.in_flight() == 0 && self.pool.outstanding() == 0
    }
}

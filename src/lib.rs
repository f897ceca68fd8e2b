#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Mesh Engine
//!
//! A chunked voxel world with a concurrent greedy-meshing pipeline.
//!
//! Voxels live in fixed-size cubic chunks held in a shared store. When a chunk
//! changes it is queued as dirty; a scheduler on the owning thread hands the
//! nearest dirty chunks to a pool of worker threads, each of which fills the
//! chunk's terrain on first use, copies the chunk plus a one-voxel halo of its
//! neighbors, and runs a greedy mesher over the copy. Finished meshes go back
//! to the owning thread, which passes them to a [`RenderAdapter`].
//!
//! ## Key Modules
//!
//! * `core` - Shared-ownership primitives used throughout the engine
//! * `config` - JSON-loadable engine settings
//! * `error` - Error types for jobs, configuration and startup
//! * `engine_state` - The world, the mesher, the worker pool and the scheduler
//!
//! ## Usage
//!
//! ```no_run
//! use cgmath::Point3;
//! use voxel_mesh_engine::{ChunkMeshRegistry, EngineConfig, EngineState, VoxelType};
//!
//! voxel_mesh_engine::init_logger();
//!
//! let mut engine = EngineState::new(EngineConfig::default()).unwrap();
//! engine.populate_from_config();
//! engine.edit_voxel(Point3::new(0, 0, 0), VoxelType::Stone.voxel());
//!
//! let mut registry = ChunkMeshRegistry::new();
//! while !engine.is_idle() {
//!     engine.tick(&Point3::new(0.0, 16.0, 0.0), &mut registry);
//! }
//! println!("{} quads", registry.total_quads());
//! ```

pub mod config;
pub mod core;
pub mod engine_state;
pub mod error;

pub use config::{EngineConfig, SchedulerConfig, TerrainConfig};
pub use engine_state::rendering::meshing::{greedy_mesh, ChunkMeshRegistry, RegisteredMesh};
pub use engine_state::rendering::{MeshData, RenderAdapter, Vertex};
pub use engine_state::scheduler::{ChunkMeshState, MeshScheduler, SchedulerStats, TickReport};
pub use engine_state::task_management::{JobOutcome, JobProcessor, WorkerPool};
pub use engine_state::viewpoint::{OrbitViewpoint, ViewpointProvider};
pub use engine_state::voxels::chunk::padded::PaddedVoxelBuffer;
pub use engine_state::voxels::chunk::{Chunk, CHUNK_DIMENSION};
pub use engine_state::voxels::terrain::TerrainGenerator;
pub use engine_state::voxels::voxel_type::{Palette, Voxel, VoxelType, AIR};
pub use engine_state::voxels::world::World;
pub use engine_state::EngineState;
pub use error::{ConfigError, EngineError, JobError};

/// Installs the `env_logger` backend, writing to stdout and filtered by
/// `RUST_LOG`. Safe to call more than once; later calls are ignored.
pub fn init_logger() {
    let _ = env_logger::Builder::new()
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .try_init();
}

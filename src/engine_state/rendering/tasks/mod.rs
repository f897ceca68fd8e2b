//! Background jobs for the rendering system.
//!
//! # Available Jobs
//! - `ChunkMeshGenerationTask`: Fills and meshes chunks in the background

pub mod chunk_mesh_generation_task;

pub use chunk_mesh_generation_task::{ChunkMeshGenerationResult, ChunkMeshGenerationTask};

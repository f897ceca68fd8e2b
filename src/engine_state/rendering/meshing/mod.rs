//! Mesh generation and bookkeeping for voxel rendering.
//!
//! This module handles the conversion of voxel data into triangle meshes and
//! keeps track of the meshes that have been applied.
//!
//! # Architecture
//! - `mesh/`: The greedy meshing algorithm and the [`MeshData`] it produces
//! - [`ChunkMeshRegistry`]: An in-memory [`RenderAdapter`](super::RenderAdapter)
//!   holding the latest mesh per chunk
//!
//! # Performance Considerations
//! - Greedy meshing minimizes vertex count
//! - Meshing is a pure function of its input buffer, so any number of workers
//!   can run it at once

mod mesh;
mod registry;

pub use mesh::*;
pub use registry::{ChunkMeshRegistry, RegisteredMesh};

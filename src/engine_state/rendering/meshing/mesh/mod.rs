//! Mesh generation for voxel rendering.
//!
//! This module converts a chunk's padded voxel buffer into triangle geometry. It
//! implements greedy meshing to reduce the number of vertices and faces by
//! combining coplanar faces with the same voxel type and orientation.
//!
//! # Architecture
//! - [`MeshData`]: The vertices and indices of one chunk
//! - [`Quad`]: A merged rectangle of faces, the unit the mesher emits
//! - [`greedy_mesh`]: The meshing entry point
//!
//! # Usage
//! ```
//! use voxel_mesh_engine::{greedy_mesh, Palette, PaddedVoxelBuffer};
//!
//! let mut buffer = PaddedVoxelBuffer::new(4);
//! buffer.set(0, 0, 0, 2);
//! let mesh = greedy_mesh(&buffer, &Palette::default());
//! assert_eq!(mesh.quad_count(), 6);
//! ```

mod face;
mod greedy;
mod mesh;

pub use face::{FaceOrientation, MaskFace, Quad};
pub use greedy::greedy_mesh;
pub use mesh::MeshData;

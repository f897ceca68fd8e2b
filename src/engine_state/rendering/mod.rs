//! Rendering side of the voxel engine.
//!
//! This module turns chunk voxels into geometry and defines where that geometry
//! goes. It knows nothing about how meshes end up on screen: completed meshes
//! are handed to a [`RenderAdapter`], which owns that concern.

use cgmath::Point3;

pub mod meshing;
pub mod tasks;
mod vertex;

// Re-export commonly used types
pub use meshing::MeshData;
pub use vertex::Vertex;

/// Receives the meshes the engine produces.
///
/// Called only on the owning thread, from `EngineState::tick`.
pub trait RenderAdapter {
    /// A chunk's new mesh is ready.
    ///
    /// # Arguments
    /// * `position` - The chunk's grid coordinate
    /// * `origin` - World-space position of the chunk's minimum corner; mesh
    ///   vertices are relative to it
    /// * `mesh` - The chunk's complete geometry, replacing any previous mesh
    fn apply_mesh(&mut self, position: Point3<i32>, origin: Point3<f32>, mesh: MeshData);

    /// A chunk was removed from the world; drop whatever was built for it.
    fn remove_chunk(&mut self, position: Point3<i32>);
}

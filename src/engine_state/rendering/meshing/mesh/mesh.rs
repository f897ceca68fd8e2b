//! Mesh data produced for a single chunk.
//!
//! A [`MeshData`] is built on a worker, moved to the owning thread once, and
//! handed to the render adapter. Vertices are interleaved and indices are `u32`,
//! four vertices and six indices per quad.

use crate::engine_state::rendering::Vertex;
use crate::engine_state::voxels::voxel_type::Color;

use super::face::Quad;

/// Triangle geometry for one chunk, in chunk-local space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Interleaved vertex records
    pub vertices: Vec<Vertex>,
    /// Triangle list indices into `vertices`
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a quad's four vertices and two triangles.
    ///
    /// # Arguments
    /// * `quad` - The merged face to emit
    /// * `color` - Color written into all four vertices
    pub fn push_quad(&mut self, quad: &Quad, color: Color) {
        let first = self.vertices.len() as u32;
        let normal = quad.normal();
        self.vertices.extend(
            quad.corners()
                .into_iter()
                .map(|position| Vertex::new(position, normal, color)),
        );
        self.indices
            .extend(quad.local_indices().into_iter().map(|i| first + i));
    }

    /// Whether the mesh has no geometry at all.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }

    /// Number of quads emitted.
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Number of triangles in the index list.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// The vertex buffer as raw bytes, ready for upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// The index buffer as raw bytes, ready for upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

//! Vertex data structures for voxel meshes.
//!
//! This module defines the interleaved vertex format produced by the mesher and
//! handed to the render adapter.

use std::mem::{offset_of, size_of};

use crate::engine_state::voxels::voxel_type::Color;

/// A vertex of a chunk mesh, in chunk-local space.
///
/// Plain old data, so a `&[Vertex]` can be reinterpreted as bytes for upload
/// (see [`MeshData::vertex_bytes`](super::meshing::MeshData::vertex_bytes)).
///
/// # Memory Layout
/// - Position: 3x f32 (12 bytes)
/// - Normal: 3x f32 (12 bytes)
/// - Color: 4x f32 (16 bytes)
///
/// Total size: 40 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position relative to the chunk's minimum corner
    pub position: [f32; 3],
    /// Unit normal of the face this vertex belongs to
    pub normal: [f32; 3],
    /// RGBA color from the palette
    pub color: Color,
}

impl Vertex {
    /// Byte distance between consecutive vertices.
    pub const STRIDE: usize = size_of::<Vertex>();
    /// Byte offset of `position` within a vertex.
    pub const POSITION_OFFSET: usize = offset_of!(Vertex, position);
    /// Byte offset of `normal` within a vertex.
    pub const NORMAL_OFFSET: usize = offset_of!(Vertex, normal);
    /// Byte offset of `color` within a vertex.
    pub const COLOR_OFFSET: usize = offset_of!(Vertex, color);

    /// Creates a new vertex.
    pub fn new(position: [f32; 3], normal: [f32; 3], color: Color) -> Self {
        Vertex {
            position,
            normal,
            color,
        }
    }
}

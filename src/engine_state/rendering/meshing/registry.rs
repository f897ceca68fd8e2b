//! Keeps the latest mesh of every chunk, keyed by position.
//!
//! `ChunkMeshRegistry` is the in-memory render adapter: it stands where a GPU
//! upload would, assigning each chunk a stable slot index (reused after the chunk
//! is removed) and holding on to its geometry.

use std::collections::{BTreeSet, HashMap};

use cgmath::Point3;
use log::trace;

use super::super::RenderAdapter;
use super::MeshData;

/// A chunk's registered geometry.
#[derive(Debug, Clone)]
pub struct RegisteredMesh {
    /// Slot assigned to the chunk when its first mesh arrived
    pub slot: u32,
    /// World-space position of the chunk's minimum corner
    pub origin: Point3<f32>,
    /// The most recently applied mesh
    pub mesh: MeshData,
    /// How many meshes have been applied for this chunk
    pub revision: u32,
}

/// Maps chunk positions to their current mesh and slot index.
#[derive(Debug, Default)]
pub struct ChunkMeshRegistry {
    chunk_position_to_mesh: HashMap<Point3<i32>, RegisteredMesh>,
    available_slots: BTreeSet<u32>,
    next_slot: u32,
}

impl ChunkMeshRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_slot(&mut self) -> u32 {
        if let Some(slot) = self.available_slots.pop_first() {
            return slot;
        }
        let slot = self.next_slot;
        self.next_slot += 1;
        slot
    }

    /// The registered mesh for a chunk, if any.
    pub fn get(&self, position: Point3<i32>) -> Option<&RegisteredMesh> {
        self.chunk_position_to_mesh.get(&position)
    }

    /// Number of chunks with a registered mesh.
    pub fn len(&self) -> usize {
        self.chunk_position_to_mesh.len()
    }

    /// Whether no chunk has a registered mesh.
    pub fn is_empty(&self) -> bool {
        self.chunk_position_to_mesh.is_empty()
    }

    /// Total quads across every registered mesh.
    pub fn total_quads(&self) -> usize {
        self.chunk_position_to_mesh
            .values()
            .map(|entry| entry.mesh.quad_count())
            .sum()
    }

    /// Total vertex bytes across every registered mesh.
    pub fn total_vertex_bytes(&self) -> usize {
        self.chunk_position_to_mesh
            .values()
            .map(|entry| entry.mesh.vertex_bytes().len())
            .sum()
    }
}

impl RenderAdapter for ChunkMeshRegistry {
    fn apply_mesh(&mut self, position: Point3<i32>, origin: Point3<f32>, mesh: MeshData) {
        if let Some(entry) = self.chunk_position_to_mesh.get_mut(&position) {
            entry.mesh = mesh;
            entry.origin = origin;
            entry.revision += 1;
            trace!("Chunk {position:?} mesh revision {}", entry.revision);
            return;
        }

        let slot = self.allocate_slot();
        trace!("Chunk {position:?} registered in slot {slot}");
        self.chunk_position_to_mesh.insert(
            position,
            RegisteredMesh {
                slot,
                origin,
                mesh,
                revision: 1,
            },
        );
    }

    fn remove_chunk(&mut self, position: Point3<i32>) {
        if let Some(entry) = self.chunk_position_to_mesh.remove(&position) {
            self.available_slots.insert(entry.slot);
        }
    }
}

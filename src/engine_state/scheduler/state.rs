//! Per-chunk meshing state and boundary tracking.

use cgmath::Point3;

use crate::engine_state::voxels::chunk::CHUNK_DIMENSION;

/// Where a chunk is in the meshing workflow.
///
/// `Clean → QueuedDirty → InFlight → Clean`. At most one job per chunk is ever
/// outstanding because only a `Clean` chunk can be queued.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChunkMeshState {
    /// No remesh pending. Either meshed and current, or never requested.
    #[default]
    Clean,
    /// Waiting in the dirty queue.
    QueuedDirty,
    /// A job for this chunk is running or its result has not been applied yet.
    InFlight,
}

/// The scheduler's bookkeeping for one chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChunkRecord {
    /// Current workflow state
    pub state: ChunkMeshState,
    /// Whether a mesh for this chunk has ever been applied
    pub meshed: bool,
    /// The chunk was removed while its job was in flight; the result must not be applied
    pub stale: bool,
    /// A neighbor's terrain was filled while this chunk's job was in flight
    pub redirty: bool,
}

/// The six face-adjacent chunk offsets, in a fixed order.
pub const FACE_NEIGHBORS: [[i32; 3]; 6] = [
    [-1, 0, 0],
    [1, 0, 0],
    [0, -1, 0],
    [0, 1, 0],
    [0, 0, -1],
    [0, 0, 1],
];

/// Face-adjacent chunk coordinates of `coord`.
pub fn face_neighbors(coord: Point3<i32>) -> impl Iterator<Item = Point3<i32>> {
    FACE_NEIGHBORS
        .into_iter()
        .map(move |[dx, dy, dz]| Point3::new(coord.x + dx, coord.y + dy, coord.z + dz))
}

/// Flags indicating which chunk faces a voxel touches.
///
/// A voxel on a face is part of the neighbor's halo, so editing it changes how
/// that neighbor meshes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoundaryFlags {
    /// Voxel is on the -X face (local x == 0).
    pub neg_x: bool,
    /// Voxel is on the +X face (local x == N - 1).
    pub pos_x: bool,
    /// Voxel is on the -Y face (local y == 0).
    pub neg_y: bool,
    /// Voxel is on the +Y face (local y == N - 1).
    pub pos_y: bool,
    /// Voxel is on the -Z face (local z == 0).
    pub neg_z: bool,
    /// Voxel is on the +Z face (local z == N - 1).
    pub pos_z: bool,
}

impl BoundaryFlags {
    /// Flags for an in-range local coordinate.
    pub fn from_local(local: Point3<i32>) -> Self {
        let last = CHUNK_DIMENSION - 1;
        BoundaryFlags {
            neg_x: local.x == 0,
            pos_x: local.x == last,
            neg_y: local.y == 0,
            pos_y: local.y == last,
            neg_z: local.z == 0,
            pos_z: local.z == last,
        }
    }

    /// Whether the voxel touches any face.
    pub fn any(&self) -> bool {
        self.neg_x || self.pos_x || self.neg_y || self.pos_y || self.neg_z || self.pos_z
    }

    /// Face neighbors of `coord` whose halo contains the voxel.
    pub fn affected_neighbors(&self, coord: Point3<i32>) -> Vec<Point3<i32>> {
        let flags = [
            self.neg_x, self.pos_x, self.neg_y, self.pos_y, self.neg_z, self.pos_z,
        ];
        face_neighbors(coord)
            .zip(flags)
            .filter_map(|(neighbor, touches)| touches.then_some(neighbor))
            .collect()
    }
}

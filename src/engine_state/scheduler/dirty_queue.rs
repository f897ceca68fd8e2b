//! Priority queue of chunks waiting for a remesh.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use cgmath::{MetricSpace, Point3};

use crate::engine_state::voxels::chunk::coords;

/// A queued chunk and its distance from the viewpoint when it was queued.
#[derive(Clone, Copy, Debug)]
struct DirtyEntry {
    coord: Point3<i32>,
    distance: f32,
}

impl PartialEq for DirtyEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DirtyEntry {}

impl PartialOrd for DirtyEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DirtyEntry {
    /// `BinaryHeap` is a max-heap, so the nearest entry must compare greatest.
    /// Equal distances fall back to the coordinate so the pop order never
    /// depends on insertion order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| (other.coord.x, other.coord.y, other.coord.z).cmp(&(self.coord.x, self.coord.y, self.coord.z)))
    }
}

/// Distance from a viewpoint to a chunk's center.
pub fn chunk_distance(coord: Point3<i32>, viewpoint: Point3<f32>) -> f32 {
    coords::chunk_center(coord).distance(viewpoint)
}

/// Chunks pending remesh, nearest first.
///
/// Each coordinate is queued at most once: pushing a coordinate that is already
/// queued is a no-op.
#[derive(Debug, Default)]
pub struct DirtyQueue {
    queue: BinaryHeap<DirtyEntry>,
    in_queue: HashSet<Point3<i32>>,
}

impl DirtyQueue {
    /// Create a new empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a chunk with an explicit distance.
    ///
    /// Returns `true` if the chunk was added, `false` if it was already queued.
    pub fn push(&mut self, coord: Point3<i32>, distance: f32) -> bool {
        if !self.in_queue.insert(coord) {
            return false;
        }
        self.queue.push(DirtyEntry { coord, distance });
        true
    }

    /// Queue a chunk, prioritized by its distance from `viewpoint`.
    pub fn push_toward(&mut self, coord: Point3<i32>, viewpoint: Point3<f32>) -> bool {
        self.push(coord, chunk_distance(coord, viewpoint))
    }

    /// Pop the nearest chunk. Returns `None` if nothing is queued.
    pub fn pop(&mut self) -> Option<Point3<i32>> {
        while let Some(entry) = self.queue.pop() {
            if self.in_queue.remove(&entry.coord) {
                return Some(entry.coord);
            }
        }
        None
    }

    /// Drop a chunk from the queue. Returns `true` if it was queued.
    ///
    /// The heap entry goes too, so pushing the chunk again later queues it at
    /// its new distance only.
    pub fn remove(&mut self, coord: Point3<i32>) -> bool {
        let removed = self.in_queue.remove(&coord);
        if removed {
            self.queue.retain(|entry| entry.coord != coord);
        }
        removed
    }

    /// Recompute every queued chunk's distance against a new viewpoint.
    pub fn reprioritize(&mut self, viewpoint: Point3<f32>) {
        self.queue = self
            .in_queue
            .iter()
            .map(|&coord| DirtyEntry {
                coord,
                distance: chunk_distance(coord, viewpoint),
            })
            .collect();
    }

    /// Whether a chunk is queued.
    pub fn contains(&self, coord: Point3<i32>) -> bool {
        self.in_queue.contains(&coord)
    }

    /// Number of queued chunks.
    pub fn len(&self) -> usize {
        self.in_queue.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.in_queue.is_empty()
    }
}

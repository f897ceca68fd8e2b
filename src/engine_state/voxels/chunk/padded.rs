//! # Padded Voxel Buffer
//!
//! The mesher's input: a chunk's voxels plus a one voxel halo on every face,
//! copied from the neighboring chunks. With the halo in place, faces on the
//! chunk boundary are culled correctly without touching the neighbors' meshes.
//!
//! Coordinates passed to [`PaddedVoxelBuffer::get`] and
//! [`PaddedVoxelBuffer::set`] are chunk-local and range over `-1..=size`, so the
//! interior is addressed exactly as in the chunk itself.

use super::super::voxel_type::{Voxel, AIR};

/// A `(size + 2)³` voxel buffer. X varies fastest, then Y, then Z.
#[derive(Debug, Clone, PartialEq)]
pub struct PaddedVoxelBuffer {
    size: usize,
    voxels: Vec<Voxel>,
}

impl PaddedVoxelBuffer {
    /// An all-air buffer around an interior of edge `size`.
    pub fn new(size: usize) -> Self {
        let padded = size + 2;
        PaddedVoxelBuffer {
            size,
            voxels: vec![AIR; padded * padded * padded],
        }
    }

    /// Builds a buffer by evaluating `f` at every coordinate in `-1..=size`.
    pub fn from_fn(size: usize, mut f: impl FnMut(i32, i32, i32) -> Voxel) -> Self {
        let mut buffer = Self::new(size);
        let max = size as i32;
        for z in -1..=max {
            for y in -1..=max {
                for x in -1..=max {
                    let index = buffer.index(x, y, z);
                    buffer.voxels[index] = f(x, y, z);
                }
            }
        }
        buffer
    }

    /// Edge length of the interior.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Edge length including the halo.
    pub fn padded_size(&self) -> usize {
        self.size + 2
    }

    #[inline]
    fn index(&self, x: i32, y: i32, z: i32) -> usize {
        let padded = self.padded_size();
        debug_assert!(
            [x, y, z].iter().all(|c| (-1..=self.size as i32).contains(c)),
            "padded coordinate ({x}, {y}, {z}) out of range for size {}",
            self.size
        );
        (x + 1) as usize + padded * (y + 1) as usize + padded * padded * (z + 1) as usize
    }

    /// Voxel at a chunk-local coordinate in `-1..=size`.
    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> Voxel {
        self.voxels[self.index(x, y, z)]
    }

    /// Writes a voxel at a chunk-local coordinate in `-1..=size`.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, z: i32, voxel: Voxel) {
        let index = self.index(x, y, z);
        self.voxels[index] = voxel;
    }

    /// Raw storage, halo included.
    pub fn as_slice(&self) -> &[Voxel] {
        &self.voxels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_air() {
        let buffer = PaddedVoxelBuffer::new(4);
        assert_eq!(buffer.padded_size(), 6);
        assert_eq!(buffer.as_slice().len(), 216);
        assert!(buffer.as_slice().iter().all(|&v| v == AIR));
    }

    #[test]
    fn halo_and_interior_are_addressable() {
        let mut buffer = PaddedVoxelBuffer::new(4);
        buffer.set(-1, -1, -1, 1);
        buffer.set(4, 4, 4, 2);
        buffer.set(0, 3, 2, 3);

        assert_eq!(buffer.as_slice()[0], 1);
        assert_eq!(*buffer.as_slice().last().unwrap(), 2);
        assert_eq!(buffer.get(0, 3, 2), 3);
    }

    #[test]
    fn from_fn_visits_every_cell() {
        let buffer = PaddedVoxelBuffer::from_fn(3, |x, y, z| ((x + 1) + (y + 1) + (z + 1)) as Voxel);
        assert_eq!(buffer.get(-1, -1, -1), 0);
        assert_eq!(buffer.get(3, 3, 3), 12);
        assert_eq!(buffer.get(1, 0, -1), 3);
    }
}

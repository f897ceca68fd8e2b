//! # Chunk Coordinate Math
//!
//! Conversions between the three coordinate spaces used by the store:
//!
//! * **world**: integer voxel coordinates, unbounded in both directions
//! * **chunk**: integer grid coordinate of a chunk (`world / CHUNK_DIMENSION`, floored)
//! * **local**: voxel offset inside a chunk, in `[0, CHUNK_DIMENSION)`
//!
//! Division is floored and the remainder is non-negative, so world voxel `-1`
//! lives in chunk `-1` at local `CHUNK_DIMENSION - 1` rather than in chunk `0`.
//! `div_euclid`/`rem_euclid` give exactly that for a positive divisor.

use cgmath::Point3;

use super::{CHUNK_DIMENSION, CHUNK_PLANE_SIZE};

/// Chunk grid coordinate that owns a world voxel coordinate.
pub fn chunk_of(world: Point3<i32>) -> Point3<i32> {
    Point3::new(
        world.x.div_euclid(CHUNK_DIMENSION),
        world.y.div_euclid(CHUNK_DIMENSION),
        world.z.div_euclid(CHUNK_DIMENSION),
    )
}

/// Offset of a world voxel coordinate inside its owning chunk.
pub fn local_of(world: Point3<i32>) -> Point3<i32> {
    Point3::new(
        world.x.rem_euclid(CHUNK_DIMENSION),
        world.y.rem_euclid(CHUNK_DIMENSION),
        world.z.rem_euclid(CHUNK_DIMENSION),
    )
}

/// World voxel coordinate of a (possibly out of range) local offset in a chunk.
pub fn to_world(chunk: Point3<i32>, x: i32, y: i32, z: i32) -> Point3<i32> {
    Point3::new(
        chunk.x * CHUNK_DIMENSION + x,
        chunk.y * CHUNK_DIMENSION + y,
        chunk.z * CHUNK_DIMENSION + z,
    )
}

/// Whether a local offset lies inside a chunk.
#[inline]
pub fn in_bounds(x: i32, y: i32, z: i32) -> bool {
    (0..CHUNK_DIMENSION).contains(&x)
        && (0..CHUNK_DIMENSION).contains(&y)
        && (0..CHUNK_DIMENSION).contains(&z)
}

/// Linear index of an in-range local offset. X varies fastest, then Y, then Z.
#[inline]
pub fn local_index(x: i32, y: i32, z: i32) -> usize {
    (x + CHUNK_DIMENSION * y + CHUNK_PLANE_SIZE * z) as usize
}

/// World-space position of a chunk's minimum corner.
pub fn chunk_origin(chunk: Point3<i32>) -> Point3<f32> {
    Point3::new(
        (chunk.x * CHUNK_DIMENSION) as f32,
        (chunk.y * CHUNK_DIMENSION) as f32,
        (chunk.z * CHUNK_DIMENSION) as f32,
    )
}

/// World-space position of a chunk's center.
pub fn chunk_center(chunk: Point3<i32>) -> Point3<f32> {
    let half = CHUNK_DIMENSION as f32 * 0.5;
    let origin = chunk_origin(chunk);
    Point3::new(origin.x + half, origin.y + half, origin.z + half)
}

/// Chunk grid coordinate containing a world-space point.
pub fn chunk_containing(position: Point3<f32>) -> Point3<i32> {
    let size = CHUNK_DIMENSION as f32;
    Point3::new(
        (position.x / size).floor() as i32,
        (position.y / size).floor() as i32,
        (position.z / size).floor() as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const N: i32 = CHUNK_DIMENSION;

    #[test]
    fn positive_coordinates() {
        assert_eq!(chunk_of(Point3::new(0, 0, 0)), Point3::new(0, 0, 0));
        assert_eq!(chunk_of(Point3::new(N - 1, N, 2 * N)), Point3::new(0, 1, 2));
        assert_eq!(local_of(Point3::new(N + 3, 1, 2 * N)), Point3::new(3, 1, 0));
    }

    #[test]
    fn negative_coordinates_floor() {
        // Truncating division would put -1 in chunk 0.
        assert_eq!(chunk_of(Point3::new(-1, 0, 0)), Point3::new(-1, 0, 0));
        assert_eq!(local_of(Point3::new(-1, 0, 0)), Point3::new(N - 1, 0, 0));

        assert_eq!(chunk_of(Point3::new(-N, -N - 1, 0)), Point3::new(-1, -2, 0));
        assert_eq!(local_of(Point3::new(-N, -N - 1, 0)), Point3::new(0, N - 1, 0));
    }

    #[test]
    fn local_offsets_outside_the_chunk_map_to_neighbors() {
        let world = to_world(Point3::new(-1, 0, 0), -1, 0, 0);
        assert_eq!(chunk_of(world), Point3::new(-2, 0, 0));
        assert_eq!(local_of(world), Point3::new(N - 1, 0, 0));

        let world = to_world(Point3::new(3, -2, 0), 5, N, -1);
        assert_eq!(chunk_of(world), Point3::new(3, -1, -1));
        assert_eq!(local_of(world), Point3::new(5, 0, N - 1));
    }

    #[test]
    fn bounds_and_index() {
        assert!(in_bounds(0, 0, 0));
        assert!(in_bounds(N - 1, N - 1, N - 1));
        assert!(!in_bounds(-1, 0, 0));
        assert!(!in_bounds(0, N, 0));

        assert_eq!(local_index(0, 0, 0), 0);
        assert_eq!(local_index(1, 0, 0), 1);
        assert_eq!(local_index(0, 1, 0), N as usize);
        assert_eq!(local_index(0, 0, 1), (N * N) as usize);
    }

    #[test]
    fn centers_and_containment() {
        let half = N as f32 / 2.0;
        assert_eq!(chunk_center(Point3::new(0, 0, 0)), Point3::new(half, half, half));
        assert_eq!(chunk_containing(Point3::new(-0.5, 0.0, N as f32)), Point3::new(-1, 0, 1));
    }
}

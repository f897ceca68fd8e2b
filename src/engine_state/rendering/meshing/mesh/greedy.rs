//! Greedy meshing implementation for voxel rendering.
//!
//! This module implements the greedy meshing algorithm, which combines adjacent
//! coplanar faces of the same voxel type and orientation into larger quads. Each
//! axis is swept one plane at a time: a 2D mask records the visible faces on
//! that plane, then the mask is consumed row by row into rectangles.
//!
//! The result is deterministic (a fixed sweep order, no hashing) but not a
//! globally minimal set of quads.

use log::trace;

use crate::engine_state::voxels::chunk::padded::PaddedVoxelBuffer;
use crate::engine_state::voxels::voxel_type::{Palette, AIR};

use super::face::{FaceOrientation, MaskFace, Quad};
use super::mesh::MeshData;

/// Builds the face mask for one plane.
///
/// Compares the voxel at `plane` with the voxel at `plane + 1` along `axis` for
/// every `(u, v)` cell. A face exists where exactly one of the two is solid and
/// takes that voxel's type. Plane `-1` compares the halo with the chunk's first
/// layer, so a solid halo voxel facing an empty boundary cell yields a face too.
///
/// # Arguments
/// * `buffer` - The padded voxel buffer being meshed
/// * `axis` - Sweep axis (0 = X, 1 = Y, 2 = Z)
/// * `plane` - Plane index in `-1..size`
/// * `mask` - Output, `size * size` cells, `u` fastest
fn build_mask(buffer: &PaddedVoxelBuffer, axis: usize, plane: i32, mask: &mut [Option<MaskFace>]) {
    let size = buffer.size() as i32;
    let u_axis = (axis + 1) % 3;
    let v_axis = (axis + 2) % 3;

    let mut cursor = [0i32; 3];
    cursor[axis] = plane;
    let mut n = 0;
    for v in 0..size {
        cursor[v_axis] = v;
        for u in 0..size {
            cursor[u_axis] = u;
            let mut ahead = cursor;
            ahead[axis] += 1;

            let near = buffer.get(cursor[0], cursor[1], cursor[2]);
            let far = buffer.get(ahead[0], ahead[1], ahead[2]);

            mask[n] = match (near != AIR, far != AIR) {
                (true, false) => Some(MaskFace {
                    voxel: near,
                    orientation: FaceOrientation::Forward,
                }),
                (false, true) => Some(MaskFace {
                    voxel: far,
                    orientation: FaceOrientation::Backward,
                }),
                _ => None,
            };
            n += 1;
        }
    }
}

/// Consumes a plane's mask into merged quads.
///
/// Scans `v` outer, `u` inner. Each face cell grows a run along `u`, then the run
/// grows along `v` while every cell of the next row matches. Consumed cells are
/// cleared so they are not emitted twice.
///
/// # Arguments
/// * `mask` - The plane's mask; cleared as quads are emitted
/// * `size` - Edge length of the mask
/// * `axis` - Sweep axis the mask was built on
/// * `plane` - Plane index the mask was built on; quads lie on `plane + 1`
/// * `emit` - Called once per quad, in scan order
fn merge_mask(
    mask: &mut [Option<MaskFace>],
    size: usize,
    axis: usize,
    plane: i32,
    mut emit: impl FnMut(Quad),
) {
    for j in 0..size {
        let mut i = 0;
        while i < size {
            let n = i + j * size;
            let Some(face) = mask[n] else {
                i += 1;
                continue;
            };

            let mut width = 1;
            while i + width < size && mask[n + width] == Some(face) {
                width += 1;
            }

            let mut height = 1;
            'rows: while j + height < size {
                for k in 0..width {
                    if mask[n + k + height * size] != Some(face) {
                        break 'rows;
                    }
                }
                height += 1;
            }

            emit(Quad {
                axis,
                plane: plane + 1,
                u: i as i32,
                v: j as i32,
                width: width as i32,
                height: height as i32,
                face,
            });

            for l in 0..height {
                for k in 0..width {
                    mask[n + k + l * size] = None;
                }
            }
            i += width;
        }
    }
}

/// Generates the mesh of a chunk from its padded voxel buffer.
///
/// # Arguments
/// * `buffer` - The chunk's voxels plus a one voxel halo from its neighbors
/// * `palette` - Maps voxel ids to vertex colors
///
/// # Returns
/// Quads for every visible face on the chunk's `N + 1` planes per axis,
/// including halo voxels seen across the chunk boundary, with vertices in
/// chunk-local space. An all-air buffer yields an empty mesh.
///
/// # Performance
/// O(N³) for an edge of N: each of the three axes sweeps N + 1 planes of N²
/// cells, and every mask cell is consumed at most once.
pub fn greedy_mesh(buffer: &PaddedVoxelBuffer, palette: &Palette) -> MeshData {
    let size = buffer.size();
    let mut mesh = MeshData::new();
    let mut mask = vec![None; size * size];

    for axis in 0..3 {
        for plane in -1..size as i32 {
            build_mask(buffer, axis, plane, &mut mask);
            merge_mask(&mut mask, size, axis, plane, |quad| {
                mesh.push_quad(&quad, palette.color(quad.face.voxel));
            });
        }
    }

    trace!(
        "Greedy mesh of size {} produced {} quads",
        size,
        mesh.quad_count()
    );
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::voxel_type::{Voxel, VoxelType, FALLBACK_COLOR};

    fn solid_interior(size: usize, voxel: Voxel) -> PaddedVoxelBuffer {
        let max = size as i32;
        PaddedVoxelBuffer::from_fn(size, |x, y, z| {
            let inside = |c: i32| (0..max).contains(&c);
            if inside(x) && inside(y) && inside(z) {
                voxel
            } else {
                AIR
            }
        })
    }

    fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    fn assert_winding_matches_normals(mesh: &MeshData) {
        for triangle in mesh.indices.chunks(3) {
            let [a, b, c] = [
                mesh.vertices[triangle[0] as usize],
                mesh.vertices[triangle[1] as usize],
                mesh.vertices[triangle[2] as usize],
            ];
            let face_normal = cross(sub(b.position, a.position), sub(c.position, a.position));
            assert!(
                dot(face_normal, a.normal) > 0.0,
                "triangle {triangle:?} winds against its normal {:?}",
                a.normal
            );
        }
    }

    #[test]
    fn empty_buffer_yields_empty_mesh() {
        let mesh = greedy_mesh(&PaddedVoxelBuffer::new(8), &Palette::default());
        assert!(mesh.is_empty());
        assert!(mesh.vertices.is_empty());
        assert!(mesh.indices.is_empty());
    }

    #[test]
    fn solid_cube_is_six_full_quads() {
        let size = 8;
        let stone = VoxelType::Stone.voxel();
        let mesh = greedy_mesh(&solid_interior(size, stone), &Palette::default());

        assert_eq!(mesh.quad_count(), 6);
        assert_eq!(mesh.indices.len(), 36);

        let mut normals: Vec<[f32; 3]> = mesh.vertices.chunks(4).map(|quad| quad[0].normal).collect();
        normals.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let mut expected = vec![
            [1.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, -1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, -1.0],
        ];
        expected.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(normals, expected);

        for quad in mesh.vertices.chunks(4) {
            // Each quad spans the whole face.
            let span = sub(quad[3].position, quad[0].position);
            let extents: Vec<f32> = span.iter().copied().filter(|c| *c != 0.0).collect();
            assert_eq!(extents, vec![size as f32, size as f32]);

            // Outward: a +X face sits on x = size, a -X face on x = 0.
            let axis = quad[0].normal.iter().position(|c| *c != 0.0).unwrap();
            let expected_plane = if quad[0].normal[axis] > 0.0 { size as f32 } else { 0.0 };
            assert!(quad.iter().all(|v| v.position[axis] == expected_plane));
            assert!(quad.iter().all(|v| v.color == VoxelType::Stone.color()));
        }
        assert_winding_matches_normals(&mesh);
    }

    #[test]
    fn row_of_identical_faces_merges_into_one_quad() {
        let size = 8;
        let k = 5;
        let mut buffer = PaddedVoxelBuffer::new(size);
        // A run of k dirt voxels along Y at (x=2, z=3): the +X faces of the run
        // form k adjacent cells along u = Y in the X sweep.
        for y in 0..k {
            buffer.set(2, y, 3, VoxelType::Dirt.voxel());
        }

        let mesh = greedy_mesh(&buffer, &Palette::default());
        let plus_x: Vec<_> = mesh
            .vertices
            .chunks(4)
            .filter(|quad| quad[0].normal == [1.0, 0.0, 0.0])
            .collect();
        assert_eq!(plus_x.len(), 1);
        let span = sub(plus_x[0][3].position, plus_x[0][0].position);
        assert_eq!(span, [0.0, k as f32, 1.0]);
    }

    #[test]
    fn different_types_do_not_merge() {
        let size = 4;
        let mut buffer = PaddedVoxelBuffer::new(size);
        buffer.set(0, 0, 0, VoxelType::Dirt.voxel());
        buffer.set(0, 1, 0, VoxelType::Stone.voxel());

        let mesh = greedy_mesh(&buffer, &Palette::default());
        let plus_x = mesh
            .vertices
            .chunks(4)
            .filter(|quad| quad[0].normal == [1.0, 0.0, 0.0])
            .count();
        assert_eq!(plus_x, 2);
    }

    #[test]
    fn solid_halo_voxel_faces_an_empty_boundary_cell() {
        let size = 4;
        let stone = VoxelType::Stone.voxel();
        let buffer = PaddedVoxelBuffer::from_fn(size, |x, _, _| if x == -1 { stone } else { AIR });

        let mesh = greedy_mesh(&buffer, &Palette::default());
        assert_eq!(mesh.quad_count(), 1);
        let quad = &mesh.vertices[..4];
        assert!(quad.iter().all(|v| v.normal == [1.0, 0.0, 0.0]));
        assert!(quad.iter().all(|v| v.position[0] == 0.0));
        assert_eq!(sub(quad[3].position, quad[0].position), [0.0, size as f32, size as f32]);
        assert!(quad.iter().all(|v| v.color == VoxelType::Stone.color()));
        assert_winding_matches_normals(&mesh);
    }

    #[test]
    fn solid_halo_around_empty_interior_faces_inward() {
        let size = 4;
        let dirt = VoxelType::Dirt.voxel();
        let hollow = PaddedVoxelBuffer::from_fn(size, |x, y, z| {
            let inside = |c: i32| (0..size as i32).contains(&c);
            if inside(x) && inside(y) && inside(z) {
                AIR
            } else {
                dirt
            }
        });
        let mesh = greedy_mesh(&hollow, &Palette::default());
        assert_eq!(mesh.quad_count(), 6);

        for quad in mesh.vertices.chunks(4) {
            let span = sub(quad[3].position, quad[0].position);
            let extents: Vec<f32> = span.iter().copied().filter(|c| *c != 0.0).collect();
            assert_eq!(extents, vec![size as f32, size as f32]);

            // Inward: a +X face sits on x = 0, a -X face on x = size.
            let axis = quad[0].normal.iter().position(|c| *c != 0.0).unwrap();
            let expected_plane = if quad[0].normal[axis] > 0.0 { 0.0 } else { size as f32 };
            assert!(quad.iter().all(|v| v.position[axis] == expected_plane));
        }
        assert_winding_matches_normals(&mesh);

        // Solid halo around a solid interior: nothing is visible.
        let full = PaddedVoxelBuffer::from_fn(size, |_, _, _| dirt);
        assert!(greedy_mesh(&full, &Palette::default()).is_empty());
    }

    #[test]
    fn unknown_types_use_the_fallback_color() {
        let mut buffer = PaddedVoxelBuffer::new(2);
        buffer.set(0, 0, 0, 200);
        let mesh = greedy_mesh(&buffer, &Palette::default());
        assert_eq!(mesh.quad_count(), 6);
        assert!(mesh.vertices.iter().all(|v| v.color == FALLBACK_COLOR));
    }

    #[test]
    fn random_buffers_are_deterministic_and_well_wound() {
        let mut rng = fastrand::Rng::with_seed(7);
        let size = 12;
        let buffer = PaddedVoxelBuffer::from_fn(size, |_, _, _| {
            if rng.f32() < 0.4 {
                rng.u8(1..=4)
            } else {
                AIR
            }
        });

        let palette = Palette::default();
        let first = greedy_mesh(&buffer, &palette);
        let second = greedy_mesh(&buffer, &palette);
        assert_eq!(first, second);
        assert!(!first.is_empty());
        assert_eq!(first.indices.len(), first.quad_count() * 6);
        assert!(first
            .indices
            .iter()
            .all(|&i| (i as usize) < first.vertices.len()));
        assert_winding_matches_normals(&first);
    }

    #[test]
    fn single_voxel_has_six_unit_faces() {
        let mut buffer = PaddedVoxelBuffer::new(3);
        buffer.set(1, 1, 1, VoxelType::Grass.voxel());
        let mesh = greedy_mesh(&buffer, &Palette::default());
        assert_eq!(mesh.quad_count(), 6);
        assert_winding_matches_normals(&mesh);
    }
}

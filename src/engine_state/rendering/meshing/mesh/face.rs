use crate::engine_state::voxels::voxel_type::Voxel;

/// Which way a face points along its sweep axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceOrientation {
    /// The solid voxel is on the lower side of the plane; the face points toward +axis.
    Forward,
    /// The solid voxel is on the upper side of the plane; the face points toward -axis.
    Backward,
}

impl FaceOrientation {
    /// `1.0` for forward faces, `-1.0` for backward faces.
    pub fn sign(self) -> f32 {
        match self {
            FaceOrientation::Forward => 1.0,
            FaceOrientation::Backward => -1.0,
        }
    }
}

/// One cell of a slice mask: the visible face's voxel type and orientation.
///
/// Two cells merge only when both fields are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskFace {
    /// Type of the solid voxel that owns the face
    pub voxel: Voxel,
    /// Side of the plane the face points toward
    pub orientation: FaceOrientation,
}

/// A merged, axis-aligned rectangle of faces lying on one plane.
///
/// Coordinates are in chunk-local voxel units. `u` and `v` are the two axes
/// perpendicular to `axis`, taken cyclically: `u = (axis + 1) % 3`,
/// `v = (axis + 2) % 3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quad {
    /// Sweep axis: 0 = X, 1 = Y, 2 = Z
    pub axis: usize,
    /// Coordinate of the quad's plane along `axis`
    pub plane: i32,
    /// Minimum coordinate along `u`
    pub u: i32,
    /// Minimum coordinate along `v`
    pub v: i32,
    /// Extent along `u`
    pub width: i32,
    /// Extent along `v`
    pub height: i32,
    /// The face type shared by every merged cell
    pub face: MaskFace,
}

impl Quad {
    /// The `u` and `v` axes for this quad's sweep axis.
    pub fn tangent_axes(&self) -> (usize, usize) {
        ((self.axis + 1) % 3, (self.axis + 2) % 3)
    }

    /// Corners in emission order: base, base + du, base + dv, base + du + dv.
    pub fn corners(&self) -> [[f32; 3]; 4] {
        let (u_axis, v_axis) = self.tangent_axes();
        let mut base = [0.0; 3];
        base[self.axis] = self.plane as f32;
        base[u_axis] = self.u as f32;
        base[v_axis] = self.v as f32;

        let mut du = [0.0; 3];
        du[u_axis] = self.width as f32;
        let mut dv = [0.0; 3];
        dv[v_axis] = self.height as f32;

        let add = |a: [f32; 3], b: [f32; 3]| [a[0] + b[0], a[1] + b[1], a[2] + b[2]];
        [base, add(base, du), add(base, dv), add(add(base, du), dv)]
    }

    /// Outward unit normal.
    pub fn normal(&self) -> [f32; 3] {
        let mut normal = [0.0; 3];
        normal[self.axis] = self.face.orientation.sign();
        normal
    }

    /// Triangle indices relative to the quad's first vertex.
    ///
    /// `du × dv` always points toward `+axis`, so forward faces use the corners
    /// in order and backward faces swap the second and third vertex of each
    /// triangle. Either way the triangles are counter-clockwise seen from the
    /// side the normal points to.
    pub fn local_indices(&self) -> [u32; 6] {
        match self.face.orientation {
            FaceOrientation::Forward => [0, 1, 2, 1, 3, 2],
            FaceOrientation::Backward => [0, 2, 1, 1, 2, 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(axis: usize, orientation: FaceOrientation) -> Quad {
        Quad {
            axis,
            plane: 4,
            u: 1,
            v: 2,
            width: 3,
            height: 5,
            face: MaskFace { voxel: 1, orientation },
        }
    }

    #[test]
    fn corners_follow_tangent_axes() {
        // axis Y: u = Z, v = X
        let corners = quad(1, FaceOrientation::Forward).corners();
        assert_eq!(corners[0], [2.0, 4.0, 1.0]);
        assert_eq!(corners[1], [2.0, 4.0, 4.0]);
        assert_eq!(corners[2], [7.0, 4.0, 1.0]);
        assert_eq!(corners[3], [7.0, 4.0, 4.0]);
    }

    #[test]
    fn normals_point_along_orientation() {
        assert_eq!(quad(0, FaceOrientation::Forward).normal(), [1.0, 0.0, 0.0]);
        assert_eq!(quad(2, FaceOrientation::Backward).normal(), [0.0, 0.0, -1.0]);
    }
}

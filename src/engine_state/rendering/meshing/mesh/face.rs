//! Unit-cube tables used to emit one quad per visible voxel face.
//!
//! `CUBE_INDICES` lists, for each face in [`BlockSide`] order, the two
//! triangles of that face as indices into `CUBE_VERTICES`. `UNIQUE_INDICES`
//! picks the four distinct corners out of those six entries and
//! `FACE_INDICES` rebuilds the two triangles from the four emitted vertices.

use cgmath::Point3;

use crate::engine_state::voxels::block::block_side::BlockSide;

/// Corners of the unit cube.
pub const CUBE_VERTICES: [[u32; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [1, 1, 0],
    [0, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [1, 1, 1],
    [0, 1, 1],
];

/// Two triangles per face, in [`BlockSide`] order.
pub const CUBE_INDICES: [[usize; 6]; 6] = [
    [1, 0, 3, 1, 3, 2], // north (-z)
    [4, 5, 6, 4, 6, 7], // south (+z)
    [5, 1, 2, 5, 2, 6], // east (+x)
    [0, 4, 7, 0, 7, 3], // west (-x)
    [2, 3, 7, 2, 7, 6], // up (+y)
    [5, 4, 0, 5, 0, 1], // down (-y)
];

/// Positions within a `CUBE_INDICES` row holding the four distinct corners.
pub const UNIQUE_INDICES: [usize; 4] = [1, 0, 5, 2];

/// Triangle list over the four emitted corners of a quad.
pub const FACE_INDICES: [u32; 6] = [1, 0, 3, 1, 3, 2];

/// Cube corner offsets of a face, in emission order.
pub fn face_corners(side: BlockSide) -> [Point3<u32>; 4] {
    let row = &CUBE_INDICES[side as usize];
    UNIQUE_INDICES.map(|slot| {
        let [x, y, z] = CUBE_VERTICES[row[slot]];
        Point3::new(x, y, z)
    })
}

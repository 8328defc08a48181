//! # Block Side Module
//!
//! This module defines the six faces of a voxel and the axis offsets the
//! mesher uses to find the voxel each face looks at.

use cgmath::Vector3;

/// Represents the six faces of a voxel block.
///
/// The discriminants index the per-face tables in the mesher and the block
/// catalog, so the order is fixed: [NORTH, SOUTH, EAST, WEST, UP, DOWN].
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// Facing negative Z
    NORTH = 0,

    /// Facing positive Z
    SOUTH = 1,

    /// Facing positive X
    EAST = 2,

    /// Facing negative X
    WEST = 3,

    /// Facing positive Y
    UP = 4,

    /// Facing negative Y
    DOWN = 5,
}

impl BlockSide {
    /// Returns all six faces in discriminant order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::NORTH,
            BlockSide::SOUTH,
            BlockSide::EAST,
            BlockSide::WEST,
            BlockSide::UP,
            BlockSide::DOWN,
        ]
    }

    /// Unit offset from a voxel to the voxel this face looks at.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            BlockSide::NORTH => Vector3::new(0, 0, -1),
            BlockSide::SOUTH => Vector3::new(0, 0, 1),
            BlockSide::EAST => Vector3::new(1, 0, 0),
            BlockSide::WEST => Vector3::new(-1, 0, 0),
            BlockSide::UP => Vector3::new(0, 1, 0),
            BlockSide::DOWN => Vector3::new(0, -1, 0),
        }
    }

    /// The face pointing the other way.
    pub fn opposite(self) -> BlockSide {
        match self {
            BlockSide::NORTH => BlockSide::SOUTH,
            BlockSide::SOUTH => BlockSide::NORTH,
            BlockSide::EAST => BlockSide::WEST,
            BlockSide::WEST => BlockSide::EAST,
            BlockSide::UP => BlockSide::DOWN,
            BlockSide::DOWN => BlockSide::UP,
        }
    }

    /// Whether this face points across a chunk column boundary.
    pub fn is_horizontal(self) -> bool {
        !matches!(self, BlockSide::UP | BlockSide::DOWN)
    }

    /// Directional shading code packed into every vertex of the face.
    ///
    /// The shader darkens faces by this code: East 1, West 2, North 3,
    /// South 2 and 0 for the vertical faces.
    pub fn shade_code(self) -> u8 {
        match self {
            BlockSide::EAST => 1,
            BlockSide::WEST => 2,
            BlockSide::NORTH => 3,
            BlockSide::SOUTH => 2,
            BlockSide::UP | BlockSide::DOWN => 0,
        }
    }
}

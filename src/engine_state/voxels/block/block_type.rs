//! # Block Type Module
//!
//! The block types the engine ships with. Voxel grids store raw
//! [`BlockTypeSize`] codes so any of the 256 codes can appear in chunk data;
//! this enum names the ones with built-in catalog entries.

use num_derive::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates the built-in block types.
///
/// The `FromPrimitive` derive allows conversion from the raw codes stored in
/// voxel grids.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// Air: transparent and empty. Code 0 is the only transparency sentinel.
    AIR = 0,

    /// Grass on dirt, with distinct top, bottom and side textures.
    GRASS = 1,

    /// Plain dirt on every side.
    DIRT = 2,

    /// Plain stone on every side.
    STONE = 3,
}

impl BlockType {
    /// Converts a raw code to a `BlockType`, or `None` for codes without a built-in type.
    pub fn from_int(code: BlockTypeSize) -> Option<Self> {
        num_traits::FromPrimitive::from_u8(code)
    }

    /// The raw code stored in voxel grids.
    pub fn code(self) -> BlockTypeSize {
        self as BlockTypeSize
    }

    /// Whether voxels of this type occlude their neighbors' faces.
    pub fn is_solid(self) -> bool {
        self != BlockType::AIR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for block in [
            BlockType::AIR,
            BlockType::GRASS,
            BlockType::DIRT,
            BlockType::STONE,
        ] {
            assert_eq!(BlockType::from_int(block.code()), Some(block));
        }
        assert_eq!(BlockType::from_int(200), None);
    }

    #[test]
    fn only_air_is_transparent() {
        assert!(!BlockType::AIR.is_solid());
        assert!(BlockType::STONE.is_solid());
    }
}

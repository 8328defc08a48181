//! # Block Module
//!
//! This module provides the block-related definitions for the voxel engine:
//! block type codes, block faces, and the catalog mapping each block type and
//! face to a texture atlas cell.

use block_side::BlockSide;
use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
pub type BlockTypeSize = u8;

/// Atlas cell of a face texture as `(u, v)` cell indices.
pub type TextureCoordinates = (u8, u8);

/// Per-face atlas cells of the built-in block types, keyed by block code.
///
/// Each entry lists the faces in [`BlockSide`] order:
/// [North, South, East, West, Up, Down].
static BUILT_IN_TEXTURES: phf::Map<u8, [[u8; 2]; 6]> = phf::phf_map! {
    0u8 => [[0, 0], [0, 0], [0, 0], [0, 0], [0, 0], [0, 0]],
    1u8 => [[3, 0], [3, 0], [3, 0], [3, 0], [2, 0], [18, 1]],
    2u8 => [[18, 1], [18, 1], [18, 1], [18, 1], [18, 1], [18, 1]],
    3u8 => [[19, 0], [19, 0], [19, 0], [19, 0], [19, 0], [19, 0]],
};

/// Lookup from block type and face to texture atlas coordinates.
///
/// The catalog covers the closed set of codes 0-255. Codes without an entry
/// fall back to the mapping of block type 0. A catalog is built once, shared
/// behind an `Arc`, and never mutated while meshing tasks hold it.
#[derive(Debug, Clone)]
pub struct BlockCatalog {
    faces: Vec<Option<[TextureCoordinates; 6]>>,
}

impl BlockCatalog {
    /// Creates a catalog holding the built-in block types.
    pub fn new() -> Self {
        let mut catalog = BlockCatalog {
            faces: vec![None; 256],
        };
        for (code, cells) in BUILT_IN_TEXTURES.entries() {
            catalog.register(*code, (*cells).map(|[u, v]| (u, v)));
        }
        catalog
    }

    /// Registers (or replaces) the per-face texture cells of a block code.
    ///
    /// `faces` is ordered like [`BlockSide::all`].
    pub fn register(&mut self, code: BlockTypeSize, faces: [TextureCoordinates; 6]) {
        self.faces[code as usize] = Some(faces);
    }

    /// Registers a block code that uses the same atlas cell on every face.
    pub fn register_uniform(&mut self, code: BlockTypeSize, cell: TextureCoordinates) {
        self.register(code, [cell; 6]);
    }

    /// Whether a block code has its own entry.
    pub fn is_registered(&self, code: BlockTypeSize) -> bool {
        self.faces[code as usize].is_some()
    }

    /// Atlas cell for one face of a block code.
    pub fn texture_coordinates(&self, code: BlockTypeSize, side: BlockSide) -> TextureCoordinates {
        let faces = self.faces[code as usize]
            .or(self.faces[BlockType::AIR as usize])
            .unwrap_or([(0, 0); 6]);
        faces[side as usize]
    }
}

impl Default for BlockCatalog {
    fn default() -> Self {
        Self::new()
    }
}

//! Mesh buffers produced by one meshing pass over a chunk.

use cgmath::Point3;

use crate::engine_state::{
    rendering::Vertex,
    voxels::{
        block::{block_side::BlockSide, TextureCoordinates},
        chunk::ChunkDimensions,
    },
};

use super::face::{face_corners, FACE_INDICES};

/// Vertex and index buffers of one chunk mesh.
///
/// Emission is append-only: every quad adds 4 vertices and 6 indices. A mesh
/// is never edited after it is built; a remesh produces a new buffer that
/// replaces the old one wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkMeshBuffer {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    /// Number of quads emitted per face direction, in `BlockSide` order
    quads_per_side: [u32; 6],
}

impl ChunkMeshBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Upper bound on vertices for a chunk: every voxel emitting all six faces.
    pub fn max_vertices(dimensions: ChunkDimensions) -> usize {
        dimensions.volume() * 6 * 4
    }

    /// Upper bound on indices for a chunk: every voxel emitting all six faces.
    pub fn max_indices(dimensions: ChunkDimensions) -> usize {
        dimensions.volume() * 6 * 6
    }

    /// Appends one quad for a face of the voxel at `block`.
    pub fn add_face(&mut self, block: Point3<usize>, side: BlockSide, atlas: TextureCoordinates) {
        let base = self.vertices.len() as u32;
        let shade = side.shade_code();
        for (corner, offset) in face_corners(side).into_iter().enumerate() {
            let position = Point3::new(
                block.x as u32 + offset.x,
                block.y as u32 + offset.y,
                block.z as u32 + offset.z,
            );
            self.vertices
                .push(Vertex::new(position, corner as u8, atlas, shade));
        }
        self.indices
            .extend(FACE_INDICES.iter().map(|index| base + index));
        self.quads_per_side[side as usize] += 1;
    }

    /// Packed vertices.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Triangle indices, six per quad.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Vertex buffer as raw bytes for upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index buffer as raw bytes for upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of indices.
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Number of quads.
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Number of quads facing one direction.
    pub fn quads_on(&self, side: BlockSide) -> usize {
        self.quads_per_side[side as usize] as usize
    }

    /// Whether the mesh has no geometry. Drawing it is a no-op.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

//! Mesh generation for voxel rendering.
//!
//! This module turns voxel grids into GPU-ready vertex and index buffers.
//!
//! # Architecture
//! - [`ChunkMeshBuffer`]: append-only vertex/index buffers of one chunk
//! - [`face`]: unit-cube corner and triangle tables
//! - [`build_chunk_mesh`]: the face-culling mesher, aware of neighbor chunks
//!
//! # Usage
//! ```
//! use voxel_stream::engine_state::rendering::meshing::mesh::{build_chunk_mesh, MeshSettings};
//! use voxel_stream::engine_state::voxels::{
//!     block::BlockCatalog,
//!     chunk::{ChunkDimensions, NeighborSet, VoxelGrid},
//! };
//!
//! let grid = VoxelGrid::filled_below(ChunkDimensions::new(16, 64), 63, 1);
//! let catalog = BlockCatalog::new();
//! let mesh = build_chunk_mesh(&grid, &NeighborSet::empty(), &catalog, MeshSettings::default());
//! assert_eq!(mesh.quad_count(), 256 + 4 * 16 * 63);
//! ```

mod culled;
pub mod face;
mod mesh;

pub use culled::{build_chunk_mesh, MeshSettings};
pub use mesh::ChunkMeshBuffer;

//! Mesh generation and GPU hand-off for voxel rendering.
//!
//! # Architecture
//! - `mesh/`: mesh buffers, cube tables and the face-culling mesher
//! - `renderer`: the `ChunkRenderer` contract and its in-memory recording backend
//!
//! Meshing runs on worker threads against immutable grid snapshots. Uploads,
//! releases and draws run on the main thread only.

pub mod mesh;
mod renderer;

pub use mesh::{build_chunk_mesh, ChunkMeshBuffer, MeshSettings};
pub use renderer::*;

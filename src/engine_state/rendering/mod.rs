//! Rendering system for the voxel engine.
//!
//! This module covers everything between voxel data and the GPU: the packed
//! vertex format, chunk meshing, the renderer contract and the background
//! mesh generation task.

pub mod meshing;
pub mod tasks;
mod vertex;

// Re-export commonly used types
pub use meshing::{ChunkMeshBuffer, ChunkRenderer, GpuHandle, RecordingRenderer};
pub use vertex::Vertex;

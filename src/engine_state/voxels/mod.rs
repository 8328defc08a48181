//! # Voxel World Data
//!
//! This module contains everything about voxel data itself, independent of
//! how it is drawn.
//!
//! ## Architecture
//!
//! * **Block**: block type codes, faces and the texture catalog
//! * **Chunk**: fixed-size voxel grids addressed by 2D chunk coordinates
//! * **ChunkStore**: the main thread's map of resident chunks
//! * **Terrain**: loading, saving and synthesizing chunk data
//! * **Raycast**: finding the first solid voxel along a ray
//! * **Tasks**: background loads and edits producing new chunk data
//!
//! ## Thread Safety
//!
//! Grids cross thread boundaries only as `Arc<VoxelGrid>` snapshots that
//! nobody mutates. Tasks return new grids through result queues and the main
//! thread swaps them into the store.

pub mod block;
pub mod chunk;
pub mod chunk_store;
pub mod raycast;
pub mod tasks;
pub mod terrain;

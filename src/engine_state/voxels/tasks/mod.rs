//! # Voxel Task System
//!
//! Background tasks that produce chunk data. Both kinds report through the
//! same data-ready queue so the world applies loads and edits in one place.
//!
//! - `ChunkGenerationTask`: loads or synthesizes the grid of a chunk
//! - `BlockEditTask`: applies block edits to a copy of a grid and saves it
//!
//! A panicking terrain source never leaves the world waiting: loads report
//! `ChunkData::LoadFailed` and edits still hand back their grid.

use std::sync::Arc;

use cgmath::Point3;

use super::{
    block::BlockTypeSize,
    chunk::{ChunkCoordinate, VoxelGrid},
};

pub mod block_edit_task;
pub mod chunk_generation_task;

/// A single-voxel change, in chunk-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockEdit {
    /// Local position inside the chunk
    pub local: Point3<usize>,
    /// New block code
    pub block: BlockTypeSize,
}

/// What a data task produced.
#[derive(Debug, Clone)]
pub enum ChunkData {
    /// Grid loaded from persistence or synthesized
    Loaded(Arc<VoxelGrid>),
    /// Grid produced by applying edits to a resident snapshot
    Edited {
        /// The edited grid
        grid: Arc<VoxelGrid>,
        /// Data version of the snapshot the edits were applied to
        base_version: u64,
        /// Local positions that were written
        touched: Vec<Point3<usize>>,
    },
    /// The terrain source panicked; no grid was produced
    LoadFailed,
}

/// New voxel data for a chunk, waiting to be applied on the main thread.
#[derive(Debug, Clone)]
pub struct ChunkDataResult {
    /// Chunk the data belongs to
    pub coordinate: ChunkCoordinate,
    /// Load, edit or failure
    pub data: ChunkData,
}

//! # Block Edit Task
//!
//! Applies a batch of block edits to a private copy of a chunk grid, saves the
//! result write-through and hands the new grid back to the main thread. The
//! snapshot the task starts from is never mutated. The result carries the
//! data version of that snapshot so the world can tell whether the chunk was
//! replaced while the task ran.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use log::{debug, error, warn};

use crate::engine_state::{
    task_management::{result_queue::ResultQueue, task::Task},
    voxels::{
        chunk::{ChunkCoordinate, VoxelGrid},
        terrain::TerrainSource,
    },
};

use super::{BlockEdit, ChunkData, ChunkDataResult};

/// A task that produces a replacement grid with some voxels changed.
pub struct BlockEditTask {
    coordinate: ChunkCoordinate,
    snapshot: Arc<VoxelGrid>,
    base_version: u64,
    edits: Vec<BlockEdit>,
    terrain: Arc<dyn TerrainSource>,
    results: ResultQueue<ChunkDataResult>,
}

impl BlockEditTask {
    /// Creates a new block edit task.
    ///
    /// # Arguments
    /// * `coordinate` - The edited chunk
    /// * `snapshot` - The chunk's grid at submission time
    /// * `base_version` - The data version `snapshot` was taken at
    /// * `edits` - Edits to apply, in order
    /// * `terrain` - Where the edited grid is saved
    /// * `results` - Queue the new grid is pushed to
    pub fn new(
        coordinate: ChunkCoordinate,
        snapshot: Arc<VoxelGrid>,
        base_version: u64,
        edits: Vec<BlockEdit>,
        terrain: Arc<dyn TerrainSource>,
        results: ResultQueue<ChunkDataResult>,
    ) -> Self {
        BlockEditTask {
            coordinate,
            snapshot,
            base_version,
            edits,
            terrain,
            results,
        }
    }
}

impl Task for BlockEditTask {
    fn process(self: Box<Self>) {
        let mut grid = VoxelGrid::clone(&self.snapshot);
        let mut touched = Vec::with_capacity(self.edits.len());
        for edit in &self.edits {
            match grid.set(edit.local.x, edit.local.y, edit.local.z, edit.block) {
                Ok(()) => touched.push(edit.local),
                Err(err) => warn!("Skipping edit in chunk {}: {err}", self.coordinate),
            }
        }

        let saved = panic::catch_unwind(AssertUnwindSafe(|| {
            self.terrain.save(self.coordinate, &grid)
        }));
        if saved.is_err() {
            error!("Terrain source panicked while saving chunk {}", self.coordinate);
        }
        debug!(
            "Applied {} edits to chunk {}",
            touched.len(),
            self.coordinate
        );

        self.results.push(ChunkDataResult {
            coordinate: self.coordinate,
            data: ChunkData::Edited {
                grid: Arc::new(grid),
                base_version: self.base_version,
                touched,
            },
        });
    }

    fn name(&self) -> &'static str {
        "block edit"
    }
}

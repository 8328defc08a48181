//! # Chunk Generation Task
//!
//! Loads the grid of a chunk on a worker thread. The terrain source decides
//! whether the data comes from persistence or from synthesis; either way the
//! task always produces a result. A source that panics yields
//! `ChunkData::LoadFailed` so the world stops waiting on the chunk.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use log::{debug, error};

use crate::engine_state::{
    task_management::{result_queue::ResultQueue, task::Task},
    voxels::{chunk::ChunkCoordinate, terrain::TerrainSource},
};

use super::{ChunkData, ChunkDataResult};

/// A task that produces the voxel data of one chunk.
pub struct ChunkGenerationTask {
    /// The chunk to load
    coordinate: ChunkCoordinate,
    /// Where the data comes from
    terrain: Arc<dyn TerrainSource>,
    /// Queue the loaded grid is pushed to
    results: ResultQueue<ChunkDataResult>,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    pub fn new(
        coordinate: ChunkCoordinate,
        terrain: Arc<dyn TerrainSource>,
        results: ResultQueue<ChunkDataResult>,
    ) -> Self {
        ChunkGenerationTask {
            coordinate,
            terrain,
            results,
        }
    }
}

impl Task for ChunkGenerationTask {
    fn process(self: Box<Self>) {
        let coordinate = self.coordinate;
        let data = match panic::catch_unwind(AssertUnwindSafe(|| self.terrain.load(coordinate))) {
            Ok(grid) => {
                debug!(
                    "Loaded chunk {} ({} solid voxels)",
                    coordinate,
                    grid.solid_count()
                );
                ChunkData::Loaded(Arc::new(grid))
            }
            Err(_) => {
                error!("Terrain source panicked while loading chunk {coordinate}");
                ChunkData::LoadFailed
            }
        };
        self.results.push(ChunkDataResult { coordinate, data });
    }

    fn name(&self) -> &'static str {
        "chunk generation"
    }
}

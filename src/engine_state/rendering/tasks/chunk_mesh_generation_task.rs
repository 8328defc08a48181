//! Task for generating the mesh of a chunk on a worker thread.
//!
//! The task owns immutable snapshots of the chunk's grid and of whichever
//! neighbor grids were loaded at submission time, so the main thread is free
//! to replace the live data while the mesh is being built. The result carries
//! the data version the snapshot was taken at; the world discards results
//! whose version no longer matches.

use std::sync::Arc;

use log::debug;

use crate::engine_state::{
    rendering::meshing::{build_chunk_mesh, ChunkMeshBuffer, MeshSettings},
    task_management::{result_queue::ResultQueue, task::Task},
    voxels::{
        block::BlockCatalog,
        chunk::{ChunkCoordinate, NeighborSet, VoxelGrid},
    },
};

/// A finished mesh waiting to be applied on the main thread.
#[derive(Debug)]
pub struct ChunkMeshResult {
    /// Chunk the mesh belongs to
    pub coordinate: ChunkCoordinate,
    /// Data version of the grid snapshot the mesh was built from
    pub data_version: u64,
    /// The mesh
    pub mesh: ChunkMeshBuffer,
}

/// A task that meshes one chunk in a background thread.
pub struct ChunkMeshGenerationTask {
    coordinate: ChunkCoordinate,
    data_version: u64,
    grid: Arc<VoxelGrid>,
    neighbors: NeighborSet,
    catalog: Arc<BlockCatalog>,
    settings: MeshSettings,
    results: ResultQueue<ChunkMeshResult>,
}

impl ChunkMeshGenerationTask {
    /// Creates a new chunk mesh generation task.
    ///
    /// # Arguments
    /// * `coordinate` - The chunk being meshed
    /// * `data_version` - Version of `grid` in the chunk store
    /// * `grid` - Snapshot of the chunk's voxels
    /// * `neighbors` - Snapshots of the loaded axis neighbors
    /// * `catalog` - Block texture lookup
    /// * `settings` - Visibility rules for world and chunk edges
    /// * `results` - Queue the finished mesh is pushed to
    pub fn new(
        coordinate: ChunkCoordinate,
        data_version: u64,
        grid: Arc<VoxelGrid>,
        neighbors: NeighborSet,
        catalog: Arc<BlockCatalog>,
        settings: MeshSettings,
        results: ResultQueue<ChunkMeshResult>,
    ) -> Self {
        ChunkMeshGenerationTask {
            coordinate,
            data_version,
            grid,
            neighbors,
            catalog,
            settings,
            results,
        }
    }
}

impl Task for ChunkMeshGenerationTask {
    fn process(self: Box<Self>) {
        debug!(
            "Meshing chunk {} (version {}, {} neighbors loaded)",
            self.coordinate,
            self.data_version,
            self.neighbors.loaded_count()
        );
        let mesh = build_chunk_mesh(&self.grid, &self.neighbors, &self.catalog, self.settings);
        self.results.push(ChunkMeshResult {
            coordinate: self.coordinate,
            data_version: self.data_version,
            mesh,
        });
    }

    fn name(&self) -> &'static str {
        "chunk mesh generation"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{block::block_side::BlockSide, chunk::ChunkDimensions};

    #[test]
    fn result_carries_coordinate_and_version() {
        let results = ResultQueue::new();
        let grid = Arc::new(VoxelGrid::filled_below(ChunkDimensions::new(4, 4), 1, 1));
        let task = ChunkMeshGenerationTask::new(
            ChunkCoordinate::new(3, -1),
            7,
            grid,
            NeighborSet::empty(),
            Arc::new(BlockCatalog::new()),
            MeshSettings::default(),
            results.clone(),
        );
        Box::new(task).process();

        let drained = results.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].coordinate, ChunkCoordinate::new(3, -1));
        assert_eq!(drained[0].data_version, 7);
        assert_eq!(drained[0].mesh.quads_on(BlockSide::UP), 16);
    }
}

//! # Terrain Module
//!
//! Where chunk data comes from. A [`TerrainSource`] loads the grid of a chunk
//! by coordinate and saves edited grids back. Sources are shared with worker
//! threads behind an `Arc` and are only ever called from background tasks.
//!
//! ## Sources
//! - [`HeightmapGenerator`]: pure synthesis from height noise, saves are dropped
//! - [`PersistentTerrain`]: saved bytes first, synthesis on a miss
//!
//! Persistence failures never reach the caller. A failed read degrades to a
//! miss and a failed write is logged and ignored.

use log::{debug, warn};

use crate::core::WorldConfig;

use super::chunk::{ChunkCoordinate, ChunkDimensions, VoxelGrid};

pub mod height_map;
pub mod persistence;

pub use height_map::HeightmapGenerator;
pub use persistence::{ChunkFileStore, ChunkPersistence, MemoryChunkStore};

/// Loads and saves chunk grids by coordinate.
pub trait TerrainSource: Send + Sync {
    /// Produces the grid of a chunk. Never fails.
    fn load(&self, coordinate: ChunkCoordinate) -> VoxelGrid;

    /// Persists a chunk grid, best effort.
    fn save(&self, coordinate: ChunkCoordinate, grid: &VoxelGrid);
}

/// Saved chunk data backed by a [`ChunkPersistence`], with noise synthesis for misses.
pub struct PersistentTerrain<P> {
    generator: HeightmapGenerator,
    persistence: P,
    dimensions: ChunkDimensions,
}

impl<P: ChunkPersistence> PersistentTerrain<P> {
    /// Creates a source over the given storage.
    pub fn new(config: &WorldConfig, persistence: P) -> Self {
        let dimensions = config.dimensions();
        Self {
            generator: HeightmapGenerator::new(dimensions, &config.terrain),
            persistence,
            dimensions,
        }
    }

    /// The underlying storage.
    pub fn persistence(&self) -> &P {
        &self.persistence
    }
}

impl<P: ChunkPersistence> TerrainSource for PersistentTerrain<P> {
    fn load(&self, coordinate: ChunkCoordinate) -> VoxelGrid {
        match self.persistence.read(coordinate) {
            Ok(Some(bytes)) => match VoxelGrid::from_bytes(self.dimensions, bytes) {
                Ok(grid) => return grid,
                Err(err) => warn!("Discarding saved data of chunk {coordinate}: {err}"),
            },
            Ok(None) => debug!("No saved data for chunk {coordinate}, generating"),
            Err(err) => warn!("Reading chunk {coordinate} failed, generating instead: {err:#}"),
        }
        self.generator.generate(coordinate)
    }

    fn save(&self, coordinate: ChunkCoordinate, grid: &VoxelGrid) {
        if let Err(err) = self.persistence.write(coordinate, grid.as_bytes()) {
            warn!("Saving chunk {coordinate} failed: {err:#}");
        }
    }
}

//! # Chunk Store Module
//!
//! The authoritative map from chunk coordinate to [`ChunkRecord`]. Only the
//! world's main thread touches the store. Background tasks receive `Arc`
//! snapshots of grids at submission time and never reach back in here.
//!
//! ## Data Versions
//!
//! Every time a record's grid is set, the store stamps it with a fresh value
//! from one store-wide counter. Versions are therefore unique across evictions
//! and reloads of the same coordinate, which lets the world recognise a mesh
//! built from any older snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use crate::engine_state::rendering::{ChunkMeshBuffer, GpuHandle};

use super::chunk::{ChunkCoordinate, NeighborSet, VoxelGrid};

/// Everything tracked for one resident chunk.
#[derive(Debug)]
pub struct ChunkRecord {
    coordinate: ChunkCoordinate,
    grid: Arc<VoxelGrid>,
    data_version: u64,
    /// Latest applied mesh, replaced wholesale by each remesh
    pub mesh: Option<ChunkMeshBuffer>,
    /// Renderer handle of the uploaded mesh
    pub gpu_handle: Option<GpuHandle>,
    /// Data changed since the last mesh was requested
    pub dirty: bool,
    /// The current mesh still has to be uploaded
    pub pending_upload: bool,
    /// A mesh is uploaded and the chunk may be drawn
    pub mesh_loaded: bool,
}

impl ChunkRecord {
    /// Coordinate of the chunk.
    pub fn coordinate(&self) -> ChunkCoordinate {
        self.coordinate
    }

    /// Shared snapshot of the current voxel data.
    pub fn grid(&self) -> &Arc<VoxelGrid> {
        &self.grid
    }

    /// Version stamp of the current voxel data.
    pub fn data_version(&self) -> u64 {
        self.data_version
    }

    /// Whether a mesh has been applied since the record was created.
    pub fn is_meshed(&self) -> bool {
        self.mesh.is_some()
    }
}

/// Coordinate-keyed storage of resident chunks.
#[derive(Debug, Default)]
pub struct ChunkStore {
    records: HashMap<ChunkCoordinate, ChunkRecord>,
    next_version: u64,
}

impl ChunkStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn bump_version(&mut self) -> u64 {
        self.next_version += 1;
        self.next_version
    }

    /// Inserts a chunk or replaces the grid of an existing one.
    ///
    /// The record is marked dirty and gets a fresh data version. A replaced
    /// record keeps its current mesh and GPU handle, so it stays drawable until
    /// the remesh arrives.
    pub fn insert_or_replace(
        &mut self,
        coordinate: ChunkCoordinate,
        grid: Arc<VoxelGrid>,
    ) -> &mut ChunkRecord {
        let data_version = self.bump_version();
        let record = self
            .records
            .entry(coordinate)
            .or_insert_with(|| ChunkRecord {
                coordinate,
                grid: grid.clone(),
                data_version,
                mesh: None,
                gpu_handle: None,
                dirty: true,
                pending_upload: false,
                mesh_loaded: false,
            });
        record.grid = grid;
        record.data_version = data_version;
        record.dirty = true;
        record
    }

    /// Removes a chunk, returning its record.
    pub fn remove(&mut self, coordinate: ChunkCoordinate) -> Option<ChunkRecord> {
        self.records.remove(&coordinate)
    }

    /// The record of a chunk.
    pub fn get(&self, coordinate: ChunkCoordinate) -> Option<&ChunkRecord> {
        self.records.get(&coordinate)
    }

    /// Mutable record of a chunk.
    pub fn get_mut(&mut self, coordinate: ChunkCoordinate) -> Option<&mut ChunkRecord> {
        self.records.get_mut(&coordinate)
    }

    /// Whether a chunk is resident.
    pub fn contains(&self, coordinate: ChunkCoordinate) -> bool {
        self.records.contains_key(&coordinate)
    }

    /// Number of resident chunks.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no chunk is resident.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All resident records, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &ChunkRecord> {
        self.records.values()
    }

    /// All resident records, mutable, in no particular order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ChunkRecord> {
        self.records.values_mut()
    }

    /// Coordinates of all resident chunks, in no particular order.
    pub fn coordinates(&self) -> impl Iterator<Item = ChunkCoordinate> + '_ {
        self.records.keys().copied()
    }

    /// Snapshots of the resident axis neighbors of a chunk.
    pub fn neighbors(&self, coordinate: ChunkCoordinate) -> NeighborSet {
        NeighborSet::SIDES.iter().fold(NeighborSet::empty(), |set, &side| {
            let grid = self
                .get(coordinate.neighbor(side))
                .map(|record| record.grid.clone());
            set.with(side, grid)
        })
    }

    /// Whether all four axis neighbors of a chunk are resident.
    pub fn has_all_neighbors(&self, coordinate: ChunkCoordinate) -> bool {
        coordinate
            .neighbors()
            .iter()
            .all(|neighbor| self.contains(*neighbor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{block::block_side::BlockSide, chunk::ChunkDimensions};

    fn grid() -> Arc<VoxelGrid> {
        Arc::new(VoxelGrid::new(ChunkDimensions::new(4, 4)))
    }

    #[test]
    fn insert_creates_dirty_record_without_mesh() {
        let mut store = ChunkStore::new();
        let record = store.insert_or_replace(ChunkCoordinate::new(0, 0), grid());
        assert!(record.dirty);
        assert!(!record.mesh_loaded);
        assert!(record.gpu_handle.is_none());
        assert!(!record.is_meshed());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn replace_bumps_version_and_keeps_gpu_state() {
        let mut store = ChunkStore::new();
        let coordinate = ChunkCoordinate::new(1, 2);
        let first = store.insert_or_replace(coordinate, grid()).data_version();
        {
            let record = store.get_mut(coordinate).unwrap();
            record.dirty = false;
            record.gpu_handle = Some(GpuHandle(9));
            record.mesh_loaded = true;
        }
        let replacement = Arc::new(VoxelGrid::solid(ChunkDimensions::new(4, 4), 1));
        let record = store.insert_or_replace(coordinate, replacement.clone());
        assert!(record.data_version() > first);
        assert!(record.dirty);
        assert_eq!(record.gpu_handle, Some(GpuHandle(9)));
        assert!(Arc::ptr_eq(record.grid(), &replacement));
    }

    #[test]
    fn versions_are_unique_across_reinsertion() {
        let mut store = ChunkStore::new();
        let coordinate = ChunkCoordinate::new(0, 0);
        let first = store.insert_or_replace(coordinate, grid()).data_version();
        store.remove(coordinate);
        let second = store.insert_or_replace(coordinate, grid()).data_version();
        assert_ne!(first, second);
    }

    #[test]
    fn neighbors_reflect_resident_chunks() {
        let mut store = ChunkStore::new();
        let center = ChunkCoordinate::new(0, 0);
        store.insert_or_replace(center, grid());
        store.insert_or_replace(ChunkCoordinate::new(1, 0), grid());
        store.insert_or_replace(ChunkCoordinate::new(0, -1), grid());

        let neighbors = store.neighbors(center);
        assert!(neighbors.get(BlockSide::EAST).is_some());
        assert!(neighbors.get(BlockSide::NORTH).is_some());
        assert!(neighbors.get(BlockSide::WEST).is_none());
        assert!(!store.has_all_neighbors(center));

        store.insert_or_replace(ChunkCoordinate::new(-1, 0), grid());
        store.insert_or_replace(ChunkCoordinate::new(0, 1), grid());
        assert!(store.has_all_neighbors(center));
    }
}

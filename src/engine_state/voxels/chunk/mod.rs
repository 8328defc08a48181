//! # Chunk Module
//!
//! This module provides the chunk data model: the 2D [`ChunkCoordinate`] that
//! addresses a chunk column, the flat [`VoxelGrid`] holding one byte per
//! voxel, and the transient [`NeighborSet`] the mesher reads across chunk
//! borders.
//!
//! ## Memory Layout
//!
//! A grid is a single `WIDTH * HEIGHT * WIDTH` byte array indexed as
//! `x * HEIGHT * WIDTH + y * WIDTH + z`. Code 0 is air. The same layout is the
//! on-disk save format, so `as_bytes`/`from_bytes` are exact inverses.
//!
//! ## Sharing
//!
//! Grids handed to background tasks travel as `Arc<VoxelGrid>` and are never
//! mutated afterwards. An edit clones the grid, changes the clone and swaps
//! the new `Arc` into the chunk store.

use std::fmt;
use std::sync::Arc;

use cgmath::{Point3, Vector3};

use crate::core::VoxelError;

use super::block::{block_side::BlockSide, BlockTypeSize};

pub mod chunk_creation;
pub mod chunk_iteration;

/// Width and height of every chunk grid in a world.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChunkDimensions {
    /// Extent along x and z
    pub width: usize,
    /// Extent along y
    pub height: usize,
}

impl ChunkDimensions {
    /// Creates a dimension pair.
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Number of voxels in one grid.
    pub const fn volume(&self) -> usize {
        self.width * self.height * self.width
    }

    /// Whether a signed local coordinate lies inside the grid.
    pub fn contains(&self, position: Point3<i32>) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.z >= 0
            && (position.x as usize) < self.width
            && (position.y as usize) < self.height
            && (position.z as usize) < self.width
    }

    /// Whether a local coordinate touches a chunk column edge (x or z at 0 or width - 1).
    pub fn on_column_edge(&self, local: Point3<usize>) -> bool {
        local.x == 0 || local.z == 0 || local.x + 1 == self.width || local.z + 1 == self.width
    }
}

impl Default for ChunkDimensions {
    fn default() -> Self {
        Self::new(16, 64)
    }
}

/// Identifies a chunk column on the 2D chunk grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoordinate {
    /// Column index along x
    pub x: i32,
    /// Column index along z
    pub z: i32,
}

impl ChunkCoordinate {
    /// Creates a chunk coordinate.
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The chunk containing an absolute block position.
    pub fn from_block_position(position: Point3<i32>, width: usize) -> Self {
        let width = width as i32;
        Self {
            x: position.x.div_euclid(width),
            z: position.z.div_euclid(width),
        }
    }

    /// The chunk containing an absolute world-space position.
    pub fn from_world_position(position: Point3<f32>, width: usize) -> Self {
        Self::from_block_position(
            Point3::new(
                position.x.floor() as i32,
                position.y.floor() as i32,
                position.z.floor() as i32,
            ),
            width,
        )
    }

    /// Splits an absolute block position into its chunk and local voxel position.
    ///
    /// Returns `None` when `y` is below or above the world.
    pub fn split_block_position(
        position: Point3<i32>,
        dimensions: ChunkDimensions,
    ) -> Option<(Self, Point3<usize>)> {
        if position.y < 0 || position.y as usize >= dimensions.height {
            return None;
        }
        let width = dimensions.width as i32;
        let coordinate = Self::from_block_position(position, dimensions.width);
        let local = Point3::new(
            position.x.rem_euclid(width) as usize,
            position.y as usize,
            position.z.rem_euclid(width) as usize,
        );
        Some((coordinate, local))
    }

    /// The axis-adjacent chunk on a horizontal side; vertical sides return `self`.
    pub fn neighbor(self, side: BlockSide) -> Self {
        let offset = side.offset();
        Self::new(self.x + offset.x, self.z + offset.z)
    }

    /// The four axis-adjacent chunks in +X, -X, +Z, -Z order.
    pub fn neighbors(self) -> [Self; 4] {
        NeighborSet::SIDES.map(|side| self.neighbor(side))
    }

    /// Chebyshev distance in chunks.
    pub fn chebyshev_distance(self, other: Self) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }

    /// World-space translation of this chunk's local origin.
    pub fn world_translation(self, width: usize) -> Vector3<f32> {
        Vector3::new(
            (self.x * width as i32) as f32,
            0.0,
            (self.z * width as i32) as f32,
        )
    }
}

impl fmt::Display for ChunkCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// One chunk column of voxel data.
#[derive(Clone, PartialEq, Eq)]
pub struct VoxelGrid {
    dimensions: ChunkDimensions,
    voxels: Box<[BlockTypeSize]>,
}

impl VoxelGrid {
    /// Creates a grid filled with air.
    pub fn new(dimensions: ChunkDimensions) -> Self {
        Self {
            dimensions,
            voxels: vec![0; dimensions.volume()].into_boxed_slice(),
        }
    }

    /// Wraps raw voxel bytes in the grid layout.
    ///
    /// # Errors
    /// `VoxelError::InvalidLength` when `bytes` is not exactly one grid volume.
    pub fn from_bytes(dimensions: ChunkDimensions, bytes: Vec<u8>) -> Result<Self, VoxelError> {
        if bytes.len() != dimensions.volume() {
            return Err(VoxelError::InvalidLength {
                expected: dimensions.volume(),
                actual: bytes.len(),
            });
        }
        Ok(Self {
            dimensions,
            voxels: bytes.into_boxed_slice(),
        })
    }

    /// Dimensions of this grid.
    pub fn dimensions(&self) -> ChunkDimensions {
        self.dimensions
    }

    /// Raw voxel bytes in grid layout.
    pub fn as_bytes(&self) -> &[u8] {
        &self.voxels
    }

    #[inline]
    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x * self.dimensions.height * self.dimensions.width + y * self.dimensions.width + z
    }

    fn checked_index(&self, x: usize, y: usize, z: usize) -> Result<usize, VoxelError> {
        let ChunkDimensions { width, height } = self.dimensions;
        if x < width && y < height && z < width {
            Ok(self.index(x, y, z))
        } else {
            Err(VoxelError::OutOfBounds {
                x: saturating_i64(x),
                y: saturating_i64(y),
                z: saturating_i64(z),
                width,
                height,
            })
        }
    }

    /// Reads the block code at a local position.
    ///
    /// # Errors
    /// `VoxelError::OutOfBounds` when any coordinate is outside the grid.
    pub fn get(&self, x: usize, y: usize, z: usize) -> Result<BlockTypeSize, VoxelError> {
        let index = self.checked_index(x, y, z)?;
        Ok(self.voxels[index])
    }

    /// Writes the block code at a local position.
    ///
    /// # Errors
    /// `VoxelError::OutOfBounds` when any coordinate is outside the grid.
    pub fn set(
        &mut self,
        x: usize,
        y: usize,
        z: usize,
        block: BlockTypeSize,
    ) -> Result<(), VoxelError> {
        let index = self.checked_index(x, y, z)?;
        self.voxels[index] = block;
        Ok(())
    }

    /// Reads a block at a signed local position, `None` when it lies outside the grid.
    #[inline]
    pub fn get_signed(&self, position: Point3<i32>) -> Option<BlockTypeSize> {
        if self.dimensions.contains(position) {
            Some(self.voxels[self.index(
                position.x as usize,
                position.y as usize,
                position.z as usize,
            )])
        } else {
            None
        }
    }

    /// Number of non-air voxels.
    pub fn solid_count(&self) -> usize {
        self.voxels.iter().filter(|&&block| block != 0).count()
    }

    /// Whether every voxel is air.
    pub fn is_empty(&self) -> bool {
        self.voxels.iter().all(|&block| block == 0)
    }
}

/// Positions past `i64::MAX` are reported as `i64::MAX`.
fn saturating_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

impl fmt::Debug for VoxelGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoxelGrid")
            .field("dimensions", &self.dimensions)
            .field("solid", &self.solid_count())
            .finish()
    }
}

/// Read-only view of the four axis-adjacent grids of a chunk, used while meshing.
///
/// A missing entry means the neighbor is not loaded yet.
#[derive(Clone, Default, Debug)]
pub struct NeighborSet {
    grids: [Option<Arc<VoxelGrid>>; 4],
}

impl NeighborSet {
    /// Slot order of the neighbors: +X, -X, +Z, -Z.
    pub const SIDES: [BlockSide; 4] = [
        BlockSide::EAST,
        BlockSide::WEST,
        BlockSide::SOUTH,
        BlockSide::NORTH,
    ];

    /// A set with no neighbor loaded.
    pub fn empty() -> Self {
        Self::default()
    }

    fn slot(side: BlockSide) -> Option<usize> {
        Self::SIDES.iter().position(|&s| s == side)
    }

    /// Returns the set with the neighbor on `side` replaced.
    ///
    /// Vertical sides have no neighbor chunk and are ignored.
    pub fn with(mut self, side: BlockSide, grid: Option<Arc<VoxelGrid>>) -> Self {
        if let Some(slot) = Self::slot(side) {
            self.grids[slot] = grid;
        }
        self
    }

    /// The neighbor grid on a horizontal side, if loaded.
    pub fn get(&self, side: BlockSide) -> Option<&VoxelGrid> {
        Self::slot(side).and_then(|slot| self.grids[slot].as_deref())
    }

    /// Number of loaded neighbors.
    pub fn loaded_count(&self) -> usize {
        self.grids.iter().filter(|grid| grid.is_some()).count()
    }

    /// Whether all four neighbors are loaded.
    pub fn is_complete(&self) -> bool {
        self.loaded_count() == 4
    }
}

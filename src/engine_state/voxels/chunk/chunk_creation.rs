//! # Chunk Creation Module
//!
//! Builders for populating voxel grids. `ChunkCreationIterator` fills a grid
//! sequentially in storage order, which is how terrain generation writes
//! columns. The `VoxelGrid` constructors below cover the fixed shapes used by
//! tests and the demo world.

use cgmath::Point3;

use crate::engine_state::voxels::block::{block_type::BlockType, BlockTypeSize};

use super::{ChunkDimensions, VoxelGrid};

/// Sequential builder that writes voxels in storage order.
///
/// Storage order walks `z` fastest, then `y`, then `x`. Pushing more than one
/// grid volume of blocks is ignored.
pub struct ChunkCreationIterator {
    grid: VoxelGrid,
    /// Next flat index to write
    cursor: usize,
}

impl ChunkCreationIterator {
    /// Creates a builder for an air-filled grid.
    pub fn new(dimensions: ChunkDimensions) -> Self {
        ChunkCreationIterator {
            grid: VoxelGrid::new(dimensions),
            cursor: 0,
        }
    }

    /// Local position the next pushed block lands on.
    pub fn current_position(&self) -> Point3<usize> {
        let ChunkDimensions { width, height } = self.grid.dimensions();
        Point3::new(
            self.cursor / (height * width),
            (self.cursor / width) % height,
            self.cursor % width,
        )
    }

    /// Writes a block code at the current position and advances.
    pub fn push_block(&mut self, block: BlockTypeSize) {
        if let Some(slot) = self.grid.voxels.get_mut(self.cursor) {
            *slot = block;
            self.cursor += 1;
        }
    }

    /// Writes a built-in block type at the current position and advances.
    pub fn push_block_type(&mut self, block_type: BlockType) {
        self.push_block(block_type.code());
    }

    /// Finalizes the grid. Positions never pushed stay air.
    pub fn return_chunk(self) -> VoxelGrid {
        self.grid
    }
}

impl VoxelGrid {
    /// A grid where every voxel holds `block`.
    pub fn solid(dimensions: ChunkDimensions, block: BlockTypeSize) -> Self {
        let mut grid = Self::new(dimensions);
        grid.voxels.fill(block);
        grid
    }

    /// A grid with a single voxel at the given local position.
    pub fn single(
        dimensions: ChunkDimensions,
        position: Point3<usize>,
        block: BlockTypeSize,
    ) -> Self {
        let mut grid = Self::new(dimensions);
        if position.x < dimensions.width
            && position.y < dimensions.height
            && position.z < dimensions.width
        {
            let index = grid.index(position.x, position.y, position.z);
            grid.voxels[index] = block;
        }
        grid
    }

    /// A grid where every voxel with `y < level` holds `block`.
    pub fn filled_below(dimensions: ChunkDimensions, level: usize, block: BlockTypeSize) -> Self {
        let level = level.min(dimensions.height);
        Self::from_heightmap(dimensions, |_, _| level, |_| block)
    }

    /// Builds a grid column by column.
    ///
    /// `height_at(x, z)` gives the number of filled voxels in the column
    /// (clamped to the grid height) and `block_at(y)` the code written at each
    /// filled `y`.
    pub fn from_heightmap(
        dimensions: ChunkDimensions,
        height_at: impl Fn(usize, usize) -> usize,
        block_at: impl Fn(usize) -> BlockTypeSize,
    ) -> Self {
        let mut builder = ChunkCreationIterator::new(dimensions);
        for x in 0..dimensions.width {
            let columns: Vec<usize> = (0..dimensions.width)
                .map(|z| height_at(x, z).min(dimensions.height))
                .collect();
            for y in 0..dimensions.height {
                for column_height in &columns {
                    if y < *column_height {
                        builder.push_block(block_at(y));
                    } else {
                        builder.push_block(BlockType::AIR.code());
                    }
                }
            }
        }
        builder.return_chunk()
    }

    /// A 3D checkerboard of `block` and air.
    pub fn checkerboard(dimensions: ChunkDimensions, block: BlockTypeSize) -> Self {
        let mut builder = ChunkCreationIterator::new(dimensions);
        for x in 0..dimensions.width {
            for y in 0..dimensions.height {
                for z in 0..dimensions.width {
                    if (x + y + z) % 2 == 0 {
                        builder.push_block(block);
                    } else {
                        builder.push_block_type(BlockType::AIR);
                    }
                }
            }
        }
        builder.return_chunk()
    }
}

//! # Chunk Iteration Module
//!
//! Iteration over the non-air voxels of a grid in mesher order: `x` outermost,
//! then `y`, then `z`. Mesh output order depends on this order, so it must not
//! change.

use cgmath::Point3;

use crate::engine_state::voxels::block::BlockTypeSize;

use super::{ChunkDimensions, VoxelGrid};

/// An iterator over all non-air voxels of a grid with their local positions.
pub struct ChunkBlockIterator<'a> {
    voxels: &'a [BlockTypeSize],
    dimensions: ChunkDimensions,
    /// Flat index of the next voxel to inspect
    cursor: usize,
}

impl<'a> ChunkBlockIterator<'a> {
    /// Creates an iterator positioned before the first voxel.
    pub fn new(grid: &'a VoxelGrid) -> Self {
        ChunkBlockIterator {
            voxels: grid.as_bytes(),
            dimensions: grid.dimensions(),
            cursor: 0,
        }
    }

    fn position_of(&self, index: usize) -> Point3<usize> {
        let ChunkDimensions { width, height } = self.dimensions;
        Point3::new(index / (height * width), (index / width) % height, index % width)
    }
}

impl Iterator for ChunkBlockIterator<'_> {
    type Item = (Point3<usize>, BlockTypeSize);

    fn next(&mut self) -> Option<Self::Item> {
        // Storage order already matches x -> y -> z, so a linear scan suffices.
        let offset = self.voxels[self.cursor..]
            .iter()
            .position(|&block| block != 0)?;
        let index = self.cursor + offset;
        self.cursor = index + 1;
        Some((self.position_of(index), self.voxels[index]))
    }
}

impl VoxelGrid {
    /// Iterates over the non-air voxels in `x -> y -> z` order.
    pub fn solid_blocks(&self) -> ChunkBlockIterator<'_> {
        ChunkBlockIterator::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_solid_voxels_in_mesher_order() {
        let dims = ChunkDimensions::new(4, 4);
        let mut grid = VoxelGrid::new(dims);
        grid.set(1, 0, 0, 5).unwrap();
        grid.set(0, 3, 2, 6).unwrap();
        grid.set(0, 1, 3, 7).unwrap();

        let visited: Vec<_> = grid.solid_blocks().collect();
        assert_eq!(
            visited,
            vec![
                (Point3::new(0, 1, 3), 7),
                (Point3::new(0, 3, 2), 6),
                (Point3::new(1, 0, 0), 5),
            ]
        );
    }

    #[test]
    fn empty_grid_yields_nothing() {
        let grid = VoxelGrid::new(ChunkDimensions::new(3, 3));
        assert_eq!(grid.solid_blocks().count(), 0);
    }

    #[test]
    fn last_voxel_is_reached() {
        let dims = ChunkDimensions::new(2, 2);
        let mut grid = VoxelGrid::new(dims);
        grid.set(1, 1, 1, 1).unwrap();
        assert_eq!(grid.solid_blocks().next(), Some((Point3::new(1, 1, 1), 1)));
    }
}

//! Height-noise terrain synthesis.

use noise::{NoiseFn, Perlin};

use crate::core::TerrainConfig;
use crate::engine_state::voxels::{
    block::block_type::BlockType,
    chunk::{ChunkCoordinate, ChunkDimensions, VoxelGrid},
};

use super::TerrainSource;

/// Generates chunk columns from 2D Perlin noise.
///
/// Each column is filled with grass below
/// `floor((noise + 1) * amplitude + base_height)`, clamped to `height - 1`.
#[derive(Clone)]
pub struct HeightmapGenerator {
    noise: Perlin,
    dimensions: ChunkDimensions,
    frequency: f64,
    amplitude: f64,
    base_height: f64,
}

impl HeightmapGenerator {
    /// Creates a generator for grids of the given dimensions.
    pub fn new(dimensions: ChunkDimensions, config: &TerrainConfig) -> Self {
        Self {
            noise: Perlin::new(config.seed),
            dimensions,
            frequency: config.frequency,
            amplitude: config.amplitude,
            base_height: config
                .base_height
                .unwrap_or(dimensions.height as f64 / 2.0),
        }
    }

    /// Number of filled voxels in the column at an absolute block position.
    pub fn column_height(&self, world_x: i64, world_z: i64) -> usize {
        let sample = self
            .noise
            .get([world_x as f64 * self.frequency, world_z as f64 * self.frequency]);
        let height = ((sample + 1.0) * self.amplitude + self.base_height).floor();
        let ceiling = self.dimensions.height.saturating_sub(1);
        if height <= 0.0 {
            0
        } else {
            (height as usize).min(ceiling)
        }
    }

    /// Synthesizes the grid of one chunk.
    pub fn generate(&self, coordinate: ChunkCoordinate) -> VoxelGrid {
        let width = self.dimensions.width as i64;
        let origin_x = coordinate.x as i64 * width;
        let origin_z = coordinate.z as i64 * width;
        VoxelGrid::from_heightmap(
            self.dimensions,
            |x, z| self.column_height(origin_x + x as i64, origin_z + z as i64),
            |_| BlockType::GRASS.code(),
        )
    }
}

impl TerrainSource for HeightmapGenerator {
    fn load(&self, coordinate: ChunkCoordinate) -> VoxelGrid {
        self.generate(coordinate)
    }

    fn save(&self, coordinate: ChunkCoordinate, _grid: &VoxelGrid) {
        log::trace!("No persistence configured, edit of chunk {coordinate} stays in memory");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(base: f64) -> TerrainConfig {
        TerrainConfig {
            amplitude: 0.0,
            base_height: Some(base),
            ..TerrainConfig::default()
        }
    }

    #[test]
    fn zero_amplitude_gives_flat_terrain() {
        let dims = ChunkDimensions::new(8, 32);
        let generator = HeightmapGenerator::new(dims, &flat(10.0));
        let grid = generator.generate(ChunkCoordinate::new(-3, 7));
        assert_eq!(grid.solid_count(), 8 * 8 * 10);
        assert_eq!(grid.get(0, 9, 0).unwrap(), BlockType::GRASS.code());
        assert_eq!(grid.get(0, 10, 0).unwrap(), 0);
    }

    #[test]
    fn height_is_clamped_below_the_top_layer() {
        let dims = ChunkDimensions::new(4, 16);
        let generator = HeightmapGenerator::new(dims, &flat(1000.0));
        assert_eq!(generator.column_height(0, 0), 15);
        let grid = generator.generate(ChunkCoordinate::new(0, 0));
        assert_eq!(grid.get(2, 15, 2).unwrap(), 0);
    }

    #[test]
    fn generation_is_deterministic_per_seed() {
        let dims = ChunkDimensions::default();
        let config = TerrainConfig {
            seed: 42,
            ..TerrainConfig::default()
        };
        let a = HeightmapGenerator::new(dims, &config).generate(ChunkCoordinate::new(5, -2));
        let b = HeightmapGenerator::new(dims, &config).generate(ChunkCoordinate::new(5, -2));
        assert_eq!(a, b);
    }
}

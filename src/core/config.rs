//! # World Configuration
//!
//! All tunables of the streaming pipeline live in [`WorldConfig`]. The struct
//! deserialises from JSON with every field optional, so a config file only has
//! to name what it changes:
//!
//! ```json
//! { "load_radius": 6, "render_radius": 5, "save_directory": "saves/world" }
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::engine_state::voxels::chunk::ChunkDimensions;

/// Largest chunk width the packed vertex format can address (5 bits, corner inclusive).
pub const MAX_CHUNK_WIDTH: usize = 31;
/// Largest chunk height the packed vertex format can address (9 bits, corner inclusive).
pub const MAX_CHUNK_HEIGHT: usize = 511;

/// How a face bordering a chunk that is not loaded yet is treated while meshing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NeighborPolicy {
    /// Emit the face; a remesh removes it once the neighbor turns out solid.
    #[default]
    AssumeVisible,
    /// Skip the face; a remesh adds it once the neighbor turns out open.
    AssumeHidden,
}

/// Parameters of the height-noise terrain synthesiser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Noise seed
    pub seed: u32,
    /// Sampling frequency applied to absolute block coordinates
    pub frequency: f64,
    /// Height variation above and below the base height
    pub amplitude: f64,
    /// Column height for a zero noise sample; `None` means half the chunk height
    pub base_height: Option<f64>,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            frequency: 0.01,
            amplitude: 5.0,
            base_height: None,
        }
    }
}

/// Configuration of a streamed voxel world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Chunk extent along x and z, in voxels
    pub chunk_width: usize,
    /// Chunk extent along y, in voxels
    pub chunk_height: usize,
    /// Chebyshev radius (in chunks) kept resident around the viewer
    pub load_radius: i32,
    /// Extra ring of chunks prefetched beyond the load radius
    pub extra_load_margin: i32,
    /// Chebyshev radius (in chunks) drawn around the viewer
    pub render_radius: i32,
    /// Worker thread count; `None` uses the available parallelism
    pub worker_threads: Option<usize>,
    /// Capacity of the bounded task queue feeding the workers
    pub task_queue_capacity: usize,
    /// Maximum number of chunk loads submitted per frame
    pub max_loads_per_frame: usize,
    /// Maximum number of mesh tasks submitted per frame
    pub max_meshes_per_frame: usize,
    /// Visibility of faces that border an unloaded neighbor chunk
    pub unloaded_neighbor_policy: NeighborPolicy,
    /// Mesh chunks before all four neighbors are loaded and remesh them later
    pub mesh_with_missing_neighbors: bool,
    /// Emit the Down face of voxels at `y == 0`
    pub render_world_floor: bool,
    /// Emit the Up face of voxels at `y == chunk_height - 1`
    pub render_world_ceiling: bool,
    /// Directory for per-chunk save files; persistence is disabled when unset
    pub save_directory: Option<PathBuf>,
    /// Terrain synthesis parameters
    pub terrain: TerrainConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_width: 16,
            chunk_height: 64,
            load_radius: 4,
            extra_load_margin: 1,
            render_radius: 4,
            worker_threads: None,
            task_queue_capacity: 256,
            max_loads_per_frame: 16,
            max_meshes_per_frame: 16,
            unloaded_neighbor_policy: NeighborPolicy::default(),
            mesh_with_missing_neighbors: false,
            render_world_floor: false,
            render_world_ceiling: true,
            save_directory: None,
            terrain: TerrainConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Parses a configuration from a JSON document and validates it.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: WorldConfig =
            serde_json::from_str(json).context("failed to parse world configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read world configuration {}", path.display()))?;
        Self::from_json_str(&json)
    }

    /// Checks the invariants the rest of the pipeline relies on.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.chunk_width == 0 || self.chunk_width > MAX_CHUNK_WIDTH {
            bail!(
                "chunk_width must be in 1..={}, got {}",
                MAX_CHUNK_WIDTH,
                self.chunk_width
            );
        }
        if self.chunk_height == 0 || self.chunk_height > MAX_CHUNK_HEIGHT {
            bail!(
                "chunk_height must be in 1..={}, got {}",
                MAX_CHUNK_HEIGHT,
                self.chunk_height
            );
        }
        if self.load_radius < 0 || self.extra_load_margin < 0 || self.render_radius < 0 {
            bail!("radii must not be negative");
        }
        if self.render_radius > self.window_radius() {
            bail!(
                "render_radius {} exceeds load_radius + extra_load_margin ({})",
                self.render_radius,
                self.window_radius()
            );
        }
        if self.task_queue_capacity == 0 {
            bail!("task_queue_capacity must be at least 1");
        }
        if self.worker_threads == Some(0) {
            bail!("worker_threads must be at least 1 when set");
        }
        Ok(())
    }

    /// Half extent of the resident window: load radius plus prefetch margin.
    pub fn window_radius(&self) -> i32 {
        self.load_radius + self.extra_load_margin
    }

    /// Grid dimensions every chunk of this world uses.
    pub fn dimensions(&self) -> ChunkDimensions {
        ChunkDimensions::new(self.chunk_width, self.chunk_height)
    }

    /// Number of worker threads to spawn.
    pub fn resolved_worker_threads(&self) -> usize {
        self.worker_threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

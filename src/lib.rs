#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Stream
//!
//! The chunk streaming and meshing core of a voxel engine: it keeps a window
//! of chunks resident around a moving viewer, synthesizes or loads their voxel
//! data on worker threads, turns them into face-culled meshes and hands those
//! to a renderer.
//!
//! ## Key Modules
//!
//! * `core` - Configuration and error types used throughout the crate
//! * `engine_state` - The streaming world, voxel data, meshing and task management
//!
//! ## Architecture
//!
//! The crate follows a single-writer design:
//! * [`World`] owns every chunk record and is driven once per frame from the
//!   thread that owns the renderer
//! * Loading, meshing and editing run on a fixed worker pool against
//!   immutable snapshots
//! * Workers report through result queues that the world drains each frame,
//!   discarding anything that went stale in the meantime
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::Point3;
//! use voxel_stream::{RecordingRenderer, World, WorldConfig};
//!
//! let config = WorldConfig {
//!     load_radius: 1,
//!     render_radius: 1,
//!     worker_threads: Some(2),
//!     ..WorldConfig::default()
//! };
//! let mut world = World::new(config, RecordingRenderer::new()).unwrap();
//!
//! let viewer = Point3::new(8.0, 40.0, 8.0);
//! loop {
//!     world.tick(viewer);
//!     if !world.has_pending_work() {
//!         break;
//!     }
//!     world.wait_for_background_work();
//! }
//! assert_eq!(world.render(), 9);
//! ```

use log::info;

pub mod core;
pub mod engine_state;

pub use crate::core::{NeighborPolicy, TerrainConfig, VoxelError, WorldConfig};
pub use engine_state::{
    load_window::LoadWindow,
    rendering::{ChunkMeshBuffer, ChunkRenderer, GpuHandle, RecordingRenderer, Vertex},
    voxels::{
        chunk::{ChunkCoordinate, ChunkDimensions, VoxelGrid},
        raycast::RayCastHit,
        terrain::TerrainSource,
    },
    FrameStats, World,
};

/// Initializes the global logger from `RUST_LOG`, writing to stdout.
///
/// Calling it more than once is harmless.
pub fn init_logging() {
    let mut log_builder = env_logger::Builder::new();
    let initialized = log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .try_init()
        .is_ok();

    if initialized {
        info!("Logger initialized");
    }
}

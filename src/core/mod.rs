//! # Core Module
//!
//! Crate-wide building blocks that every subsystem depends on: the world
//! configuration and the voxel error taxonomy.
//!
//! ## Key Components
//! - `WorldConfig`: serde-backed configuration of the streaming pipeline
//! - `VoxelError`: failures at the voxel accessor boundary

pub mod config;
pub mod error;

pub use config::{NeighborPolicy, TerrainConfig, WorldConfig};
pub use error::VoxelError;

//! # Error Types
//!
//! Errors raised at the voxel accessor boundary. Everything that can go wrong
//! further out (persistence, configuration files) is reported through
//! `anyhow::Result` and degraded locally by the caller.

use std::fmt;

/// Errors produced by checked voxel grid access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoxelError {
    /// A voxel coordinate lies outside `[0, width) x [0, height) x [0, width)`.
    OutOfBounds {
        /// Requested x coordinate
        x: i64,
        /// Requested y coordinate
        y: i64,
        /// Requested z coordinate
        z: i64,
        /// Grid width (x and z extent)
        width: usize,
        /// Grid height (y extent)
        height: usize,
    },
    /// A raw voxel byte buffer does not match the grid volume.
    InvalidLength {
        /// Number of bytes the grid requires
        expected: usize,
        /// Number of bytes supplied
        actual: usize,
    },
}

impl fmt::Display for VoxelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoxelError::OutOfBounds {
                x,
                y,
                z,
                width,
                height,
            } => write!(
                f,
                "voxel ({}, {}, {}) is outside of a {}x{}x{} grid",
                x, y, z, width, height, width
            ),
            VoxelError::InvalidLength { expected, actual } => write!(
                f,
                "voxel buffer holds {} bytes but the grid volume is {}",
                actual, expected
            ),
        }
    }
}

impl std::error::Error for VoxelError {}

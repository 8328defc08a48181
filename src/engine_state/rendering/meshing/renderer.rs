//! The GPU side of chunk rendering.
//!
//! [`ChunkRenderer`] is the contract the streaming world needs from a graphics
//! backend: take a vertex/index buffer pair and make it drawable, release it
//! later, draw it at a world-space translation. All calls happen on the thread
//! that owns the world, which is the thread owning the GPU context.
//!
//! [`RecordingRenderer`] implements the contract in memory. It keeps the
//! uploaded buffers and logs every draw, which is what the headless demo and
//! the tests render into.

use std::collections::HashMap;

use cgmath::Vector3;
use log::{trace, warn};

use super::mesh::ChunkMeshBuffer;

/// Opaque identifier of a mesh uploaded to a renderer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GpuHandle(pub u64);

/// Graphics backend used by the world to upload, release and draw chunk meshes.
pub trait ChunkRenderer {
    /// Creates GPU buffers holding a mesh and returns their handle.
    fn upload(&mut self, mesh: &ChunkMeshBuffer) -> GpuHandle;

    /// Frees the buffers behind a handle returned by `upload`.
    fn release(&mut self, handle: GpuHandle);

    /// Called once before the draws of a frame.
    fn begin_frame(&mut self) {}

    /// Draws an uploaded mesh translated to its chunk's world position.
    fn draw(&mut self, handle: GpuHandle, translation: Vector3<f32>);
}

/// Buffers held by a [`RecordingRenderer`] for one handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidentMesh {
    /// Raw vertex buffer contents
    pub vertex_bytes: Vec<u8>,
    /// Raw index buffer contents
    pub index_bytes: Vec<u8>,
    /// Number of indices to draw
    pub index_count: usize,
}

/// One recorded draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    /// Mesh drawn
    pub handle: GpuHandle,
    /// World-space translation of the chunk origin
    pub translation: Vector3<f32>,
}

/// In-memory [`ChunkRenderer`] that records what it is asked to do.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    next_handle: u64,
    resident: HashMap<GpuHandle, ResidentMesh>,
    frame_draws: Vec<DrawCall>,
    uploads: usize,
    releases: usize,
}

impl RecordingRenderer {
    /// Creates a renderer with nothing resident.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers of a resident handle.
    pub fn resident(&self, handle: GpuHandle) -> Option<&ResidentMesh> {
        self.resident.get(&handle)
    }

    /// Number of handles currently resident.
    pub fn resident_count(&self) -> usize {
        self.resident.len()
    }

    /// Draw calls issued since the last `begin_frame`.
    pub fn frame_draws(&self) -> &[DrawCall] {
        &self.frame_draws
    }

    /// Total number of uploads.
    pub fn upload_count(&self) -> usize {
        self.uploads
    }

    /// Total number of releases.
    pub fn release_count(&self) -> usize {
        self.releases
    }
}

impl ChunkRenderer for RecordingRenderer {
    fn upload(&mut self, mesh: &ChunkMeshBuffer) -> GpuHandle {
        let handle = GpuHandle(self.next_handle);
        self.next_handle += 1;
        self.uploads += 1;
        self.resident.insert(
            handle,
            ResidentMesh {
                vertex_bytes: mesh.vertex_bytes().to_vec(),
                index_bytes: mesh.index_bytes().to_vec(),
                index_count: mesh.index_count(),
            },
        );
        trace!("Uploaded {handle:?} with {} indices", mesh.index_count());
        handle
    }

    fn release(&mut self, handle: GpuHandle) {
        if self.resident.remove(&handle).is_some() {
            self.releases += 1;
        } else {
            warn!("Release of unknown GPU handle {handle:?}");
        }
    }

    fn begin_frame(&mut self) {
        self.frame_draws.clear();
    }

    fn draw(&mut self, handle: GpuHandle, translation: Vector3<f32>) {
        match self.resident.get(&handle) {
            Some(mesh) if mesh.index_count == 0 => {}
            Some(_) => self.frame_draws.push(DrawCall {
                handle,
                translation,
            }),
            None => warn!("Draw of unknown GPU handle {handle:?}"),
        }
    }
}

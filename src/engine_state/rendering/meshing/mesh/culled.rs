//! Face-culling mesher.
//!
//! Every non-air voxel is visited in `x -> y -> z` order and each of its six
//! faces is emitted when the voxel it looks at is air. Faces crossing a
//! column edge look into the matching neighbor grid; faces crossing the top
//! or bottom of the world follow the floor/ceiling settings.

use cgmath::Point3;
use log::debug;
use web_time::Instant;

use crate::core::{NeighborPolicy, WorldConfig};
use crate::engine_state::voxels::{
    block::{block_side::BlockSide, BlockCatalog},
    chunk::{NeighborSet, VoxelGrid},
};

use super::mesh::ChunkMeshBuffer;

/// Visibility rules that are not determined by voxel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshSettings {
    /// Treatment of faces bordering a neighbor that is not loaded
    pub unloaded_neighbor_policy: NeighborPolicy,
    /// Emit Down faces at `y == 0`
    pub render_world_floor: bool,
    /// Emit Up faces at `y == height - 1`
    pub render_world_ceiling: bool,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self::from(&WorldConfig::default())
    }
}

impl From<&WorldConfig> for MeshSettings {
    fn from(config: &WorldConfig) -> Self {
        Self {
            unloaded_neighbor_policy: config.unloaded_neighbor_policy,
            render_world_floor: config.render_world_floor,
            render_world_ceiling: config.render_world_ceiling,
        }
    }
}

/// Builds the mesh of one chunk.
///
/// The output is a pure function of the inputs: identical grids, neighbors
/// and settings always produce identical buffers.
pub fn build_chunk_mesh(
    grid: &VoxelGrid,
    neighbors: &NeighborSet,
    catalog: &BlockCatalog,
    settings: MeshSettings,
) -> ChunkMeshBuffer {
    let start = Instant::now();
    let mut mesh = ChunkMeshBuffer::new();

    for (position, block) in grid.solid_blocks() {
        let local = Point3::new(position.x as i32, position.y as i32, position.z as i32);
        for side in BlockSide::all() {
            let target = local + side.offset();
            let visible = match grid.get_signed(target) {
                Some(other) => other == 0,
                None => edge_face_visible(grid, neighbors, settings, side, target),
            };
            if visible {
                mesh.add_face(position, side, catalog.texture_coordinates(block, side));
            }
        }
    }

    debug!(
        "Meshed {} solid voxels into {} quads in {:?}",
        grid.solid_count(),
        mesh.quad_count(),
        start.elapsed()
    );
    mesh
}

/// Visibility of a face whose target lies outside the grid.
fn edge_face_visible(
    grid: &VoxelGrid,
    neighbors: &NeighborSet,
    settings: MeshSettings,
    side: BlockSide,
    target: Point3<i32>,
) -> bool {
    match side {
        BlockSide::UP => settings.render_world_ceiling,
        BlockSide::DOWN => settings.render_world_floor,
        _ => match neighbors.get(side) {
            None => settings.unloaded_neighbor_policy == NeighborPolicy::AssumeVisible,
            Some(neighbor) => {
                // Wrap the out-of-range coordinate into the neighbor's local space.
                let width = grid.dimensions().width as i32;
                let wrapped = Point3::new(
                    target.x.rem_euclid(width),
                    target.y,
                    target.z.rem_euclid(width),
                );
                neighbor.get_signed(wrapped).map_or(true, |block| block == 0)
            }
        },
    }
}

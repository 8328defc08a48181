//! End-to-end tests of the streaming world.
//!
//! Tests:
//! - Window residency and the render radius
//! - Eviction on viewer movement, with GPU handles released
//! - Edits, neighbor remeshing and write-through saves
//! - Evict and reload round trip through persistence
//! - Edits that finish after their chunk was reloaded
//! - Shutdown

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

use cgmath::{Point3, Vector3};
use voxel_stream::engine_state::rendering::meshing::{build_chunk_mesh, MeshSettings};
use voxel_stream::engine_state::voxels::block::BlockCatalog;
use voxel_stream::engine_state::voxels::terrain::{MemoryChunkStore, PersistentTerrain};
use voxel_stream::{
    ChunkCoordinate, ChunkDimensions, RecordingRenderer, TerrainSource, VoxelError, VoxelGrid,
    World, WorldConfig,
};

const WIDTH: usize = 8;
const HEIGHT: usize = 16;
const GROUND: usize = 5;

/// Flat stone below `GROUND`, counting loads.
struct FlatTerrain {
    loads: AtomicUsize,
}

impl FlatTerrain {
    fn new() -> Self {
        Self {
            loads: AtomicUsize::new(0),
        }
    }
}

impl TerrainSource for FlatTerrain {
    fn load(&self, _coordinate: ChunkCoordinate) -> VoxelGrid {
        self.loads.fetch_add(1, Ordering::SeqCst);
        VoxelGrid::filled_below(ChunkDimensions::new(WIDTH, HEIGHT), GROUND, 3)
    }

    fn save(&self, _coordinate: ChunkCoordinate, _grid: &VoxelGrid) {}
}

/// Flat terrain whose saves block until `open` is called.
struct GatedSaves {
    open: Mutex<bool>,
    opened: Condvar,
}

impl GatedSaves {
    fn new() -> Self {
        Self {
            open: Mutex::new(false),
            opened: Condvar::new(),
        }
    }

    fn open(&self) {
        *self.open.lock().unwrap() = true;
        self.opened.notify_all();
    }
}

impl TerrainSource for GatedSaves {
    fn load(&self, _coordinate: ChunkCoordinate) -> VoxelGrid {
        VoxelGrid::filled_below(ChunkDimensions::new(WIDTH, HEIGHT), GROUND, 3)
    }

    fn save(&self, _coordinate: ChunkCoordinate, _grid: &VoxelGrid) {
        let mut open = self.open.lock().unwrap();
        while !*open {
            open = self.opened.wait(open).unwrap();
        }
    }
}

fn config() -> WorldConfig {
    WorldConfig {
        chunk_width: WIDTH,
        chunk_height: HEIGHT,
        load_radius: 1,
        extra_load_margin: 1,
        render_radius: 1,
        worker_threads: Some(3),
        task_queue_capacity: 8,
        max_loads_per_frame: 6,
        max_meshes_per_frame: 4,
        ..WorldConfig::default()
    }
}

/// Center of a chunk at eye height.
fn viewer_in(x: i32, z: i32) -> Point3<f32> {
    let half = WIDTH as f32 / 2.0;
    Point3::new(
        x as f32 * WIDTH as f32 + half,
        HEIGHT as f32 - 2.5,
        z as f32 * WIDTH as f32 + half,
    )
}

/// Ticks until nothing is left in the pipeline.
fn settle(world: &mut World<RecordingRenderer>, viewer: Point3<f32>) {
    for _ in 0..500 {
        world.tick(viewer);
        if !world.has_pending_work() {
            return;
        }
        world.wait_for_background_work();
    }
    panic!("world did not settle");
}

fn flat_world() -> (World<RecordingRenderer>, Arc<FlatTerrain>) {
    let terrain = Arc::new(FlatTerrain::new());
    let world = World::with_terrain(config(), RecordingRenderer::new(), terrain.clone()).unwrap();
    (world, terrain)
}

fn gpu_handles_in_store(world: &World<RecordingRenderer>) -> usize {
    world
        .store()
        .iter()
        .filter(|record| record.gpu_handle.is_some())
        .count()
}

#[test]
fn streams_window_and_draws_render_radius() {
    let (mut world, terrain) = flat_world();
    let viewer = viewer_in(0, 0);
    settle(&mut world, viewer);

    assert_eq!(world.store().len(), 25);
    assert_eq!(terrain.loads.load(Ordering::SeqCst), 25);
    assert_eq!(world.render(), 9);
    assert_eq!(world.renderer().frame_draws().len(), 9);

    // The outer ring has no complete neighborhood and stays unmeshed.
    assert_eq!(world.renderer().resident_count(), 9);
    assert_eq!(gpu_handles_in_store(&world), 9);
}

#[test]
fn resident_meshes_match_current_data() {
    let (mut world, _) = flat_world();
    settle(&mut world, viewer_in(0, 0));

    let catalog = BlockCatalog::new();
    let settings = MeshSettings::from(world.config());
    for record in world.store().iter().filter(|record| record.mesh_loaded) {
        let neighbors = world.store().neighbors(record.coordinate());
        let expected = build_chunk_mesh(record.grid(), &neighbors, &catalog, settings);
        assert_eq!(record.mesh.as_ref(), Some(&expected));
    }
}

#[test]
fn moving_evicts_and_releases_gpu_handles() {
    let (mut world, _) = flat_world();
    settle(&mut world, viewer_in(0, 0));

    let stats = world.tick(viewer_in(3, 0));
    assert!(stats.window_changed);
    assert_eq!(stats.evictions, 15);
    assert!(world
        .store()
        .coordinates()
        .all(|c| c.chebyshev_distance(ChunkCoordinate::new(3, 0)) <= 2));

    settle(&mut world, viewer_in(3, 0));
    assert_eq!(world.store().len(), 25);
    // Every handle the renderer still holds belongs to a resident chunk.
    assert_eq!(world.renderer().resident_count(), gpu_handles_in_store(&world));
    assert!(world.renderer().release_count() >= 6);
    assert_eq!(world.render(), 9);
}

#[test]
fn staying_in_a_chunk_does_not_recompute_the_window() {
    let (mut world, terrain) = flat_world();
    settle(&mut world, viewer_in(0, 0));

    let nudged = viewer_in(0, 0) + Vector3::new(1.0, 0.0, -1.0);
    let stats = world.tick(nudged);
    assert!(!stats.window_changed);
    assert_eq!(stats.loads_submitted, 0);
    assert_eq!(terrain.loads.load(Ordering::SeqCst), 25);
}

#[test]
fn interior_edit_remeshes_only_its_chunk() {
    let (mut world, _) = flat_world();
    let viewer = viewer_in(0, 0);
    settle(&mut world, viewer);

    assert_eq!(world.edit_block(Point3::new(3, GROUND as i32, 3), 2), Ok(true));
    world.wait_for_background_work();
    let stats = world.update(viewer);
    assert_eq!(stats.data_applied, 1);
    assert_eq!(stats.meshes_submitted, 1);

    settle(&mut world, viewer);
    assert_eq!(world.block_at(Point3::new(3, GROUND as i32, 3)), Some(2));
}

#[test]
fn edge_edit_remeshes_the_neighbor() {
    let (mut world, _) = flat_world();
    let viewer = viewer_in(0, 0);
    settle(&mut world, viewer);

    // Local x == 0 borders the chunk to the west.
    assert_eq!(world.edit_block(Point3::new(0, GROUND as i32 - 1, 3), 0), Ok(true));
    world.wait_for_background_work();
    let stats = world.update(viewer);
    assert_eq!(stats.data_applied, 1);
    assert_eq!(stats.meshes_submitted, 2);

    settle(&mut world, viewer);
    assert_eq!(world.block_at(Point3::new(0, GROUND as i32 - 1, 3)), Some(0));
    assert_eq!(world.block_at(Point3::new(-1, GROUND as i32 - 1, 3)), Some(3));
}

#[test]
fn consecutive_edits_to_one_chunk_all_land() {
    let (mut world, _) = flat_world();
    let viewer = viewer_in(0, 0);
    settle(&mut world, viewer);

    for x in 1..WIDTH as i32 - 1 {
        assert_eq!(world.edit_block(Point3::new(x, GROUND as i32, 4), 1), Ok(true));
    }
    settle(&mut world, viewer);
    for x in 1..WIDTH as i32 - 1 {
        assert_eq!(world.block_at(Point3::new(x, GROUND as i32, 4)), Some(1));
    }
}

#[test]
fn edits_outside_the_resident_world() {
    let (mut world, _) = flat_world();
    settle(&mut world, viewer_in(0, 0));

    assert!(matches!(
        world.edit_block(Point3::new(0, HEIGHT as i32, 0), 1),
        Err(VoxelError::OutOfBounds { .. })
    ));
    assert!(world.edit_block(Point3::new(0, -1, 0), 1).is_err());
    assert_eq!(world.edit_block(Point3::new(100 * WIDTH as i32, 1, 0), 1), Ok(false));

    assert_eq!(world.block_at(Point3::new(0, -3, 0)), Some(0));
    assert_eq!(world.block_at(Point3::new(0, HEIGHT as i32 + 3, 0)), Some(0));
    assert_eq!(world.block_at(Point3::new(100 * WIDTH as i32, 1, 0)), None);
}

#[test]
fn raycast_finds_the_ground() {
    let (mut world, _) = flat_world();
    let viewer = viewer_in(0, 0);
    settle(&mut world, viewer);

    let hit = world
        .raycast(viewer, Vector3::new(0.0, -1.0, 0.0), HEIGHT as f32)
        .unwrap();
    assert_eq!(hit.block_position.y, GROUND as i32 - 1);
    assert_eq!(hit.normal, Vector3::new(0, 1, 0));
    assert!(world
        .raycast(viewer, Vector3::new(0.0, 1.0, 0.0), HEIGHT as f32)
        .is_none());
}

#[test]
fn edited_chunks_survive_eviction() {
    let config = config();
    let saves = Arc::new(MemoryChunkStore::new());
    let terrain = Arc::new(PersistentTerrain::new(&config, saves.clone()));
    let mut world = World::with_terrain(config, RecordingRenderer::new(), terrain).unwrap();

    let home = viewer_in(0, 0);
    settle(&mut world, home);
    let position = Point3::new(2, HEIGHT as i32 - 1, 5);
    assert_eq!(world.edit_block(position, 3), Ok(true));
    settle(&mut world, home);
    assert_eq!(world.block_at(position), Some(3));
    assert!(saves.stored(ChunkCoordinate::new(0, 0)).is_some());

    settle(&mut world, viewer_in(20, 0));
    assert_eq!(world.block_at(position), None);

    settle(&mut world, home);
    assert_eq!(world.block_at(position), Some(3));
    let origin = ChunkCoordinate::new(0, 0);
    assert_eq!(
        saves.stored(origin).as_deref(),
        Some(world.store().get(origin).unwrap().grid().as_bytes())
    );
}

#[test]
fn edit_finishing_after_evict_and_reload_is_dropped() {
    let terrain = Arc::new(GatedSaves::new());
    let mut world =
        World::with_terrain(config(), RecordingRenderer::new(), terrain.clone()).unwrap();
    let home = viewer_in(0, 0);
    let origin = ChunkCoordinate::new(0, 0);
    settle(&mut world, home);

    let position = Point3::new(3, GROUND as i32, 3);
    assert_eq!(world.edit_block(position, 1), Ok(true));

    // The edit is parked in its save while the chunk is evicted and reloaded.
    world.tick(viewer_in(20, 0));
    assert!(!world.store().contains(origin));
    let mut reloaded = false;
    for _ in 0..2000 {
        world.tick(home);
        if world.store().contains(origin) {
            reloaded = true;
            break;
        }
        thread::sleep(Duration::from_millis(1));
    }
    terrain.open();
    assert!(reloaded);

    settle(&mut world, home);
    assert_eq!(world.block_at(position), Some(0));
    assert_eq!(world.edit_block(position, 2), Ok(true));
    settle(&mut world, home);
    assert_eq!(world.block_at(position), Some(2));
}

#[test]
fn shutdown_releases_every_handle() {
    let (mut world, _) = flat_world();
    settle(&mut world, viewer_in(0, 0));
    settle(&mut world, viewer_in(1, 1));
    assert!(world.renderer().resident_count() > 0);

    world.shutdown();
    assert!(world.store().is_empty());
    assert_eq!(world.renderer().resident_count(), 0);
    assert_eq!(
        world.renderer().upload_count(),
        world.renderer().release_count()
    );
    assert!(!world.has_pending_work());

    world.shutdown();
    assert_eq!(world.renderer().resident_count(), 0);
}

#[test]
fn independent_worlds_do_not_interfere() {
    let (mut first, _) = flat_world();
    let (mut second, _) = flat_world();
    settle(&mut first, viewer_in(0, 0));
    settle(&mut second, viewer_in(5, 5));

    assert_eq!(first.edit_block(Point3::new(1, 1, 1), 0), Ok(true));
    settle(&mut first, viewer_in(0, 0));
    assert_eq!(first.block_at(Point3::new(1, 1, 1)), Some(0));
    assert_eq!(second.viewer_chunk(), Some(ChunkCoordinate::new(5, 5)));
    assert_eq!(second.block_at(Point3::new(1, 1, 1)), None);
}

#[test]
fn invalid_configuration_is_rejected() {
    let config = WorldConfig {
        render_radius: 9,
        ..config()
    };
    assert!(World::new(config, RecordingRenderer::new()).is_err());
}

#[test]
fn custom_catalog_reaches_the_mesher() {
    let mut catalog = BlockCatalog::new();
    catalog.register_uniform(7, (4, 4));
    let (world, _) = flat_world();
    let mut world = world.with_catalog(catalog);
    let viewer = viewer_in(0, 0);
    settle(&mut world, viewer);

    assert_eq!(world.edit_block(Point3::new(4, GROUND as i32, 4), 7), Ok(true));
    settle(&mut world, viewer);

    let record = world.store().get(ChunkCoordinate::new(0, 0)).unwrap();
    let mesh = record.mesh.as_ref().unwrap();
    assert!(mesh.vertices().iter().any(|vertex| vertex.atlas() == (4, 4)));
}

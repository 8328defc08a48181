//! # Engine State Module
//!
//! The streaming world: the per-frame pipeline that moves chunks from
//! unloaded through data-loaded, meshed and GPU-resident to evicted.
//!
//! ## Key Components
//!
//! * `World` - owns every chunk record and drives the pipeline
//! * `load_window` - square regions of chunk coordinates around the viewer
//! * `rendering` - meshing, the renderer contract and the mesh task
//! * `task_management` - the worker pool and result queues
//! * `voxels` - voxel data, terrain sources and data tasks
//!
//! ## Architecture
//!
//! `World` is the single writer. It runs on the main thread, which is also
//! the thread owning the GPU context. Workers receive immutable snapshots and
//! report back through typed result queues that the world drains each frame:
//!
//! 1. Apply data results (loads and edits)
//! 2. Apply mesh results
//! 3. Release queued GPU handles, then upload fresh meshes
//! 4. On a chunk crossing: recompute the load window, evict chunks outside
//!    it and rebuild the nearest-first load queue
//! 5. Submit queued edits, then loads and meshes, throttled per frame
//! 6. Draw resident chunks within the render radius
//!
//! Results for chunks that were evicted or changed since the work was
//! submitted are discarded on apply.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use cgmath::{Point3, Vector3};
use log::{debug, info, trace, warn};

use crate::core::{VoxelError, WorldConfig};

use load_window::LoadWindow;
use rendering::{
    meshing::MeshSettings,
    tasks::chunk_mesh_generation_task::{ChunkMeshGenerationTask, ChunkMeshResult},
    ChunkRenderer, GpuHandle,
};
use task_management::{result_queue::ResultQueue, TaskManager};
use voxels::{
    block::{block_side::BlockSide, BlockCatalog, BlockTypeSize},
    chunk::{ChunkCoordinate, ChunkDimensions},
    chunk_store::ChunkStore,
    raycast::{cast_ray, RayCastHit},
    tasks::{
        block_edit_task::BlockEditTask, chunk_generation_task::ChunkGenerationTask, BlockEdit,
        ChunkData, ChunkDataResult,
    },
    terrain::{ChunkFileStore, HeightmapGenerator, PersistentTerrain, TerrainSource},
};

pub mod load_window;
pub mod rendering;
pub mod task_management;
pub mod voxels;

/// Counters describing one frame of the pipeline.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    /// The viewer entered a new chunk and the window was recomputed
    pub window_changed: bool,
    /// Load tasks submitted
    pub loads_submitted: usize,
    /// Mesh tasks submitted
    pub meshes_submitted: usize,
    /// Edit tasks submitted
    pub edits_submitted: usize,
    /// Data results applied to the store
    pub data_applied: usize,
    /// Mesh results applied to the store
    pub meshes_applied: usize,
    /// Data or mesh results dropped as stale
    pub results_discarded: usize,
    /// Loads that failed in the terrain source
    pub failed_loads: usize,
    /// Meshes uploaded to the renderer
    pub uploads: usize,
    /// GPU handles released
    pub releases: usize,
    /// Chunks removed from the store
    pub evictions: usize,
    /// Chunks drawn
    pub draws: usize,
}

/// A streamed voxel world rendered through `R`.
///
/// All methods must be called from the thread that owns the renderer.
pub struct World<R: ChunkRenderer> {
    config: WorldConfig,
    dimensions: ChunkDimensions,
    mesh_settings: MeshSettings,
    store: ChunkStore,
    task_manager: TaskManager,
    terrain: Arc<dyn TerrainSource>,
    catalog: Arc<BlockCatalog>,
    renderer: R,
    data_ready: ResultQueue<ChunkDataResult>,
    mesh_ready: ResultQueue<ChunkMeshResult>,
    gpu_teardown: ResultQueue<GpuHandle>,
    viewer_chunk: Option<ChunkCoordinate>,
    window: Option<LoadWindow>,
    pending_loads: VecDeque<ChunkCoordinate>,
    loads_in_flight: HashSet<ChunkCoordinate>,
    meshes_in_flight: HashSet<ChunkCoordinate>,
    /// Data version each in-flight edit was based on
    edits_in_flight: HashMap<ChunkCoordinate, u64>,
    queued_edits: HashMap<ChunkCoordinate, Vec<BlockEdit>>,
}

impl<R: ChunkRenderer> World<R> {
    /// Creates a world from its configuration.
    ///
    /// Chunk data is synthesized from height noise. When `save_directory` is
    /// set, saved chunks are read from and edits written to that directory.
    pub fn new(config: WorldConfig, renderer: R) -> anyhow::Result<Self> {
        config.validate()?;
        let terrain: Arc<dyn TerrainSource> = match &config.save_directory {
            Some(directory) => Arc::new(PersistentTerrain::new(
                &config,
                ChunkFileStore::open(directory)?,
            )),
            None => Arc::new(HeightmapGenerator::new(
                config.dimensions(),
                &config.terrain,
            )),
        };
        Self::with_terrain(config, renderer, terrain)
    }

    /// Creates a world reading chunk data from a custom terrain source.
    pub fn with_terrain(
        config: WorldConfig,
        renderer: R,
        terrain: Arc<dyn TerrainSource>,
    ) -> anyhow::Result<Self> {
        config.validate()?;
        let workers = config.resolved_worker_threads();
        let task_manager = TaskManager::new(workers, config.task_queue_capacity);
        info!(
            "Created world with {}x{}x{} chunks, window radius {}, render radius {}",
            config.chunk_width,
            config.chunk_height,
            config.chunk_width,
            config.window_radius(),
            config.render_radius
        );
        Ok(Self {
            dimensions: config.dimensions(),
            mesh_settings: MeshSettings::from(&config),
            config,
            store: ChunkStore::new(),
            task_manager,
            terrain,
            catalog: Arc::new(BlockCatalog::new()),
            renderer,
            data_ready: ResultQueue::new(),
            mesh_ready: ResultQueue::new(),
            gpu_teardown: ResultQueue::new(),
            viewer_chunk: None,
            window: None,
            pending_loads: VecDeque::new(),
            loads_in_flight: HashSet::new(),
            meshes_in_flight: HashSet::new(),
            edits_in_flight: HashMap::new(),
            queued_edits: HashMap::new(),
        })
    }

    /// Replaces the block catalog used by future mesh tasks.
    pub fn with_catalog(mut self, catalog: BlockCatalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    /// Runs one frame: the update pipeline followed by the render pass.
    pub fn tick(&mut self, viewer: Point3<f32>) -> FrameStats {
        let mut stats = self.update(viewer);
        stats.draws = self.render();
        stats
    }

    /// Runs the update pipeline for a viewer position. Never blocks on workers.
    pub fn update(&mut self, viewer: Point3<f32>) -> FrameStats {
        let mut stats = FrameStats::default();

        self.apply_data_results(&mut stats);
        self.apply_mesh_results(&mut stats);
        self.release_gpu_teardown(&mut stats);
        self.upload_meshes(&mut stats);

        let viewer_chunk = ChunkCoordinate::from_world_position(viewer, self.dimensions.width);
        if self.viewer_chunk != Some(viewer_chunk) {
            self.move_window(viewer_chunk, &mut stats);
        }

        self.submit_edits(&mut stats);
        self.submit_loads(&mut stats);
        self.submit_meshes(&mut stats);

        if stats != FrameStats::default() {
            trace!("Frame stats: {stats:?}");
        }
        stats
    }

    /// Draws every GPU-resident chunk within the render radius and returns the draw count.
    pub fn render(&mut self) -> usize {
        self.renderer.begin_frame();
        let Some(viewer_chunk) = self.viewer_chunk else {
            return 0;
        };
        let mut visible: Vec<(ChunkCoordinate, GpuHandle)> = self
            .store
            .iter()
            .filter(|record| record.mesh_loaded)
            .filter(|record| {
                record.coordinate().chebyshev_distance(viewer_chunk) <= self.config.render_radius
            })
            .filter_map(|record| record.gpu_handle.map(|handle| (record.coordinate(), handle)))
            .collect();
        visible.sort();

        for (coordinate, handle) in &visible {
            let translation: Vector3<f32> = coordinate.world_translation(self.dimensions.width);
            self.renderer.draw(*handle, translation);
        }
        visible.len()
    }

    fn apply_data_results(&mut self, stats: &mut FrameStats) {
        for result in self.data_ready.drain() {
            let coordinate = result.coordinate;
            match result.data {
                ChunkData::Loaded(grid) => {
                    self.loads_in_flight.remove(&coordinate);
                    let wanted = self
                        .window
                        .is_some_and(|window| window.contains(coordinate));
                    if !wanted {
                        trace!("Discarding load of chunk {coordinate}, no longer in range");
                        stats.results_discarded += 1;
                        continue;
                    }
                    self.store.insert_or_replace(coordinate, grid);
                    // Neighbors meshed without this chunk or against an older copy need a remesh.
                    for neighbor in coordinate.neighbors() {
                        if let Some(record) = self.store.get_mut(neighbor) {
                            if record.is_meshed() || self.meshes_in_flight.contains(&neighbor) {
                                record.dirty = true;
                            }
                        }
                    }
                    debug!("Applied data of chunk {coordinate}");
                }
                ChunkData::Edited {
                    grid,
                    base_version,
                    touched,
                } => {
                    if self.edits_in_flight.get(&coordinate) == Some(&base_version) {
                        self.edits_in_flight.remove(&coordinate);
                    }
                    match self.store.get(coordinate) {
                        Some(record) if record.data_version() == base_version => {}
                        Some(_) => {
                            trace!("Discarding edit of chunk {coordinate}, it was reloaded");
                            stats.results_discarded += 1;
                            continue;
                        }
                        None => {
                            trace!("Discarding edit of chunk {coordinate}, it was evicted");
                            stats.results_discarded += 1;
                            continue;
                        }
                    }
                    self.store.insert_or_replace(coordinate, grid);
                    for side in edge_sides(&touched, self.dimensions) {
                        if let Some(record) = self.store.get_mut(coordinate.neighbor(side)) {
                            record.dirty = true;
                        }
                    }
                    debug!("Applied {} edits to chunk {coordinate}", touched.len());
                }
                ChunkData::LoadFailed => {
                    // Retried on the next window change.
                    self.loads_in_flight.remove(&coordinate);
                    warn!("Load of chunk {coordinate} failed");
                    stats.failed_loads += 1;
                    continue;
                }
            }
            stats.data_applied += 1;
        }
    }

    fn apply_mesh_results(&mut self, stats: &mut FrameStats) {
        for result in self.mesh_ready.drain() {
            let coordinate = result.coordinate;
            self.meshes_in_flight.remove(&coordinate);
            match self.store.get_mut(coordinate) {
                Some(record) if record.data_version() == result.data_version => {
                    record.mesh = Some(result.mesh);
                    record.pending_upload = true;
                    stats.meshes_applied += 1;
                }
                Some(_) => {
                    trace!("Discarding outdated mesh of chunk {coordinate}");
                    stats.results_discarded += 1;
                }
                None => {
                    trace!("Discarding mesh of evicted chunk {coordinate}");
                    stats.results_discarded += 1;
                }
            }
        }
    }

    fn release_gpu_teardown(&mut self, stats: &mut FrameStats) {
        for handle in self.gpu_teardown.drain() {
            self.renderer.release(handle);
            stats.releases += 1;
        }
    }

    fn upload_meshes(&mut self, stats: &mut FrameStats) {
        for record in self.store.iter_mut().filter(|record| record.pending_upload) {
            let Some(mesh) = &record.mesh else {
                record.pending_upload = false;
                continue;
            };
            let handle = self.renderer.upload(mesh);
            if let Some(previous) = record.gpu_handle.replace(handle) {
                self.renderer.release(previous);
                stats.releases += 1;
            }
            record.pending_upload = false;
            record.mesh_loaded = true;
            stats.uploads += 1;
        }
    }

    fn move_window(&mut self, viewer_chunk: ChunkCoordinate, stats: &mut FrameStats) {
        info!("Viewer entered chunk {viewer_chunk}");
        let window = LoadWindow::new(viewer_chunk, self.config.window_radius());
        self.viewer_chunk = Some(viewer_chunk);
        self.window = Some(window);
        stats.window_changed = true;

        self.pending_loads = window
            .coordinates_nearest_first()
            .into_iter()
            .filter(|c| !self.store.contains(*c) && !self.loads_in_flight.contains(c))
            .collect();

        let evicted: Vec<ChunkCoordinate> = self
            .store
            .coordinates()
            .filter(|c| !window.contains(*c))
            .collect();
        for coordinate in evicted {
            if let Some(record) = self.store.remove(coordinate) {
                if let Some(handle) = record.gpu_handle {
                    self.gpu_teardown.push(handle);
                }
                self.edits_in_flight.remove(&coordinate);
                if let Some(edits) = self.queued_edits.remove(&coordinate) {
                    debug!(
                        "Dropping {} queued edits of evicted chunk {coordinate}",
                        edits.len()
                    );
                }
                debug!("Evicted chunk {coordinate}");
                stats.evictions += 1;
            }
        }
    }

    fn submit_loads(&mut self, stats: &mut FrameStats) {
        while stats.loads_submitted < self.config.max_loads_per_frame {
            let Some(coordinate) = self.pending_loads.pop_front() else {
                break;
            };
            if self.store.contains(coordinate) || !self.loads_in_flight.insert(coordinate) {
                continue;
            }
            debug!("Submitting load of chunk {coordinate}");
            self.task_manager.submit(Box::new(ChunkGenerationTask::new(
                coordinate,
                self.terrain.clone(),
                self.data_ready.clone(),
            )));
            stats.loads_submitted += 1;
        }
    }

    fn mesh_eligible(&self, coordinate: ChunkCoordinate) -> bool {
        self.config.mesh_with_missing_neighbors || self.store.has_all_neighbors(coordinate)
    }

    fn submit_meshes(&mut self, stats: &mut FrameStats) {
        let Some(window) = self.window else {
            return;
        };
        let mut candidates: Vec<ChunkCoordinate> = self
            .store
            .iter()
            .filter(|record| record.dirty)
            .map(|record| record.coordinate())
            .filter(|c| !self.meshes_in_flight.contains(c) && self.mesh_eligible(*c))
            .collect();
        candidates.sort_by(|a, b| window.compare_distance(*a, *b));
        candidates.truncate(self.config.max_meshes_per_frame);

        for coordinate in candidates {
            let neighbors = self.store.neighbors(coordinate);
            let Some(record) = self.store.get_mut(coordinate) else {
                continue;
            };
            record.dirty = false;
            self.meshes_in_flight.insert(coordinate);
            debug!(
                "Submitting mesh of chunk {coordinate} (version {})",
                record.data_version()
            );
            self.task_manager.submit(Box::new(ChunkMeshGenerationTask::new(
                coordinate,
                record.data_version(),
                record.grid().clone(),
                neighbors,
                self.catalog.clone(),
                self.mesh_settings,
                self.mesh_ready.clone(),
            )));
            stats.meshes_submitted += 1;
        }
    }

    fn submit_edits(&mut self, stats: &mut FrameStats) {
        let ready: Vec<ChunkCoordinate> = self
            .queued_edits
            .keys()
            .copied()
            .filter(|c| !self.edits_in_flight.contains_key(c))
            .collect();
        for coordinate in ready {
            if self.submit_edit_batch(coordinate) {
                stats.edits_submitted += 1;
            }
        }
    }

    /// Submits the queued edits of one chunk as a single task.
    fn submit_edit_batch(&mut self, coordinate: ChunkCoordinate) -> bool {
        let Some(edits) = self.queued_edits.remove(&coordinate) else {
            return false;
        };
        let Some(record) = self.store.get(coordinate) else {
            return false;
        };
        self.edits_in_flight.insert(coordinate, record.data_version());
        self.task_manager.submit(Box::new(BlockEditTask::new(
            coordinate,
            record.grid().clone(),
            record.data_version(),
            edits,
            self.terrain.clone(),
            self.data_ready.clone(),
        )));
        true
    }

    /// Requests a block change at an absolute block position.
    ///
    /// Returns `Ok(false)` when the owning chunk is not resident, in which
    /// case the edit is ignored. Edits to a chunk that already has an edit in
    /// flight are batched and submitted once that edit has been applied.
    ///
    /// # Errors
    /// `VoxelError::OutOfBounds` when `y` lies below or above the world.
    pub fn edit_block(
        &mut self,
        position: Point3<i32>,
        block: BlockTypeSize,
    ) -> Result<bool, VoxelError> {
        let (coordinate, local) = ChunkCoordinate::split_block_position(position, self.dimensions)
            .ok_or(VoxelError::OutOfBounds {
                x: position.x as i64,
                y: position.y as i64,
                z: position.z as i64,
                width: self.dimensions.width,
                height: self.dimensions.height,
            })?;
        if !self.store.contains(coordinate) {
            debug!("Ignoring edit at {position:?}, chunk {coordinate} is not loaded");
            return Ok(false);
        }

        self.queued_edits
            .entry(coordinate)
            .or_default()
            .push(BlockEdit { local, block });
        if !self.edits_in_flight.contains_key(&coordinate) {
            self.submit_edit_batch(coordinate);
        }
        Ok(true)
    }

    /// Block code at an absolute block position.
    ///
    /// Positions above or below the world are air. Returns `None` when the
    /// owning chunk is not resident.
    pub fn block_at(&self, position: Point3<i32>) -> Option<BlockTypeSize> {
        match ChunkCoordinate::split_block_position(position, self.dimensions) {
            None => Some(0),
            Some((coordinate, local)) => self
                .store
                .get(coordinate)
                .and_then(|record| record.grid().get(local.x, local.y, local.z).ok()),
        }
    }

    /// Casts a ray against resident chunk data.
    pub fn raycast(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Option<RayCastHit> {
        cast_ray(origin, direction, max_distance, |position| {
            self.block_at(position).is_some_and(|block| block != 0)
        })
    }

    /// Blocks until every submitted background task has finished.
    ///
    /// The results are applied by the next `update`.
    pub fn wait_for_background_work(&self) {
        self.task_manager.wait_idle();
    }

    /// Whether any chunk is still moving through the pipeline.
    ///
    /// Dirty chunks that cannot mesh yet because a neighbor is outside the
    /// window do not count.
    pub fn has_pending_work(&self) -> bool {
        !self.pending_loads.is_empty()
            || !self.loads_in_flight.is_empty()
            || !self.meshes_in_flight.is_empty()
            || !self.edits_in_flight.is_empty()
            || !self.queued_edits.is_empty()
            || !self.data_ready.is_empty()
            || !self.mesh_ready.is_empty()
            || !self.gpu_teardown.is_empty()
            || self.store.iter().any(|record| {
                record.pending_upload || (record.dirty && self.mesh_eligible(record.coordinate()))
            })
    }

    /// Waits for the workers, drops outstanding results and releases every GPU handle.
    ///
    /// The world is empty afterwards; a later `update` starts streaming again.
    pub fn shutdown(&mut self) {
        self.task_manager.wait_idle();
        let dropped = self.data_ready.drain().len() + self.mesh_ready.drain().len();
        for handle in self.gpu_teardown.drain() {
            self.renderer.release(handle);
        }
        let coordinates: Vec<ChunkCoordinate> = self.store.coordinates().collect();
        for coordinate in coordinates {
            if let Some(handle) = self
                .store
                .remove(coordinate)
                .and_then(|record| record.gpu_handle)
            {
                self.renderer.release(handle);
            }
        }
        self.pending_loads.clear();
        self.loads_in_flight.clear();
        self.meshes_in_flight.clear();
        self.edits_in_flight.clear();
        self.queued_edits.clear();
        self.viewer_chunk = None;
        self.window = None;
        info!("World shut down ({dropped} unapplied results dropped)");
    }

    /// The chunk store.
    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    /// The renderer.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The renderer, mutable.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// The configuration the world was built with.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Chunk the viewer was in at the last update.
    pub fn viewer_chunk(&self) -> Option<ChunkCoordinate> {
        self.viewer_chunk
    }

    /// Current load window.
    pub fn load_window(&self) -> Option<LoadWindow> {
        self.window
    }

    /// Number of loads waiting for submission.
    pub fn pending_load_count(&self) -> usize {
        self.pending_loads.len()
    }
}

impl<R: ChunkRenderer> Drop for World<R> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Chunk sides whose neighbor shares a face with any of the touched voxels.
fn edge_sides(touched: &[Point3<usize>], dimensions: ChunkDimensions) -> Vec<BlockSide> {
    let last = dimensions.width - 1;
    let mut sides = Vec::new();
    for local in touched.iter().filter(|local| dimensions.on_column_edge(**local)) {
        let candidates = [
            (local.x == 0, BlockSide::WEST),
            (local.x == last, BlockSide::EAST),
            (local.z == 0, BlockSide::NORTH),
            (local.z == last, BlockSide::SOUTH),
        ];
        for (on_edge, side) in candidates {
            if on_edge && !sides.contains(&side) {
                sides.push(side);
            }
        }
    }
    sides
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::rendering::{ChunkMeshBuffer, RecordingRenderer};
    use crate::engine_state::voxels::chunk::VoxelGrid;

    struct Flat(ChunkDimensions);

    impl TerrainSource for Flat {
        fn load(&self, _coordinate: ChunkCoordinate) -> VoxelGrid {
            VoxelGrid::filled_below(self.0, 2, 1)
        }

        fn save(&self, _coordinate: ChunkCoordinate, _grid: &VoxelGrid) {}
    }

    const HOME: Point3<f32> = Point3 {
        x: 2.0,
        y: 6.0,
        z: 2.0,
    };

    fn test_config() -> WorldConfig {
        WorldConfig {
            chunk_width: 4,
            chunk_height: 8,
            load_radius: 1,
            extra_load_margin: 0,
            render_radius: 1,
            worker_threads: Some(2),
            mesh_with_missing_neighbors: true,
            ..WorldConfig::default()
        }
    }

    fn settled_world() -> World<RecordingRenderer> {
        settled_world_with(Arc::new(Flat(test_config().dimensions())))
    }

    fn settled_world_with(terrain: Arc<dyn TerrainSource>) -> World<RecordingRenderer> {
        let mut world =
            World::with_terrain(test_config(), RecordingRenderer::new(), terrain).unwrap();
        for _ in 0..200 {
            world.tick(HOME);
            if !world.has_pending_work() {
                break;
            }
            world.wait_for_background_work();
        }
        assert!(!world.has_pending_work());
        world
    }

    #[test]
    fn missing_neighbors_mode_meshes_the_whole_window() {
        let world = settled_world();
        assert_eq!(world.store().len(), 9);
        assert!(world.store().iter().all(|record| record.mesh_loaded));
        assert_eq!(world.renderer().resident_count(), 9);
    }

    #[test]
    fn outdated_and_orphaned_meshes_are_discarded() {
        let mut world = settled_world();
        let origin = ChunkCoordinate::new(0, 0);
        let current = world.store().get(origin).unwrap().data_version();
        let uploads = world.renderer().upload_count();

        world.mesh_ready.push(ChunkMeshResult {
            coordinate: origin,
            data_version: current - 1,
            mesh: ChunkMeshBuffer::new(),
        });
        world.mesh_ready.push(ChunkMeshResult {
            coordinate: ChunkCoordinate::new(40, 40),
            data_version: current,
            mesh: ChunkMeshBuffer::new(),
        });
        let stats = world.update(HOME);

        assert_eq!(stats.results_discarded, 2);
        assert_eq!(stats.meshes_applied, 0);
        assert_eq!(world.renderer().upload_count(), uploads);
        assert!(!world.store().get(origin).unwrap().mesh.as_ref().unwrap().is_empty());
    }

    #[test]
    fn loads_outside_the_window_are_discarded() {
        let mut world = settled_world();
        let far = ChunkCoordinate::new(-30, 2);
        world.loads_in_flight.insert(far);
        world.data_ready.push(ChunkDataResult {
            coordinate: far,
            data: ChunkData::Loaded(Arc::new(VoxelGrid::new(world.dimensions))),
        });

        let stats = world.update(HOME);
        assert_eq!(stats.results_discarded, 1);
        assert!(!world.store().contains(far));
        assert!(world.loads_in_flight.is_empty());
    }

    #[test]
    fn edits_based_on_an_older_copy_are_discarded() {
        let mut world = settled_world();
        let origin = ChunkCoordinate::new(0, 0);
        let current = world.store().get(origin).unwrap().data_version();
        // A newer edit against the current copy is still running.
        world.edits_in_flight.insert(origin, current);
        world.data_ready.push(ChunkDataResult {
            coordinate: origin,
            data: ChunkData::Edited {
                grid: Arc::new(VoxelGrid::new(world.dimensions)),
                base_version: current - 1,
                touched: vec![Point3::new(1, 1, 1)],
            },
        });

        let stats = world.update(HOME);
        assert_eq!(stats.results_discarded, 1);
        assert_eq!(stats.data_applied, 0);
        assert_eq!(world.store().get(origin).unwrap().data_version(), current);
        assert_eq!(world.block_at(Point3::new(1, 1, 1)), Some(1));
        assert_eq!(world.edits_in_flight.get(&origin), Some(&current));
    }

    #[test]
    fn eviction_forgets_edits_in_flight() {
        let mut world = settled_world();
        let origin = ChunkCoordinate::new(0, 0);
        let version = world.store().get(origin).unwrap().data_version();
        world.edits_in_flight.insert(origin, version);

        let stats = world.update(Point3::new(42.0, 6.0, 2.0));
        assert!(stats.evictions > 0);
        assert!(!world.store().contains(origin));
        assert!(world.edits_in_flight.is_empty());
    }

    /// Flat terrain whose source panics for one chunk.
    struct Hole {
        dimensions: ChunkDimensions,
        missing: ChunkCoordinate,
    }

    impl TerrainSource for Hole {
        fn load(&self, coordinate: ChunkCoordinate) -> VoxelGrid {
            assert_ne!(coordinate, self.missing, "corrupt chunk");
            VoxelGrid::filled_below(self.dimensions, 2, 1)
        }

        fn save(&self, _coordinate: ChunkCoordinate, _grid: &VoxelGrid) {}
    }

    #[test]
    fn failed_loads_leave_the_pipeline() {
        let missing = ChunkCoordinate::new(1, 0);
        let mut world = settled_world_with(Arc::new(Hole {
            dimensions: test_config().dimensions(),
            missing,
        }));
        assert_eq!(world.store().len(), 8);
        assert!(!world.store().contains(missing));
        assert!(world.loads_in_flight.is_empty());

        world.loads_in_flight.insert(missing);
        world.data_ready.push(ChunkDataResult {
            coordinate: missing,
            data: ChunkData::LoadFailed,
        });
        let stats = world.update(HOME);
        assert_eq!(stats.failed_loads, 1);
        assert_eq!(stats.data_applied, 0);
        assert!(!world.has_pending_work());
    }

    #[test]
    fn replaced_mesh_releases_the_previous_handle() {
        let mut world = settled_world();
        let origin = ChunkCoordinate::new(0, 0);
        let before = world.store().get(origin).unwrap().gpu_handle.unwrap();

        assert_eq!(world.edit_block(Point3::new(1, 5, 1), 3), Ok(true));
        for _ in 0..20 {
            world.tick(HOME);
            world.wait_for_background_work();
        }

        let after = world.store().get(origin).unwrap().gpu_handle.unwrap();
        assert_ne!(before, after);
        assert!(world.renderer().resident(before).is_none());
        assert_eq!(world.renderer().resident_count(), 9);
    }

    #[test]
    fn edge_sides_follow_touched_columns() {
        let dims = ChunkDimensions::new(16, 64);
        assert!(edge_sides(&[Point3::new(5, 0, 5)], dims).is_empty());
        assert_eq!(edge_sides(&[Point3::new(0, 3, 5)], dims), vec![BlockSide::WEST]);
        assert_eq!(
            edge_sides(&[Point3::new(15, 3, 15), Point3::new(15, 4, 15)], dims),
            vec![BlockSide::EAST, BlockSide::SOUTH]
        );
        assert_eq!(
            edge_sides(&[Point3::new(0, 0, 0)], dims),
            vec![BlockSide::WEST, BlockSide::NORTH]
        );
    }

    #[test]
    fn single_column_chunks_touch_every_side() {
        let dims = ChunkDimensions::new(1, 4);
        assert_eq!(edge_sides(&[Point3::new(0, 0, 0)], dims).len(), 4);
    }
}

//! # Voxel Stream Demo
//!
//! Headless driver for the streaming world. It walks a viewer along a fixed
//! path through the world, breaks and places a few blocks on the way and logs
//! pipeline statistics. Rendering goes into an in-memory recording renderer.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- --frames 600 --save-dir saves/demo
//! ```

use std::path::PathBuf;

use anyhow::Result;
use cgmath::{Point3, Vector3};
use clap::Parser;
use log::{info, warn};
use web_time::Instant;

use voxel_stream::{init_logging, FrameStats, RecordingRenderer, World, WorldConfig};

#[derive(Parser, Debug)]
#[command(version, about = "Streams and meshes a voxel world along a scripted path")]
struct Args {
    /// JSON world configuration; defaults are used for missing fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 300)]
    frames: usize,

    /// Directory edited chunks are saved to, overriding the configuration
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Viewer speed in blocks per frame
    #[arg(long, default_value_t = 0.5)]
    speed: f32,

    /// Seed for the block edits made along the way
    #[arg(long, default_value_t = 1)]
    edit_seed: u64,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => WorldConfig::from_file(path)?,
        None => WorldConfig::default(),
    };
    if args.save_dir.is_some() {
        config.save_directory = args.save_dir.clone();
    }

    let eye_height = config.chunk_height as f32 * 0.75;
    let mut world = World::new(config, RecordingRenderer::new())?;
    let mut rng = fastrand::Rng::with_seed(args.edit_seed);
    let mut totals = FrameStats::default();
    let started = Instant::now();

    for frame in 0..args.frames {
        let viewer = viewer_position(frame, args.speed, eye_height);
        let stats = world.tick(viewer);
        accumulate(&mut totals, &stats);

        if frame % 30 == 29 {
            edit_below(&mut world, &mut rng, viewer);
        }
        if frame % 60 == 0 {
            info!(
                "Frame {frame}: viewer chunk {:?}, {} resident, {} drawn, {} GPU meshes",
                world.viewer_chunk(),
                world.store().len(),
                stats.draws,
                world.renderer().resident_count()
            );
        }
    }

    world.wait_for_background_work();
    let stats = world.tick(viewer_position(args.frames, args.speed, eye_height));
    accumulate(&mut totals, &stats);

    info!(
        "Simulated {} frames in {:.2?}: {} loads, {} meshes, {} edits submitted",
        args.frames,
        started.elapsed(),
        totals.loads_submitted,
        totals.meshes_submitted,
        totals.edits_submitted
    );
    info!(
        "{} uploads, {} releases, {} evictions, {} stale results, {} failed loads",
        totals.uploads,
        totals.releases,
        totals.evictions,
        totals.results_discarded,
        totals.failed_loads
    );

    world.shutdown();
    info!(
        "Shut down with {} GPU meshes resident",
        world.renderer().resident_count()
    );
    Ok(())
}

/// A slow spiral out from the origin.
fn viewer_position(frame: usize, speed: f32, eye_height: f32) -> Point3<f32> {
    let travelled = frame as f32 * speed;
    let angle = travelled / 64.0;
    let radius = 8.0 + travelled / 4.0;
    Point3::new(radius * angle.cos(), eye_height, radius * angle.sin())
}

/// Breaks the first block below the viewer, or places one next to it.
fn edit_below(
    world: &mut World<RecordingRenderer>,
    rng: &mut fastrand::Rng,
    viewer: Point3<f32>,
) {
    let direction = Vector3::new(rng.f32() - 0.5, -1.0, rng.f32() - 0.5);
    let Some(hit) = world.raycast(viewer, direction, world.config().chunk_height as f32) else {
        return;
    };
    let (position, block) = if rng.bool() {
        (hit.block_position, 0)
    } else {
        (hit.adjacent_position(), rng.u8(1..=3))
    };
    match world.edit_block(position, block) {
        Ok(true) => info!("Set block {position:?} to {block}"),
        Ok(false) => {}
        Err(err) => warn!("Edit rejected: {err}"),
    }
}

fn accumulate(totals: &mut FrameStats, stats: &FrameStats) {
    totals.loads_submitted += stats.loads_submitted;
    totals.meshes_submitted += stats.meshes_submitted;
    totals.edits_submitted += stats.edits_submitted;
    totals.data_applied += stats.data_applied;
    totals.meshes_applied += stats.meshes_applied;
    totals.results_discarded += stats.results_discarded;
    totals.failed_loads += stats.failed_loads;
    totals.uploads += stats.uploads;
    totals.releases += stats.releases;
    totals.evictions += stats.evictions;
    totals.draws = stats.draws;
}

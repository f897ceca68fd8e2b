//! # Voxel Mesh Engine Demo
//!
//! Populates a world, meshes it to completion while the viewpoint orbits, then
//! scatters random edits and meshes again.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- [config.json] [edit-count]
//! ```

use std::process::ExitCode;
use std::time::Duration;

use cgmath::Point3;
use log::{error, info};
use web_time::Instant;

use voxel_mesh_engine::{
    ChunkMeshRegistry, EngineConfig, EngineError, EngineState, OrbitViewpoint, VoxelType,
    CHUNK_DIMENSION,
};

const DEFAULT_EDIT_COUNT: usize = 64;
const EDIT_SEED: u64 = 0x5EED;

fn main() -> ExitCode {
    voxel_mesh_engine::init_logger();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), EngineError> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => {
            info!("Loading config from {path}");
            EngineConfig::load(path)?
        }
        None => EngineConfig::default(),
    };
    let edit_count = args
        .next()
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_EDIT_COUNT);

    let radius = config.world_radius;
    let vertical_radius = config.vertical_radius;
    let mut engine = EngineState::new(config)?;
    let mut registry = ChunkMeshRegistry::new();
    let mut viewpoint = OrbitViewpoint {
        radius: (radius * CHUNK_DIMENSION) as f32 * 0.5,
        height: CHUNK_DIMENSION as f32,
        angle: 0.0,
        step: 0.01,
    };

    engine.populate_from_config();
    let (ticks, elapsed) = run_until_idle(&mut engine, &mut viewpoint, &mut registry);
    info!(
        "Initial mesh: {} chunks, {} quads, {} vertex bytes in {ticks} ticks ({elapsed:?})",
        registry.len(),
        registry.total_quads(),
        registry.total_vertex_bytes()
    );

    let mut rng = fastrand::Rng::with_seed(EDIT_SEED);
    let extent = (radius * 2 + 1) * CHUNK_DIMENSION;
    let height = (vertical_radius * 2 + 1) * CHUNK_DIMENSION;
    let materials = [
        VoxelType::Air,
        VoxelType::Stone,
        VoxelType::Dirt,
        VoxelType::Grass,
    ];
    let mut applied_edits = 0;
    for _ in 0..edit_count {
        let position = Point3::new(
            rng.i32(0..extent) - radius * CHUNK_DIMENSION,
            rng.i32(0..height) - vertical_radius * CHUNK_DIMENSION,
            rng.i32(0..extent) - radius * CHUNK_DIMENSION,
        );
        let material = materials[rng.usize(..materials.len())];
        if engine.edit_voxel(position, material.voxel()) {
            applied_edits += 1;
        }
    }

    let (ticks, elapsed) = run_until_idle(&mut engine, &mut viewpoint, &mut registry);
    info!(
        "Remeshed after {applied_edits} edits in {ticks} ticks ({elapsed:?}): {} quads",
        registry.total_quads()
    );

    let stats = engine.scheduler().stats();
    info!(
        "Totals: {} dispatched, {} applied, {} failed, {} discarded, {} neighbor refreshes",
        stats.dispatched, stats.applied, stats.failed, stats.discarded, stats.neighbor_refreshes
    );
    Ok(())
}

fn run_until_idle(
    engine: &mut EngineState,
    viewpoint: &mut OrbitViewpoint,
    registry: &mut ChunkMeshRegistry,
) -> (usize, Duration) {
    let start = Instant::now();
    let mut ticks = 0;
    while !engine.is_idle() {
        viewpoint.advance();
        engine.tick(&*viewpoint, registry);
        ticks += 1;
        std::thread::sleep(Duration::from_millis(1));
    }
    (ticks, start.elapsed())
}

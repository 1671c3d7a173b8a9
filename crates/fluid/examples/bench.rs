//! Quick benchmark for profiling the kernel pipeline
//!
//! Run with: cargo run --release --example bench -p fluid

use fluid::{Filtering, FluidConfig, FluidSim, SplatRequest};
use glam::{Vec2, Vec3};
use std::time::Instant;

fn main() {
    env_logger::init();

    const WIDTH: u32 = 1280;
    const HEIGHT: u32 = 720;
    const FRAMES: usize = 300; // 5 seconds at 60 FPS
    const DT: f32 = 1.0 / 60.0;

    let config = FluidConfig::default();
    println!(
        "Setting up sim at {} cells, dye at {} cells",
        config.sim_resolution, config.dye_resolution
    );

    let mut sim = FluidSim::new(config, WIDTH, HEIGHT, Filtering::Linear)
        .expect("default config is valid");

    // Warm up with a few impulses so the advection has work to do.
    println!("Warming up (30 frames)...");
    for frame in 0..30 {
        let t = frame as f32 * 0.2;
        let splat = SplatRequest {
            point: Vec2::new(0.3 + 0.4 * t.sin().abs(), 0.5),
            force: Vec2::new(t.cos(), t.sin()) * 600.0,
            color: Vec3::new(0.3, 0.1, 0.6),
            radius: 0.01,
        };
        sim.step(DT, &[splat]).unwrap();
    }

    println!("Running {} frames...", FRAMES);
    let start = Instant::now();
    for _ in 0..FRAMES {
        sim.step(DT, &[]).unwrap();
    }
    let elapsed = start.elapsed();

    let per_frame = elapsed.as_secs_f64() / FRAMES as f64;
    println!(
        "{} frames in {:.2?} ({:.2} ms/frame, {:.0} FPS)",
        FRAMES,
        elapsed,
        per_frame * 1e3,
        1.0 / per_frame
    );
    println!("final divergence L2: {:.3e}", sim.divergence_l2());
}

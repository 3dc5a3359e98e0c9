//! Renders a short cloud sequence over a gradient sky and writes PNGs.
//!
//! Usage: render_demo [config.toml]
//! Bakes the noise assets first if they are missing.

use anyhow::{Context, Result};
use glam::{Vec3, Vec4};
use std::time::Instant;

use cloudscape::{
    CameraState, CloudPipeline, FrameBuffer, LightDescriptor, PipelineConfig, RenderParameters,
};

const WIDTH: u32 = 640;
const HEIGHT: u32 = 360;
const FRAMES: u32 = 8;

/// Simple vertical sky gradient standing in for the host's rendered frame.
fn sky_background() -> FrameBuffer {
    let mut bg = FrameBuffer::new(WIDTH, HEIGHT);
    for y in 0..HEIGHT {
        let t = y as f32 / (HEIGHT - 1) as f32;
        let horizon = Vec4::new(0.75, 0.85, 0.95, 1.0);
        let zenith = Vec4::new(0.25, 0.45, 0.85, 1.0);
        let color = zenith.lerp(horizon, t);
        for x in 0..WIDTH {
            bg.set(x, y, color);
        }
    }
    bg
}

fn main() -> Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => PipelineConfig::from_toml_file(&path)
            .with_context(|| format!("loading config from {}", path))?,
        None => PipelineConfig::default(),
    };

    let mut pipeline = CloudPipeline::initialize(config).context("initializing pipeline")?;
    if !pipeline.has_assets() {
        log::info!("no baked assets found, baking now");
        pipeline.bake_all().context("baking noise assets")?;
    }

    let mut camera = CameraState::new(WIDTH, HEIGHT);
    camera.position = Vec3::new(0.0, 30.0, -180.0);
    camera.yaw = 90.0;
    camera.rotate(0.0, 8.0);

    let light = LightDescriptor {
        position: Vec3::new(300.0, 500.0, -200.0),
        color: Vec3::new(1.0, 0.96, 0.88),
        intensity: 1.2,
        enabled: true,
    };

    let mut params = RenderParameters::default();
    params.temporal_upsampling = true;

    let background = sky_background();
    for frame in 0..FRAMES {
        let time = frame as f32 / 30.0;
        let start = Instant::now();
        let output = pipeline
            .render_frame(&camera, &light, &params, &background, time)
            .context("rendering frame")?;
        let path = format!("clouds_{:03}.png", frame);
        output.to_rgba_image().save(&path)?;
        log::info!("frame {} rendered in {:.2?} -> {}", frame, start.elapsed(), path);
        // Slow drift so the temporal blend has something to reproject
        camera.move_right(0.5);
    }

    pipeline.shutdown();
    Ok(())
}

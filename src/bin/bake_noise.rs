//! Bakes the shape/detail noise volumes and the weather map.
//!
//! Usage: bake_noise [config.toml]
//! With no argument the default configuration bakes into ./assets.

use anyhow::{Context, Result};
use std::time::Instant;

use cloudscape::{CloudPipeline, PipelineConfig};

fn main() -> Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => PipelineConfig::from_toml_file(&path)
            .with_context(|| format!("loading config from {}", path))?,
        None => PipelineConfig::default(),
    };

    let asset_dir = config.asset_dir.clone();
    let mut pipeline = CloudPipeline::initialize(config).context("initializing pipeline")?;

    let start = Instant::now();
    pipeline.bake_all().context("baking noise assets")?;
    log::info!(
        "baked shape, detail and weather assets into {} in {:.2?}",
        asset_dir.display(),
        start.elapsed()
    );

    pipeline.shutdown();
    Ok(())
}

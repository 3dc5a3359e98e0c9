//! Cloud rendering pipeline
//!
//! The embedding application's entry point: `initialize` once, then
//! `render_frame` per frame and `bake_*` on demand. Engine lifecycle hooks
//! and input polling stay on the host side; everything here is an explicit
//! call.

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::camera::CameraState;
use crate::clouds::density::{CloudContainerBounds, CloudDensityField};
use crate::clouds::params::{LightDescriptor, RenderParameters};
use crate::clouds::raymarch::{composite_over, render_cloud_layer, RayMarchContext};
use crate::clouds::temporal::TemporalState;
use crate::constants::{assets, resolutions, seeds};
use crate::error::{configuration_error, CloudError, CloudResult};
use crate::framebuffer::FrameBuffer;
use crate::noise::{
    synthesize_volume, synthesize_weather_map, NoiseChannelSpec, WeatherSpec,
};
use crate::texture::{pack_image, pack_volume, TextureStore};

/// Horizontal drift direction of the scroll offset
const SCROLL_DIRECTION: Vec3 = Vec3::new(1.0, 0.0, 0.5);

/// Bake-time and container configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding the baked texture assets
    pub asset_dir: PathBuf,
    pub shape_resolution: u32,
    pub detail_resolution: u32,
    pub weather_resolution: u32,
    /// Shape volume channels: Perlin base plus Worley erosion
    pub shape_channels: Vec<NoiseChannelSpec>,
    /// Detail volume channels: Worley at increasing frequency
    pub detail_channels: Vec<NoiseChannelSpec>,
    pub weather: WeatherSpec,
    /// Cloud container center
    pub container_position: Vec3,
    /// Cloud container extents
    pub container_scale: Vec3,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("assets"),
            shape_resolution: resolutions::SHAPE_RESOLUTION,
            detail_resolution: resolutions::DETAIL_RESOLUTION,
            weather_resolution: resolutions::WEATHER_RESOLUTION,
            shape_channels: vec![
                NoiseChannelSpec::perlin(16, 8, seeds::SHAPE_SEED),
                NoiseChannelSpec::worley(4, 3, seeds::SHAPE_SEED ^ 1),
                NoiseChannelSpec::worley(8, 3, seeds::SHAPE_SEED ^ 2),
                NoiseChannelSpec::worley(16, 3, seeds::SHAPE_SEED ^ 3),
            ],
            detail_channels: vec![
                NoiseChannelSpec::worley(2, 3, seeds::DETAIL_SEED ^ 1),
                NoiseChannelSpec::worley(4, 3, seeds::DETAIL_SEED ^ 2),
                NoiseChannelSpec::worley(8, 3, seeds::DETAIL_SEED ^ 3),
            ],
            weather: WeatherSpec::default(),
            container_position: Vec3::new(0.0, 60.0, 0.0),
            container_scale: Vec3::new(200.0, 40.0, 200.0),
        }
    }
}

impl PipelineConfig {
    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> CloudResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&text).map_err(|e| {
            configuration_error(format!(
                "failed to parse {}: {}",
                path.as_ref().display(),
                e
            ))
        })
    }

    fn validate(&self) -> CloudResult<()> {
        if self.shape_resolution == 0 || self.detail_resolution == 0 || self.weather_resolution == 0
        {
            return Err(configuration_error("texture resolutions must be positive"));
        }
        if self.container_scale.min_element() <= 0.0 {
            return Err(configuration_error("container scale must be positive"));
        }
        for spec in self.shape_channels.iter().chain(&self.detail_channels) {
            spec.validate()?;
        }
        Ok(())
    }
}

/// One camera's cloud renderer, owning its assets and temporal history
pub struct CloudPipeline {
    config: PipelineConfig,
    store: TextureStore,
    field: Option<CloudDensityField>,
    temporal: TemporalState,
    assets_warned: bool,
    params_warned: bool,
}

impl CloudPipeline {
    /// Opens the asset store and loads whatever baked assets exist. Missing
    /// assets do not fail initialization; the pipeline renders no clouds
    /// until they are baked.
    pub fn initialize(config: PipelineConfig) -> CloudResult<Self> {
        config.validate()?;
        let store = TextureStore::new(&config.asset_dir)?;
        let mut pipeline = Self {
            config,
            store,
            field: None,
            temporal: TemporalState::new(),
            assets_warned: false,
            params_warned: false,
        };
        pipeline.reload_assets();
        Ok(pipeline)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn has_assets(&self) -> bool {
        self.field.is_some()
    }

    /// Moves the cloud container. Takes effect next frame.
    pub fn set_container(&mut self, position: Vec3, scale: Vec3) {
        self.config.container_position = position;
        self.config.container_scale = scale;
    }

    /// Re-reads the three named assets from the store.
    fn reload_assets(&mut self) {
        let loaded = (|| -> CloudResult<CloudDensityField> {
            let shape = self.store.load_volume(assets::SHAPE_NOISE)?;
            let detail = self.store.load_volume(assets::DETAIL_NOISE)?;
            let weather = self.store.load_map(assets::WEATHER_MAP)?;
            Ok(CloudDensityField::new(shape, detail, weather))
        })();

        match loaded {
            Ok(field) => {
                self.field = Some(field);
                self.assets_warned = false;
            }
            Err(e) => {
                self.field = None;
                if !self.assets_warned {
                    log::warn!("cloud assets unavailable, rendering no clouds: {}", e);
                    self.assets_warned = true;
                }
            }
        }
    }

    /// Renders clouds over `source` and returns the composited frame.
    ///
    /// `time_seconds` drives the scroll offset. With no loaded assets, or
    /// with out-of-domain parameters, the source passes through unchanged;
    /// the frame is never aborted.
    pub fn render_frame(
        &mut self,
        camera: &CameraState,
        light: &LightDescriptor,
        params: &RenderParameters,
        source: &FrameBuffer,
        time_seconds: f32,
    ) -> CloudResult<FrameBuffer> {
        if let Err(e) = params.validate() {
            if !self.params_warned {
                log::warn!("invalid render parameters, rendering no clouds: {}", e);
                self.params_warned = true;
            }
            return Ok(source.clone());
        }

        if source.width() == 0 || source.height() == 0 {
            return Ok(source.clone());
        }
        let Some(field) = &self.field else {
            return Ok(source.clone());
        };

        let bounds = CloudContainerBounds::from_transform(
            self.config.container_position,
            self.config.container_scale,
        );
        let ctx = RayMarchContext {
            field,
            bounds,
            camera,
            light: *light,
            params,
            scroll: SCROLL_DIRECTION * (params.speed * time_seconds),
        };

        let layer = render_cloud_layer(&ctx, source.width(), source.height());

        let final_layer = if params.temporal_upsampling {
            let blended = match self.temporal.reproject_and_blend(
                &layer,
                camera,
                &bounds,
                params.blending_coeff,
            ) {
                Ok(blended) => blended,
                // First frame or resize: render without history this frame
                Err(CloudError::StaleTemporalState { .. }) => layer.clone(),
                Err(e) => return Err(e),
            };
            self.temporal.store(&layer, camera.view_projection());
            blended
        } else {
            layer
        };

        Ok(composite_over(source, &final_layer))
    }

    /// Bakes the shape noise volume and persists it under its fixed name.
    pub fn bake_shape_noise(&mut self) -> CloudResult<()> {
        let field = synthesize_volume(&self.config.shape_channels, self.config.shape_resolution)?;
        self.store.save_volume(assets::SHAPE_NOISE, &pack_volume(&field))?;
        self.reload_assets();
        Ok(())
    }

    /// Bakes the detail noise volume and persists it under its fixed name.
    pub fn bake_detail_noise(&mut self) -> CloudResult<()> {
        let field = synthesize_volume(&self.config.detail_channels, self.config.detail_resolution)?;
        self.store.save_volume(assets::DETAIL_NOISE, &pack_volume(&field))?;
        self.reload_assets();
        Ok(())
    }

    /// Bakes the weather map and persists it under its fixed name.
    pub fn bake_weather_map(&mut self) -> CloudResult<()> {
        let map = synthesize_weather_map(&self.config.weather, self.config.weather_resolution)?;
        self.store.save_map(assets::WEATHER_MAP, &pack_image(&map))?;
        self.reload_assets();
        Ok(())
    }

    /// Bakes all three assets.
    pub fn bake_all(&mut self) -> CloudResult<()> {
        self.bake_shape_noise()?;
        self.bake_detail_noise()?;
        self.bake_weather_map()
    }

    /// Releases the pipeline's resources.
    pub fn shutdown(self) {
        log::info!("cloud pipeline shut down");
    }
}

/// Convenience: a weather spec with constant coverage, for hosts that do
/// not want a noise-driven weather map.
pub fn constant_weather(coverage: f32, height: f32, cloud_type: f32) -> WeatherSpec {
    WeatherSpec {
        coverage: crate::noise::CoverageMode::Constant { value: coverage },
        height,
        cloud_type,
    }
}

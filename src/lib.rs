//! Cloudscape: procedural volumetric cloud rendering
//!
//! A CPU implementation of the classic volumetric cloud stack: tileable
//! Perlin/Worley noise volumes baked into packed 3D textures, a weather map
//! controlling coverage, and a per-pixel raymarcher with Beer-Lambert
//! lighting, Henyey-Greenstein scattering, a powder term and optional
//! temporal reprojection.
//!
//! The host supplies camera state, a light snapshot, render parameters and
//! a source image per frame; `CloudPipeline::render_frame` returns the
//! composited result. Baking is an explicit command (`bake_*`), not an
//! engine callback.

pub mod camera;
pub mod clouds;
pub mod constants;
pub mod error;
pub mod framebuffer;
pub mod noise;
pub mod texture;

pub use camera::CameraState;
pub use clouds::{
    CloudContainerBounds, CloudDensityField, CloudPipeline, LightDescriptor, LightingMode,
    PhaseMode, PipelineConfig, RenderParameters, TemporalState,
};
pub use error::{CloudError, CloudResult};
pub use framebuffer::FrameBuffer;
pub use noise::{ChannelAlgorithm, CoverageMode, FeaturePointSet, NoiseChannelSpec, WeatherSpec};
pub use texture::{Texture2d, Texture3d, TextureStore, VolumeField};

//! Volumetric cloud rendering
//!
//! Density field, raymarcher, temporal blender and the pipeline facade that
//! ties them together.

pub mod density;
pub mod params;
pub mod pipeline;
pub mod raymarch;
pub mod temporal;

pub use density::{CloudContainerBounds, CloudDensityField};
pub use params::{LightDescriptor, LightingMode, PhaseMode, RenderParameters};
pub use pipeline::{constant_weather, CloudPipeline, PipelineConfig};
pub use raymarch::{composite_over, render_cloud_layer, RayMarchContext};
pub use temporal::TemporalState;

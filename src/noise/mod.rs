//! Procedural noise generation
//!
//! Feature points feed the Worley sampler; the synthesizer combines Perlin
//! and Worley channels into the volumes the cloud renderer consumes.

pub mod feature_points;
pub mod perlin;
pub mod synthesizer;
pub mod worley;

pub use feature_points::FeaturePointSet;
pub use perlin::Perlin3;
pub use synthesizer::{
    synthesize_volume, synthesize_weather_map, ChannelAlgorithm, CoverageMode, NoiseChannelSpec,
    WeatherSpec,
};
pub use worley::WorleySampler;

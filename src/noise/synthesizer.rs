//! Noise field synthesis
//!
//! Builds the shape/detail volumes and the weather map from per-channel
//! specs. Every voxel is independent, so synthesis is a rayon parallel-for
//! over z-layers (the CPU stand-in for a GPU compute dispatch).

use glam::{Vec3, Vec4};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{configuration_error, CloudResult};
use crate::framebuffer::FrameBuffer;
use crate::noise::feature_points::FeaturePointSet;
use crate::noise::perlin::Perlin3;
use crate::noise::worley::WorleySampler;
use crate::texture::volume::VolumeField;

/// Noise algorithm for one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelAlgorithm {
    Perlin,
    Worley,
}

/// Configuration for one color channel of a noise volume
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NoiseChannelSpec {
    pub algorithm: ChannelAlgorithm,
    /// Octave count, 1..=8
    pub octaves: u32,
    /// Amplitude decay per octave
    pub persistence: f32,
    /// Frequency growth per octave (Perlin only; Worley doubles per octave)
    pub lacunarity: f32,
    /// Base cells per axis: lattice period for Perlin, Worley cell density
    pub cell_count: u32,
    /// Integer frequency multiplier on top of `cell_count`
    pub frequency: f32,
    pub seed: u64,
}

impl NoiseChannelSpec {
    pub fn perlin(cell_count: u32, octaves: u32, seed: u64) -> Self {
        Self {
            algorithm: ChannelAlgorithm::Perlin,
            octaves,
            persistence: 0.6,
            lacunarity: 2.0,
            cell_count,
            frequency: 1.0,
            seed,
        }
    }

    pub fn worley(cell_count: u32, octaves: u32, seed: u64) -> Self {
        Self {
            algorithm: ChannelAlgorithm::Worley,
            octaves,
            persistence: 0.5,
            lacunarity: 2.0,
            cell_count,
            frequency: 1.0,
            seed,
        }
    }

    pub fn validate(&self) -> CloudResult<()> {
        if self.octaves == 0 || self.octaves > 8 {
            return Err(configuration_error(format!(
                "octaves must be in 1..=8, got {}",
                self.octaves
            )));
        }
        if self.cell_count == 0 {
            return Err(configuration_error("cell count must be positive"));
        }
        if self.persistence <= 0.0 || self.lacunarity <= 0.0 || self.frequency <= 0.0 {
            return Err(configuration_error(
                "persistence, lacunarity and frequency must be positive",
            ));
        }
        Ok(())
    }

    /// Effective base cells per axis after the frequency multiplier.
    /// Rounded to an integer so the channel keeps tiling.
    fn effective_cells(&self) -> u32 {
        ((self.cell_count as f32 * self.frequency).round() as u32).max(1)
    }
}

/// Prebuilt per-channel sampler
enum ChannelSampler {
    Perlin(Perlin3),
    Worley(FeaturePointSet),
}

impl ChannelSampler {
    fn build(spec: &NoiseChannelSpec) -> CloudResult<Self> {
        spec.validate()?;
        Ok(match spec.algorithm {
            ChannelAlgorithm::Perlin => ChannelSampler::Perlin(Perlin3::new(spec.seed)),
            ChannelAlgorithm::Worley => {
                ChannelSampler::Worley(FeaturePointSet::generate(spec.seed, spec.effective_cells())?)
            }
        })
    }

    fn sample(&self, spec: &NoiseChannelSpec, p: Vec3) -> f32 {
        match self {
            ChannelSampler::Perlin(noise) => noise.fbm(
                p,
                spec.effective_cells(),
                spec.octaves,
                spec.persistence,
                spec.lacunarity,
            ),
            ChannelSampler::Worley(points) => {
                WorleySampler::new(points).fbm(p, spec.octaves, spec.persistence)
            }
        }
    }
}

/// Computes a multi-channel volume; one spec per channel, up to four.
///
/// Unused channels stay zero. Deterministic for fixed specs.
pub fn synthesize_volume(specs: &[NoiseChannelSpec], resolution: u32) -> CloudResult<VolumeField> {
    if resolution == 0 {
        return Err(configuration_error("volume resolution must be positive"));
    }
    if specs.is_empty() || specs.len() > 4 {
        return Err(configuration_error(format!(
            "a volume needs 1..=4 channel specs, got {}",
            specs.len()
        )));
    }

    let samplers: Vec<ChannelSampler> = specs
        .iter()
        .map(ChannelSampler::build)
        .collect::<CloudResult<_>>()?;

    let mut field = VolumeField::new(resolution);
    let inv = 1.0 / resolution as f32;

    field
        .layers_mut()
        .enumerate()
        .par_bridge()
        .for_each(|(z, layer)| {
            let pz = (z as f32 + 0.5) * inv;
            for y in 0..resolution {
                let py = (y as f32 + 0.5) * inv;
                for x in 0..resolution {
                    let p = Vec3::new((x as f32 + 0.5) * inv, py, pz);
                    let mut voxel = Vec4::ZERO;
                    for (i, sampler) in samplers.iter().enumerate() {
                        voxel[i] = sampler.sample(&specs[i], p);
                    }
                    layer[(x + y * resolution) as usize] = voxel;
                }
            }
        });

    Ok(field)
}

/// How the weather map coverage channel is produced
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum CoverageMode {
    /// Uniform coverage everywhere
    Constant { value: f32 },
    /// 2D fractal noise coverage
    Noise { spec: NoiseChannelSpec },
}

/// Weather map configuration: coverage + per-map height/type constants
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WeatherSpec {
    pub coverage: CoverageMode,
    /// Height-scale written to the green channel
    pub height: f32,
    /// Cloud type written to the blue channel
    pub cloud_type: f32,
}

impl Default for WeatherSpec {
    fn default() -> Self {
        Self {
            coverage: CoverageMode::Noise {
                spec: NoiseChannelSpec::perlin(8, 4, crate::constants::seeds::WEATHER_SEED),
            },
            height: 1.0,
            cloud_type: 0.5,
        }
    }
}

/// Computes the 2D weather map: coverage in R, height in G, type in B.
pub fn synthesize_weather_map(spec: &WeatherSpec, resolution: u32) -> CloudResult<FrameBuffer> {
    if resolution == 0 {
        return Err(configuration_error("weather map resolution must be positive"));
    }

    // Resolve the coverage source once; the pixel loop only samples.
    enum CoverageSampler {
        Constant(f32),
        Noise(Perlin3, NoiseChannelSpec),
    }

    let sampler = match spec.coverage {
        CoverageMode::Constant { value } => {
            if !(0.0..=1.0).contains(&value) {
                return Err(configuration_error(format!(
                    "constant coverage must be in [0,1], got {}",
                    value
                )));
            }
            CoverageSampler::Constant(value)
        }
        CoverageMode::Noise { spec: channel } => {
            channel.validate()?;
            CoverageSampler::Noise(Perlin3::new(channel.seed), channel)
        }
    };

    let mut map = FrameBuffer::new(resolution, resolution);
    let inv = 1.0 / resolution as f32;
    let height = spec.height.clamp(0.0, 1.0);
    let cloud_type = spec.cloud_type.clamp(0.0, 1.0);

    map.rows_mut().enumerate().par_bridge().for_each(|(y, row)| {
        let v = (y as f32 + 0.5) * inv;
        for (x, texel) in row.iter_mut().enumerate() {
            let u = (x as f32 + 0.5) * inv;
            let coverage = match &sampler {
                CoverageSampler::Constant(value) => *value,
                CoverageSampler::Noise(perlin, c) => perlin.fbm_2d(
                    u,
                    v,
                    c.effective_cells(),
                    c.octaves,
                    c.persistence,
                    c.lacunarity,
                ),
            };
            *texel = Vec4::new(coverage, height, cloud_type, 1.0);
        }
    });

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape_specs() -> Vec<NoiseChannelSpec> {
        vec![
            NoiseChannelSpec::perlin(8, 4, 1),
            NoiseChannelSpec::worley(4, 2, 2),
            NoiseChannelSpec::worley(8, 2, 3),
            NoiseChannelSpec::worley(16, 2, 4),
        ]
    }

    #[test]
    fn test_volume_deterministic() {
        let a = synthesize_volume(&shape_specs(), 16).expect("synthesis should succeed");
        let b = synthesize_volume(&shape_specs(), 16).expect("synthesis should succeed");
        assert_eq!(a, b, "same specs must give a bit-identical volume");
    }

    #[test]
    fn test_volume_values_normalized() {
        let field = synthesize_volume(&shape_specs(), 16).expect("synthesis should succeed");
        for voxel in field.voxels() {
            assert!(voxel.min_element() >= 0.0 && voxel.max_element() <= 1.0);
        }
    }

    #[test]
    fn test_unused_channels_zero() {
        let field = synthesize_volume(&[NoiseChannelSpec::perlin(4, 2, 9)], 8)
            .expect("synthesis should succeed");
        for voxel in field.voxels() {
            assert_eq!(voxel.y, 0.0);
            assert_eq!(voxel.w, 0.0);
        }
    }

    #[test]
    fn test_invalid_specs_rejected() {
        let mut bad = NoiseChannelSpec::perlin(8, 4, 1);
        bad.octaves = 0;
        assert!(synthesize_volume(&[bad], 8).is_err());
        assert!(synthesize_volume(&shape_specs(), 0).is_err());
        assert!(synthesize_volume(&[], 8).is_err());
    }

    #[test]
    fn test_constant_weather_map() {
        let spec = WeatherSpec {
            coverage: CoverageMode::Constant { value: 0.75 },
            height: 0.9,
            cloud_type: 0.25,
        };
        let map = synthesize_weather_map(&spec, 32).expect("synthesis should succeed");
        let texel = map.get(17, 5);
        assert_eq!(texel.x, 0.75);
        assert_eq!(texel.y, 0.9);
        assert_eq!(texel.z, 0.25);
    }

    #[test]
    fn test_noise_weather_map_in_range() {
        let map = synthesize_weather_map(&WeatherSpec::default(), 64)
            .expect("synthesis should succeed");
        for y in 0..64 {
            for x in 0..64 {
                let c = map.get(x, y).x;
                assert!((0.0..=1.0).contains(&c), "coverage {} outside [0,1]", c);
            }
        }
    }
}

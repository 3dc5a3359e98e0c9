//! Tiled Worley (cellular) noise
//!
//! Distance to the nearest feature point, evaluated over the 27 neighbor
//! cells with wraparound so a volume sampled over [0,1)³ tiles seamlessly.
//! The value is inverted and normalized: 1 at a feature point, falling to 0
//! one cell away, which gives the bulbous look cloud erosion wants.

use glam::Vec3;

use crate::noise::feature_points::FeaturePointSet;

/// Worley sampler over a borrowed feature point set
pub struct WorleySampler<'a> {
    points: &'a FeaturePointSet,
}

impl<'a> WorleySampler<'a> {
    pub fn new(points: &'a FeaturePointSet) -> Self {
        Self { points }
    }

    /// Samples at `p` in [0,1)³ (coordinates outside wrap). Returns [0, 1].
    pub fn sample(&self, p: Vec3) -> f32 {
        let n = self.points.points_per_axis() as i32;
        let nf = n as f32;

        // Position in cell units; the containing cell and its 26 neighbors
        // are the only candidates for the nearest feature point.
        let pos = (p - p.floor()) * nf;
        let base = pos.floor();

        let mut min_dist_sq = f32::MAX;
        for dz in -1..=1 {
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let neighbor = base + Vec3::new(dx as f32, dy as f32, dz as f32);
                    let cx = (neighbor.x as i32).rem_euclid(n) as u32;
                    let cy = (neighbor.y as i32).rem_euclid(n) as u32;
                    let cz = (neighbor.z as i32).rem_euclid(n) as u32;
                    // Unwrapped neighbor position + wrapped cell's offset keeps
                    // distances continuous across the tile boundary.
                    let feature = neighbor + self.points.cell_point(cx, cy, cz);
                    let d = pos - feature;
                    min_dist_sq = min_dist_sq.min(d.length_squared());
                }
            }
        }

        1.0 - min_dist_sq.sqrt().min(1.0)
    }

    /// Multi-octave accumulation: cell frequency doubles per octave, the
    /// amplitude decays by `persistence`, and the sum is renormalized.
    pub fn fbm(&self, p: Vec3, octaves: u32, persistence: f32) -> f32 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut max_amplitude = 0.0;
        let mut frequency = 1.0;

        for _ in 0..octaves.max(1) {
            total += self.sample(p * frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= persistence;
            frequency *= 2.0;
        }

        (total / max_amplitude).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::feature_points::FeaturePointSet;

    #[test]
    fn test_range() {
        let points = FeaturePointSet::generate(11, 8).expect("generation should succeed");
        let worley = WorleySampler::new(&points);
        for i in 0..1000 {
            let p = Vec3::new(
                (i as f32 * 0.017).fract(),
                (i as f32 * 0.031).fract(),
                (i as f32 * 0.053).fract(),
            );
            let v = worley.sample(p);
            assert!((0.0..=1.0).contains(&v), "worley value {} outside [0,1]", v);
        }
    }

    #[test]
    fn test_peaks_at_feature_point() {
        let points = FeaturePointSet::generate(3, 4).expect("generation should succeed");
        let worley = WorleySampler::new(&points);
        let n = 4.0;
        let feature = (Vec3::new(1.0, 2.0, 3.0) + points.cell_point(1, 2, 3)) / n;
        let v = worley.sample(feature);
        assert!(v > 0.999, "value at a feature point should be 1, got {}", v);
    }

    #[test]
    fn test_tiles_seamlessly() {
        let points = FeaturePointSet::generate(21, 8).expect("generation should succeed");
        let worley = WorleySampler::new(&points);
        for i in 0..40 {
            let a = i as f32 * 0.023;
            let b = i as f32 * 0.059;
            let lo = worley.sample(Vec3::new(0.0, a, b));
            let hi = worley.sample(Vec3::new(1.0, a, b));
            assert!(
                (lo - hi).abs() < 1e-5,
                "worley should match at u=0 and u=1 ({} vs {})",
                lo,
                hi
            );
        }
    }

    #[test]
    fn test_fbm_range() {
        let points = FeaturePointSet::generate(9, 6).expect("generation should succeed");
        let worley = WorleySampler::new(&points);
        for i in 0..200 {
            let p = Vec3::splat((i as f32 * 0.013).fract());
            let v = worley.fbm(p, 3, 0.5);
            assert!((0.0..=1.0).contains(&v));
        }
    }
}

//! Tileable gradient (Perlin) noise
//!
//! Classic permutation-table gradient noise with the lattice wrapped at a
//! configurable integer period, so a volume sampled over one period tiles
//! seamlessly on every axis. The permutation is shuffled with a deterministic
//! xorshift stream so baked textures reproduce exactly for a given seed.

use glam::Vec3;

/// Seeded 3D gradient noise generator
pub struct Perlin3 {
    /// 256-entry permutation, doubled to avoid index wrapping
    perm: [u8; 512],
}

impl Perlin3 {
    pub fn new(seed: u64) -> Self {
        let mut perm = [0u8; 512];
        for i in 0..256 {
            perm[i] = i as u8;
        }

        // Fisher-Yates shuffle with xorshift64 for deterministic output
        let mut state = seed | 1;
        for i in (1..256).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let j = (state as usize) % (i + 1);
            perm.swap(i, j);
        }
        for i in 0..256 {
            perm[256 + i] = perm[i];
        }

        Self { perm }
    }

    #[inline]
    fn hash(&self, x: usize, y: usize, z: usize) -> u8 {
        let a = self.perm[x & 255] as usize;
        let b = self.perm[a + (y & 255)] as usize;
        self.perm[b + (z & 255)]
    }

    /// Samples noise at `p` measured in lattice cells, wrapping the lattice
    /// every `period` cells. Returns a value in [-1, 1].
    pub fn sample(&self, p: Vec3, period: u32) -> f32 {
        let period = period.max(1) as i32;
        let cell = p.floor();
        let frac = p - cell;

        let xi = cell.x as i32;
        let yi = cell.y as i32;
        let zi = cell.z as i32;

        let wrap = |v: i32| -> usize { v.rem_euclid(period) as usize };

        let u = fade(frac.x);
        let v = fade(frac.y);
        let w = fade(frac.z);

        let corner = |dx: i32, dy: i32, dz: i32| -> f32 {
            let h = self.hash(wrap(xi + dx), wrap(yi + dy), wrap(zi + dz));
            grad(h, frac.x - dx as f32, frac.y - dy as f32, frac.z - dz as f32)
        };

        let x00 = lerp(corner(0, 0, 0), corner(1, 0, 0), u);
        let x10 = lerp(corner(0, 1, 0), corner(1, 1, 0), u);
        let x01 = lerp(corner(0, 0, 1), corner(1, 0, 1), u);
        let x11 = lerp(corner(0, 1, 1), corner(1, 1, 1), u);
        lerp(lerp(x00, x10, v), lerp(x01, x11, v), w)
    }

    /// Multi-octave fractal sum over the unit cube, normalized to [0, 1].
    ///
    /// `p` is a position in [0,1)³; `period` is the base lattice resolution.
    /// Octave periods are rounded to integers so each octave still tiles.
    pub fn fbm(
        &self,
        p: Vec3,
        period: u32,
        octaves: u32,
        persistence: f32,
        lacunarity: f32,
    ) -> f32 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut max_amplitude = 0.0;
        let mut octave_period = period.max(1) as f32;

        for _ in 0..octaves.max(1) {
            let cells = octave_period.round().max(1.0);
            total += self.sample(p * cells, cells as u32) * amplitude;
            max_amplitude += amplitude;
            amplitude *= persistence;
            octave_period *= lacunarity;
        }

        (total / max_amplitude * 0.5 + 0.5).clamp(0.0, 1.0)
    }

    /// 2D fractal noise for the weather map, tiled on x/y.
    pub fn fbm_2d(
        &self,
        x: f32,
        y: f32,
        period: u32,
        octaves: u32,
        persistence: f32,
        lacunarity: f32,
    ) -> f32 {
        // Fixed z plane keeps the 2D slice deterministic; x/y tiling is
        // what the weather map needs.
        self.fbm(Vec3::new(x, y, 0.37), period, octaves, persistence, lacunarity)
    }
}

#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Ken Perlin's gradient selection: 12 edge directions of a cube.
#[inline]
fn grad(hash: u8, x: f32, y: f32, z: f32) -> f32 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    let u = if h & 1 == 0 { u } else { -u };
    let v = if h & 2 == 0 { v } else { -v };
    u + v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let a = Perlin3::new(1234);
        let b = Perlin3::new(1234);
        for i in 0..100 {
            let p = Vec3::new(i as f32 * 0.13, i as f32 * 0.29, i as f32 * 0.41);
            assert_eq!(a.sample(p, 16), b.sample(p, 16));
        }
    }

    #[test]
    fn test_range() {
        let noise = Perlin3::new(77);
        for i in 0..2000 {
            let p = Vec3::new(i as f32 * 0.171, i as f32 * 0.233, i as f32 * 0.119);
            let v = noise.sample(p, 8);
            assert!(v >= -1.5 && v <= 1.5, "value {} out of range at {:?}", v, p);
            let f = noise.fbm(p.fract(), 8, 4, 0.5, 2.0);
            assert!((0.0..=1.0).contains(&f), "fbm {} outside [0,1]", f);
        }
    }

    #[test]
    fn test_tiles_at_period() {
        let noise = Perlin3::new(99);
        let period = 8u32;
        for i in 0..50 {
            let y = i as f32 * 0.37;
            let z = i as f32 * 0.73;
            let at_zero = noise.sample(Vec3::new(0.0, y, z), period);
            let at_period = noise.sample(Vec3::new(period as f32, y, z), period);
            assert!(
                (at_zero - at_period).abs() < 1e-5,
                "noise should tile across the period boundary"
            );
        }
    }

    #[test]
    fn test_fbm_tiles_on_unit_cube() {
        let noise = Perlin3::new(5);
        for i in 0..20 {
            let y = i as f32 * 0.047;
            let a = noise.fbm(Vec3::new(0.0, y, 0.5), 16, 4, 0.5, 2.0);
            let b = noise.fbm(Vec3::new(1.0, y, 0.5), 16, 4, 0.5, 2.0);
            assert!((a - b).abs() < 1e-5, "fbm should tile on the unit cube");
        }
    }

    #[test]
    fn test_continuity() {
        let noise = Perlin3::new(42);
        let p = Vec3::new(3.21, 1.07, 2.55);
        let v1 = noise.sample(p, 16);
        let v2 = noise.sample(p + Vec3::splat(0.001), 16);
        assert!((v1 - v2).abs() < 0.02, "noise should be continuous");
    }
}

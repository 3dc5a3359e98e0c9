//! Packed texture assets
//!
//! Immutable RGBA8 textures produced by the packer and persisted by the
//! store. Downstream consumers treat them as opaque: sampled with trilinear
//! (3D) or bilinear (2D) filtering and wrap addressing, never mutated.

use glam::{Vec2, Vec3, Vec4};

/// Immutable packed 3D texture, RGBA8, wrap addressing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture3d {
    resolution: u32,
    texels: Vec<[u8; 4]>,
}

impl Texture3d {
    pub fn from_texels(resolution: u32, texels: Vec<[u8; 4]>) -> Self {
        assert_eq!(
            texels.len(),
            (resolution * resolution * resolution) as usize,
            "texel count must match resolution³"
        );
        Self { resolution, texels }
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn texels(&self) -> &[[u8; 4]] {
        &self.texels
    }

    #[inline]
    fn fetch(&self, x: i32, y: i32, z: i32) -> Vec4 {
        let r = self.resolution as i32;
        let x = x.rem_euclid(r) as u32;
        let y = y.rem_euclid(r) as u32;
        let z = z.rem_euclid(r) as u32;
        let t = self.texels[(x + y * self.resolution + z * self.resolution * self.resolution) as usize];
        Vec4::new(
            t[0] as f32 / 255.0,
            t[1] as f32 / 255.0,
            t[2] as f32 / 255.0,
            t[3] as f32 / 255.0,
        )
    }

    /// Trilinear sample at `uvw`; coordinates outside [0,1)³ wrap.
    pub fn sample(&self, uvw: Vec3) -> Vec4 {
        let r = self.resolution as f32;
        let p = uvw * r - 0.5;
        let base = p.floor();
        let t = p - base;
        let x = base.x as i32;
        let y = base.y as i32;
        let z = base.z as i32;

        let c000 = self.fetch(x, y, z);
        let c100 = self.fetch(x + 1, y, z);
        let c010 = self.fetch(x, y + 1, z);
        let c110 = self.fetch(x + 1, y + 1, z);
        let c001 = self.fetch(x, y, z + 1);
        let c101 = self.fetch(x + 1, y, z + 1);
        let c011 = self.fetch(x, y + 1, z + 1);
        let c111 = self.fetch(x + 1, y + 1, z + 1);

        let c00 = c000.lerp(c100, t.x);
        let c10 = c010.lerp(c110, t.x);
        let c01 = c001.lerp(c101, t.x);
        let c11 = c011.lerp(c111, t.x);
        c00.lerp(c10, t.y).lerp(c01.lerp(c11, t.y), t.z)
    }
}

/// Immutable packed 2D texture, RGBA8, wrap addressing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture2d {
    width: u32,
    height: u32,
    texels: Vec<[u8; 4]>,
}

impl Texture2d {
    pub fn from_texels(width: u32, height: u32, texels: Vec<[u8; 4]>) -> Self {
        assert_eq!(
            texels.len(),
            (width * height) as usize,
            "texel count must match width*height"
        );
        Self {
            width,
            height,
            texels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn texels(&self) -> &[[u8; 4]] {
        &self.texels
    }

    #[inline]
    fn fetch(&self, x: i32, y: i32) -> Vec4 {
        let x = x.rem_euclid(self.width as i32) as u32;
        let y = y.rem_euclid(self.height as i32) as u32;
        let t = self.texels[(x + y * self.width) as usize];
        Vec4::new(
            t[0] as f32 / 255.0,
            t[1] as f32 / 255.0,
            t[2] as f32 / 255.0,
            t[3] as f32 / 255.0,
        )
    }

    /// Bilinear sample at `uv`; coordinates outside [0,1)² wrap.
    pub fn sample(&self, uv: Vec2) -> Vec4 {
        let p = Vec2::new(uv.x * self.width as f32, uv.y * self.height as f32) - 0.5;
        let base = p.floor();
        let t = p - base;
        let x = base.x as i32;
        let y = base.y as i32;

        let top = self.fetch(x, y).lerp(self.fetch(x + 1, y), t.x);
        let bottom = self.fetch(x, y + 1).lerp(self.fetch(x + 1, y + 1), t.x);
        top.lerp(bottom, t.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trilinear_constant_volume() {
        let tex = Texture3d::from_texels(4, vec![[128, 64, 32, 255]; 64]);
        for i in 0..20 {
            let p = Vec3::splat(i as f32 * 0.137);
            let c = tex.sample(p);
            assert!((c.x - 128.0 / 255.0).abs() < 1e-5);
            assert!((c.y - 64.0 / 255.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_sample_wraps() {
        let mut texels = vec![[0, 0, 0, 255]; 64];
        texels[0] = [255, 0, 0, 255];
        let tex = Texture3d::from_texels(4, texels);
        // Texel centers one tile apart must sample identically
        let a = tex.sample(Vec3::splat(0.125));
        let b = tex.sample(Vec3::splat(1.125));
        assert!((a - b).length() < 1e-5, "wrap addressing should tile");
    }

    #[test]
    fn test_bilinear_texel_center() {
        let mut texels = vec![[0, 0, 0, 0]; 16];
        texels[5] = [200, 100, 50, 255]; // (1, 1) of a 4x4
        let tex = Texture2d::from_texels(4, 4, texels);
        let c = tex.sample(Vec2::new(1.5 / 4.0, 1.5 / 4.0));
        assert!((c.x - 200.0 / 255.0).abs() < 1e-5, "texel center should be exact");
    }
}

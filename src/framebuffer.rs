//! RGBA float framebuffer
//!
//! The pipeline treats the host's source and destination images as opaque 2D
//! pixel buffers. This is that buffer: linear RGBA f32, row-major. The cloud
//! layer and the temporal history reuse the same type.

use glam::Vec4;

/// 2D RGBA f32 image, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Vec4>,
}

impl FrameBuffer {
    /// Creates a buffer filled with transparent black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Vec4::ZERO; (width * height) as usize],
        }
    }

    /// Creates a buffer filled with a constant color.
    pub fn filled(width: u32, height: u32, color: Vec4) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Vec4 {
        self.pixels[(y * self.width + x) as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: Vec4) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Bilinear sample at normalized uv, clamped to the image edge.
    /// Used by the temporal blender when reading reprojected history.
    pub fn sample_clamped(&self, u: f32, v: f32) -> Vec4 {
        let fx = (u.clamp(0.0, 1.0) * self.width as f32 - 0.5).max(0.0);
        let fy = (v.clamp(0.0, 1.0) * self.height as f32 - 0.5).max(0.0);
        let x0 = (fx as u32).min(self.width - 1);
        let y0 = (fy as u32).min(self.height - 1);
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;

        let top = self.get(x0, y0).lerp(self.get(x1, y0), tx);
        let bottom = self.get(x0, y1).lerp(self.get(x1, y1), tx);
        top.lerp(bottom, ty)
    }

    /// Mutable row access for parallel per-row rendering.
    pub fn rows_mut(&mut self) -> std::slice::ChunksMut<'_, Vec4> {
        self.pixels.chunks_mut(self.width as usize)
    }

    pub fn pixels(&self) -> &[Vec4] {
        &self.pixels
    }

    /// Converts to an 8-bit image for PNG output. Values are clamped to [0, 1].
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_fn(self.width, self.height, |x, y| {
            let c = self.get(x, y).clamp(Vec4::ZERO, Vec4::ONE) * 255.0;
            image::Rgba([c.x as u8, c.y as u8, c.z as u8, c.w as u8])
        })
    }

    /// Builds a buffer from an 8-bit image, mapping to [0, 1] floats.
    pub fn from_rgba_image(img: &image::RgbaImage) -> Self {
        let mut buf = Self::new(img.width(), img.height());
        for (x, y, p) in img.enumerate_pixels() {
            buf.set(
                x,
                y,
                Vec4::new(
                    p[0] as f32 / 255.0,
                    p[1] as f32 / 255.0,
                    p[2] as f32 / 255.0,
                    p[3] as f32 / 255.0,
                ),
            );
        }
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_roundtrip() {
        let mut buf = FrameBuffer::new(4, 4);
        buf.set(2, 3, Vec4::new(0.1, 0.2, 0.3, 1.0));
        assert_eq!(buf.get(2, 3), Vec4::new(0.1, 0.2, 0.3, 1.0));
        assert_eq!(buf.get(0, 0), Vec4::ZERO);
    }

    #[test]
    fn test_bilinear_sample_constant_image() {
        let buf = FrameBuffer::filled(8, 8, Vec4::splat(0.5));
        for i in 0..10 {
            let t = i as f32 / 9.0;
            let c = buf.sample_clamped(t, 1.0 - t);
            assert!((c.x - 0.5).abs() < 1e-6, "constant image should sample flat");
        }
    }

    #[test]
    fn test_rgba_image_conversion() {
        let mut buf = FrameBuffer::new(3, 2);
        buf.set(1, 1, Vec4::new(1.0, 0.5, 0.0, 1.0));
        let img = buf.to_rgba_image();
        let back = FrameBuffer::from_rgba_image(&img);
        let c = back.get(1, 1);
        assert!((c.x - 1.0).abs() < 1.0 / 255.0);
        assert!((c.y - 0.5).abs() < 1.0 / 255.0);
    }
}

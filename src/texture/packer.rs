//! Volume texture packing
//!
//! The synthesizer hands over a float field as a stack of 2D layers; the
//! packer quantizes each layer to RGBA8 and interleaves all of them into one
//! addressable 3D texture at index x + y*res + z*res². Packing is a pure
//! function of the field: the same field always produces byte-identical
//! output, which is what makes baked assets cacheable.

use glam::Vec4;

use crate::framebuffer::FrameBuffer;
use crate::texture::packed::{Texture2d, Texture3d};
use crate::texture::volume::VolumeField;

/// Clamp to [0,1] and quantize to 8 bits per channel, preserving order.
#[inline]
fn quantize(v: Vec4) -> [u8; 4] {
    let c = v.clamp(Vec4::ZERO, Vec4::ONE) * 255.0;
    [
        c.x.round() as u8,
        c.y.round() as u8,
        c.z.round() as u8,
        c.w.round() as u8,
    ]
}

/// Packs a computed volume into an immutable 3D texture.
pub fn pack_volume(field: &VolumeField) -> Texture3d {
    let res = field.resolution();
    let plane = (res * res) as usize;

    // Slice pass: pull the volume apart into quantized 2D layers.
    let layers: Vec<Vec<[u8; 4]>> = (0..res)
        .map(|k| field.extract_slice(k).into_iter().map(quantize).collect())
        .collect();

    // Interleave the layers back into one 3D texel buffer.
    let mut texels = vec![[0u8; 4]; plane * res as usize];
    for (z, layer) in layers.iter().enumerate() {
        texels[z * plane..(z + 1) * plane].copy_from_slice(layer);
    }

    Texture3d::from_texels(res, texels)
}

/// Packs a 2D float field (weather map) into an immutable 2D texture.
pub fn pack_image(field: &FrameBuffer) -> Texture2d {
    let texels = field.pixels().iter().copied().map(quantize).collect();
    Texture2d::from_texels(field.width(), field.height(), texels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn test_field() -> VolumeField {
        let mut field = VolumeField::new(8);
        for z in 0..8 {
            for y in 0..8 {
                for x in 0..8 {
                    let v = (x + y * 8 + z * 64) as f32 / 511.0;
                    field.set(x, y, z, Vec4::new(v, 1.0 - v, v * 0.5, 1.0));
                }
            }
        }
        field
    }

    #[test]
    fn test_pack_is_idempotent() {
        let field = test_field();
        let a = pack_volume(&field);
        let b = pack_volume(&field);
        assert_eq!(a, b, "packing the same field twice must be byte-identical");
    }

    #[test]
    fn test_pack_preserves_layout_and_channels() {
        let field = test_field();
        let packed = pack_volume(&field);
        let src = field.get(3, 5, 7);
        let texel = packed.texels()[(3 + 5 * 8 + 7 * 64) as usize];
        assert_eq!(texel[0], (src.x * 255.0).round() as u8);
        assert_eq!(texel[1], (src.y * 255.0).round() as u8);
        assert_eq!(texel[2], (src.z * 255.0).round() as u8);
    }

    #[test]
    fn test_pack_clamps_out_of_range() {
        let mut field = VolumeField::new(2);
        field.set(0, 0, 0, Vec4::new(-0.5, 2.0, 0.5, 1.0));
        let packed = pack_volume(&field);
        let texel = packed.texels()[0];
        assert_eq!(texel[0], 0);
        assert_eq!(texel[1], 255);
        assert_eq!(texel[2], 128);
    }

    #[test]
    fn test_packed_sample_matches_source() {
        let field = test_field();
        let packed = pack_volume(&field);
        // Sample at a voxel center; trilinear weights collapse to the texel.
        let uvw = Vec3::new(3.5 / 8.0, 5.5 / 8.0, 7.5 / 8.0);
        let sampled = packed.sample(uvw);
        let src = field.get(3, 5, 7);
        assert!((sampled.x - src.x).abs() < 1.0 / 255.0 + 1e-5);
        assert!((sampled.y - src.y).abs() < 1.0 / 255.0 + 1e-5);
    }
}

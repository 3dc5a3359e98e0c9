//! Computed volume fields
//!
//! A `VolumeField` is the synthesizer's output: a cubic grid of RGBA f32
//! voxels. It is produced once, then packed; nothing mutates it afterwards.
//! Slice extraction mirrors the GPU constraint the packer works around:
//! some backends can only write 2D targets, so the volume leaves the
//! synthesis stage as a stack of 2D layers.

use glam::Vec4;

/// Cubic 3D field of RGBA f32 voxels, indexed x + y*res + z*res²
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeField {
    resolution: u32,
    voxels: Vec<Vec4>,
}

impl VolumeField {
    pub fn new(resolution: u32) -> Self {
        let n = resolution as usize;
        Self {
            resolution,
            voxels: vec![Vec4::ZERO; n * n * n],
        }
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32, z: u32) -> Vec4 {
        let r = self.resolution;
        self.voxels[(x + y * r + z * r * r) as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, z: u32, value: Vec4) {
        let r = self.resolution;
        self.voxels[(x + y * r + z * r * r) as usize] = value;
    }

    /// Extracts one depth layer as a 2D slice (the slicer pass).
    pub fn extract_slice(&self, layer: u32) -> Vec<Vec4> {
        let r = self.resolution as usize;
        let start = layer as usize * r * r;
        self.voxels[start..start + r * r].to_vec()
    }

    /// Mutable z-slices for parallel synthesis, one chunk per layer.
    pub fn layers_mut(&mut self) -> std::slice::ChunksMut<'_, Vec4> {
        let r = self.resolution as usize;
        self.voxels.chunks_mut(r * r)
    }

    pub fn voxels(&self) -> &[Vec4] {
        &self.voxels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_layout() {
        let mut field = VolumeField::new(4);
        field.set(1, 2, 3, Vec4::splat(0.5));
        assert_eq!(field.get(1, 2, 3), Vec4::splat(0.5));
        // x + y*res + z*res² layout
        assert_eq!(field.voxels()[1 + 2 * 4 + 3 * 16], Vec4::splat(0.5));
    }

    #[test]
    fn test_extract_slice_selects_layer() {
        let mut field = VolumeField::new(3);
        field.set(2, 1, 2, Vec4::ONE);
        let slice = field.extract_slice(2);
        assert_eq!(slice.len(), 9);
        assert_eq!(slice[2 + 1 * 3], Vec4::ONE);
        assert_eq!(field.extract_slice(0)[2 + 1 * 3], Vec4::ZERO);
    }
}

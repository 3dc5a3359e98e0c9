//! Cloud density field
//!
//! Wraps the packed shape/detail volumes and the weather map behind one
//! density-at-point query. This is the raymarcher's inner loop (ray steps ×
//! light steps per pixel), so it stays cheap and branch-light.

use glam::{Vec2, Vec3};

use crate::clouds::params::RenderParameters;
use crate::texture::packed::{Texture2d, Texture3d};

/// Axis-aligned cloud container in world space
#[derive(Debug, Clone, Copy)]
pub struct CloudContainerBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl CloudContainerBounds {
    /// Box centered on `position` with extents `scale`. Derived at query
    /// time, not cached; the container may move between frames.
    pub fn from_transform(position: Vec3, scale: Vec3) -> Self {
        let half = scale * 0.5;
        Self {
            min: position - half,
            max: position + half,
        }
    }

    #[inline]
    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Slab-method ray/box intersection. Returns entry and exit distances
    /// along the ray, or `None` when the ray misses. A zero-length overlap
    /// counts as a miss.
    pub fn ray_intersect(&self, origin: Vec3, dir: Vec3) -> Option<(f32, f32)> {
        let inv = dir.recip();
        let t0 = (self.min - origin) * inv;
        let t1 = (self.max - origin) * inv;
        let t_min = t0.min(t1);
        let t_max = t0.max(t1);
        let near = t_min.max_element();
        let far = t_max.min_element();
        if far > near.max(0.0) {
            Some((near.max(0.0), far))
        } else {
            None
        }
    }
}

/// Shape + detail + weather behind a single density query
pub struct CloudDensityField {
    shape: Texture3d,
    detail: Texture3d,
    weather: Texture2d,
}

impl CloudDensityField {
    pub fn new(shape: Texture3d, detail: Texture3d, weather: Texture2d) -> Self {
        Self {
            shape,
            detail,
            weather,
        }
    }

    /// Density at a world point, in [0, density_constant]. Zero outside the
    /// bounds; no extrapolation.
    ///
    /// `scroll` is this frame's accumulated scroll offset in tile units.
    pub fn sample_density(
        &self,
        p: Vec3,
        bounds: &CloudContainerBounds,
        params: &RenderParameters,
        scroll: Vec3,
    ) -> f32 {
        if !bounds.contains(p) {
            return 0.0;
        }

        let uvw = (p - bounds.min) / bounds.size();

        // Base shape: Perlin channel eroded by the weighted Worley channels.
        let shape_uvw = p / params.tile_size + scroll;
        let shape = self.shape.sample(shape_uvw);
        let w = params.shape_erosion_weights;
        let erosion = shape.y * w.x + shape.z * w.y + shape.w * w.z;
        let mut density = (shape.x - erosion).max(0.0);

        // Detail erosion at higher frequency carves the shape edges.
        if params.detail_amount > 0.0 {
            let detail = self.detail.sample(shape_uvw * DETAIL_TILE_FACTOR);
            let detail_value = detail.x * w.x + detail.y * w.y + detail.z * w.z;
            density = (density - detail_value * params.detail_amount * params.detail_modifier)
                .max(0.0);
        }

        // Weather: coverage scales density, height channel scales the top.
        let weather = self.weather.sample(Vec2::new(uvw.x, uvw.z));
        let coverage = weather.x;
        let height_scale = weather.y;

        // Smooth height falloff between the bottom band and the scaled top.
        let h = uvw.y;
        let bottom = params.cloud_bottom_modifier.max(1e-3);
        let top = (params.cloud_max_height * params.cloud_height_modifier * height_scale)
            .max(bottom + 1e-3);
        let falloff = smoothstep(0.0, bottom, h) * (1.0 - smoothstep(top * 0.5, top, h));

        (density * falloff * coverage * params.density_constant)
            .clamp(0.0, params.density_constant)
    }
}

/// Detail volume repeats this many times per shape tile.
const DETAIL_TILE_FACTOR: f32 = 4.0;

#[inline]
pub(crate) fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

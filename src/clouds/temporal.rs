//! Temporal reprojection blender
//!
//! Reuses the previous frame's cloud layer, warped into the current view via
//! the previous view-projection matrix, and blends it with the freshly
//! rendered layer. History lives in buffers owned by one pipeline instance
//! and allocated once per resolution; a resize or the first frame simply
//! falls back to the current layer.

use glam::{Mat4, Vec3, Vec4};
use rayon::prelude::*;

use crate::camera::CameraState;
use crate::clouds::density::CloudContainerBounds;
use crate::error::{CloudError, CloudResult};
use crate::framebuffer::FrameBuffer;

/// Distance used to anchor reprojection when a pixel's ray misses the box
const FALLBACK_ANCHOR_DISTANCE: f32 = 100.0;

/// Frame-to-frame state owned by one rendering instance
#[derive(Debug)]
pub struct TemporalState {
    prev_view_proj: Mat4,
    history: Option<FrameBuffer>,
}

impl TemporalState {
    pub fn new() -> Self {
        Self {
            prev_view_proj: Mat4::IDENTITY,
            history: None,
        }
    }

    pub fn has_history(&self) -> bool {
        self.history.is_some()
    }

    /// Drops the history, e.g. after a resolution change.
    pub fn invalidate(&mut self) {
        self.history = None;
    }

    /// Blends the current cloud layer with the reprojected previous layer:
    /// `lerp(current, previous, blending_coeff)` per pixel.
    ///
    /// Fails with `StaleTemporalState` when no usable history exists; the
    /// caller falls back to the current layer for that frame.
    pub fn reproject_and_blend(
        &self,
        current: &FrameBuffer,
        camera: &CameraState,
        bounds: &CloudContainerBounds,
        blending_coeff: f32,
    ) -> CloudResult<FrameBuffer> {
        let history = self.history.as_ref().ok_or(CloudError::StaleTemporalState {
            reason: "no previous frame".to_string(),
        })?;
        if history.width() != current.width() || history.height() != current.height() {
            return Err(CloudError::StaleTemporalState {
                reason: format!(
                    "history is {}x{}, current frame is {}x{}",
                    history.width(),
                    history.height(),
                    current.width(),
                    current.height()
                ),
            });
        }

        let width = current.width();
        let height = current.height();
        let origin = camera.position;
        let forward = camera.forward();
        let right = camera.right();
        let up = camera.up();
        let tan_half_fov = (camera.fov_y.to_radians() * 0.5).tan();
        let aspect = camera.aspect();
        let prev_view_proj = self.prev_view_proj;

        let mut blended = FrameBuffer::new(width, height);
        blended
            .rows_mut()
            .enumerate()
            .par_bridge()
            .for_each(|(y, row)| {
                let ndc_y = 1.0 - 2.0 * (y as f32 + 0.5) / height as f32;
                for (x, pixel) in row.iter_mut().enumerate() {
                    let ndc_x = 2.0 * (x as f32 + 0.5) / width as f32 - 1.0;
                    let dir = (forward
                        + right * (ndc_x * tan_half_fov * aspect)
                        + up * (ndc_y * tan_half_fov))
                        .normalize();

                    // Anchor the pixel at the container entry point so the
                    // warp matches where the clouds actually are.
                    let anchor_t = bounds
                        .ray_intersect(origin, dir)
                        .map(|(near, _)| near.max(1e-3))
                        .unwrap_or(FALLBACK_ANCHOR_DISTANCE);
                    let world = origin + dir * anchor_t;

                    let cur = current.get(x as u32, y as u32);
                    *pixel = match reproject_uv(prev_view_proj, world) {
                        Some((u, v)) => cur.lerp(history.sample_clamped(u, v), blending_coeff),
                        // Sample left the previous frame; keep the current one
                        None => cur,
                    };
                }
            });

        Ok(blended)
    }

    /// Saves this frame's cloud layer and view-projection for the next frame.
    /// Reuses the existing allocation when the resolution is unchanged.
    pub fn store(&mut self, layer: &FrameBuffer, view_proj: Mat4) {
        match &mut self.history {
            Some(history)
                if history.width() == layer.width() && history.height() == layer.height() =>
            {
                history.clone_from(layer);
            }
            _ => self.history = Some(layer.clone()),
        }
        self.prev_view_proj = view_proj;
    }
}

impl Default for TemporalState {
    fn default() -> Self {
        Self::new()
    }
}

/// Projects a world point through the previous view-projection, returning
/// its uv in the previous frame, or `None` when it lands off-screen.
fn reproject_uv(view_proj: Mat4, world: Vec3) -> Option<(f32, f32)> {
    let clip: Vec4 = view_proj * world.extend(1.0);
    if clip.w <= 1e-6 {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    let u = ndc.x * 0.5 + 0.5;
    let v = 0.5 - ndc.y * 0.5;
    if (0.0..=1.0).contains(&u) && (0.0..=1.0).contains(&v) {
        Some((u, v))
    } else {
        None
    }
}

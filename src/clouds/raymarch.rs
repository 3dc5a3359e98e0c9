//! Raymarch & lighting engine
//!
//! Marches every output pixel's view ray through the cloud container,
//! accumulating scattered light and transmittance front to back. Pixels are
//! independent, so the image is rendered as a rayon parallel-for over rows.
//!
//! The cloud layer is produced alone (premultiplied color, alpha =
//! 1 - transmittance) so the temporal blender can reproject it before it is
//! composited over the background.

use glam::{Vec3, Vec4};
use rayon::prelude::*;

use crate::camera::CameraState;
use crate::clouds::density::{CloudContainerBounds, CloudDensityField};
use crate::clouds::params::{LightDescriptor, RenderParameters};
use crate::constants::march::{MIN_STEP_SIZE, PHASE_G_LIMIT, TRANSMITTANCE_CUTOFF};
use crate::framebuffer::FrameBuffer;

/// Flat base term so clouds stay visible without any light
const UNLIT_BASE: f32 = 0.25;

/// Everything one frame's march needs, borrowed for the frame
pub struct RayMarchContext<'a> {
    pub field: &'a CloudDensityField,
    pub bounds: CloudContainerBounds,
    pub camera: &'a CameraState,
    pub light: LightDescriptor,
    pub params: &'a RenderParameters,
    /// Accumulated scroll offset in tile units (speed * time)
    pub scroll: Vec3,
}

/// Henyey-Greenstein phase function; `g` is clamped inside (-1, 1).
pub fn henyey_greenstein(cos_theta: f32, g: f32) -> f32 {
    let g = g.clamp(-PHASE_G_LIMIT, PHASE_G_LIMIT);
    let g2 = g * g;
    let denom = 1.0 + g2 - 2.0 * g * cos_theta;
    (1.0 - g2) / (4.0 * std::f32::consts::PI * denom * denom.sqrt())
}

/// Phase value for a scattering angle: HG weighted by the frame's effective
/// ratio against an isotropic term.
fn phase(cos_theta: f32, params: &RenderParameters) -> f32 {
    let ratio = params.effective_henyey_ratio();
    let isotropic = 1.0 / (4.0 * std::f32::consts::PI);
    ratio * henyey_greenstein(cos_theta, params.henyey_coeff) * params.henyey_intensity
        + (1.0 - ratio) * isotropic
}

/// Powder darkening, blended in by `powder_amount` so 0 disables it.
fn powder_term(density: f32, params: &RenderParameters) -> f32 {
    let powder = 1.0 - (-density * params.powder_coeff).exp();
    1.0 + params.powder_amount * (powder * params.powder_intensity - 1.0)
}

/// Interleaved gradient noise, the per-pixel dither for march jittering.
#[inline]
fn pixel_dither(x: u32, y: u32) -> f32 {
    let v = 0.067_110_56 * x as f32 + 0.005_837_15 * y as f32;
    (52.982_92 * v.fract()).fract()
}

/// Short sub-march from `p` toward the light, estimating how much light
/// survives the intervening cloud (Beer-Lambert over accumulated optical
/// depth). Steps shrink by `light_march_decrease` and together span the
/// remaining distance inside the container.
fn light_march(ctx: &RayMarchContext, p: Vec3, dither: f32) -> f32 {
    let params = ctx.params;
    let to_light = ctx.light.position - p;
    let distance_to_light = to_light.length();
    if distance_to_light < 1e-6 {
        return 1.0;
    }
    let dir = to_light / distance_to_light;

    let span = match ctx.bounds.ray_intersect(p, dir) {
        Some((_, far)) => far.min(distance_to_light),
        None => return 1.0,
    };
    if span <= 0.0 {
        return 1.0;
    }

    let steps = params.light_march_steps;
    let shrink = params.light_march_decrease;
    let mut weight_sum = 0.0;
    let mut weight = 1.0;
    for _ in 0..steps {
        weight_sum += weight;
        weight /= shrink;
    }
    let first_step = span / weight_sum;

    let mut optical_depth = 0.0;
    let mut t = 0.0;
    let mut step = first_step;
    for _ in 0..steps {
        let mut sample_t = t + step * 0.5;
        if params.use_blue_noise_light {
            sample_t += (dither - 0.5) * step * params.blue_noise_light_amount;
        }
        let sample = p + dir * sample_t.clamp(0.0, span);
        optical_depth +=
            ctx.field.sample_density(sample, &ctx.bounds, params, ctx.scroll) * step;
        t += step;
        step /= shrink;
    }

    (-optical_depth * params.absorption_coeff).exp()
}

/// Marches one pixel's ray. Returns premultiplied cloud color with
/// alpha = 1 - transmittance; a missed container is fully transparent.
fn march_pixel(ctx: &RayMarchContext, dir: Vec3, dither: f32, use_light: bool) -> Vec4 {
    let params = ctx.params;
    let origin = ctx.camera.position;

    let Some((t_near, t_far)) = ctx.bounds.ray_intersect(origin, dir) else {
        return Vec4::ZERO;
    };

    let mut step = params.ray_march_step_size.max(MIN_STEP_SIZE);
    let mut t = t_near;
    if params.use_blue_noise_ray {
        t += dither * step * params.blue_noise_ray_amount;
    }

    let mut transmittance = 1.0f32;
    let mut color = Vec3::ZERO;

    while t < t_far {
        let p = origin + dir * t;
        let density = ctx.field.sample_density(p, &ctx.bounds, params, ctx.scroll);
        if density > 0.0 {
            let lit = if use_light {
                let cos_theta = dir.dot((ctx.light.position - p).normalize_or_zero());
                let light_transmittance = light_march(ctx, p, dither);
                ctx.light.color
                    * (light_transmittance
                        * phase(cos_theta, params)
                        * powder_term(density, params)
                        * ctx.light.intensity
                        * params.cloud_intensity)
            } else {
                Vec3::ZERO
            };

            let inscatter = params.cloud_color * (Vec3::splat(UNLIT_BASE) + lit);
            color += inscatter * (transmittance * density * step);
            transmittance *= (-density * params.absorption_coeff * step).exp();
            if transmittance < TRANSMITTANCE_CUTOFF {
                break;
            }
        }
        t += step;
        // Coarser sampling farther from the camera
        step = (step * params.ray_march_decrease).max(MIN_STEP_SIZE);
    }

    Vec4::new(color.x, color.y, color.z, 1.0 - transmittance)
}

/// Renders the cloud layer alone, no background.
pub fn render_cloud_layer(ctx: &RayMarchContext, width: u32, height: u32) -> FrameBuffer {
    let use_light = ctx.params.resolve_use_light(&ctx.light);

    let origin_forward = ctx.camera.forward();
    let right = ctx.camera.right();
    let up = ctx.camera.up();
    let tan_half_fov = (ctx.camera.fov_y.to_radians() * 0.5).tan();
    let aspect = ctx.camera.aspect();

    let mut layer = FrameBuffer::new(width, height);
    layer.rows_mut().enumerate().par_bridge().for_each(|(y, row)| {
        let ndc_y = 1.0 - 2.0 * (y as f32 + 0.5) / height as f32;
        for (x, pixel) in row.iter_mut().enumerate() {
            let ndc_x = 2.0 * (x as f32 + 0.5) / width as f32 - 1.0;
            let dir = (origin_forward
                + right * (ndc_x * tan_half_fov * aspect)
                + up * (ndc_y * tan_half_fov))
                .normalize();
            let dither = pixel_dither(x as u32, y as u32);
            *pixel = march_pixel(ctx, dir, dither, use_light);
        }
    });
    layer
}

/// Composites a premultiplied cloud layer over the background.
pub fn composite_over(background: &FrameBuffer, clouds: &FrameBuffer) -> FrameBuffer {
    debug_assert_eq!(background.width(), clouds.width());
    debug_assert_eq!(background.height(), clouds.height());

    let mut out = FrameBuffer::new(background.width(), background.height());
    for y in 0..out.height() {
        for x in 0..out.width() {
            let bg = background.get(x, y);
            let c = clouds.get(x, y);
            let rgb = bg.truncate() * (1.0 - c.w) + c.truncate();
            out.set(x, y, Vec4::new(rgb.x, rgb.y, rgb.z, bg.w));
        }
    }
    out
}

//! Render parameters
//!
//! One frame's configuration snapshot. Rebuilt (or reused) fresh every frame
//! by the host; nothing in here persists beyond the frame. Each field has a
//! documented valid range, enforced by `validate`.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{configuration_error, CloudResult};

/// Where the frame's light comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightingMode {
    /// Global directional light
    Sun,
    /// A user-designated scene light
    SceneLight,
    /// No lighting; clouds keep their flat base color
    None,
}

/// Phase function selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseMode {
    HenyeyGreenstein,
    None,
}

/// Read-only light snapshot taken once per frame
#[derive(Debug, Clone, Copy)]
pub struct LightDescriptor {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub enabled: bool,
}

impl LightDescriptor {
    pub fn disabled() -> Self {
        Self {
            position: Vec3::ZERO,
            color: Vec3::ONE,
            intensity: 0.0,
            enabled: false,
        }
    }
}

/// Per-frame cloud rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderParameters {
    // main
    pub cloud_color: Vec3,
    /// Scroll speed; the accumulated offset is speed * frame time
    pub speed: f32,
    /// World-space size of one shape noise tile
    pub tile_size: f32,
    /// Extinction per unit optical depth, 0..=1
    pub absorption_coeff: f32,

    // shape
    /// Density multiplier and upper bound of the density field, 0..=5
    pub density_constant: f32,
    /// Top of the cloud layer as a fraction of box height, 0..=1
    pub cloud_max_height: f32,
    /// Tapering of the cloud top, 0..=1
    pub cloud_height_modifier: f32,
    /// Height where clouds reach full density, 0..=0.2
    pub cloud_bottom_modifier: f32,
    /// Strength of detail erosion, 0..=1
    pub detail_amount: f32,
    /// Detail erosion shaping, 0..=1
    pub detail_modifier: f32,
    /// Weights of the three Worley erosion channels against the Perlin base
    pub shape_erosion_weights: Vec3,

    // lighting
    pub lighting_mode: LightingMode,
    /// Multiplier on the lit contribution
    pub cloud_intensity: f32,
    pub phase_mode: PhaseMode,
    /// Henyey-Greenstein asymmetry g, clamped inside (-1, 1)
    pub henyey_coeff: f32,
    /// Weight of the HG term against the isotropic term, 0..=1
    pub henyey_ratio: f32,
    pub henyey_intensity: f32,

    // powder effect
    /// Extinction coefficient of the powder term, 0..=1
    pub powder_coeff: f32,
    /// Blend of the powder term, 0..=1; 0 disables the effect
    pub powder_amount: f32,
    /// 0..=50
    pub powder_intensity: f32,

    // ray march performance
    pub ray_march_step_size: f32,
    /// Step growth per step, >= 1
    pub ray_march_decrease: f32,
    pub use_blue_noise_ray: bool,
    /// Dither strength for the march start, 1..=2
    pub blue_noise_ray_amount: f32,

    // light march performance
    /// 1..=4
    pub light_march_steps: u32,
    /// Step shrink per light step, 1..=10
    pub light_march_decrease: f32,
    pub use_blue_noise_light: bool,
    /// Dither strength for light steps, 0..=0.5
    pub blue_noise_light_amount: f32,

    // temporal upsampling
    pub temporal_upsampling: bool,
    /// History blend weight, 0..=1
    pub blending_coeff: f32,
}

impl Default for RenderParameters {
    fn default() -> Self {
        Self {
            cloud_color: Vec3::ONE,
            speed: 0.01,
            tile_size: 60.0,
            absorption_coeff: 0.75,

            density_constant: 1.5,
            cloud_max_height: 0.9,
            cloud_height_modifier: 0.8,
            cloud_bottom_modifier: 0.1,
            detail_amount: 0.3,
            detail_modifier: 0.5,
            shape_erosion_weights: Vec3::new(0.625, 0.25, 0.125),

            lighting_mode: LightingMode::Sun,
            cloud_intensity: 1.0,
            phase_mode: PhaseMode::HenyeyGreenstein,
            henyey_coeff: 0.6,
            henyey_ratio: 0.7,
            henyey_intensity: 1.0,

            powder_coeff: 0.5,
            powder_amount: 0.4,
            powder_intensity: 10.0,

            ray_march_step_size: 0.5,
            ray_march_decrease: 1.0,
            use_blue_noise_ray: true,
            blue_noise_ray_amount: 1.2,

            light_march_steps: 3,
            light_march_decrease: 2.0,
            use_blue_noise_light: false,
            blue_noise_light_amount: 0.2,

            temporal_upsampling: false,
            blending_coeff: 0.5,
        }
    }
}

fn check_range(name: &str, value: f32, lo: f32, hi: f32) -> CloudResult<()> {
    if !(lo..=hi).contains(&value) {
        return Err(configuration_error(format!(
            "{} must be in [{}, {}], got {}",
            name, lo, hi, value
        )));
    }
    Ok(())
}

impl RenderParameters {
    /// Checks every knob against its documented domain.
    pub fn validate(&self) -> CloudResult<()> {
        check_range("absorption coefficient", self.absorption_coeff, 0.0, 1.0)?;
        check_range("density constant", self.density_constant, 0.0, 5.0)?;
        check_range("cloud max height", self.cloud_max_height, 0.0, 1.0)?;
        check_range("cloud height modifier", self.cloud_height_modifier, 0.0, 1.0)?;
        check_range("cloud bottom modifier", self.cloud_bottom_modifier, 0.0, 0.2)?;
        check_range("detail amount", self.detail_amount, 0.0, 1.0)?;
        check_range("detail modifier", self.detail_modifier, 0.0, 1.0)?;
        check_range("henyey ratio", self.henyey_ratio, 0.0, 1.0)?;
        check_range("powder coefficient", self.powder_coeff, 0.0, 1.0)?;
        check_range("powder amount", self.powder_amount, 0.0, 1.0)?;
        check_range("powder intensity", self.powder_intensity, 0.0, 50.0)?;
        check_range("blue noise ray amount", self.blue_noise_ray_amount, 1.0, 2.0)?;
        check_range("blue noise light amount", self.blue_noise_light_amount, 0.0, 0.5)?;
        check_range("light march decrease", self.light_march_decrease, 1.0, 10.0)?;
        check_range("blending coefficient", self.blending_coeff, 0.0, 1.0)?;
        if self.tile_size <= 0.0 {
            return Err(configuration_error("tile size must be positive"));
        }
        if self.ray_march_step_size <= 0.0 {
            return Err(configuration_error("ray march step size must be positive"));
        }
        if self.ray_march_decrease < 1.0 {
            return Err(configuration_error("ray march decrease must be >= 1"));
        }
        if !(1..=4).contains(&self.light_march_steps) {
            return Err(configuration_error("light march steps must be in 1..=4"));
        }
        Ok(())
    }

    /// Resolves whether lit shading applies this frame. Mode None, or a
    /// disabled selected light, zeroes the lit contribution.
    pub fn resolve_use_light(&self, light: &LightDescriptor) -> bool {
        match self.lighting_mode {
            LightingMode::None => false,
            LightingMode::Sun | LightingMode::SceneLight => light.enabled,
        }
    }

    /// HG weight actually used this frame; `PhaseMode::None` forces it to 0.
    pub fn effective_henyey_ratio(&self) -> f32 {
        match self.phase_mode {
            PhaseMode::HenyeyGreenstein => self.henyey_ratio,
            PhaseMode::None => 0.0,
        }
    }
}

// Cloudscape constants - single source of truth
//
// Resolutions, asset names and numeric thresholds shared by the bake
// and render stages. Do not redefine these elsewhere.

/// Noise volume / weather map resolutions
pub mod resolutions {
    /// Shape noise volume edge length (voxels)
    pub const SHAPE_RESOLUTION: u32 = 128;
    /// Detail noise volume edge length (voxels)
    pub const DETAIL_RESOLUTION: u32 = 32;
    /// Weather map edge length (pixels)
    pub const WEATHER_RESOLUTION: u32 = 512;
}

/// Fixed asset names under which baked textures are persisted
pub mod assets {
    pub const SHAPE_NOISE: &str = "ShapeNoise";
    pub const DETAIL_NOISE: &str = "DetailNoise";
    pub const WEATHER_MAP: &str = "WeatherMap";
}

/// Raymarch numeric thresholds
pub mod march {
    /// Transmittance below this ends the march early
    pub const TRANSMITTANCE_CUTOFF: f32 = 0.01;
    /// Henyey-Greenstein asymmetry is clamped inside the open interval (-1, 1)
    pub const PHASE_G_LIMIT: f32 = 0.999;
    /// Minimum usable ray march step (world units)
    pub const MIN_STEP_SIZE: f32 = 1e-3;
}

/// Default seeds for the deterministic bake pipeline
pub mod seeds {
    pub const SHAPE_SEED: u64 = 0x5EED_C10D;
    pub const DETAIL_SEED: u64 = 0xDE7A_11ED;
    pub const WEATHER_SEED: u64 = 0x7EA7_4E12;
}

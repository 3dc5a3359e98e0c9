//! Texture packing and persistence
//!
//! Float volume fields from the synthesizer become immutable RGBA8 textures
//! here, then round-trip through the named asset store.

pub mod packed;
pub mod packer;
pub mod store;
pub mod volume;

pub use packed::{Texture2d, Texture3d};
pub use packer::{pack_image, pack_volume};
pub use store::TextureStore;
pub use volume::VolumeField;

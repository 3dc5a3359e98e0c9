//! Texture asset store
//!
//! Named persistence for baked textures. The renderer looks assets up by a
//! fixed string key and treats whatever comes back as an immutable packed
//! texture. Volumes persist as a small header plus raw RGBA8 bytes; weather
//! maps persist as PNG.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{configuration_error, resource_missing, CloudError, CloudResult};
use crate::texture::packed::{Texture2d, Texture3d};

/// Magic prefix of the volume asset format
const VOLUME_MAGIC: &[u8; 4] = b"CSV3";

/// Largest volume resolution the store accepts when reading a header.
/// Headers are untrusted input; anything larger is a corrupt file.
const MAX_VOLUME_RESOLUTION: u32 = 4096;

/// On-disk store rooted at one directory
#[derive(Debug, Clone)]
pub struct TextureStore {
    root: PathBuf,
}

impl TextureStore {
    /// Opens (and creates if needed) a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> CloudResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn volume_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.vol3", name))
    }

    fn map_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.png", name))
    }

    /// Persists a packed volume under `name`.
    pub fn save_volume(&self, name: &str, texture: &Texture3d) -> CloudResult<()> {
        let mut bytes = Vec::with_capacity(8 + texture.texels().len() * 4);
        bytes.extend_from_slice(VOLUME_MAGIC);
        bytes.extend_from_slice(&texture.resolution().to_le_bytes());
        bytes.extend_from_slice(bytemuck::cast_slice(texture.texels()));
        fs::write(self.volume_path(name), bytes)?;
        log::info!(
            "saved volume asset '{}' ({}³)",
            name,
            texture.resolution()
        );
        Ok(())
    }

    /// Loads a packed volume by name.
    pub fn load_volume(&self, name: &str) -> CloudResult<Texture3d> {
        let path = self.volume_path(name);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(resource_missing(name))
            }
            Err(e) => return Err(CloudError::Io(e)),
        };

        if bytes.len() < 8 || &bytes[0..4] != VOLUME_MAGIC {
            return Err(configuration_error(format!(
                "volume asset '{}' has an invalid header",
                name
            )));
        }
        let resolution = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if resolution == 0 || resolution > MAX_VOLUME_RESOLUTION {
            return Err(configuration_error(format!(
                "volume asset '{}' declares resolution {}, valid range is 1..={}",
                name, resolution, MAX_VOLUME_RESOLUTION
            )));
        }
        let expected = (resolution as usize).pow(3) * 4;
        if bytes.len() != 8 + expected {
            return Err(configuration_error(format!(
                "volume asset '{}' is truncated: expected {} payload bytes, found {}",
                name,
                expected,
                bytes.len() - 8
            )));
        }

        let texels: Vec<[u8; 4]> = bytes[8..]
            .chunks_exact(4)
            .map(|c| [c[0], c[1], c[2], c[3]])
            .collect();
        Ok(Texture3d::from_texels(resolution, texels))
    }

    /// Persists a packed 2D map under `name` as PNG.
    pub fn save_map(&self, name: &str, texture: &Texture2d) -> CloudResult<()> {
        let img = image::RgbaImage::from_fn(texture.width(), texture.height(), |x, y| {
            image::Rgba(texture.texels()[(x + y * texture.width()) as usize])
        });
        img.save(self.map_path(name))?;
        log::info!(
            "saved map asset '{}' ({}x{})",
            name,
            texture.width(),
            texture.height()
        );
        Ok(())
    }

    /// Loads a packed 2D map by name.
    pub fn load_map(&self, name: &str) -> CloudResult<Texture2d> {
        let path = self.map_path(name);
        if !path.exists() {
            return Err(resource_missing(name));
        }
        let img = image::open(&path)?.to_rgba8();
        let texels = img.pixels().map(|p| p.0).collect();
        Ok(Texture2d::from_texels(img.width(), img.height(), texels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TextureStore::new(dir.path()).expect("store should open");

        let texels: Vec<[u8; 4]> = (0..27u32)
            .map(|i| [i as u8, (i * 2) as u8, (i * 3) as u8, 255])
            .collect();
        let tex = Texture3d::from_texels(3, texels);
        store.save_volume("test", &tex).expect("save should succeed");
        let loaded = store.load_volume("test").expect("load should succeed");
        assert_eq!(tex, loaded, "volume should round-trip byte-identically");
    }

    #[test]
    fn test_map_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TextureStore::new(dir.path()).expect("store should open");

        let texels: Vec<[u8; 4]> = (0..16u32).map(|i| [i as u8 * 16, 0, 255, 255]).collect();
        let tex = Texture2d::from_texels(4, 4, texels);
        store.save_map("weather", &tex).expect("save should succeed");
        let loaded = store.load_map("weather").expect("load should succeed");
        assert_eq!(tex, loaded, "map should round-trip losslessly through PNG");
    }

    #[test]
    fn test_missing_asset_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TextureStore::new(dir.path()).expect("store should open");
        assert!(matches!(
            store.load_volume("NotThere"),
            Err(CloudError::ResourceMissing { .. })
        ));
        assert!(matches!(
            store.load_map("NotThere"),
            Err(CloudError::ResourceMissing { .. })
        ));
    }

    #[test]
    fn test_corrupt_volume_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TextureStore::new(dir.path()).expect("store should open");
        fs::write(dir.path().join("bad.vol3"), b"NOPE1234").expect("write");
        assert!(matches!(
            store.load_volume("bad"),
            Err(CloudError::ConfigurationError { .. })
        ));
    }

    #[test]
    fn test_oversized_resolution_header_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TextureStore::new(dir.path()).expect("store should open");

        // A valid magic with an absurd resolution must come back as a
        // configuration error, not overflow while sizing the payload.
        for resolution in [u32::MAX, MAX_VOLUME_RESOLUTION + 1, 0] {
            let mut bytes = Vec::new();
            bytes.extend_from_slice(VOLUME_MAGIC);
            bytes.extend_from_slice(&resolution.to_le_bytes());
            bytes.extend_from_slice(&[0u8; 16]);
            fs::write(dir.path().join("huge.vol3"), &bytes).expect("write");
            assert!(
                matches!(
                    store.load_volume("huge"),
                    Err(CloudError::ConfigurationError { .. })
                ),
                "resolution {} must be rejected as corrupt",
                resolution
            );
        }
    }
}

//! Uploads decoded bitmaps once per asset key.

use std::collections::HashMap;

use britannia_assets::{AssetKey, Bitmap};
use tracing::debug;

use crate::device::{GraphicsDevice, Texture};
use crate::error::RenderResult;

/// Device textures keyed by the asset they were uploaded from.
#[derive(Debug, Default)]
pub struct TextureCache {
    textures: HashMap<AssetKey, Texture>,
    uploads: u64,
}

impl TextureCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the texture for `key`, uploading `bitmap` the first time.
    ///
    /// # Errors
    ///
    /// The device's upload error.
    pub fn get_or_upload(
        &mut self,
        key: AssetKey,
        bitmap: &Bitmap,
        device: &mut dyn GraphicsDevice,
    ) -> RenderResult<Texture> {
        if let Some(texture) = self.textures.get(&key) {
            return Ok(*texture);
        }

        let texture = device.create_texture(bitmap.width(), bitmap.height(), &bitmap.to_rgba8())?;
        self.textures.insert(key, texture);
        self.uploads += 1;
        debug!(%key, width = texture.width, height = texture.height, "texture uploaded");
        Ok(texture)
    }

    /// The texture for `key`, if uploaded.
    #[must_use]
    pub fn get(&self, key: AssetKey) -> Option<Texture> {
        self.textures.get(&key).copied()
    }

    /// Forgets `key`. The next `get_or_upload` uploads again.
    pub fn remove(&mut self, key: AssetKey) -> Option<Texture> {
        self.textures.remove(&key)
    }

    /// Uploads performed.
    #[must_use]
    pub const fn uploads(&self) -> u64 {
        self.uploads
    }

    /// Textures held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Returns true if nothing is uploaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::HeadlessDevice;
    use britannia_assets::AssetKind;

    #[test]
    fn test_upload_once_per_key() {
        let mut device = HeadlessDevice::new(64, 64);
        let mut cache = TextureCache::new();
        let bitmap = Bitmap::new(4, 2).unwrap();
        let key = AssetKey::new(AssetKind::Gump, 9);

        let a = cache.get_or_upload(key, &bitmap, &mut device).unwrap();
        let b = cache.get_or_upload(key, &bitmap, &mut device).unwrap();

        assert_eq!(a, b);
        assert_eq!((a.width, a.height), (4, 2));
        assert_eq!(cache.uploads(), 1);
        assert_eq!(device.texture_count(), 1);
    }
}

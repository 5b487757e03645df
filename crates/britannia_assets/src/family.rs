//! # Asset Factories
//!
//! The six factories the client uses, wired to the install's data files.
//!
//! ```text
//! artwork        artidx.mul + art.mul
//! texmaps        texidx.mul + texmaps.mul
//! animations     anim.idx   + anim.mul
//! gumps          gumpidx.mul + gumpart.mul
//! ascii_fonts    fonts.mul
//! unicode_fonts  unifont.mul, unifont1.mul, ... (count from the profile)
//! ```
//!
//! A kind whose files are missing gets an empty source: the install still
//! opens and every resolve of that kind is `NotFound`.

use britannia_core::{AssetSettings, InstallLocation};
use tracing::{info, warn};

use crate::cache::CacheStats;
use crate::decode::{
    AnimationDecoder, ArtworkDecoder, AsciiFontDecoder, GumpDecoder, TexmapDecoder,
    UnicodeFontDecoder,
};
use crate::error::AssetResult;
use crate::factory::{AssetFactory, PreloadReport};
use crate::key::{AssetKey, AssetKind};
use crate::profile::FormatProfile;
use crate::source::{AsciiFontFile, EmptySource, FilePerRecord, IndexedFile, RecordSource};

/// Land tiles and item art.
pub type ArtworkFactory = AssetFactory<ArtworkDecoder>;
/// Terrain textures.
pub type TexmapFactory = AssetFactory<TexmapDecoder>;
/// Mobile animations.
pub type AnimationFactory = AssetFactory<AnimationDecoder>;
/// UI overlays.
pub type GumpFactory = AssetFactory<GumpDecoder>;
/// ASCII fonts.
pub type AsciiFontFactory = AssetFactory<AsciiFontDecoder>;
/// Unicode fonts.
pub type UnicodeFontFactory = AssetFactory<UnicodeFontDecoder>;

/// All six factories for one install.
#[derive(Debug)]
pub struct AssetFactories {
    /// Artwork.
    pub artwork: ArtworkFactory,
    /// Texture maps.
    pub texmaps: TexmapFactory,
    /// Animations.
    pub animations: AnimationFactory,
    /// Gumps.
    pub gumps: GumpFactory,
    /// ASCII fonts.
    pub ascii_fonts: AsciiFontFactory,
    /// Unicode fonts.
    pub unicode_fonts: UnicodeFontFactory,
}

fn indexed(install: &InstallLocation, index: &str, data: &str) -> Box<dyn RecordSource> {
    let (Some(index_path), Some(data_path)) = (install.data_file(index), install.data_file(data))
    else {
        warn!(index, data, "data files missing, serving nothing");
        return Box::new(EmptySource::new(format!("{data} not installed")));
    };

    match IndexedFile::open(&index_path, &data_path) {
        Ok(file) => Box::new(file),
        Err(e) => {
            warn!(index, data, error = %e, "cannot open data files, serving nothing");
            Box::new(EmptySource::new(format!("{data}: {e}")))
        }
    }
}

fn unicode_font_name(index: u32) -> String {
    if index == 0 {
        String::from("unifont.mul")
    } else {
        format!("unifont{index}.mul")
    }
}

impl AssetFactories {
    /// Builds every factory over `install`.
    ///
    /// Opening never fails; missing files show up as `NotFound` on resolve.
    #[must_use]
    pub fn open(install: &InstallLocation) -> Self {
        let profile = FormatProfile::for_version(install.version());

        let ascii: Box<dyn RecordSource> = match install.data_file("fonts.mul") {
            Some(path) => Box::new(AsciiFontFile::new(path)),
            None => {
                warn!("fonts.mul missing, serving nothing");
                Box::new(EmptySource::new("fonts.mul not installed"))
            }
        };

        let unicode_files = (0..profile.unicode_font_files)
            .map(|i| install.data_file(&unicode_font_name(i)))
            .collect();

        let factories = Self {
            artwork: AssetFactory::new(
                indexed(install, "artidx.mul", "art.mul"),
                ArtworkDecoder,
                profile,
            ),
            texmaps: AssetFactory::new(
                indexed(install, "texidx.mul", "texmaps.mul"),
                TexmapDecoder,
                profile,
            ),
            animations: AssetFactory::new(
                indexed(install, "anim.idx", "anim.mul"),
                AnimationDecoder,
                profile,
            ),
            gumps: AssetFactory::new(
                indexed(install, "gumpidx.mul", "gumpart.mul"),
                GumpDecoder,
                profile,
            ),
            ascii_fonts: AssetFactory::new(ascii, AsciiFontDecoder, profile),
            unicode_fonts: AssetFactory::new(
                Box::new(FilePerRecord::new(unicode_files)),
                UnicodeFontDecoder,
                profile,
            ),
        };

        info!(
            directory = %install.directory().display(),
            version = %install.version(),
            "asset factories ready"
        );
        factories
    }

    /// Resolves any key, discarding the asset. Used by background loaders.
    ///
    /// # Errors
    ///
    /// The factory's error for that key.
    pub fn resolve_key(&self, key: AssetKey) -> AssetResult<()> {
        match key.kind {
            AssetKind::Artwork => self.artwork.resolve(key.id).map(drop),
            AssetKind::Texmap => self.texmaps.resolve(key.id).map(drop),
            AssetKind::Animation => self.animations.resolve(key.id).map(drop),
            AssetKind::Gump => self.gumps.resolve(key.id).map(drop),
            AssetKind::AsciiFont => self.ascii_fonts.resolve(key.id).map(drop),
            AssetKind::UnicodeFont => self.unicode_fonts.resolve(key.id).map(drop),
        }
    }

    /// Returns true if `key` is already cached.
    #[must_use]
    pub fn is_cached(&self, key: AssetKey) -> bool {
        match key.kind {
            AssetKind::Artwork => self.artwork.cached(key.id).is_some(),
            AssetKind::Texmap => self.texmaps.cached(key.id).is_some(),
            AssetKind::Animation => self.animations.cached(key.id).is_some(),
            AssetKind::Gump => self.gumps.cached(key.id).is_some(),
            AssetKind::AsciiFont => self.ascii_fonts.cached(key.id).is_some(),
            AssetKind::UnicodeFont => self.unicode_fonts.cached(key.id).is_some(),
        }
    }

    /// Preloads the ids listed in the asset settings.
    pub fn preload(&self, settings: &AssetSettings) -> PreloadReport {
        let mut report = self.artwork.preload(settings.preload_artwork.iter().copied());
        report.merge(self.gumps.preload(settings.preload_gumps.iter().copied()));
        report
    }

    /// Counters for every factory.
    #[must_use]
    pub fn stats(&self) -> [(AssetKind, CacheStats); 6] {
        [
            (AssetKind::Artwork, self.artwork.stats()),
            (AssetKind::Texmap, self.texmaps.stats()),
            (AssetKind::Animation, self.animations.stats()),
            (AssetKind::Gump, self.gumps.stats()),
            (AssetKind::AsciiFont, self.ascii_fonts.stats()),
            (AssetKind::UnicodeFont, self.unicode_fonts.stats()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unicode_font_names() {
        assert_eq!(unicode_font_name(0), "unifont.mul");
        assert_eq!(unicode_font_name(12), "unifont12.mul");
    }
}

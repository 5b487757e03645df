//! Version-dependent format variants.

use britannia_core::ClientVersion;

/// First client release with the extended item art range and the larger
/// unicode font set.
pub const EXTENDED_ART_VERSION: ClientVersion = ClientVersion::new(7, 0, 0, 0);

/// Decode parameters selected by the client version.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatProfile {
    /// The version this profile was derived from.
    pub version: ClientVersion,
    /// Number of item art slots after the land tiles.
    pub art_item_capacity: u32,
    /// Number of `unifont*.mul` files the client ships.
    pub unicode_font_files: u32,
}

impl FormatProfile {
    /// Selects the profile for a client version.
    #[must_use]
    pub fn for_version(version: ClientVersion) -> Self {
        if version.at_least(EXTENDED_ART_VERSION) {
            Self {
                version,
                art_item_capacity: 0x1_0000,
                unicode_font_files: 13,
            }
        } else {
            Self {
                version,
                art_item_capacity: 0x4000,
                unicode_font_files: 3,
            }
        }
    }
}

impl Default for FormatProfile {
    fn default() -> Self {
        Self::for_version(ClientVersion::BASELINE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_profile() {
        let p = FormatProfile::for_version(ClientVersion::new(6, 0, 14, 2));
        assert_eq!(p.art_item_capacity, 0x4000);
        assert_eq!(p.unicode_font_files, 3);
    }

    #[test]
    fn test_extended_profile() {
        let p = FormatProfile::for_version(ClientVersion::new(7, 0, 15, 1));
        assert_eq!(p.art_item_capacity, 0x1_0000);
    }
}

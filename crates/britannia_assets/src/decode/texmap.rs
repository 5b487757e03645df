//! Terrain texture maps: square, raw, no transparency.

use std::io::Cursor;

use super::{read_u16, Decoder};
use crate::bitmap::Bitmap;
use crate::error::DecodeError;
use crate::key::AssetKind;
use crate::profile::FormatProfile;
use crate::source::Record;

/// Byte length of a 64x64 texture.
pub const SMALL_TEXMAP_BYTES: usize = 64 * 64 * 2;

/// Byte length of a 128x128 texture.
pub const LARGE_TEXMAP_BYTES: usize = 128 * 128 * 2;

/// Decodes texture map records. The side length follows from the record size.
#[derive(Clone, Copy, Debug, Default)]
pub struct TexmapDecoder;

impl Decoder for TexmapDecoder {
    type Output = Bitmap;

    const KIND: AssetKind = AssetKind::Texmap;

    fn decode(&self, record: &Record, _profile: &FormatProfile) -> Result<Bitmap, DecodeError> {
        let size = match record.data.len() {
            SMALL_TEXMAP_BYTES => 64,
            LARGE_TEXMAP_BYTES => 128,
            other => {
                return Err(DecodeError::Malformed(format!(
                    "texmap of {other} bytes is neither 64x64 nor 128x128"
                )))
            }
        };

        let mut bmp = Bitmap::new(size, size)?;
        let mut reader = Cursor::new(record.data.as_slice());
        for y in 0..size {
            for x in 0..size {
                bmp.set(x, y, read_u16(&mut reader)? | 0x8000);
            }
        }
        Ok(bmp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes_follow_length() {
        let small = Record::new(1, vec![0u8; SMALL_TEXMAP_BYTES]);
        let large = Record::new(2, vec![0u8; LARGE_TEXMAP_BYTES]);
        let profile = FormatProfile::default();

        assert_eq!(TexmapDecoder.decode(&small, &profile).unwrap().width(), 64);
        assert_eq!(TexmapDecoder.decode(&large, &profile).unwrap().width(), 128);
    }

    #[test]
    fn test_texmap_pixels_are_opaque() {
        let bmp = TexmapDecoder
            .decode(&Record::new(1, vec![0u8; SMALL_TEXMAP_BYTES]), &FormatProfile::default())
            .unwrap();
        assert_eq!(bmp.pixel(63, 63), Some(0x8000));
    }

    #[test]
    fn test_odd_length_is_malformed() {
        let err = TexmapDecoder
            .decode(&Record::new(1, vec![0u8; 100]), &FormatProfile::default())
            .unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }
}

//! Bitmap fonts.
//!
//! ```text
//! ASCII (one font inside fonts.mul):
//!   u8 header
//!   224 x { u8 width, u8 height, u8 unused, u16 pixels[width * height] }
//!   glyph i is character 32 + i
//!
//! Unicode (one unifont*.mul file):
//!   i32 lookup[0x10000]               absolute offsets, 0 = no glyph
//!   glyph: i8 x_offset | i8 y_offset | u8 width | u8 height
//!          height rows of ceil(width / 8) bytes, MSB is the leftmost pixel
//! ```

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek, SeekFrom};

use super::{read_i32, read_i8, read_u16, read_u8, Decoder};
use crate::bitmap::Bitmap;
use crate::error::DecodeError;
use crate::key::AssetKind;
use crate::profile::FormatProfile;
use crate::source::{Record, ASCII_GLYPHS_PER_FONT};

/// First character stored in an ASCII font.
pub const FIRST_ASCII_CHAR: u32 = 32;

/// Entries in a unicode font lookup table.
pub const UNICODE_TABLE_ENTRIES: usize = 0x1_0000;

/// Color used for set bits of unicode glyphs. Tinted at draw time.
pub const UNICODE_INK: u16 = 0xFFFF;

/// One ASCII glyph. Blank glyphs have no bitmap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Glyph {
    /// Advance width.
    pub width: u32,
    /// Cell height.
    pub height: u32,
    /// Pixels, if the glyph is not blank.
    pub bitmap: Option<Bitmap>,
}

/// A fixed-range bitmap font.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AsciiFont {
    /// Font header byte.
    pub header: u8,
    glyphs: Vec<Glyph>,
}

impl AsciiFont {
    /// Glyph for `ch`, if the font covers it.
    #[must_use]
    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        let index = u32::from(ch).checked_sub(FIRST_ASCII_CHAR)?;
        self.glyphs.get(index as usize)
    }

    /// Tallest glyph.
    #[must_use]
    pub fn line_height(&self) -> u32 {
        self.glyphs.iter().map(|g| g.height).max().unwrap_or(0)
    }

    /// Width and height of a single line of text. Unknown characters add nothing.
    #[must_use]
    pub fn measure(&self, text: &str) -> (u32, u32) {
        let width = text.chars().filter_map(|c| self.glyph(c)).map(|g| g.width).sum();
        (width, self.line_height())
    }
}

/// Decodes one font from `fonts.mul`.
#[derive(Clone, Copy, Debug, Default)]
pub struct AsciiFontDecoder;

impl Decoder for AsciiFontDecoder {
    type Output = AsciiFont;

    const KIND: AssetKind = AssetKind::AsciiFont;

    fn decode(&self, record: &Record, _profile: &FormatProfile) -> Result<AsciiFont, DecodeError> {
        let mut reader = Cursor::new(record.data.as_slice());
        let header = read_u8(&mut reader)?;
        let mut glyphs = Vec::with_capacity(ASCII_GLYPHS_PER_FONT);

        for _ in 0..ASCII_GLYPHS_PER_FONT {
            let width = u32::from(read_u8(&mut reader)?);
            let height = u32::from(read_u8(&mut reader)?);
            let _unused = read_u8(&mut reader)?;

            let bitmap = if width == 0 || height == 0 {
                None
            } else {
                let mut bmp = Bitmap::new(width, height)?;
                for y in 0..height {
                    for x in 0..width {
                        bmp.set_opaque(x, y, read_u16(&mut reader)?);
                    }
                }
                Some(bmp)
            };
            glyphs.push(Glyph {
                width,
                height,
                bitmap,
            });
        }

        Ok(AsciiFont { header, glyphs })
    }
}

/// One unicode glyph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnicodeGlyph {
    /// Horizontal bearing.
    pub x_offset: i8,
    /// Vertical bearing.
    pub y_offset: i8,
    /// Advance width.
    pub width: u32,
    /// Glyph height.
    pub height: u32,
    /// Pixels, if the glyph is not blank.
    pub bitmap: Option<Bitmap>,
}

/// A sparse font over the basic multilingual plane.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnicodeFont {
    glyphs: HashMap<u16, UnicodeGlyph>,
}

impl UnicodeFont {
    /// Glyph for `ch`, if present.
    #[must_use]
    pub fn glyph(&self, ch: char) -> Option<&UnicodeGlyph> {
        u16::try_from(u32::from(ch))
            .ok()
            .and_then(|code| self.glyphs.get(&code))
    }

    /// Number of glyphs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Returns true if the font has no glyphs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Width of a single line of text, bearings included.
    #[must_use]
    pub fn measure(&self, text: &str) -> u32 {
        text.chars()
            .filter_map(|c| self.glyph(c))
            .map(|g| (i64::from(g.x_offset) + i64::from(g.width)).max(0) as u32)
            .sum()
    }
}

/// Decodes one `unifont*.mul` file.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnicodeFontDecoder;

impl UnicodeFontDecoder {
    fn decode_glyph(reader: &mut Cursor<&[u8]>) -> Result<UnicodeGlyph, DecodeError> {
        let x_offset = read_i8(reader)?;
        let y_offset = read_i8(reader)?;
        let width = u32::from(read_u8(reader)?);
        let height = u32::from(read_u8(reader)?);

        let bitmap = if width == 0 || height == 0 {
            None
        } else {
            let mut bmp = Bitmap::new(width, height)?;
            let mut row = vec![0u8; width.div_ceil(8) as usize];
            for y in 0..height {
                reader.read_exact(&mut row)?;
                for x in 0..width {
                    let byte = row[(x / 8) as usize];
                    if byte & (0x80 >> (x % 8)) != 0 {
                        bmp.set(x, y, UNICODE_INK);
                    }
                }
            }
            Some(bmp)
        };

        Ok(UnicodeGlyph {
            x_offset,
            y_offset,
            width,
            height,
            bitmap,
        })
    }
}

impl Decoder for UnicodeFontDecoder {
    type Output = UnicodeFont;

    const KIND: AssetKind = AssetKind::UnicodeFont;

    fn decode(&self, record: &Record, _profile: &FormatProfile) -> Result<UnicodeFont, DecodeError> {
        let mut reader = Cursor::new(record.data.as_slice());
        let mut offsets = Vec::with_capacity(UNICODE_TABLE_ENTRIES);
        for _ in 0..UNICODE_TABLE_ENTRIES {
            offsets.push(read_i32(&mut reader)?);
        }

        let len = record.data.len() as u64;
        let mut glyphs = HashMap::new();
        for (code, offset) in (0..=u16::MAX).zip(offsets) {
            let Ok(offset) = u64::try_from(offset) else {
                continue;
            };
            if offset == 0 || offset >= len {
                continue;
            }
            reader.seek(SeekFrom::Start(offset))?;
            glyphs.insert(code, Self::decode_glyph(&mut reader)?);
        }

        Ok(UnicodeFont { glyphs })
    }

    fn accepts(&self, id: u32, profile: &FormatProfile) -> bool {
        id < profile.unicode_font_files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ascii_font_bytes() -> Vec<u8> {
        let mut data = vec![2u8];
        for i in 0..ASCII_GLYPHS_PER_FONT {
            if i == 0 {
                // space: blank, 4 wide
                data.extend_from_slice(&[4, 0, 0]);
            } else {
                data.extend_from_slice(&[2, 3, 0]);
                for _ in 0..6 {
                    data.extend_from_slice(&0x7FFFu16.to_le_bytes());
                }
            }
        }
        data
    }

    #[test]
    fn test_ascii_font_glyphs() {
        let font = AsciiFontDecoder
            .decode(&Record::new(0, ascii_font_bytes()), &FormatProfile::default())
            .unwrap();

        assert_eq!(font.header, 2);
        assert!(font.glyph(' ').unwrap().bitmap.is_none());
        assert_eq!(font.glyph('A').unwrap().bitmap.as_ref().unwrap().pixel(1, 2), Some(0xFFFF));
        assert!(font.glyph('\n').is_none());
        assert_eq!(font.measure("A B"), (2 + 4 + 2, 3));
    }

    #[test]
    fn test_ascii_font_truncated() {
        let mut bytes = ascii_font_bytes();
        bytes.truncate(50);
        let err = AsciiFontDecoder
            .decode(&Record::new(0, bytes), &FormatProfile::default())
            .unwrap_err();
        assert_eq!(err, DecodeError::Truncated);
    }

    #[test]
    fn test_unicode_font_bits() {
        let mut data = vec![0u8; UNICODE_TABLE_ENTRIES * 4];
        let glyph_at = data.len() as i32;
        let code = usize::from(b'A');
        data[code * 4..code * 4 + 4].copy_from_slice(&glyph_at.to_le_bytes());
        // 9 wide, 1 tall: two bytes per row
        data.extend_from_slice(&[1, 0xFE, 9, 1, 0b1000_0001, 0b1000_0000]);

        let font = UnicodeFontDecoder
            .decode(&Record::new(0, data), &FormatProfile::default())
            .unwrap();
        let glyph = font.glyph('A').unwrap();
        let bmp = glyph.bitmap.as_ref().unwrap();

        assert_eq!(font.len(), 1);
        assert_eq!((glyph.x_offset, glyph.y_offset), (1, -2));
        assert_eq!(bmp.pixel(0, 0), Some(UNICODE_INK));
        assert_eq!(bmp.pixel(1, 0), Some(0));
        assert_eq!(bmp.pixel(7, 0), Some(UNICODE_INK));
        assert_eq!(bmp.pixel(8, 0), Some(UNICODE_INK));
        assert_eq!(font.measure("AA"), 20);
    }

    #[test]
    fn test_unicode_file_count_follows_version() {
        let legacy = FormatProfile::for_version(britannia_core::ClientVersion::new(5, 0, 0, 0));
        assert!(UnicodeFontDecoder.accepts(2, &legacy));
        assert!(!UnicodeFontDecoder.accepts(3, &legacy));
        assert!(UnicodeFontDecoder.accepts(12, &FormatProfile::default()));
    }
}

//! UI overlays.
//!
//! ```text
//! index extra = (width << 16) | height
//! u32 row_lookup[height]        offsets in 4-byte units from record start
//! per row: { u16 color, u16 run }* until the row's width is filled
//! ```

use std::io::{Cursor, Seek, SeekFrom};

use super::{read_u16, read_u32, Decoder};
use crate::bitmap::Bitmap;
use crate::error::DecodeError;
use crate::key::AssetKind;
use crate::profile::FormatProfile;
use crate::source::Record;

/// Decodes gump records.
#[derive(Clone, Copy, Debug, Default)]
pub struct GumpDecoder;

impl GumpDecoder {
    /// Packs dimensions the way the index stores them.
    #[must_use]
    pub const fn pack_extra(width: u16, height: u16) -> i32 {
        ((width as i32) << 16) | height as i32
    }
}

impl Decoder for GumpDecoder {
    type Output = Bitmap;

    const KIND: AssetKind = AssetKind::Gump;

    fn decode(&self, record: &Record, _profile: &FormatProfile) -> Result<Bitmap, DecodeError> {
        let width = (record.extra >> 16) as u32 & 0xFFFF;
        let height = record.extra as u32 & 0xFFFF;
        let mut bmp = Bitmap::new(width, height)?;

        let mut reader = Cursor::new(record.data.as_slice());
        let mut lookup = Vec::with_capacity(height as usize);
        for _ in 0..height {
            lookup.push(u64::from(read_u32(&mut reader)?) * 4);
        }

        for (y, offset) in (0..height).zip(lookup) {
            reader.seek(SeekFrom::Start(offset))?;
            let mut x = 0u32;
            while x < width {
                let color = read_u16(&mut reader)?;
                let run = u32::from(read_u16(&mut reader)?);
                if run == 0 || x + run > width {
                    return Err(DecodeError::Malformed(format!(
                        "row {y} run of {run} at x={x} does not fit width {width}"
                    )));
                }
                if color != 0 {
                    for i in 0..run {
                        bmp.set_opaque(x + i, y, color);
                    }
                }
                x += run;
            }
        }

        Ok(bmp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two rows, width 3: row 0 = [red x3], row 1 = [clear, green x2].
    fn sample() -> Record {
        let mut data = Vec::new();
        // lookup: row 0 at 2 dwords, row 1 at 3 dwords
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(&3u32.to_le_bytes());
        data.extend_from_slice(&0x7C00u16.to_le_bytes());
        data.extend_from_slice(&3u16.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&0x03E0u16.to_le_bytes());
        data.extend_from_slice(&2u16.to_le_bytes());
        Record::new(1, data).with_extra(GumpDecoder::pack_extra(3, 2))
    }

    #[test]
    fn test_gump_rows() {
        let bmp = GumpDecoder.decode(&sample(), &FormatProfile::default()).unwrap();

        assert_eq!((bmp.width(), bmp.height()), (3, 2));
        assert_eq!(bmp.pixel(2, 0), Some(0xFC00));
        assert_eq!(bmp.pixel(0, 1), Some(0));
        assert_eq!(bmp.pixel(1, 1), Some(0x83E0));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let record = Record::new(1, Vec::new());
        let err = GumpDecoder.decode(&record, &FormatProfile::default()).unwrap_err();
        assert_eq!(err, DecodeError::InvalidDimensions { width: 0, height: 0 });
    }
}

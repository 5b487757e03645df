//! Land tile and item art.
//!
//! ```text
//! Land (id < 0x4000): 44x44 diamond, raw pixels row by row
//!   rows 0..22  : 2, 4, ... 44 pixels wide, centered
//!   rows 22..44 : 44, 42, ... 2 pixels wide, centered
//!
//! Item: u32 flags | u16 width | u16 height | u16 row_offsets[height]
//!   per row: { u16 x_skip, u16 run, u16 pixels[run] }* until {0, 0}
//! ```

use std::io::{Cursor, Seek, SeekFrom};

use super::{read_u16, read_u32, Decoder};
use crate::bitmap::Bitmap;
use crate::error::DecodeError;
use crate::key::{ArtworkId, AssetKind};
use crate::profile::FormatProfile;
use crate::source::Record;

/// Side length of a land tile.
pub const LAND_SIZE: u32 = 44;

/// Decodes artwork records.
#[derive(Clone, Copy, Debug, Default)]
pub struct ArtworkDecoder;

impl ArtworkDecoder {
    fn decode_land(data: &[u8]) -> Result<Bitmap, DecodeError> {
        let mut bmp = Bitmap::new(LAND_SIZE, LAND_SIZE)?;
        let mut reader = Cursor::new(data);
        let half = LAND_SIZE / 2;

        for y in 0..LAND_SIZE {
            let (start, width) = if y < half {
                (half - 1 - y, 2 + 2 * y)
            } else {
                (y - half, 2 + 2 * (LAND_SIZE - 1 - y))
            };
            for x in start..start + width {
                bmp.set_opaque(x, y, read_u16(&mut reader)?);
            }
        }

        Ok(bmp)
    }

    fn decode_item(data: &[u8]) -> Result<Bitmap, DecodeError> {
        let mut reader = Cursor::new(data);
        let _flags = read_u32(&mut reader)?;
        let width = u32::from(read_u16(&mut reader)?);
        let height = u32::from(read_u16(&mut reader)?);
        let mut bmp = Bitmap::new(width, height)?;

        let mut row_offsets = Vec::with_capacity(height as usize);
        for _ in 0..height {
            row_offsets.push(u64::from(read_u16(&mut reader)?));
        }
        let data_start = reader.position();

        for (y, offset) in (0..height).zip(row_offsets) {
            reader.seek(SeekFrom::Start(data_start + offset * 2))?;
            let mut x = 0u32;
            loop {
                let skip = u32::from(read_u16(&mut reader)?);
                let run = u32::from(read_u16(&mut reader)?);
                if skip + run == 0 {
                    break;
                }
                x += skip;
                if x + run > width {
                    return Err(DecodeError::Malformed(format!(
                        "row {y} overruns width {width}"
                    )));
                }
                for i in 0..run {
                    bmp.set_opaque(x + i, y, read_u16(&mut reader)?);
                }
                x += run;
            }
        }

        Ok(bmp)
    }
}

impl Decoder for ArtworkDecoder {
    type Output = Bitmap;

    const KIND: AssetKind = AssetKind::Artwork;

    fn decode(&self, record: &Record, _profile: &FormatProfile) -> Result<Bitmap, DecodeError> {
        match ArtworkId::from_logical(record.id) {
            Some(ArtworkId::Land(_)) => Self::decode_land(&record.data),
            Some(ArtworkId::Item(_)) => Self::decode_item(&record.data),
            None => Err(DecodeError::Malformed(format!("artwork id {} out of range", record.id))),
        }
    }

    fn accepts(&self, id: u32, profile: &FormatProfile) -> bool {
        id < ArtworkId::LAND_COUNT + profile.art_item_capacity
    }
}

/// Builds a land tile record filled with one color. Used by fixtures.
#[must_use]
pub fn land_record_bytes(color: u16) -> Vec<u8> {
    // 22 rows growing by two pixels, then the mirror: 2 * (2 + 4 + ... + 44)
    let pixels = 2 * (1..=LAND_SIZE / 2).map(|i| 2 * i).sum::<u32>();
    (0..pixels).flat_map(|_| color.to_le_bytes()).collect()
}

//! Mobile animations: one record holds every frame of one
//! (body, action, direction).
//!
//! ```text
//! u16 palette[256]
//! i32 frame_count
//! i32 frame_offset[frame_count]        relative to byte 512
//!
//! frame: i16 center_x | i16 center_y | u16 width | u16 height
//!        { u32 header, u8 index[run] }* until header == 0x7FFF_7FFF
//!
//! header bits: [31..22] x (signed) | [21..12] y (signed) | [11..0] run
//! ```

use std::io::{Cursor, Seek, SeekFrom};

use super::{read_i16, read_i32, read_u16, read_u32, read_u8, Decoder};
use crate::bitmap::Bitmap;
use crate::error::DecodeError;
use crate::key::AssetKind;
use crate::profile::FormatProfile;
use crate::source::Record;

/// Palette entries per animation.
pub const PALETTE_SIZE: usize = 256;

/// Upper bound on frames per record.
pub const MAX_FRAMES: usize = 1024;

const PALETTE_BYTES: u64 = (PALETTE_SIZE * 2) as u64;
const END_OF_FRAME: u32 = 0x7FFF_7FFF;

/// One decoded frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimationFrame {
    /// Horizontal anchor inside the bitmap.
    pub center_x: i16,
    /// Vertical anchor inside the bitmap.
    pub center_y: i16,
    /// Frame pixels.
    pub bitmap: Bitmap,
}

/// Every frame of one animation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Animation {
    /// Frames in playback order.
    pub frames: Vec<AnimationFrame>,
}

impl Animation {
    /// Number of frames.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns true if the animation has no frames.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame for a running frame counter, wrapping around.
    #[must_use]
    pub fn frame_at(&self, tick: usize) -> Option<&AnimationFrame> {
        if self.frames.is_empty() {
            None
        } else {
            self.frames.get(tick % self.frames.len())
        }
    }
}

/// Decodes animation records.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnimationDecoder;

#[inline]
fn sign_extend_10(value: u32) -> i32 {
    let v = (value & 0x3FF) as i32;
    if v & 0x200 != 0 {
        v - 0x400
    } else {
        v
    }
}

impl AnimationDecoder {
    fn decode_frame(
        reader: &mut Cursor<&[u8]>,
        palette: &[u16; PALETTE_SIZE],
    ) -> Result<AnimationFrame, DecodeError> {
        let center_x = read_i16(reader)?;
        let center_y = read_i16(reader)?;
        let width = u32::from(read_u16(reader)?);
        let height = u32::from(read_u16(reader)?);
        let mut bitmap = Bitmap::new(width, height)?;

        let base_x = i32::from(center_x);
        let base_y = i32::from(center_y) + height as i32;

        loop {
            let header = read_u32(reader)?;
            if header == END_OF_FRAME {
                break;
            }
            let x = base_x + sign_extend_10(header >> 22);
            let y = base_y + sign_extend_10(header >> 12);
            let run = header & 0xFFF;

            if x < 0 || y < 0 || x as u32 + run > width || y as u32 >= height {
                return Err(DecodeError::Malformed(format!(
                    "chunk at ({x}, {y}) run {run} outside {width}x{height}"
                )));
            }
            for i in 0..run {
                let index = usize::from(read_u8(reader)?);
                bitmap.set(x as u32 + i, y as u32, palette[index] | 0x8000);
            }
        }

        Ok(AnimationFrame {
            center_x,
            center_y,
            bitmap,
        })
    }
}

impl Decoder for AnimationDecoder {
    type Output = Animation;

    const KIND: AssetKind = AssetKind::Animation;

    fn decode(&self, record: &Record, _profile: &FormatProfile) -> Result<Animation, DecodeError> {
        let mut reader = Cursor::new(record.data.as_slice());

        let mut palette = [0u16; PALETTE_SIZE];
        for entry in &mut palette {
            *entry = read_u16(&mut reader)?;
        }

        let count = read_i32(&mut reader)?;
        let count = usize::try_from(count)
            .ok()
            .filter(|c| *c <= MAX_FRAMES)
            .ok_or_else(|| DecodeError::Malformed(format!("frame count {count}")))?;

        let mut offsets = Vec::with_capacity(count);
        for _ in 0..count {
            let offset = read_i32(&mut reader)?;
            let offset = u64::try_from(offset)
                .map_err(|_| DecodeError::Malformed(format!("frame offset {offset}")))?;
            offsets.push(PALETTE_BYTES + offset);
        }

        let mut frames = Vec::with_capacity(count);
        for offset in offsets {
            reader.seek(SeekFrom::Start(offset))?;
            frames.push(Self::decode_frame(&mut reader, &palette)?);
        }

        Ok(Animation { frames })
    }
}

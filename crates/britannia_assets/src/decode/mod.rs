//! # Decoders
//!
//! One decoder per asset kind. Each turns a raw `Record` into a renderable
//! resource, with format variants chosen by the `FormatProfile`.

mod animation;
mod artwork;
mod font;
mod gump;
mod texmap;

pub use animation::{Animation, AnimationDecoder, AnimationFrame};
pub use artwork::{land_record_bytes, ArtworkDecoder, LAND_SIZE};
pub use font::{AsciiFont, AsciiFontDecoder, Glyph, UnicodeFont, UnicodeFontDecoder, UnicodeGlyph};
pub use gump::GumpDecoder;
pub use texmap::TexmapDecoder;

use std::io::Read;

use crate::error::DecodeError;
use crate::key::AssetKind;
use crate::profile::FormatProfile;
use crate::source::Record;

/// Turns raw records of one kind into resources.
pub trait Decoder: Send + Sync + 'static {
    /// The decoded resource.
    type Output: Send + Sync + 'static;

    /// The kind this decoder handles.
    const KIND: AssetKind;

    /// Decodes one record.
    fn decode(&self, record: &Record, profile: &FormatProfile) -> Result<Self::Output, DecodeError>;

    /// Returns false for ids that cannot exist under `profile`.
    ///
    /// Checked before the source is read.
    fn accepts(&self, _id: u32, _profile: &FormatProfile) -> bool {
        true
    }
}

/// Reads a single byte.
pub(crate) fn read_u8<R: Read>(reader: &mut R) -> Result<u8, DecodeError> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Reads a signed byte.
pub(crate) fn read_i8<R: Read>(reader: &mut R) -> Result<i8, DecodeError> {
    Ok(i8::from_le_bytes([read_u8(reader)?]))
}

/// Reads a little-endian u16.
pub(crate) fn read_u16<R: Read>(reader: &mut R) -> Result<u16, DecodeError> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

/// Reads a little-endian i16.
pub(crate) fn read_i16<R: Read>(reader: &mut R) -> Result<i16, DecodeError> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(i16::from_le_bytes(buf))
}

/// Reads a little-endian u32.
pub(crate) fn read_u32<R: Read>(reader: &mut R) -> Result<u32, DecodeError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Reads a little-endian i32.
pub(crate) fn read_i32<R: Read>(reader: &mut R) -> Result<i32, DecodeError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

//! Decoded 16-bit bitmaps.
//!
//! Pixels stay in the install's ARGB1555 layout until upload; zero is
//! transparent.

use crate::error::DecodeError;

/// Largest accepted side length. Anything bigger is a corrupt record.
pub const MAX_DIMENSION: u32 = 4096;

/// A decoded image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u16>,
}

impl Bitmap {
    /// Creates a transparent bitmap.
    ///
    /// # Errors
    ///
    /// `InvalidDimensions` if either side is zero or above `MAX_DIMENSION`.
    pub fn new(width: u32, height: u32) -> Result<Self, DecodeError> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(DecodeError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            pixels: vec![0; (width * height) as usize],
        })
    }

    /// Width in pixels.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Raw ARGB1555 pixels, row-major.
    #[inline]
    #[must_use]
    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    /// Pixel at (x, y), or `None` outside the bitmap.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u16> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Writes one pixel; writes outside the bitmap are dropped.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: u16) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = color;
        }
    }

    /// Writes one opaque pixel from a raw 15-bit color.
    ///
    /// The files store colors without the alpha bit; any non-zero color is
    /// opaque.
    #[inline]
    pub fn set_opaque(&mut self, x: u32, y: u32, color: u16) {
        if color != 0 {
            self.set(x, y, color | 0x8000);
        }
    }

    /// Converts to RGBA8 for GPU upload.
    #[must_use]
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for &p in &self.pixels {
            let expand = |c: u16| {
                let c = (c & 0x1F) as u8;
                (c << 3) | (c >> 2)
            };
            out.push(expand(p >> 10));
            out.push(expand(p >> 5));
            out.push(expand(p));
            out.push(if p & 0x8000 != 0 { 0xFF } else { 0 });
        }
        out
    }

    /// Bytes held by the pixel buffer.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<u16>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_dimensions() {
        assert!(Bitmap::new(0, 10).is_err());
        assert!(Bitmap::new(10, MAX_DIMENSION + 1).is_err());
    }

    #[test]
    fn test_set_opaque_skips_zero() {
        let mut bmp = Bitmap::new(2, 1).unwrap();
        bmp.set_opaque(0, 0, 0);
        bmp.set_opaque(1, 0, 0x7FFF);
        assert_eq!(bmp.pixel(0, 0), Some(0));
        assert_eq!(bmp.pixel(1, 0), Some(0xFFFF));
    }

    #[test]
    fn test_rgba_expansion() {
        let mut bmp = Bitmap::new(1, 1).unwrap();
        bmp.set_opaque(0, 0, 0x7C00); // pure red
        assert_eq!(bmp.to_rgba8(), vec![0xFF, 0, 0, 0xFF]);
    }
}

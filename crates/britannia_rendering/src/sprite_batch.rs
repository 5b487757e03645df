//! Sprite batching: collect draws between `begin` and `end`, submit once.

use crate::device::{GraphicsDevice, SpriteDraw, Texture, ViewTransform};
use crate::error::{RenderError, RenderResult};

/// Collects sprites for one device submission.
#[derive(Debug, Default)]
pub struct SpriteBatch {
    transform: Option<ViewTransform>,
    sprites: Vec<SpriteDraw>,
    submitted: u64,
}

impl SpriteBatch {
    /// Creates an idle batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts collecting with `transform`.
    ///
    /// # Errors
    ///
    /// `BatchAlreadyBegun` if the previous batch was not ended.
    pub fn begin(&mut self, transform: ViewTransform) -> RenderResult<()> {
        if self.transform.is_some() {
            return Err(RenderError::BatchAlreadyBegun);
        }
        self.transform = Some(transform);
        self.sprites.clear();
        Ok(())
    }

    /// Queues `texture` at `position`, at its natural size.
    ///
    /// # Errors
    ///
    /// `BatchNotBegun` outside `begin`/`end`.
    pub fn draw(&mut self, texture: &Texture, position: (f32, f32)) -> RenderResult<()> {
        if self.transform.is_none() {
            return Err(RenderError::BatchNotBegun);
        }
        self.sprites.push(SpriteDraw {
            texture: texture.id,
            position,
            size: (texture.width as f32, texture.height as f32),
        });
        Ok(())
    }

    /// Submits the queued sprites and returns how many were drawn.
    ///
    /// An empty batch submits nothing. The batch is idle afterwards even if
    /// the device rejects the draw.
    ///
    /// # Errors
    ///
    /// `BatchNotBegun` without `begin`, or the device's error.
    pub fn end(&mut self, device: &mut dyn GraphicsDevice) -> RenderResult<usize> {
        let transform = self.transform.take().ok_or(RenderError::BatchNotBegun)?;
        let count = self.sprites.len();
        if count > 0 {
            device.draw_sprites(&transform, &self.sprites)?;
            self.submitted += count as u64;
        }
        self.sprites.clear();
        Ok(count)
    }

    /// Returns true between `begin` and `end`.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.transform.is_some()
    }

    /// Sprites submitted since creation.
    #[must_use]
    pub const fn submitted(&self) -> u64 {
        self.submitted
    }
}

//! # Graphics Device
//!
//! The boundary between the compositor and a rendering backend. The
//! workspace ships `HeadlessDevice`, which validates and records commands
//! instead of drawing them.

use std::collections::HashMap;

use tracing::trace;

use crate::error::{RenderError, RenderResult};

/// Backend handle of an uploaded texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// An uploaded texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Texture {
    /// Backend handle.
    pub id: TextureId,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// What a clear touches.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClearRequest {
    /// Color target value, if the color target is cleared.
    pub color: Option<[f32; 4]>,
    /// Depth value, if the depth target is cleared.
    pub depth: Option<f32>,
    /// Stencil value, if the stencil target is cleared.
    pub stencil: Option<u8>,
}

impl ClearRequest {
    /// Clears every target: color to `color`, depth to 1, stencil to 0.
    #[must_use]
    pub const fn all(color: [f32; 4]) -> Self {
        Self {
            color: Some(color),
            depth: Some(1.0),
            stencil: Some(0),
        }
    }

    /// Clears depth and stencil, keeping color.
    #[must_use]
    pub const fn depth_stencil() -> Self {
        Self {
            color: None,
            depth: Some(1.0),
            stencil: Some(0),
        }
    }
}

/// Maps a fixed virtual resolution onto the real target, letterboxed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    /// Virtual width.
    pub virtual_width: u32,
    /// Virtual height.
    pub virtual_height: u32,
    /// Uniform scale from virtual to target pixels.
    pub scale: f32,
    /// Horizontal letterbox offset in target pixels.
    pub offset_x: f32,
    /// Vertical letterbox offset in target pixels.
    pub offset_y: f32,
}

impl ViewTransform {
    /// Fits `virtual_size` into `target_size`, preserving aspect ratio.
    #[must_use]
    pub fn fit(virtual_size: (u32, u32), target_size: (u32, u32)) -> Self {
        let (vw, vh) = (virtual_size.0.max(1) as f32, virtual_size.1.max(1) as f32);
        let (tw, th) = (target_size.0 as f32, target_size.1 as f32);
        let scale = (tw / vw).min(th / vh);

        Self {
            virtual_width: virtual_size.0,
            virtual_height: virtual_size.1,
            scale,
            offset_x: (tw - vw * scale) / 2.0,
            offset_y: (th - vh * scale) / 2.0,
        }
    }

    /// Converts a virtual position to target pixels.
    #[inline]
    #[must_use]
    pub fn to_target(&self, position: (f32, f32)) -> (f32, f32) {
        (
            self.offset_x + position.0 * self.scale,
            self.offset_y + position.1 * self.scale,
        )
    }
}

/// One sprite in virtual coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteDraw {
    /// Texture to sample.
    pub texture: TextureId,
    /// Top-left corner in virtual pixels.
    pub position: (f32, f32),
    /// Size in virtual pixels.
    pub size: (f32, f32),
}

/// A rendering backend.
pub trait GraphicsDevice {
    /// Uploads RGBA8 pixels.
    ///
    /// # Errors
    ///
    /// `InvalidTexture` if `rgba` is not `width * height * 4` bytes.
    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> RenderResult<Texture>;

    /// Clears the current frame.
    fn clear(&mut self, request: ClearRequest);

    /// Draws a batch of sprites.
    ///
    /// # Errors
    ///
    /// `UnknownTexture` if a sprite names a texture the device never created.
    fn draw_sprites(&mut self, transform: &ViewTransform, sprites: &[SpriteDraw]) -> RenderResult<()>;

    /// Finishes the frame.
    ///
    /// # Errors
    ///
    /// Backend specific.
    fn present(&mut self) -> RenderResult<()>;

    /// Target size in pixels.
    fn size(&self) -> (u32, u32);
}

/// A command recorded by `HeadlessDevice`.
#[derive(Clone, Debug, PartialEq)]
pub enum DeviceCommand {
    /// A texture upload.
    CreateTexture(Texture),
    /// A clear.
    Clear(ClearRequest),
    /// A sprite batch.
    DrawSprites {
        /// Transform in effect.
        transform: ViewTransform,
        /// Sprites drawn.
        sprites: Vec<SpriteDraw>,
    },
    /// End of frame.
    Present,
}

/// Records commands instead of drawing.
#[derive(Debug)]
pub struct HeadlessDevice {
    size: (u32, u32),
    next_texture: u32,
    textures: HashMap<TextureId, Texture>,
    commands: Vec<DeviceCommand>,
    frames_presented: u64,
    record: bool,
}

impl HeadlessDevice {
    /// Creates a device with a `width` x `height` target that records commands.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            next_texture: 1,
            textures: HashMap::new(),
            commands: Vec::new(),
            frames_presented: 0,
            record: true,
        }
    }

    /// Stops recording commands. Validation and counters keep working.
    #[must_use]
    pub fn without_recording(mut self) -> Self {
        self.record = false;
        self
    }

    /// Commands recorded so far.
    #[must_use]
    pub fn commands(&self) -> &[DeviceCommand] {
        &self.commands
    }

    /// Takes the recorded commands, leaving the log empty.
    pub fn take_commands(&mut self) -> Vec<DeviceCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Frames presented.
    #[must_use]
    pub const fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Textures alive on the device.
    #[must_use]
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    fn push(&mut self, command: DeviceCommand) {
        if self.record {
            self.commands.push(command);
        }
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> RenderResult<Texture> {
        if width == 0 || height == 0 || rgba.len() != (width as usize) * (height as usize) * 4 {
            return Err(RenderError::InvalidTexture {
                width,
                height,
                bytes: rgba.len(),
            });
        }

        let texture = Texture {
            id: TextureId(self.next_texture),
            width,
            height,
        };
        self.next_texture += 1;
        self.textures.insert(texture.id, texture);
        self.push(DeviceCommand::CreateTexture(texture));
        trace!(id = texture.id.0, width, height, "texture created");
        Ok(texture)
    }

    fn clear(&mut self, request: ClearRequest) {
        self.push(DeviceCommand::Clear(request));
    }

    fn draw_sprites(&mut self, transform: &ViewTransform, sprites: &[SpriteDraw]) -> RenderResult<()> {
        if let Some(unknown) = sprites.iter().find(|s| !self.textures.contains_key(&s.texture)) {
            return Err(RenderError::UnknownTexture(unknown.texture));
        }
        self.push(DeviceCommand::DrawSprites {
            transform: *transform,
            sprites: sprites.to_vec(),
        });
        Ok(())
    }

    fn present(&mut self) -> RenderResult<()> {
        self.frames_presented += 1;
        self.push(DeviceCommand::Present);
        Ok(())
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_same_aspect() {
        let t = ViewTransform::fit((1280, 720), (1920, 1080));
        assert!((t.scale - 1.5).abs() < f32::EPSILON);
        assert_eq!(t.to_target((0.0, 0.0)), (0.0, 0.0));
    }

    #[test]
    fn test_fit_letterbox() {
        let t = ViewTransform::fit((1280, 720), (1280, 1024));
        assert!((t.scale - 1.0).abs() < f32::EPSILON);
        assert!((t.offset_y - 152.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_texture_size_checked() {
        let mut device = HeadlessDevice::new(640, 480);
        assert!(device.create_texture(2, 2, &[0; 16]).is_ok());
        assert_eq!(
            device.create_texture(2, 2, &[0; 15]),
            Err(RenderError::InvalidTexture {
                width: 2,
                height: 2,
                bytes: 15
            })
        );
    }

    #[test]
    fn test_unknown_texture_rejected() {
        let mut device = HeadlessDevice::new(640, 480);
        let transform = ViewTransform::fit((640, 480), device.size());
        let sprite = SpriteDraw {
            texture: TextureId(42),
            position: (0.0, 0.0),
            size: (1.0, 1.0),
        };
        assert_eq!(
            device.draw_sprites(&transform, &[sprite]),
            Err(RenderError::UnknownTexture(TextureId(42)))
        );
    }
}

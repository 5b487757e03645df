//! Render error types.

use thiserror::Error;

use crate::device::TextureId;

/// Errors raised by the compositor, sprite batches and devices.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// `draw` or `end` without `begin`.
    #[error("sprite batch used before begin")]
    BatchNotBegun,

    /// `begin` twice without `end`.
    #[error("sprite batch already begun")]
    BatchAlreadyBegun,

    /// Texture data does not match its dimensions.
    #[error("invalid texture {width}x{height} with {bytes} bytes")]
    InvalidTexture {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
        /// Bytes supplied.
        bytes: usize,
    },

    /// The device does not know this texture.
    #[error("unknown texture {0:?}")]
    UnknownTexture(TextureId),

    /// Two stages with one name.
    #[error("render stage '{0}' already installed")]
    DuplicateStage(String),

    /// A backend failure.
    #[error("graphics device error: {0}")]
    Device(String),
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

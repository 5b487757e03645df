//! # Britannia Rendering
//!
//! The render half of the frame loop.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      COMPOSITOR                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  stage 0: "clear-frame"    clear color, depth, stencil      │
//! │  stage 1: "delegate-draw"  RenderPipeline::render_quad      │
//! │                             ├── clear depth/stencil         │
//! │                             └── SpriteBatch: tile at (0,0)  │
//! │  ...                                                        │
//! │  present                                                    │
//! └─────────────────────────────────────────────────────────────┘
//!                         │
//!                         ▼
//!                  dyn GraphicsDevice
//!          (HeadlessDevice here, GPU backends elsewhere)
//! ```

#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod device;
pub mod error;
pub mod graph;
pub mod pipeline;
pub mod sprite_batch;
pub mod textures;

pub use device::{
    ClearRequest, DeviceCommand, GraphicsDevice, HeadlessDevice, SpriteDraw, Texture, TextureId,
    ViewTransform,
};
pub use error::{RenderError, RenderResult};
pub use graph::{ClearFrameStage, Compositor, DelegateStage, FrameReport, RenderContext, RenderStage};
pub use pipeline::{RenderPipeline, CLEAR_STAGE, DELEGATE_STAGE};
pub use sprite_batch::SpriteBatch;
pub use textures::TextureCache;

/// Virtual resolution width the scene is authored for.
pub const VIRTUAL_WIDTH: u32 = 1280;

/// Virtual resolution height the scene is authored for.
pub const VIRTUAL_HEIGHT: u32 = 720;

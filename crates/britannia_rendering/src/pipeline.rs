//! # Scene Pipeline
//!
//! Installs the two stages the client needs into a compositor: a full
//! clear, then a delegate that draws the scene.
//!
//! ```text
//! "clear-frame"    color + depth + stencil
//! "delegate-draw"  render_quad():
//!                    clear depth + stencil
//!                    if a tile is set:
//!                      batch.begin(1280x720 -> target)
//!                      batch.draw(tile, (0, 0))
//!                      batch.end()
//! ```
//!
//! The pipeline and its installed delegate share state, so `set_tile` on
//! the pipeline is seen by the next frame.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::device::{ClearRequest, Texture, ViewTransform};
use crate::graph::{ClearFrameStage, Compositor, DelegateStage, RenderContext};
use crate::error::RenderResult;
use crate::sprite_batch::SpriteBatch;
use crate::{VIRTUAL_HEIGHT, VIRTUAL_WIDTH};

/// Name of the full-clear stage.
pub const CLEAR_STAGE: &str = "clear-frame";

/// Name of the scene delegate stage.
pub const DELEGATE_STAGE: &str = "delegate-draw";

/// Background color of a cleared frame.
const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

#[derive(Debug)]
struct SceneState {
    tile: Option<Texture>,
    batch: SpriteBatch,
    virtual_size: (u32, u32),
    quads: u64,
}

/// Draws the scene tile through a sprite batch.
#[derive(Clone, Debug)]
pub struct RenderPipeline {
    state: Arc<Mutex<SceneState>>,
}

impl RenderPipeline {
    /// Creates a pipeline with the default 1280x720 virtual resolution.
    #[must_use]
    pub fn new() -> Self {
        Self::with_virtual_size(VIRTUAL_WIDTH, VIRTUAL_HEIGHT)
    }

    /// Creates a pipeline with a custom virtual resolution.
    #[must_use]
    pub fn with_virtual_size(width: u32, height: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(SceneState {
                tile: None,
                batch: SpriteBatch::new(),
                virtual_size: (width, height),
                quads: 0,
            })),
        }
    }

    /// Adds the clear and delegate stages to `compositor`.
    ///
    /// # Errors
    ///
    /// `DuplicateStage` if either stage name is already taken.
    pub fn install(&self, compositor: &mut Compositor) -> RenderResult<()> {
        compositor.add_stage(Box::new(ClearFrameStage::new(CLEAR_STAGE, CLEAR_COLOR)))?;

        let pipeline = self.clone();
        compositor.add_stage(Box::new(DelegateStage::new(DELEGATE_STAGE, move |ctx| {
            pipeline.render_quad(ctx)
        })))?;

        debug!(stages = ?compositor.stage_names(), "render pipeline installed");
        Ok(())
    }

    /// Selects the texture the delegate draws. `None` draws nothing.
    pub fn set_tile(&self, tile: Option<Texture>) {
        self.state.lock().tile = tile;
    }

    /// The texture the delegate draws.
    #[must_use]
    pub fn tile(&self) -> Option<Texture> {
        self.state.lock().tile
    }

    /// Quads drawn since creation.
    #[must_use]
    pub fn quads_drawn(&self) -> u64 {
        self.state.lock().quads
    }

    /// One delegate invocation: clear depth and stencil, then draw the tile
    /// at the origin.
    ///
    /// # Errors
    ///
    /// Batch or device errors.
    pub fn render_quad(&self, ctx: &mut RenderContext<'_>) -> RenderResult<()> {
        ctx.device.clear(ClearRequest::depth_stencil());

        let mut state = self.state.lock();
        let Some(tile) = state.tile else {
            return Ok(());
        };

        let transform = ViewTransform::fit(state.virtual_size, ctx.device.size());
        state.batch.begin(transform)?;
        state.batch.draw(&tile, (0.0, 0.0))?;
        let drawn = state.batch.end(&mut *ctx.device)?;
        state.quads += drawn as u64;
        Ok(())
    }
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceCommand, GraphicsDevice, HeadlessDevice};

    #[test]
    fn test_install_adds_named_stages() {
        let mut compositor = Compositor::new();
        RenderPipeline::new().install(&mut compositor).unwrap();
        assert_eq!(compositor.stage_names(), vec![CLEAR_STAGE, DELEGATE_STAGE]);
    }

    #[test]
    fn test_no_tile_only_clears() {
        let mut compositor = Compositor::new();
        let pipeline = RenderPipeline::new();
        pipeline.install(&mut compositor).unwrap();

        let mut device = HeadlessDevice::new(1280, 720);
        compositor.execute_frame(&mut device).unwrap();

        assert_eq!(
            device.commands(),
            &[
                DeviceCommand::Clear(ClearRequest::all(CLEAR_COLOR)),
                DeviceCommand::Clear(ClearRequest::depth_stencil()),
                DeviceCommand::Present,
            ]
        );
        assert_eq!(pipeline.quads_drawn(), 0);
    }

    #[test]
    fn test_tile_drawn_at_origin() {
        let mut compositor = Compositor::new();
        let pipeline = RenderPipeline::new();
        pipeline.install(&mut compositor).unwrap();

        let mut device = HeadlessDevice::new(1920, 1080);
        let tile = device.create_texture(44, 44, &[0; 44 * 44 * 4]).unwrap();
        pipeline.set_tile(Some(tile));
        device.take_commands();

        compositor.execute_frame(&mut device).unwrap();

        let draws: Vec<_> = device
            .commands()
            .iter()
            .filter_map(|c| match c {
                DeviceCommand::DrawSprites { transform, sprites } => Some((*transform, sprites.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(draws.len(), 1);
        let (transform, sprites) = &draws[0];
        assert_eq!((transform.virtual_width, transform.virtual_height), (1280, 720));
        assert_eq!(sprites[0].position, (0.0, 0.0));
        assert_eq!(sprites[0].texture, tile.id);
        assert_eq!(pipeline.quads_drawn(), 1);
    }
}

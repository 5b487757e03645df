//! # Compositor
//!
//! An ordered list of named render stages. Each frame every stage runs in
//! insertion order against the device, then the frame is presented.

use std::fmt;

use tracing::trace;

use crate::device::{ClearRequest, GraphicsDevice};
use crate::error::{RenderError, RenderResult};

/// What a stage sees while it runs.
pub struct RenderContext<'a> {
    /// The device to draw with.
    pub device: &'a mut dyn GraphicsDevice,
    /// Frame number.
    pub frame: u64,
}

/// One step of a frame.
pub trait RenderStage {
    /// Unique name inside a compositor.
    fn name(&self) -> &str;

    /// Runs the stage.
    ///
    /// # Errors
    ///
    /// Any render error; the frame is abandoned.
    fn execute(&mut self, ctx: &mut RenderContext<'_>) -> RenderResult<()>;
}

/// Clears the whole frame.
#[derive(Clone, Copy, Debug)]
pub struct ClearFrameStage {
    name: &'static str,
    color: [f32; 4],
}

impl ClearFrameStage {
    /// Creates a stage named `name` that clears to `color`.
    #[must_use]
    pub const fn new(name: &'static str, color: [f32; 4]) -> Self {
        Self { name, color }
    }
}

impl RenderStage for ClearFrameStage {
    fn name(&self) -> &str {
        self.name
    }

    fn execute(&mut self, ctx: &mut RenderContext<'_>) -> RenderResult<()> {
        ctx.device.clear(ClearRequest::all(self.color));
        Ok(())
    }
}

/// Runs a closure as a stage.
pub struct DelegateStage<F> {
    name: &'static str,
    delegate: F,
}

impl<F> DelegateStage<F>
where
    F: FnMut(&mut RenderContext<'_>) -> RenderResult<()>,
{
    /// Creates a stage named `name` that calls `delegate`.
    #[must_use]
    pub const fn new(name: &'static str, delegate: F) -> Self {
        Self { name, delegate }
    }
}

impl<F> RenderStage for DelegateStage<F>
where
    F: FnMut(&mut RenderContext<'_>) -> RenderResult<()>,
{
    fn name(&self) -> &str {
        self.name
    }

    fn execute(&mut self, ctx: &mut RenderContext<'_>) -> RenderResult<()> {
        (self.delegate)(ctx)
    }
}

/// What one frame did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Frame number.
    pub frame: u64,
    /// Stages executed.
    pub stages: usize,
}

/// Ordered render stages.
#[derive(Default)]
pub struct Compositor {
    stages: Vec<Box<dyn RenderStage>>,
    frames: u64,
}

impl Compositor {
    /// Creates an empty compositor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage.
    ///
    /// # Errors
    ///
    /// `DuplicateStage` if a stage with the same name is installed.
    pub fn add_stage(&mut self, stage: Box<dyn RenderStage>) -> RenderResult<()> {
        if self.stages.iter().any(|s| s.name() == stage.name()) {
            return Err(RenderError::DuplicateStage(stage.name().to_string()));
        }
        self.stages.push(stage);
        Ok(())
    }

    /// Stage names in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Number of installed stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true if no stage is installed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Runs every stage in order and presents.
    ///
    /// # Errors
    ///
    /// The first stage error; later stages do not run and nothing is presented.
    pub fn execute_frame(&mut self, device: &mut dyn GraphicsDevice) -> RenderResult<FrameReport> {
        let frame = self.frames;
        self.frames += 1;

        let mut ctx = RenderContext { device, frame };
        for stage in &mut self.stages {
            trace!(frame, stage = stage.name(), "stage");
            stage.execute(&mut ctx)?;
        }
        ctx.device.present()?;

        Ok(FrameReport {
            frame,
            stages: self.stages.len(),
        })
    }
}

impl fmt::Debug for Compositor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compositor")
            .field("stages", &self.stage_names())
            .field("frames", &self.frames)
            .finish()
    }
}

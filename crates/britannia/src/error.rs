//! # Client Error Types
//!
//! Scheduler state errors and everything that can stop bootstrap.

use britannia_core::CoreError;
use britannia_rendering::RenderError;
use thiserror::Error;

use crate::scheduler::SchedulerState;

/// Errors raised by the frame scheduler.
#[derive(Error, Debug, PartialEq)]
pub enum SchedulerError {
    /// The requested transition is not part of the lifecycle.
    #[error("invalid transition from {from:?} to {to:?}")]
    InvalidTransition {
        /// Current state.
        from: SchedulerState,
        /// Requested state.
        to: SchedulerState,
    },

    /// `tick` was called outside `Running`.
    #[error("scheduler is not running (state: {0:?})")]
    NotRunning(SchedulerState),

    /// The render pass failed.
    #[error("render pass failed: {0}")]
    Render(#[from] RenderError),
}

/// Errors that abort bootstrap.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Settings could not be read or the install could not be resolved.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The render pipeline could not be installed or the tile uploaded.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The scheduler refused a lifecycle step.
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

impl ClientError {
    /// Returns true if no game data could be located.
    #[must_use]
    pub fn is_install_missing(&self) -> bool {
        matches!(self, Self::Core(e) if e.is_fatal())
    }
}

/// Result type for bootstrap and client operations.
pub type ClientResult<T> = Result<T, ClientError>;

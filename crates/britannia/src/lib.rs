//! # Britannia
//!
//! The client runtime: a bootstrap that turns settings and an install
//! directory into live asset factories, and a frame scheduler that drives
//! the engine, the network and the renderer in a fixed order.
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized ──begin_bootstrap──> Bootstrapping ──finish_bootstrap──> Running
//!                                         │                                │
//!                                  fail_bootstrap                    stop / StopHandle
//!                                         ▼                                ▼
//!                                      Failed                           Stopped
//! ```
//!
//! ## Frame
//!
//! ```text
//! tick(delta)
//!   1. EngineState::advance      (clamped delta)
//!   2. NetworkClient::slice      (exactly once)
//!   3. Compositor::execute_frame (clear-frame, delegate-draw, present)
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use britannia::{Capabilities, GameClient, IdleEngine};
//!
//! let mut client = GameClient::new(IdleEngine, network, device);
//! client.bootstrap(Capabilities::new(prompt, store))?;
//! client.run(&mut SystemClock::new(), Some(600))?;
//! ```

#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod bootstrap;
pub mod error;
pub mod prompt;
pub mod scheduler;

pub use bootstrap::{Capabilities, GameClient};
pub use error::{ClientError, ClientResult, SchedulerError};
pub use prompt::ConsolePrompt;
pub use scheduler::{
    Clock, EngineState, FixedClock, FrameScheduler, FrameStats, FrameStatsAccumulator,
    FrameTick, IdleEngine, SchedulerConfig, SchedulerState, StopHandle, SystemClock,
};

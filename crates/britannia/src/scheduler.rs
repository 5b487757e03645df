//! # Frame Scheduler
//!
//! One tick, in this order and no other:
//! ```text
//! Frame N:
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. ENGINE ADVANCE                                                   │
//! │    └─ EngineState::advance(frame, clamped delta)                    │
//! │                                                                     │
//! │ 2. NETWORK SLICE (exactly one, never skipped)                       │
//! │    └─ NetworkClient::slice: bounded, non-blocking                   │
//! │                                                                     │
//! │ 3. RENDER PASS                                                      │
//! │    ├─ every compositor stage in insertion order                     │
//! │    └─ present                                                       │
//! │                                                                     │
//! │ 4. RECORD                                                           │
//! │    └─ FrameStats into the accumulator, slow frames logged           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ticks only run in `Running`. Bootstrap moves the scheduler there; a
//! `StopHandle` (any thread) or `stop()` moves it to `Stopped`.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use britannia_core::FrameSettings;
use britannia_networking::NetworkClient;
use britannia_rendering::{Compositor, GraphicsDevice};
use tracing::{debug, info, trace, warn};

use crate::error::SchedulerError;

/// Target frame time for 60 FPS.
pub const TARGET_FRAME_TIME: Duration = Duration::from_micros(16_666);

/// Lifecycle of the scheduler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SchedulerState {
    /// Created, nothing resolved yet.
    #[default]
    Uninitialized,
    /// Install resolution and asset setup in progress.
    Bootstrapping,
    /// Ticking.
    Running,
    /// Stopped after running. Terminal.
    Stopped,
    /// Bootstrap failed. Terminal.
    Failed,
}

impl SchedulerState {
    /// Returns true for states nothing leaves.
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Failed)
    }
}

/// What the engine sees each frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameTick {
    /// Frame number, starting at 0.
    pub frame: u64,
    /// Time since the previous frame, clamped.
    pub delta: Duration,
}

/// Game state advanced once per frame, before the network slice.
pub trait EngineState {
    /// Advances the state by one frame.
    fn advance(&mut self, tick: FrameTick);
}

impl<T: EngineState + ?Sized> EngineState for Box<T> {
    fn advance(&mut self, tick: FrameTick) {
        (**self).advance(tick);
    }
}

/// Engine with no game state. Counts frames and simulated time.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdleEngine {
    frames: u64,
    elapsed: Duration,
}

impl IdleEngine {
    /// Creates an idle engine.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            frames: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Frames advanced.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Sum of the deltas seen.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl EngineState for IdleEngine {
    fn advance(&mut self, tick: FrameTick) {
        self.frames += 1;
        self.elapsed += tick.delta;
    }
}

/// Source of frame deltas for `FrameScheduler::run`.
pub trait Clock {
    /// Time since the previous call (or since creation on the first call).
    fn delta(&mut self) -> Duration;
}

/// Wall clock.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    last: Instant,
}

impl SystemClock {
    /// Starts measuring from now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn delta(&mut self) -> Duration {
        let now = Instant::now();
        let delta = now.duration_since(self.last);
        self.last = now;
        delta
    }
}

/// A clock that always reports the same delta.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClock {
    step: Duration,
}

impl FixedClock {
    /// Creates a clock reporting `step` every frame.
    #[must_use]
    pub const fn new(step: Duration) -> Self {
        Self { step }
    }
}

impl Clock for FixedClock {
    fn delta(&mut self) -> Duration {
        self.step
    }
}

/// Requests a stop from any thread. The scheduler honours it before the
/// next tick.
#[derive(Clone, Debug, Default)]
pub struct StopHandle {
    requested: Arc<AtomicBool>,
}

impl StopHandle {
    /// Requests a stop.
    pub fn stop(&self) {
        self.requested.store(true, Ordering::Release);
    }

    /// Returns true once a stop was requested.
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}

/// Scheduler tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Deltas above this are clamped.
    pub max_delta: Duration,
    /// Frames slower than this are logged.
    pub slow_frame: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_delta: Duration::from_millis(100),
            slow_frame: Duration::from_millis(33),
        }
    }
}

impl From<&FrameSettings> for SchedulerConfig {
    fn from(settings: &FrameSettings) -> Self {
        Self {
            max_delta: Duration::from_millis(settings.max_delta_ms),
            slow_frame: Duration::from_millis(settings.slow_frame_ms),
        }
    }
}

/// Frame timing statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frame number.
    pub frame: u64,
    /// Delta handed to the engine, after clamping.
    pub delta: Duration,
    /// Total frame time in microseconds.
    pub total_us: u64,
    /// Engine advance time in microseconds.
    pub engine_us: u64,
    /// Network slice time in microseconds.
    pub network_us: u64,
    /// Render pass time in microseconds.
    pub render_us: u64,
    /// Packets processed by the slice.
    pub packets: usize,
    /// Packets left queued after the slice.
    pub backlog: usize,
    /// Render stages executed.
    pub stages: usize,
}

/// Drives the engine, the network and the renderer.
pub struct FrameScheduler<E, N, D> {
    engine: E,
    network: N,
    device: D,
    compositor: Compositor,
    state: SchedulerState,
    config: SchedulerConfig,
    frame: u64,
    stop: StopHandle,
    stats: FrameStatsAccumulator,
}

impl<E, N, D> FrameScheduler<E, N, D>
where
    E: EngineState,
    N: NetworkClient,
    D: GraphicsDevice,
{
    /// Creates an `Uninitialized` scheduler with an empty compositor.
    #[must_use]
    pub fn new(engine: E, network: N, device: D, config: SchedulerConfig) -> Self {
        Self {
            engine,
            network,
            device,
            compositor: Compositor::new(),
            state: SchedulerState::Uninitialized,
            config,
            frame: 0,
            stop: StopHandle::default(),
            stats: FrameStatsAccumulator::new(),
        }
    }

    /// Current lifecycle state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> SchedulerState {
        self.state
    }

    /// Frames ticked.
    #[inline]
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame
    }

    /// A handle that stops the scheduler from any thread.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Accumulated frame statistics.
    #[must_use]
    pub const fn stats(&self) -> &FrameStatsAccumulator {
        &self.stats
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> SchedulerConfig {
        self.config
    }

    /// Replaces the configuration. Takes effect on the next tick.
    pub fn set_config(&mut self, config: SchedulerConfig) {
        self.config = config;
    }

    /// The engine.
    #[must_use]
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// The engine, mutably.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// The network client.
    #[must_use]
    pub const fn network(&self) -> &N {
        &self.network
    }

    /// The network client, mutably.
    pub fn network_mut(&mut self) -> &mut N {
        &mut self.network
    }

    /// The graphics device.
    #[must_use]
    pub const fn device(&self) -> &D {
        &self.device
    }

    /// The graphics device, mutably.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// The compositor, for stage installation.
    pub fn compositor_mut(&mut self) -> &mut Compositor {
        &mut self.compositor
    }

    /// Uninitialized -> Bootstrapping.
    pub fn begin_bootstrap(&mut self) -> Result<(), SchedulerError> {
        self.transition(SchedulerState::Uninitialized, SchedulerState::Bootstrapping)
    }

    /// Bootstrapping -> Running.
    pub fn finish_bootstrap(&mut self) -> Result<(), SchedulerError> {
        self.transition(SchedulerState::Bootstrapping, SchedulerState::Running)
    }

    /// Bootstrapping -> Failed.
    pub fn fail_bootstrap(&mut self) -> Result<(), SchedulerError> {
        self.transition(SchedulerState::Bootstrapping, SchedulerState::Failed)
    }

    /// Running -> Stopped.
    pub fn stop(&mut self) -> Result<(), SchedulerError> {
        self.transition(SchedulerState::Running, SchedulerState::Stopped)?;
        self.stop.stop();
        Ok(())
    }

    fn transition(
        &mut self,
        expected: SchedulerState,
        to: SchedulerState,
    ) -> Result<(), SchedulerError> {
        if self.state != expected {
            return Err(SchedulerError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        info!(from = ?self.state, to = ?to, "scheduler state changed");
        self.state = to;
        Ok(())
    }

    /// Moves a running scheduler to `Stopped` if a stop was requested.
    fn honour_stop_request(&mut self) {
        if self.state == SchedulerState::Running && self.stop.is_requested() {
            info!(frames = self.frame, "stop requested");
            self.state = SchedulerState::Stopped;
        }
    }

    /// Runs one frame.
    ///
    /// # Errors
    ///
    /// `NotRunning` outside `Running` (including after a stop request), or
    /// the render pass error. A failed render pass still counts as a frame
    /// and leaves the scheduler running.
    pub fn tick(&mut self, delta: Duration) -> Result<FrameStats, SchedulerError> {
        self.honour_stop_request();
        if self.state != SchedulerState::Running {
            return Err(SchedulerError::NotRunning(self.state));
        }

        let frame = self.frame;
        let delta = delta.min(self.config.max_delta);
        let frame_start = Instant::now();

        self.engine.advance(FrameTick { frame, delta });
        let engine_done = Instant::now();

        let slice = self.network.slice();
        let network_done = Instant::now();
        self.frame += 1;

        let report = self.compositor.execute_frame(&mut self.device)?;
        let render_done = Instant::now();

        let stats = FrameStats {
            frame,
            delta,
            total_us: micros(render_done - frame_start),
            engine_us: micros(engine_done - frame_start),
            network_us: micros(network_done - engine_done),
            render_us: micros(render_done - network_done),
            packets: slice.processed,
            backlog: slice.backlog,
            stages: report.stages,
        };
        self.stats.record(stats);

        if render_done - frame_start > self.config.slow_frame {
            warn!(
                frame,
                total_ms = stats.total_us as f64 / 1000.0,
                engine_us = stats.engine_us,
                network_us = stats.network_us,
                render_us = stats.render_us,
                "slow frame"
            );
        }
        trace!(frame, packets = slice.processed, backlog = slice.backlog, "frame done");

        Ok(stats)
    }

    /// Ticks until stopped or until `frame_limit` frames ran.
    ///
    /// Returns the number of frames run by this call.
    ///
    /// # Errors
    ///
    /// `NotRunning` if called outside `Running`; any tick error ends the loop.
    pub fn run(
        &mut self,
        clock: &mut dyn Clock,
        frame_limit: Option<u64>,
    ) -> Result<u64, SchedulerError> {
        self.honour_stop_request();
        if self.state != SchedulerState::Running {
            return Err(SchedulerError::NotRunning(self.state));
        }

        let mut ran = 0;
        while frame_limit.map_or(true, |limit| ran < limit) {
            let delta = clock.delta();
            match self.tick(delta) {
                Ok(_) => ran += 1,
                Err(SchedulerError::NotRunning(SchedulerState::Stopped)) => break,
                Err(e) => return Err(e),
            }
        }

        debug!(ran, state = ?self.state, "run loop exited");
        Ok(ran)
    }
}

impl<E, N, D> fmt::Debug for FrameScheduler<E, N, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("state", &self.state)
            .field("frame", &self.frame)
            .field("config", &self.config)
            .field("compositor", &self.compositor)
            .finish_non_exhaustive()
    }
}

#[inline]
fn micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

/// Accumulator for frame statistics.
#[derive(Clone, Debug)]
pub struct FrameStatsAccumulator {
    /// Total frames recorded.
    pub frames_recorded: u64,
    /// Sum of total frame times.
    pub total_us_sum: u64,
    /// Sum of engine advance times.
    pub engine_us_sum: u64,
    /// Sum of network slice times.
    pub network_us_sum: u64,
    /// Sum of render times.
    pub render_us_sum: u64,
    /// Packets processed.
    pub packets_sum: u64,
    /// Min frame time.
    pub min_frame_us: u64,
    /// Max frame time.
    pub max_frame_us: u64,
    /// Frames that exceeded the 60 FPS budget.
    pub frames_over_budget: u64,
}

impl FrameStatsAccumulator {
    /// Creates a new accumulator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            frames_recorded: 0,
            total_us_sum: 0,
            engine_us_sum: 0,
            network_us_sum: 0,
            render_us_sum: 0,
            packets_sum: 0,
            min_frame_us: u64::MAX,
            max_frame_us: 0,
            frames_over_budget: 0,
        }
    }

    /// Records a frame's statistics.
    pub fn record(&mut self, stats: FrameStats) {
        self.frames_recorded += 1;
        self.total_us_sum += stats.total_us;
        self.engine_us_sum += stats.engine_us;
        self.network_us_sum += stats.network_us;
        self.render_us_sum += stats.render_us;
        self.packets_sum += stats.packets as u64;
        self.min_frame_us = self.min_frame_us.min(stats.total_us);
        self.max_frame_us = self.max_frame_us.max(stats.total_us);

        if stats.total_us > micros(TARGET_FRAME_TIME) {
            self.frames_over_budget += 1;
        }
    }

    /// Returns average frame time in milliseconds.
    #[must_use]
    pub fn avg_frame_ms(&self) -> f64 {
        self.avg_ms(self.total_us_sum)
    }

    /// Returns average FPS.
    #[must_use]
    pub fn avg_fps(&self) -> f64 {
        let avg_ms = self.avg_frame_ms();
        if avg_ms <= 0.0 {
            return 0.0;
        }
        1000.0 / avg_ms
    }

    /// Returns the fraction of frames over budget.
    #[must_use]
    pub fn over_budget_ratio(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        self.frames_over_budget as f64 / self.frames_recorded as f64
    }

    fn avg_ms(&self, sum_us: u64) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        (sum_us as f64 / self.frames_recorded as f64) / 1000.0
    }
}

impl Default for FrameStatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FrameStatsAccumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let min_us = if self.frames_recorded == 0 { 0 } else { self.min_frame_us };

        writeln!(f, "┌─ FRAME STATISTICS ─────────────────────────────────────────────┐")?;
        writeln!(f, "│ Frames Recorded:    {}", self.frames_recorded)?;
        writeln!(
            f,
            "│ Average Frame:      {:.3} ms ({:.1} FPS)",
            self.avg_frame_ms(),
            self.avg_fps()
        )?;
        writeln!(f, "│ Min Frame:          {:.3} ms", min_us as f64 / 1000.0)?;
        writeln!(f, "│ Max Frame:          {:.3} ms", self.max_frame_us as f64 / 1000.0)?;
        writeln!(
            f,
            "│ Over Budget:        {} frames ({:.1}%)",
            self.frames_over_budget,
            self.over_budget_ratio() * 100.0
        )?;
        writeln!(f, "├─ BREAKDOWN ────────────────────────────────────────────────────┤")?;
        writeln!(f, "│ Engine:             {:.3} ms", self.avg_ms(self.engine_us_sum))?;
        writeln!(f, "│ Network:            {:.3} ms", self.avg_ms(self.network_us_sum))?;
        writeln!(f, "│ Render:             {:.3} ms", self.avg_ms(self.render_us_sum))?;
        writeln!(f, "│ Packets:            {}", self.packets_sum)?;
        write!(f, "└────────────────────────────────────────────────────────────────┘")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use britannia_networking::OfflineNetworkClient;
    use britannia_rendering::{DelegateStage, HeadlessDevice, RenderError};

    type TestScheduler = FrameScheduler<IdleEngine, OfflineNetworkClient, HeadlessDevice>;

    fn scheduler() -> TestScheduler {
        FrameScheduler::new(
            IdleEngine::new(),
            OfflineNetworkClient::new(),
            HeadlessDevice::new(64, 64),
            SchedulerConfig::default(),
        )
    }

    fn running() -> TestScheduler {
        let mut s = scheduler();
        s.begin_bootstrap().unwrap();
        s.finish_bootstrap().unwrap();
        s
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut s = scheduler();
        assert_eq!(s.state(), SchedulerState::Uninitialized);

        assert_eq!(
            s.finish_bootstrap(),
            Err(SchedulerError::InvalidTransition {
                from: SchedulerState::Uninitialized,
                to: SchedulerState::Running,
            })
        );

        s.begin_bootstrap().unwrap();
        s.finish_bootstrap().unwrap();
        assert_eq!(s.state(), SchedulerState::Running);
        assert!(s.fail_bootstrap().is_err());

        s.stop().unwrap();
        assert_eq!(s.state(), SchedulerState::Stopped);
        assert!(s.state().is_terminal());
        assert!(s.stop().is_err());
    }

    #[test]
    fn test_failed_bootstrap_is_terminal() {
        let mut s = scheduler();
        s.begin_bootstrap().unwrap();
        s.fail_bootstrap().unwrap();

        assert_eq!(s.state(), SchedulerState::Failed);
        assert!(s.finish_bootstrap().is_err());
        assert_eq!(
            s.tick(Duration::from_millis(16)),
            Err(SchedulerError::NotRunning(SchedulerState::Failed))
        );
    }

    #[test]
    fn test_tick_requires_running() {
        let mut s = scheduler();
        assert_eq!(
            s.tick(Duration::ZERO),
            Err(SchedulerError::NotRunning(SchedulerState::Uninitialized))
        );
        assert_eq!(s.frame_count(), 0);
        assert_eq!(s.network().slices(), 0);
    }

    #[test]
    fn test_tick_slices_once_and_presents() {
        let mut s = running();

        for _ in 0..3 {
            s.tick(Duration::from_millis(16)).unwrap();
        }

        assert_eq!(s.frame_count(), 3);
        assert_eq!(s.network().slices(), 3);
        assert_eq!(s.engine().frames(), 3);
        assert_eq!(s.device().frames_presented(), 3);
        assert_eq!(s.stats().frames_recorded, 3);
    }

    #[test]
    fn test_delta_is_clamped() {
        let mut s = running();

        let stats = s.tick(Duration::from_secs(5)).unwrap();
        assert_eq!(stats.delta, Duration::from_millis(100));

        let stats = s.tick(Duration::from_millis(16)).unwrap();
        assert_eq!(stats.delta, Duration::from_millis(16));
        assert_eq!(s.engine().elapsed(), Duration::from_millis(116));
    }

    #[test]
    fn test_stop_handle_stops_before_next_tick() {
        let mut s = running();
        s.tick(Duration::ZERO).unwrap();

        let handle = s.stop_handle();
        std::thread::spawn(move || handle.stop()).join().unwrap();

        assert_eq!(
            s.tick(Duration::ZERO),
            Err(SchedulerError::NotRunning(SchedulerState::Stopped))
        );
        assert_eq!(s.state(), SchedulerState::Stopped);
        assert_eq!(s.network().slices(), 1);
    }

    #[test]
    fn test_run_honours_frame_limit() {
        let mut s = running();
        let mut clock = FixedClock::new(Duration::from_millis(10));

        assert_eq!(s.run(&mut clock, Some(5)).unwrap(), 5);
        assert_eq!(s.engine().elapsed(), Duration::from_millis(50));
        assert_eq!(s.state(), SchedulerState::Running);
    }

    #[test]
    fn test_run_without_limit_ends_on_stop_request() {
        struct StoppingClock {
            handle: StopHandle,
            calls: u64,
        }

        impl Clock for StoppingClock {
            fn delta(&mut self) -> Duration {
                self.calls += 1;
                if self.calls == 4 {
                    self.handle.stop();
                }
                Duration::from_millis(16)
            }
        }

        let mut s = running();
        let mut clock = StoppingClock {
            handle: s.stop_handle(),
            calls: 0,
        };

        // The fourth delta raises the stop, so only three frames run.
        assert_eq!(s.run(&mut clock, None).unwrap(), 3);
        assert_eq!(s.state(), SchedulerState::Stopped);
    }

    #[test]
    fn test_render_failure_keeps_running() {
        let mut s = running();
        s.compositor_mut()
            .add_stage(Box::new(DelegateStage::new("broken", |_| {
                Err(RenderError::Device(String::from("lost")))
            })))
            .unwrap();

        let err = s.tick(Duration::ZERO).unwrap_err();
        assert_eq!(err, SchedulerError::Render(RenderError::Device(String::from("lost"))));
        assert_eq!(s.state(), SchedulerState::Running);
        assert_eq!(s.frame_count(), 1);
        assert_eq!(s.network().slices(), 1);
    }

    #[test]
    fn test_accumulator_averages() {
        let mut acc = FrameStatsAccumulator::new();
        assert!(acc.avg_fps().abs() < f64::EPSILON);

        acc.record(FrameStats {
            total_us: 10_000,
            packets: 3,
            ..FrameStats::default()
        });
        acc.record(FrameStats {
            total_us: 20_000,
            packets: 1,
            ..FrameStats::default()
        });

        assert!((acc.avg_frame_ms() - 15.0).abs() < 1e-9);
        assert_eq!(acc.frames_over_budget, 1);
        assert!((acc.over_budget_ratio() - 0.5).abs() < 1e-9);
        assert_eq!(acc.packets_sum, 4);
        assert_eq!((acc.min_frame_us, acc.max_frame_us), (10_000, 20_000));
        assert!(acc.to_string().contains("Frames Recorded:    2"));
    }
}

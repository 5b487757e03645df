//! The per-tick order: engine, one network slice, render pass.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use britannia::{EngineState, FrameScheduler, FrameTick, SchedulerConfig, SchedulerState};
use britannia_networking::{ConnectionState, NetworkClient, SliceStats};
use britannia_rendering::{
    ClearRequest, GraphicsDevice, HeadlessDevice, RenderPipeline, RenderResult, SpriteDraw,
    Texture, ViewTransform,
};

type Log = Rc<RefCell<Vec<&'static str>>>;

struct LoggingEngine(Log);

impl EngineState for LoggingEngine {
    fn advance(&mut self, _tick: FrameTick) {
        self.0.borrow_mut().push("advance");
    }
}

struct LoggingNetwork(Log);

impl NetworkClient for LoggingNetwork {
    fn slice(&mut self) -> SliceStats {
        self.0.borrow_mut().push("slice");
        SliceStats::default()
    }

    fn state(&self) -> ConnectionState {
        ConnectionState::Offline
    }
}

struct LoggingDevice {
    log: Log,
    inner: HeadlessDevice,
}

impl GraphicsDevice for LoggingDevice {
    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> RenderResult<Texture> {
        self.inner.create_texture(width, height, rgba)
    }

    fn clear(&mut self, request: ClearRequest) {
        self.log.borrow_mut().push("clear");
        self.inner.clear(request);
    }

    fn draw_sprites(&mut self, transform: &ViewTransform, sprites: &[SpriteDraw]) -> RenderResult<()> {
        self.log.borrow_mut().push("draw");
        self.inner.draw_sprites(transform, sprites)
    }

    fn present(&mut self) -> RenderResult<()> {
        self.log.borrow_mut().push("present");
        self.inner.present()
    }

    fn size(&self) -> (u32, u32) {
        self.inner.size()
    }
}

fn scheduler(log: &Log) -> FrameScheduler<LoggingEngine, LoggingNetwork, LoggingDevice> {
    FrameScheduler::new(
        LoggingEngine(Rc::clone(log)),
        LoggingNetwork(Rc::clone(log)),
        LoggingDevice {
            log: Rc::clone(log),
            inner: HeadlessDevice::new(1280, 720),
        },
        SchedulerConfig::default(),
    )
}

#[test]
fn test_slice_runs_once_before_render_every_tick() {
    let log: Log = Rc::default();
    let mut s = scheduler(&log);

    let pipeline = RenderPipeline::new();
    pipeline.install(s.compositor_mut()).unwrap();
    let tile = s.device_mut().create_texture(44, 44, &[0; 44 * 44 * 4]).unwrap();
    pipeline.set_tile(Some(tile));

    s.begin_bootstrap().unwrap();
    s.finish_bootstrap().unwrap();
    assert!(log.borrow().is_empty());

    for _ in 0..3 {
        s.tick(Duration::from_millis(16)).unwrap();
    }

    let frame = ["advance", "slice", "clear", "clear", "draw", "present"];
    let expected: Vec<&str> = frame.iter().copied().cycle().take(frame.len() * 3).collect();
    assert_eq!(*log.borrow(), expected);
    assert_eq!(pipeline.quads_drawn(), 3);
}

#[test]
fn test_no_work_outside_running() {
    let log: Log = Rc::default();
    let mut s = scheduler(&log);

    assert!(s.tick(Duration::ZERO).is_err());
    s.begin_bootstrap().unwrap();
    assert!(s.tick(Duration::ZERO).is_err());
    s.fail_bootstrap().unwrap();
    assert!(s.tick(Duration::ZERO).is_err());

    assert_eq!(s.state(), SchedulerState::Failed);
    assert!(log.borrow().is_empty());
}

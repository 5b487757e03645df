//! # Bootstrap
//!
//! Turns explicit capabilities into a running client:
//!
//! ```text
//! begin_bootstrap
//!   ├─ SettingsStore::load          frame pacing, slice budget, display, assets
//!   ├─ InstallResolver::resolve     may block on the prompt, persists the answer
//!   ├─ AssetFactories::open         six lazy factories over the install
//!   ├─ preload                      ids listed in settings
//!   ├─ RenderPipeline::install      clear-frame + delegate-draw
//!   ├─ tile upload                  optional, missing art draws nothing
//!   └─ AssetStreamer::start         optional background decodes
//! finish_bootstrap                  (any error above: fail_bootstrap)
//! ```
//!
//! Nothing is looked up globally; the prompt, the settings store, the
//! engine, the network client and the device are all handed in.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use britannia_assets::{AssetFactories, AssetKey, AssetKind, AssetStreamer};
use britannia_core::{
    ClientSettings, InstallLocation, InstallPrompt, InstallResolver, SettingsStore,
};
use britannia_networking::{NetworkClient, NetworkConfig};
use britannia_rendering::{GraphicsDevice, RenderPipeline, TextureCache};
use tracing::{error, info, warn};

use crate::error::{ClientResult, SchedulerError};
use crate::scheduler::{
    Clock, EngineState, FrameScheduler, FrameStats, SchedulerConfig, SchedulerState, StopHandle,
};

/// What bootstrap needs from the host.
#[derive(Debug)]
pub struct Capabilities<P, S> {
    /// Asks the user for the install when the configured one is unusable.
    pub prompt: P,
    /// Durable settings.
    pub store: S,
    /// Install directory that overrides the stored one.
    pub data_directory: Option<PathBuf>,
}

impl<P: InstallPrompt, S: SettingsStore> Capabilities<P, S> {
    /// Capabilities using the stored install directory.
    pub fn new(prompt: P, store: S) -> Self {
        Self {
            prompt,
            store,
            data_directory: None,
        }
    }

    /// Prefers `directory` over the stored install directory.
    #[must_use]
    pub fn with_data_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.data_directory = Some(directory.into());
        self
    }
}

/// The client: a frame scheduler plus everything bootstrap produced.
pub struct GameClient<E, N, D> {
    scheduler: FrameScheduler<E, N, D>,
    pipeline: RenderPipeline,
    textures: TextureCache,
    settings: ClientSettings,
    install: Option<InstallLocation>,
    assets: Option<Arc<AssetFactories>>,
    streamer: Option<AssetStreamer>,
}

impl<E, N, D> GameClient<E, N, D>
where
    E: EngineState,
    N: NetworkClient,
    D: GraphicsDevice,
{
    /// Creates an `Uninitialized` client.
    #[must_use]
    pub fn new(engine: E, network: N, device: D) -> Self {
        Self {
            scheduler: FrameScheduler::new(engine, network, device, SchedulerConfig::default()),
            pipeline: RenderPipeline::new(),
            textures: TextureCache::new(),
            settings: ClientSettings::default(),
            install: None,
            assets: None,
            streamer: None,
        }
    }

    /// Runs bootstrap once.
    ///
    /// On success the client is `Running`. On failure it is `Failed` and
    /// stays there; the error says why.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` if bootstrap already ran. Settings, install and
    /// pipeline errors fail bootstrap.
    pub fn bootstrap<P, S>(&mut self, capabilities: Capabilities<P, S>) -> ClientResult<()>
    where
        P: InstallPrompt,
        S: SettingsStore,
    {
        self.scheduler.begin_bootstrap()?;

        match self.prepare(capabilities) {
            Ok(()) => {
                self.scheduler.finish_bootstrap()?;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "bootstrap failed");
                self.scheduler.fail_bootstrap()?;
                Err(e)
            }
        }
    }

    fn prepare<P, S>(&mut self, capabilities: Capabilities<P, S>) -> ClientResult<()>
    where
        P: InstallPrompt,
        S: SettingsStore,
    {
        let Capabilities {
            prompt,
            store,
            data_directory,
        } = capabilities;

        let settings = store.load()?;
        self.scheduler.set_config(SchedulerConfig::from(&settings.frame));
        self.scheduler
            .network_mut()
            .configure(&NetworkConfig::from(&settings.network));

        let preferred = data_directory.or_else(|| settings.ultima_online.data_directory.clone());
        let install = InstallResolver::new(prompt, &store).resolve(preferred.as_deref())?;

        let assets = Arc::new(AssetFactories::open(&install));
        let report = assets.preload(&settings.assets);
        if report.is_complete() {
            info!(loaded = report.loaded, "preload complete");
        } else {
            warn!(
                requested = report.requested,
                loaded = report.loaded,
                failed = report.failed.len(),
                "preload incomplete"
            );
        }

        self.pipeline = RenderPipeline::with_virtual_size(
            settings.display.virtual_width,
            settings.display.virtual_height,
        );
        self.pipeline.install(self.scheduler.compositor_mut())?;
        self.assets = Some(Arc::clone(&assets));

        if let Some(id) = settings.assets.tile_artwork {
            self.show_tile(id)?;
        }

        if settings.assets.streaming_workers > 0 {
            self.streamer = Some(AssetStreamer::start(assets, settings.assets.streaming_workers));
        }

        self.install = Some(install);
        self.settings = settings;
        Ok(())
    }

    /// Draws artwork `id` as the scene tile from the next frame on.
    ///
    /// Returns false, and draws nothing, if the artwork cannot be resolved.
    ///
    /// # Errors
    ///
    /// The device's upload error.
    pub fn show_tile(&mut self, id: u32) -> ClientResult<bool> {
        let Some(assets) = &self.assets else {
            warn!(id, "no install yet, tile ignored");
            return Ok(false);
        };

        match assets.artwork.resolve(id) {
            Ok(bitmap) => {
                let key = AssetKey::new(AssetKind::Artwork, id);
                let texture =
                    self.textures
                        .get_or_upload(key, &bitmap, self.scheduler.device_mut())?;
                self.pipeline.set_tile(Some(texture));
                info!(id, width = texture.width, height = texture.height, "scene tile set");
                Ok(true)
            }
            Err(e) => {
                warn!(id, error = %e, "scene tile unavailable, drawing nothing");
                self.pipeline.set_tile(None);
                Ok(false)
            }
        }
    }

    /// Queues `key` for a background decode.
    ///
    /// Returns false if streaming is disabled or the key needs no work.
    pub fn request_asset(&self, key: AssetKey) -> bool {
        self.streamer
            .as_ref()
            .is_some_and(|streamer| streamer.request(key))
    }

    /// Runs one frame.
    ///
    /// # Errors
    ///
    /// See `FrameScheduler::tick`.
    pub fn tick(&mut self, delta: Duration) -> Result<FrameStats, SchedulerError> {
        self.scheduler.tick(delta)
    }

    /// Ticks until stopped or `frame_limit` frames ran.
    ///
    /// # Errors
    ///
    /// See `FrameScheduler::run`.
    pub fn run(
        &mut self,
        clock: &mut dyn Clock,
        frame_limit: Option<u64>,
    ) -> Result<u64, SchedulerError> {
        self.scheduler.run(clock, frame_limit)
    }

    /// Stops ticking and the background decoders.
    pub fn shutdown(&mut self) {
        if self.scheduler.state() == SchedulerState::Running {
            if let Err(e) = self.scheduler.stop() {
                warn!(error = %e, "scheduler did not stop cleanly");
            }
        }
        if let Some(mut streamer) = self.streamer.take() {
            streamer.shutdown();
        }
    }

    /// Current lifecycle state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// A handle that stops the client from any thread.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.scheduler.stop_handle()
    }

    /// The scheduler.
    #[must_use]
    pub const fn scheduler(&self) -> &FrameScheduler<E, N, D> {
        &self.scheduler
    }

    /// The scheduler, mutably.
    pub fn scheduler_mut(&mut self) -> &mut FrameScheduler<E, N, D> {
        &mut self.scheduler
    }

    /// The scene pipeline.
    #[must_use]
    pub const fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    /// Settings loaded by bootstrap (defaults before it).
    #[must_use]
    pub const fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// The resolved install, once bootstrapped.
    #[must_use]
    pub const fn install(&self) -> Option<&InstallLocation> {
        self.install.as_ref()
    }

    /// The asset factories, once bootstrapped.
    #[must_use]
    pub const fn assets(&self) -> Option<&Arc<AssetFactories>> {
        self.assets.as_ref()
    }

    /// The background decoder, when streaming is enabled.
    #[must_use]
    pub const fn streamer(&self) -> Option<&AssetStreamer> {
        self.streamer.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use britannia_core::{MemorySettingsStore, PromptOutcome};
    use britannia_networking::OfflineNetworkClient;
    use britannia_rendering::HeadlessDevice;
    use crate::scheduler::IdleEngine;

    fn client() -> GameClient<IdleEngine, OfflineNetworkClient, HeadlessDevice> {
        GameClient::new(
            IdleEngine::new(),
            OfflineNetworkClient::new(),
            HeadlessDevice::new(1280, 720),
        )
    }

    #[test]
    fn test_new_client_is_uninitialized() {
        let mut c = client();
        assert_eq!(c.state(), SchedulerState::Uninitialized);
        assert!(c.install().is_none());
        assert!(!c.request_asset(AssetKey::new(AssetKind::Gump, 1)));
        assert!(!c.show_tile(3).unwrap());
    }

    #[test]
    fn test_cancelled_prompt_fails_bootstrap() {
        let mut c = client();
        let store = MemorySettingsStore::default();

        let err = c
            .bootstrap(Capabilities::new(|| PromptOutcome::Cancelled, store.clone()))
            .unwrap_err();

        assert!(err.is_install_missing());
        assert_eq!(c.state(), SchedulerState::Failed);
        assert!(c.assets().is_none());
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn test_bootstrap_runs_once() {
        let mut c = client();
        let store = MemorySettingsStore::default();
        c.bootstrap(Capabilities::new(|| PromptOutcome::Cancelled, store.clone()))
            .unwrap_err();

        let err = c
            .bootstrap(Capabilities::new(|| PromptOutcome::Cancelled, store))
            .unwrap_err();
        assert!(matches!(
            err,
            crate::ClientError::Scheduler(SchedulerError::InvalidTransition { .. })
        ));
        assert_eq!(c.state(), SchedulerState::Failed);
    }
}

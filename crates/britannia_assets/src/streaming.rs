//! # Asset Streamer
//!
//! Background decoding for assets the render path wants but does not have.
//!
//! ```text
//! render path ── request(key) ──> [channel] ──> worker 1..N ── resolve_key
//!      │                                                          │
//!      └──────────── factories.cached(id) <── cache insert ───────┘
//! ```
//!
//! The render path never waits: it asks, draws nothing, and picks the asset
//! up from the cache on a later frame. Shutdown drops whatever is still
//! queued; decodes already running finish and stay cached.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::family::AssetFactories;
use crate::key::AssetKey;

/// Streamer counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamerStats {
    /// Requests accepted into the queue.
    pub requested: u64,
    /// Requests resolved successfully.
    pub completed: u64,
    /// Requests that failed to resolve.
    pub failed: u64,
    /// Requests dropped by shutdown.
    pub cancelled: u64,
}

struct Shared {
    factories: Arc<AssetFactories>,
    shutdown: AtomicBool,
    queued: Mutex<HashSet<AssetKey>>,
    stats: Mutex<StreamerStats>,
}

/// Pool of background decode workers.
pub struct AssetStreamer {
    shared: Arc<Shared>,
    sender: Option<Sender<AssetKey>>,
    workers: Vec<JoinHandle<()>>,
}

impl AssetStreamer {
    /// Starts `workers` threads over `factories`. At least one is started.
    #[must_use]
    pub fn start(factories: Arc<AssetFactories>, workers: usize) -> Self {
        let shared = Arc::new(Shared {
            factories,
            shutdown: AtomicBool::new(false),
            queued: Mutex::new(HashSet::new()),
            stats: Mutex::new(StreamerStats::default()),
        });
        let (sender, receiver) = unbounded();

        let count = workers.max(1);
        let workers = (0..count)
            .filter_map(|index| {
                let shared = Arc::clone(&shared);
                let receiver = receiver.clone();
                thread::Builder::new()
                    .name(format!("asset-stream-{index}"))
                    .spawn(move || Self::worker_loop(&shared, &receiver))
                    .map_err(|e| warn!(index, error = %e, "failed to spawn asset worker"))
                    .ok()
            })
            .collect::<Vec<_>>();

        info!(workers = workers.len(), "asset streamer started");
        Self {
            shared,
            sender: Some(sender),
            workers,
        }
    }

    fn worker_loop(shared: &Shared, receiver: &Receiver<AssetKey>) {
        while let Ok(key) = receiver.recv() {
            if shared.shutdown.load(Ordering::Acquire) {
                shared.queued.lock().remove(&key);
                shared.stats.lock().cancelled += 1;
                continue;
            }

            let result = shared.factories.resolve_key(key);
            shared.queued.lock().remove(&key);

            let mut stats = shared.stats.lock();
            match result {
                Ok(()) => {
                    stats.completed += 1;
                    debug!(%key, "streamed");
                }
                Err(e) => {
                    stats.failed += 1;
                    debug!(%key, error = %e, "stream request failed");
                }
            }
        }
    }

    /// Queues `key` for background resolution.
    ///
    /// Returns false if the key is already cached, already queued, or the
    /// streamer is shut down.
    pub fn request(&self, key: AssetKey) -> bool {
        let Some(sender) = &self.sender else {
            return false;
        };
        if self.shared.factories.is_cached(key) {
            return false;
        }
        if !self.shared.queued.lock().insert(key) {
            return false;
        }
        if sender.send(key).is_err() {
            self.shared.queued.lock().remove(&key);
            return false;
        }
        self.shared.stats.lock().requested += 1;
        true
    }

    /// Requests queued or in progress.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.shared.queued.lock().len()
    }

    /// The factories this streamer fills.
    #[must_use]
    pub fn factories(&self) -> &Arc<AssetFactories> {
        &self.shared.factories
    }

    /// Counter snapshot.
    #[must_use]
    pub fn stats(&self) -> StreamerStats {
        *self.shared.stats.lock()
    }

    /// Cancels queued requests and joins the workers. Idempotent.
    pub fn shutdown(&mut self) {
        if self.sender.is_none() {
            return;
        }
        self.shared.shutdown.store(true, Ordering::Release);
        // Dropping the sender ends each worker's recv loop once the queue drains.
        self.sender = None;
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                warn!("asset worker panicked");
            }
        }
        let stats = self.stats();
        info!(
            completed = stats.completed,
            failed = stats.failed,
            cancelled = stats.cancelled,
            "asset streamer stopped"
        );
    }
}

impl Drop for AssetStreamer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::AssetKind;
    use britannia_core::{ClientVersion, InstallLocation};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{Duration, Instant};

    fn install_with_land_tile() -> PathBuf {
        let id = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("britannia_streamer_{id}"));
        fs::create_dir_all(&dir).unwrap();

        let tile = crate::decode::land_record_bytes(0x7FFF);
        let mut idx = Vec::new();
        idx.extend_from_slice(&0i32.to_le_bytes());
        idx.extend_from_slice(&i32::try_from(tile.len()).unwrap().to_le_bytes());
        idx.extend_from_slice(&0i32.to_le_bytes());
        fs::write(dir.join("artidx.mul"), idx).unwrap();
        fs::write(dir.join("art.mul"), tile).unwrap();
        dir
    }

    fn wait_until(mut done: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if done() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn test_streamed_asset_lands_in_cache() {
        let dir = install_with_land_tile();
        let install = InstallLocation::open(&dir, ClientVersion::BASELINE).unwrap();
        let factories = Arc::new(AssetFactories::open(&install));
        let mut streamer = AssetStreamer::start(Arc::clone(&factories), 2);

        let key = AssetKey::new(AssetKind::Artwork, 0);
        assert!(streamer.request(key));
        assert!(wait_until(|| factories.artwork.cached(0).is_some()));
        assert!(wait_until(|| streamer.pending() == 0));

        // Cached now, so a second request is refused.
        assert!(!streamer.request(key));

        assert!(streamer.request(AssetKey::new(AssetKind::Artwork, 1)));
        assert!(wait_until(|| streamer.stats().failed == 1));

        streamer.shutdown();
        assert_eq!(streamer.stats().completed, 1);
        assert!(!streamer.request(AssetKey::new(AssetKind::Gump, 1)));

        fs::remove_dir_all(&dir).ok();
    }
}

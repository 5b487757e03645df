//! # Factory Cache
//!
//! Per-factory map from logical id to resolved asset.
//!
//! ## Slot Lifecycle
//!
//! ```text
//!            first caller                  decode ok
//!   (empty) ─────────────> Loading ───────────────────> Ready(Arc<T>)
//!                             │
//!                             │ decode failed
//!                             ▼
//!                          (empty)   failures are not cached
//! ```
//!
//! Callers that find a `Loading` slot block on its condvar and receive the
//! leader's result, so one id is decoded at most once at a time and every
//! concurrent caller sees the same instance or the same error.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::error::{AssetError, AssetResult};
use crate::key::{AssetKey, AssetKind};

/// Cache counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests served from a ready entry.
    pub hits: u64,
    /// Requests that started a load.
    pub misses: u64,
    /// Requests that waited on another caller's load.
    pub coalesced: u64,
    /// Loads that failed.
    pub failures: u64,
    /// Ready entries.
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of requests that needed no load of their own.
    #[must_use]
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses + self.coalesced;
        if total == 0 {
            return 0.0;
        }
        (self.hits + self.coalesced) as f64 / total as f64
    }
}

struct Pending<T> {
    result: Mutex<Option<AssetResult<Arc<T>>>>,
    ready: Condvar,
}

impl<T> Pending<T> {
    fn new() -> Self {
        Self {
            result: Mutex::new(None),
            ready: Condvar::new(),
        }
    }

    fn complete(&self, result: AssetResult<Arc<T>>) {
        *self.result.lock() = Some(result);
        self.ready.notify_all();
    }

    fn wait(&self) -> AssetResult<Arc<T>> {
        let mut slot = self.result.lock();
        loop {
            if let Some(result) = slot.as_ref() {
                return result.clone();
            }
            self.ready.wait(&mut slot);
        }
    }
}

enum Slot<T> {
    Ready(Arc<T>),
    Loading(Arc<Pending<T>>),
}

/// Thread-safe, append-only asset cache.
pub struct FactoryCache<T> {
    kind: AssetKind,
    slots: Mutex<HashMap<u32, Slot<T>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
    failures: AtomicU64,
}

impl<T> FactoryCache<T> {
    /// Creates an empty cache for one asset kind.
    #[must_use]
    pub fn new(kind: AssetKind) -> Self {
        Self {
            kind,
            slots: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            coalesced: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    /// Returns the cached entry, running `load` on a miss.
    ///
    /// Concurrent callers for the same id share one `load`.
    pub fn get_or_load<F>(&self, id: u32, load: F) -> AssetResult<Arc<T>>
    where
        F: FnOnce() -> AssetResult<T>,
    {
        let pending = {
            let mut slots = self.slots.lock();
            match slots.get(&id) {
                Some(Slot::Ready(asset)) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Ok(Arc::clone(asset));
                }
                Some(Slot::Loading(pending)) => {
                    let pending = Arc::clone(pending);
                    drop(slots);
                    self.coalesced.fetch_add(1, Ordering::Relaxed);
                    return pending.wait();
                }
                None => {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    let pending = Arc::new(Pending::new());
                    slots.insert(id, Slot::Loading(Arc::clone(&pending)));
                    pending
                }
            }
        };

        let completion = Completion {
            cache: self,
            id,
            pending,
            finished: false,
        };
        completion.finish(load().map(Arc::new))
    }

    /// Returns the entry if it is ready. Never loads.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<Arc<T>> {
        match self.slots.lock().get(&id) {
            Some(Slot::Ready(asset)) => Some(Arc::clone(asset)),
            _ => None,
        }
    }

    /// Drops a ready entry. Entries still loading are left alone.
    ///
    /// Returns true if an entry was removed.
    pub fn invalidate(&self, id: u32) -> bool {
        let mut slots = self.slots.lock();
        if matches!(slots.get(&id), Some(Slot::Ready(_))) {
            slots.remove(&id);
            true
        } else {
            false
        }
    }

    /// Number of ready entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }

    /// Returns true if no entry is ready.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

/// Publishes the leader's result. If the loader panics, waiters are released
/// with `Cancelled` and the slot is cleared.
struct Completion<'a, T> {
    cache: &'a FactoryCache<T>,
    id: u32,
    pending: Arc<Pending<T>>,
    finished: bool,
}

impl<T> Completion<'_, T> {
    fn finish(mut self, result: AssetResult<Arc<T>>) -> AssetResult<Arc<T>> {
        self.publish(result.clone());
        self.finished = true;
        result
    }

    fn publish(&self, result: AssetResult<Arc<T>>) {
        {
            let mut slots = self.cache.slots.lock();
            match &result {
                Ok(asset) => {
                    slots.insert(self.id, Slot::Ready(Arc::clone(asset)));
                }
                Err(_) => {
                    self.cache.failures.fetch_add(1, Ordering::Relaxed);
                    slots.remove(&self.id);
                }
            }
        }
        self.pending.complete(result);
    }
}

impl<T> Drop for Completion<'_, T> {
    fn drop(&mut self) {
        if !self.finished {
            let key = AssetKey::new(self.cache.kind, self.id);
            self.publish(Err(AssetError::Cancelled(key)));
        }
    }
}

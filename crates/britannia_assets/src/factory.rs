//! # Asset Factory
//!
//! One generic factory per asset kind: a record source, a decoder and a
//! cache, bound to the install's format profile.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{CacheStats, FactoryCache};
use crate::decode::Decoder;
use crate::error::{AssetError, AssetResult};
use crate::key::AssetKey;
use crate::profile::FormatProfile;
use crate::source::RecordSource;

/// Outcome of a bulk preload.
#[derive(Debug, Default)]
pub struct PreloadReport {
    /// Ids requested.
    pub requested: usize,
    /// Ids now cached.
    pub loaded: usize,
    /// One entry per id that failed.
    pub failed: Vec<AssetError>,
}

impl PreloadReport {
    /// Returns true if every id loaded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Folds another report into this one.
    pub fn merge(&mut self, other: Self) {
        self.requested += other.requested;
        self.loaded += other.loaded;
        self.failed.extend(other.failed);
    }
}

/// Resolves logical ids of one kind to cached, decoded assets.
pub struct AssetFactory<D: Decoder> {
    source: Box<dyn RecordSource>,
    decoder: D,
    profile: FormatProfile,
    cache: FactoryCache<D::Output>,
}

impl<D: Decoder> AssetFactory<D> {
    /// Creates a factory over `source`.
    pub fn new(source: Box<dyn RecordSource>, decoder: D, profile: FormatProfile) -> Self {
        Self {
            source,
            decoder,
            profile,
            cache: FactoryCache::new(D::KIND),
        }
    }

    /// The format profile in use.
    #[inline]
    #[must_use]
    pub const fn profile(&self) -> &FormatProfile {
        &self.profile
    }

    #[inline]
    fn key(id: u32) -> AssetKey {
        AssetKey::new(D::KIND, id)
    }

    /// Resolves `id`, decoding it on first use.
    ///
    /// Later calls return the same `Arc`. Concurrent first calls decode once.
    ///
    /// # Errors
    ///
    /// `NotFound` if the install has no such record, `Decode` if the record
    /// is corrupt, `Io` if the data file cannot be read.
    pub fn resolve(&self, id: u32) -> AssetResult<Arc<D::Output>> {
        self.cache.get_or_load(id, || self.load(id))
    }

    fn load(&self, id: u32) -> AssetResult<D::Output> {
        let key = Self::key(id);
        if !self.decoder.accepts(id, &self.profile) {
            debug!(%key, version = %self.profile.version, "id outside format range");
            return Err(AssetError::NotFound(key));
        }

        let record = self
            .source
            .read(id)
            .map_err(|e| {
                warn!(%key, error = %e, "failed to read record");
                AssetError::io(key, &e)
            })?
            .ok_or(AssetError::NotFound(key))?;

        match self.decoder.decode(&record, &self.profile) {
            Ok(asset) => {
                debug!(%key, bytes = record.data.len(), "decoded");
                Ok(asset)
            }
            Err(source) => {
                warn!(%key, error = %source, "decode failed");
                Err(AssetError::Decode { key, source })
            }
        }
    }

    /// The cached entry, if any. Never decodes.
    #[must_use]
    pub fn cached(&self, id: u32) -> Option<Arc<D::Output>> {
        self.cache.get(id)
    }

    /// Drops the cached entry so the next resolve decodes again.
    pub fn invalidate(&self, id: u32) -> bool {
        self.cache.invalidate(id)
    }

    /// Resolves every id, collecting failures instead of stopping on them.
    pub fn preload<I>(&self, ids: I) -> PreloadReport
    where
        I: IntoIterator<Item = u32>,
    {
        let mut report = PreloadReport::default();
        for id in ids {
            report.requested += 1;
            match self.resolve(id) {
                Ok(_) => report.loaded += 1,
                Err(e) => report.failed.push(e),
            }
        }
        debug!(
            kind = %D::KIND,
            requested = report.requested,
            loaded = report.loaded,
            "preload finished"
        );
        report
    }

    /// Cache counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl<D: Decoder> fmt::Debug for AssetFactory<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetFactory")
            .field("kind", &D::KIND)
            .field("source", &self.source.describe())
            .field("entries", &self.cache.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{land_record_bytes, ArtworkDecoder, GumpDecoder};
    use crate::source::{MemorySource, Record};

    fn artwork() -> AssetFactory<ArtworkDecoder> {
        let source = MemorySource::new()
            .with(Record::new(5, land_record_bytes(0x1234)))
            .with(Record::new(7, vec![1, 2, 3]));
        AssetFactory::new(Box::new(source), ArtworkDecoder, FormatProfile::default())
    }

    #[test]
    fn test_resolve_returns_same_instance() {
        let factory = artwork();
        let a = factory.resolve(5).unwrap();
        let b = factory.resolve(5).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(factory.stats().misses, 1);
        assert!(Arc::ptr_eq(&factory.cached(5).unwrap(), &a));
    }

    #[test]
    fn test_missing_and_corrupt_records() {
        let factory = artwork();

        assert_eq!(
            factory.resolve(6).unwrap_err(),
            AssetError::NotFound(AssetKey::new(crate::AssetKind::Artwork, 6))
        );
        assert!(matches!(factory.resolve(7).unwrap_err(), AssetError::Decode { .. }));
        assert!(factory.cached(7).is_none());
    }

    #[test]
    fn test_preload_collects_failures() {
        let factory = artwork();
        let report = factory.preload([5, 6, 7]);

        assert_eq!(report.requested, 3);
        assert_eq!(report.loaded, 1);
        assert_eq!(report.failed.len(), 2);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_empty_source_is_not_found() {
        let factory = AssetFactory::new(
            Box::new(MemorySource::new()),
            GumpDecoder,
            FormatProfile::default(),
        );
        assert!(factory.resolve(1).unwrap_err().is_not_found());
    }
}

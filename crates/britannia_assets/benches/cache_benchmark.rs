//! # Asset Cache Benchmark
//!
//! The render path calls `cached`/`resolve` for every visible tile every
//! frame, so the hit path has to stay cheap.

#![allow(missing_docs)]

use std::sync::Arc;

use britannia_assets::{
    decode::land_record_bytes, ArtworkDecoder, AssetFactory, FactoryCache, AssetKind,
    FormatProfile, MemorySource, Record,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const TILE_COUNT: u32 = 1024;

fn artwork_factory() -> AssetFactory<ArtworkDecoder> {
    let mut source = MemorySource::new();
    for id in 0..TILE_COUNT {
        source.insert(Record::new(id, land_record_bytes(0x1234)));
    }
    AssetFactory::new(Box::new(source), ArtworkDecoder, FormatProfile::default())
}

fn bench_cache_hit(c: &mut Criterion) {
    let cache = FactoryCache::new(AssetKind::Gump);
    for id in 0..TILE_COUNT {
        let _ = cache.get_or_load(id, || Ok(id));
    }

    c.bench_function("cache_get_or_load_hit", |b| {
        let mut id = 0;
        b.iter(|| {
            id = (id + 1) % TILE_COUNT;
            black_box(cache.get_or_load(id, || Ok(0)))
        });
    });
}

fn bench_factory_resolve_hit(c: &mut Criterion) {
    let factory = artwork_factory();
    let _ = factory.preload(0..TILE_COUNT);

    c.bench_function("artwork_resolve_hit_1024", |b| {
        b.iter(|| {
            for id in 0..TILE_COUNT {
                black_box(factory.resolve(id).map(|bmp| Arc::strong_count(&bmp)).ok());
            }
        });
    });

    c.bench_function("artwork_cached_lookup_1024", |b| {
        b.iter(|| {
            for id in 0..TILE_COUNT {
                black_box(factory.cached(id).is_some());
            }
        });
    });
}

fn bench_land_decode(c: &mut Criterion) {
    c.bench_function("artwork_land_decode_cold", |b| {
        let record = Record::new(5, land_record_bytes(0x1234));
        b.iter(|| {
            let source = MemorySource::new().with(record.clone());
            let factory =
                AssetFactory::new(Box::new(source), ArtworkDecoder, FormatProfile::default());
            black_box(factory.resolve(5).ok())
        });
    });
}

criterion_group!(benches, bench_cache_hit, bench_factory_resolve_hit, bench_land_decode);
criterion_main!(benches);

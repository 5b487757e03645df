//! # Britannia Assets
//!
//! Turns the installed game data into renderable resources, lazily.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       ASSET FACTORY<D>                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  resolve(id)                                                    │
//! │     │                                                           │
//! │     ├── FactoryCache hit ──────────────────────> Arc<Output>    │
//! │     │                                                           │
//! │     └── miss ── RecordSource::read(id) ── Decoder::decode ──┐   │
//! │                 (idx + mul files)         (FormatProfile)   │   │
//! │                                                             ▼   │
//! │                                      insert, wake waiters       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Six instantiations share the same cache logic: artwork, texture maps,
//! animations, gumps, ASCII fonts and unicode fonts (`AssetFactories`).
//!
//! ## Guarantees
//!
//! - A second `resolve` of the same id returns the same `Arc`, no decode
//! - Concurrent first touches decode once; everyone gets the same result
//! - `NotFound` and decode failures are not cached (retriable)

#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod bitmap;
pub mod cache;
pub mod decode;
pub mod error;
pub mod factory;
pub mod family;
pub mod key;
pub mod profile;
pub mod source;
pub mod streaming;

pub use bitmap::Bitmap;
pub use cache::{CacheStats, FactoryCache};
pub use decode::{
    Animation, AnimationDecoder, AnimationFrame, ArtworkDecoder, AsciiFont, AsciiFontDecoder,
    Decoder, Glyph, GumpDecoder, TexmapDecoder, UnicodeFont, UnicodeFontDecoder, UnicodeGlyph,
};
pub use error::{AssetError, AssetResult, DecodeError};
pub use factory::{AssetFactory, PreloadReport};
pub use family::{
    AnimationFactory, ArtworkFactory, AsciiFontFactory, AssetFactories, GumpFactory,
    TexmapFactory, UnicodeFontFactory,
};
pub use key::{AnimationId, AssetKey, AssetKind, ArtworkId};
pub use profile::FormatProfile;
pub use source::{
    AsciiFontFile, EmptySource, FilePerRecord, IndexedFile, MemorySource, Record, RecordSource,
};
pub use streaming::{AssetStreamer, StreamerStats};

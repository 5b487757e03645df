//! # Britannia Core
//!
//! Everything the client needs to know before it can touch game data:
//!
//! - **Versions**: which client release produced the installed files
//! - **Install location**: where the files are, validated once at startup
//! - **Settings**: durable per-user configuration (TOML)
//!
//! ## Startup Order
//!
//! ```text
//! ┌────────────────┐     ┌──────────────────┐     ┌────────────────────┐
//! │ SettingsStore  │────>│ InstallResolver  │────>│ InstallLocation    │
//! │ (load)         │     │ (prompt once)    │     │ (immutable)        │
//! └────────────────┘     └────────┬─────────┘     └────────────────────┘
//!                                 │
//!                                 └──> SettingsStore (save new default)
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use britannia_core::{InstallResolver, TomlSettingsStore};
//!
//! let store = TomlSettingsStore::for_application("britannia")?;
//! let install = InstallResolver::new(prompt, store).resolve(None)?;
//! ```

#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod install;
pub mod settings;
pub mod version;

pub use error::{CoreError, CoreResult};
pub use install::{
    InstallCandidate, InstallLocation, InstallPrompt, InstallResolver, PromptOutcome,
    KNOWN_DATA_FILES,
};
pub use settings::{
    AssetSettings, ClientSettings, DisplaySettings, FrameSettings, MemorySettingsStore,
    NetworkSettings, SettingsStore, TomlSettingsStore, UltimaOnlineSettings,
};
pub use version::ClientVersion;

/// Application identity used to key persisted settings.
pub const APPLICATION_NAME: &str = "britannia";

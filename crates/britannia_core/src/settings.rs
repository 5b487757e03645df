//! # Client Settings
//!
//! Durable per-user configuration, stored as TOML and keyed by application
//! name. Read once at bootstrap, written after an interactive install
//! resolution.
//!
//! ```toml
//! [ultima_online]
//! data_directory = "C:/Games/Ultima Online Classic"
//! client_version = "7.0.15.1"
//!
//! [network]
//! max_packets_per_slice = 64
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CoreError, CoreResult};
use crate::version::ClientVersion;

/// Where the game data lives.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UltimaOnlineSettings {
    /// Directory holding the installed data files.
    pub data_directory: Option<PathBuf>,
    /// Version of the client that produced the data files.
    pub client_version: Option<ClientVersion>,
}

/// Window and virtual resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Window width in pixels.
    pub width: u32,
    /// Window height in pixels.
    pub height: u32,
    /// Virtual resolution width used by sprite batches.
    pub virtual_width: u32,
    /// Virtual resolution height used by sprite batches.
    pub virtual_height: u32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            virtual_width: 1280,
            virtual_height: 720,
        }
    }
}

/// Network slicing limits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    /// Upper bound of packets dispatched by one slice.
    pub max_packets_per_slice: usize,
    /// Capacity of the inbound packet queue.
    pub inbound_capacity: usize,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            max_packets_per_slice: 64,
            inbound_capacity: 1024,
        }
    }
}

/// Asset loading behaviour.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetSettings {
    /// Background decode workers. Zero disables streaming.
    pub streaming_workers: usize,
    /// Artwork ids decoded during bootstrap.
    pub preload_artwork: Vec<u32>,
    /// Gump ids decoded during bootstrap.
    pub preload_gumps: Vec<u32>,
    /// Artwork id drawn by the scene delegate.
    pub tile_artwork: Option<u32>,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            streaming_workers: 2,
            preload_artwork: Vec::new(),
            preload_gumps: Vec::new(),
            tile_artwork: None,
        }
    }
}

/// Frame pacing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSettings {
    /// Delta time clamp in milliseconds.
    pub max_delta_ms: u64,
    /// Frames slower than this are logged.
    pub slow_frame_ms: u64,
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self {
            max_delta_ms: 100,
            slow_frame_ms: 33,
        }
    }
}

/// The complete persisted configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Install location.
    pub ultima_online: UltimaOnlineSettings,
    /// Display.
    pub display: DisplaySettings,
    /// Network.
    pub network: NetworkSettings,
    /// Assets.
    pub assets: AssetSettings,
    /// Frame pacing.
    pub frame: FrameSettings,
}

impl ClientSettings {
    /// Parses settings from TOML text.
    pub fn from_toml_str(text: &str, origin: &Path) -> CoreResult<Self> {
        toml::from_str(text).map_err(|source| CoreError::SettingsParse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Serializes settings to TOML text.
    pub fn to_toml_string(&self) -> CoreResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Durable storage for `ClientSettings`.
pub trait SettingsStore {
    /// Loads the stored settings, or defaults when nothing was stored yet.
    fn load(&self) -> CoreResult<ClientSettings>;

    /// Replaces the stored settings.
    fn save(&self, settings: &ClientSettings) -> CoreResult<()>;
}

impl<S: SettingsStore + ?Sized> SettingsStore for &S {
    fn load(&self) -> CoreResult<ClientSettings> {
        (**self).load()
    }

    fn save(&self, settings: &ClientSettings) -> CoreResult<()> {
        (**self).save(settings)
    }
}

/// Settings persisted as a TOML file.
#[derive(Clone, Debug)]
pub struct TomlSettingsStore {
    path: PathBuf,
}

impl TomlSettingsStore {
    /// Creates a store backed by an explicit file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store at `<config dir>/<application>/settings.toml`.
    pub fn for_application(application: &str) -> CoreResult<Self> {
        let base = dirs::config_dir().ok_or(CoreError::NoConfigDirectory)?;
        Ok(Self::new(base.join(application).join("settings.toml")))
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for TomlSettingsStore {
    fn load(&self) -> CoreResult<ClientSettings> {
        match fs::read_to_string(&self.path) {
            Ok(text) => ClientSettings::from_toml_str(&text, &self.path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no settings file, using defaults");
                Ok(ClientSettings::default())
            }
            Err(source) => Err(CoreError::SettingsIo {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn save(&self, settings: &ClientSettings) -> CoreResult<()> {
        let text = settings.to_toml_string()?;
        let io_err = |source| CoreError::SettingsIo {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        // Write-then-rename so a crash never leaves a truncated file.
        let staging = self.path.with_extension("toml.tmp");
        fs::write(&staging, text).map_err(io_err)?;
        fs::rename(&staging, &self.path).map_err(io_err)?;

        info!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}

/// Settings held in memory, for embedding and tests.
///
/// Clones share the same contents.
#[derive(Clone, Debug, Default)]
pub struct MemorySettingsStore {
    inner: Arc<Mutex<MemoryContents>>,
}

#[derive(Debug, Default)]
struct MemoryContents {
    settings: ClientSettings,
    saves: usize,
}

impl MemorySettingsStore {
    /// Creates a store holding `settings`.
    #[must_use]
    pub fn new(settings: ClientSettings) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryContents { settings, saves: 0 })),
        }
    }

    /// Returns a copy of the current contents.
    #[must_use]
    pub fn snapshot(&self) -> ClientSettings {
        self.inner.lock().settings.clone()
    }

    /// Number of successful saves.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.inner.lock().saves
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> CoreResult<ClientSettings> {
        Ok(self.snapshot())
    }

    fn save(&self, settings: &ClientSettings) -> CoreResult<()> {
        let mut inner = self.inner.lock();
        inner.settings = settings.clone();
        inner.saves += 1;
        Ok(())
    }
}

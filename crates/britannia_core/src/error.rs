//! # Core Error Types
//!
//! All errors that can occur while resolving the install or handling settings.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the core crate.
#[derive(Error, Debug)]
pub enum CoreError {
    /// No usable game data: the prompt was cancelled or the selection held no data.
    #[error("installation not found: {reason}")]
    InstallationNotFound {
        /// Why no installation could be used.
        reason: String,
    },

    /// A version string could not be parsed.
    #[error("invalid client version '{0}'")]
    InvalidVersion(String),

    /// Reading or writing the settings file failed.
    #[error("settings i/o failed for {path}: {source}")]
    SettingsIo {
        /// The settings file involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid TOML for `ClientSettings`.
    #[error("settings file {path} is malformed: {source}")]
    SettingsParse {
        /// The settings file involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: toml::de::Error,
    },

    /// Settings could not be serialized.
    #[error("settings could not be serialized: {0}")]
    SettingsSerialize(#[from] toml::ser::Error),

    /// No per-user configuration directory exists on this platform.
    #[error("no configuration directory available")]
    NoConfigDirectory,
}

impl CoreError {
    /// Builds an `InstallationNotFound` error.
    pub fn installation_not_found(reason: impl Into<String>) -> Self {
        Self::InstallationNotFound {
            reason: reason.into(),
        }
    }

    /// Returns true if this error means the process cannot enter the running state.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InstallationNotFound { .. })
    }
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

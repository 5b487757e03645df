//! # Asset Error Types
//!
//! `AssetError` is `Clone` so one failed decode can be handed to every
//! caller that was waiting on it.

use thiserror::Error;

use crate::key::AssetKey;

/// Why a record could not be turned into a resource.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The record ended before the structure did.
    #[error("record truncated")]
    Truncated,

    /// A dimension or count is outside what the format allows.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
    },

    /// The record is structurally wrong.
    #[error("malformed record: {0}")]
    Malformed(String),
}

impl From<std::io::Error> for DecodeError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            Self::Truncated
        } else {
            Self::Malformed(e.to_string())
        }
    }
}

/// Errors returned by asset factories.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// The install has no record for this id.
    #[error("asset not found: {0}")]
    NotFound(AssetKey),

    /// The record exists but could not be decoded.
    #[error("failed to decode {key}: {source}")]
    Decode {
        /// The asset involved.
        key: AssetKey,
        /// What went wrong.
        #[source]
        source: DecodeError,
    },

    /// Reading the data files failed.
    #[error("i/o error reading {key}: {message}")]
    Io {
        /// The asset involved.
        key: AssetKey,
        /// The underlying error, rendered.
        message: String,
    },

    /// The request was dropped by a shutting-down streamer.
    #[error("request for {0} was cancelled")]
    Cancelled(AssetKey),
}

impl AssetError {
    /// The key this error is about.
    #[must_use]
    pub const fn key(&self) -> AssetKey {
        match self {
            Self::NotFound(key) | Self::Cancelled(key) => *key,
            Self::Decode { key, .. } | Self::Io { key, .. } => *key,
        }
    }

    /// Returns true for a missing record.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub(crate) fn io(key: AssetKey, error: &std::io::Error) -> Self {
        Self::Io {
            key,
            message: error.to_string(),
        }
    }
}

/// Result type for asset operations.
pub type AssetResult<T> = Result<T, AssetError>;

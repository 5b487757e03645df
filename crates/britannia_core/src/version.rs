//! Client version numbers.
//!
//! The installed data files change layout between client releases, so the
//! version travels with the install location and selects decode variants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A dotted four-part client version, e.g. `7.0.15.1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClientVersion {
    /// Major release.
    pub major: u16,
    /// Minor release.
    pub minor: u16,
    /// Patch level.
    pub patch: u16,
    /// Build number.
    pub build: u16,
}

impl ClientVersion {
    /// Version assumed when a directory is known but no version was ever stored.
    pub const BASELINE: Self = Self::new(7, 0, 0, 0);

    /// Creates a version from its parts.
    #[inline]
    #[must_use]
    pub const fn new(major: u16, minor: u16, patch: u16, build: u16) -> Self {
        Self {
            major,
            minor,
            patch,
            build,
        }
    }

    /// Returns true if this version is at least `other`.
    #[inline]
    #[must_use]
    pub fn at_least(&self, other: Self) -> bool {
        *self >= other
    }
}

impl Default for ClientVersion {
    fn default() -> Self {
        Self::BASELINE
    }
}

impl fmt::Display for ClientVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.major, self.minor, self.patch, self.build)
    }
}

impl FromStr for ClientVersion {
    type Err = CoreError;

    /// Parses `"major[.minor[.patch[.build]]]"`; missing parts are zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidVersion(s.to_string()));
        }

        let mut parts = [0u16; 4];
        let mut count = 0;
        for piece in trimmed.split('.') {
            if count == parts.len() {
                return Err(CoreError::InvalidVersion(s.to_string()));
            }
            parts[count] = piece
                .trim()
                .parse()
                .map_err(|_| CoreError::InvalidVersion(s.to_string()))?;
            count += 1;
        }

        Ok(Self::new(parts[0], parts[1], parts[2], parts[3]))
    }
}

impl TryFrom<String> for ClientVersion {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClientVersion> for String {
    fn from(version: ClientVersion) -> Self {
        version.to_string()
    }
}

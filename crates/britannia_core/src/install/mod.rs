//! # Install Location
//!
//! A validated (directory, version) pair. Created once at bootstrap and
//! never changed for the rest of the process.

mod resolver;

pub use resolver::{InstallCandidate, InstallPrompt, InstallResolver, PromptOutcome};

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};
use crate::version::ClientVersion;

/// Files whose presence marks a directory as holding game data.
///
/// One match is enough; installs differ in which containers they ship.
pub const KNOWN_DATA_FILES: &[&str] = &[
    "art.mul",
    "artidx.mul",
    "artLegacyMUL.uop",
    "gumpart.mul",
    "gumpartLegacyMUL.uop",
    "texmaps.mul",
    "anim.mul",
    "fonts.mul",
    "unifont.mul",
    "tiledata.mul",
];

/// Where the game data is installed and which client version wrote it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstallLocation {
    directory: PathBuf,
    version: ClientVersion,
}

impl InstallLocation {
    /// Validates `directory` and binds it to `version`.
    ///
    /// # Errors
    ///
    /// `InstallationNotFound` if the directory does not exist or holds none
    /// of the `KNOWN_DATA_FILES`.
    pub fn open(directory: impl Into<PathBuf>, version: ClientVersion) -> CoreResult<Self> {
        let directory = directory.into();

        if !directory.is_dir() {
            return Err(CoreError::installation_not_found(format!(
                "{} is not a directory",
                directory.display()
            )));
        }

        if !contains_game_data(&directory) {
            return Err(CoreError::installation_not_found(format!(
                "{} holds no recognizable game data",
                directory.display()
            )));
        }

        Ok(Self { directory, version })
    }

    /// The install directory.
    #[inline]
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// The client version that produced the data.
    #[inline]
    #[must_use]
    pub const fn version(&self) -> ClientVersion {
        self.version
    }

    /// Finds a data file by name, ignoring case.
    ///
    /// Returns `None` if the install does not ship the file.
    #[must_use]
    pub fn data_file(&self, name: &str) -> Option<PathBuf> {
        find_case_insensitive(&self.directory, name)
    }
}

/// Returns true if `directory` holds at least one known data file.
#[must_use]
pub fn contains_game_data(directory: &Path) -> bool {
    KNOWN_DATA_FILES
        .iter()
        .any(|name| find_case_insensitive(directory, name).is_some())
}

fn find_case_insensitive(directory: &Path, name: &str) -> Option<PathBuf> {
    let exact = directory.join(name);
    if exact.is_file() {
        return Some(exact);
    }

    fs::read_dir(directory)
        .ok()?
        .filter_map(Result::ok)
        .find(|entry| {
            entry.file_name().to_string_lossy().eq_ignore_ascii_case(name)
                && entry.path().is_file()
        })
        .map(|entry| entry.path())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_install_dir(tag: &str) -> PathBuf {
        let id = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("britannia_install_{tag}_{id}"));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_open_rejects_missing_directory() {
        let dir = std::env::temp_dir().join("britannia_definitely_missing_dir");
        let err = InstallLocation::open(&dir, ClientVersion::BASELINE).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_open_rejects_empty_directory() {
        let dir = temp_install_dir("empty");
        let err = InstallLocation::open(&dir, ClientVersion::BASELINE).unwrap_err();
        assert!(matches!(err, CoreError::InstallationNotFound { .. }));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_data_file_ignores_case() {
        let dir = temp_install_dir("case");
        fs::write(dir.join("ARTIDX.MUL"), [0u8; 12]).unwrap();

        let install = InstallLocation::open(&dir, ClientVersion::new(7, 0, 15, 1)).unwrap();
        let found = install.data_file("artidx.mul").unwrap();
        assert_eq!(found.file_name().unwrap(), "ARTIDX.MUL");
        assert!(install.data_file("gumpart.mul").is_none());
        assert_eq!(install.version(), ClientVersion::new(7, 0, 15, 1));

        fs::remove_dir_all(&dir).ok();
    }
}

//! Install resolution.
//!
//! ```text
//! preferred dir ──valid?──yes──> InstallLocation (stored version)
//!        │
//!        no
//!        ▼
//!   InstallPrompt ──Cancelled──> InstallationNotFound
//!        │
//!     Selected ──valid?──no───> InstallationNotFound
//!        │
//!       yes ──> persist ──> InstallLocation
//! ```

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use super::{contains_game_data, InstallLocation};
use crate::error::{CoreError, CoreResult};
use crate::settings::SettingsStore;
use crate::version::ClientVersion;

/// A directory and version chosen by the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstallCandidate {
    /// Selected directory.
    pub directory: PathBuf,
    /// Selected client version.
    pub version: ClientVersion,
}

/// What the user did with the install prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PromptOutcome {
    /// The user picked an install.
    Selected(InstallCandidate),
    /// The user dismissed the prompt.
    Cancelled,
}

/// Blocking user interaction that asks where the game data is.
///
/// The call suspends the bootstrapping thread until the user answers.
pub trait InstallPrompt {
    /// Shows the prompt and waits for an answer.
    fn select_install(&mut self) -> PromptOutcome;
}

impl<F: FnMut() -> PromptOutcome> InstallPrompt for F {
    fn select_install(&mut self) -> PromptOutcome {
        self()
    }
}

/// Resolves the install location once per process.
///
/// `resolve` consumes the resolver: there is exactly one attempt.
pub struct InstallResolver<P, S> {
    prompt: P,
    store: S,
}

impl<P: InstallPrompt, S: SettingsStore> InstallResolver<P, S> {
    /// Creates a resolver with its prompt and settings store.
    pub fn new(prompt: P, store: S) -> Self {
        Self { prompt, store }
    }

    /// Resolves the install location.
    ///
    /// Uses `preferred` when it names a directory with game data; otherwise
    /// asks the prompt and persists the answer as the new default.
    ///
    /// # Errors
    ///
    /// `InstallationNotFound` when the prompt is cancelled or its selection
    /// holds no game data. Settings errors are propagated.
    pub fn resolve(mut self, preferred: Option<&Path>) -> CoreResult<InstallLocation> {
        let mut settings = self.store.load()?;

        if let Some(directory) = preferred.filter(|p| !p.as_os_str().is_empty()) {
            if directory.is_dir() && contains_game_data(directory) {
                let version = settings.ultima_online.client_version.unwrap_or_else(|| {
                    warn!(
                        baseline = %ClientVersion::BASELINE,
                        "no stored client version, assuming baseline"
                    );
                    ClientVersion::BASELINE
                });
                info!(directory = %directory.display(), %version, "using configured install");
                return InstallLocation::open(directory, version);
            }

            warn!(directory = %directory.display(), "configured install is unusable");
        }

        info!("asking user for install location");
        let candidate = match self.prompt.select_install() {
            PromptOutcome::Selected(candidate) => candidate,
            PromptOutcome::Cancelled => {
                error!("install selection cancelled");
                return Err(CoreError::installation_not_found(
                    "install selection was cancelled",
                ));
            }
        };

        let install = InstallLocation::open(&candidate.directory, candidate.version)?;

        settings.ultima_online.data_directory = Some(candidate.directory);
        settings.ultima_online.client_version = Some(candidate.version);
        self.store.save(&settings)?;

        info!(
            directory = %install.directory().display(),
            version = %install.version(),
            "install resolved and saved"
        );
        Ok(install)
    }
}

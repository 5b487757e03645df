//! Line-based install prompt for terminals.
//!
//! ```text
//! Game data directory (empty to cancel): /games/uo
//! Client version [7.0.0.0]: 7.0.15.1
//! ```

use std::io::{self, BufRead, StdinLock, Stdout, Write};
use std::path::PathBuf;

use britannia_core::{ClientVersion, InstallCandidate, InstallPrompt, PromptOutcome};
use tracing::warn;

/// Version answers accepted before the prompt gives up.
const MAX_VERSION_ATTEMPTS: usize = 3;

/// Asks for the install on a line-based reader and writer.
///
/// An empty directory or end of input cancels.
#[derive(Debug)]
pub struct ConsolePrompt<R, W> {
    input: R,
    output: W,
}

impl ConsolePrompt<StdinLock<'static>, Stdout> {
    /// A prompt on the process's stdin and stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    /// Creates a prompt over `input` and `output`.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consumes the prompt, returning its writer.
    pub fn into_output(self) -> W {
        self.output
    }

    fn ask(&mut self, question: &str) -> Option<String> {
        if let Err(e) = write!(self.output, "{question}").and_then(|()| self.output.flush()) {
            warn!(error = %e, "prompt output failed");
        }

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_string()),
            Err(e) => {
                warn!(error = %e, "prompt input failed");
                None
            }
        }
    }

    fn say(&mut self, message: &str) {
        if let Err(e) = writeln!(self.output, "{message}") {
            warn!(error = %e, "prompt output failed");
        }
    }
}

impl<R: BufRead, W: Write> InstallPrompt for ConsolePrompt<R, W> {
    fn select_install(&mut self) -> PromptOutcome {
        let directory = match self.ask("Game data directory (empty to cancel): ") {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => return PromptOutcome::Cancelled,
        };

        let question = format!("Client version [{}]: ", ClientVersion::BASELINE);
        for _ in 0..MAX_VERSION_ATTEMPTS {
            let Some(answer) = self.ask(&question) else {
                return PromptOutcome::Cancelled;
            };

            let version = if answer.is_empty() {
                Ok(ClientVersion::BASELINE)
            } else {
                answer.parse::<ClientVersion>()
            };

            match version {
                Ok(version) => {
                    return PromptOutcome::Selected(InstallCandidate { directory, version });
                }
                Err(e) => self.say(&e.to_string()),
            }
        }

        self.say("too many invalid versions");
        PromptOutcome::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompt(input: &str) -> ConsolePrompt<Cursor<Vec<u8>>, Vec<u8>> {
        ConsolePrompt::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_directory_and_version() {
        let mut p = prompt("/games/uo\n7.0.15.1\n");
        assert_eq!(
            p.select_install(),
            PromptOutcome::Selected(InstallCandidate {
                directory: PathBuf::from("/games/uo"),
                version: ClientVersion::new(7, 0, 15, 1),
            })
        );
    }

    #[test]
    fn test_empty_version_is_baseline() {
        let mut p = prompt("  /games/uo  \n\n");
        let PromptOutcome::Selected(candidate) = p.select_install() else {
            panic!("expected a selection");
        };
        assert_eq!(candidate.directory, PathBuf::from("/games/uo"));
        assert_eq!(candidate.version, ClientVersion::BASELINE);
    }

    #[test]
    fn test_empty_directory_or_eof_cancels() {
        assert_eq!(prompt("\n").select_install(), PromptOutcome::Cancelled);
        assert_eq!(prompt("").select_install(), PromptOutcome::Cancelled);
        assert_eq!(prompt("/games/uo\n").select_install(), PromptOutcome::Cancelled);
    }

    #[test]
    fn test_invalid_version_asks_again() {
        let mut p = prompt("/games/uo\nseven\n6.0.1\n");
        let PromptOutcome::Selected(candidate) = p.select_install() else {
            panic!("expected a selection");
        };
        assert_eq!(candidate.version, ClientVersion::new(6, 0, 1, 0));

        let output = String::from_utf8(p.into_output()).unwrap();
        assert_eq!(output.matches("Client version").count(), 2);
    }

    #[test]
    fn test_repeated_invalid_versions_cancel() {
        let mut p = prompt("/games/uo\na\nb\nc\n7.0.0.0\n");
        assert_eq!(p.select_install(), PromptOutcome::Cancelled);
    }
}

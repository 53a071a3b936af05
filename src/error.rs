//! Error types for tally.
//!
//! A failed check is never an error: it is a recorded outcome. [`TallyError`]
//! covers the remaining ways things can go wrong: misuse of the aggregator
//! lifecycle, I/O on the report stream, and configuration loading.

use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// TallyError
// ---------------------------------------------------------------------------

/// Unified error type for tally operations.
#[derive(Debug)]
pub enum TallyError {
    /// A check was recorded after the summary was already printed.
    Finalized,

    /// The summary was requested a second time.
    AlreadyFinished,

    /// A configuration file could not be loaded or parsed.
    Config {
        /// Path to the configuration file (empty when parsed from a string).
        path: PathBuf,
        /// Human-readable description of the problem.
        detail: String,
    },

    /// Writing to the report stream failed.
    Io(std::io::Error),
}

impl fmt::Display for TallyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finalized => write!(
                f,
                "check recorded after the test summary was printed.\n  To fix: run all checks before calling tally::finish() or dropping the guard from tally::init()."
            ),
            Self::AlreadyFinished => write!(
                f,
                "the test summary was already printed.\n  To fix: call tally::finish() exactly once, or rely on the guard from tally::init()."
            ),
            Self::Config { path, detail } => {
                if path.as_os_str().is_empty() {
                    write!(f, "configuration error: {detail}")
                } else {
                    write!(
                        f,
                        "configuration error in '{}': {detail}\n  To fix: edit the config file and correct the issue.",
                        path.display()
                    )
                }
            }
            Self::Io(err) => write!(f, "could not write check report: {err}"),
        }
    }
}

impl std::error::Error for TallyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// From impls
// ---------------------------------------------------------------------------

impl From<std::io::Error> for TallyError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<crate::config::ConfigError> for TallyError {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::Config {
            detail: err.detail(),
            path: err.path.unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

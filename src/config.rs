//! Tally configuration (`tally.toml`).
//!
//! Only controls what gets printed and how the demonstration program exits.
//! The line formats and the comparison tolerance are fixed.
//!
//! ```toml
//! [report]
//! show_passes = true
//! instance_counts = true
//! exit_on_failure = false
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::aggregator::ReportOptions;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "tally.toml";

/// Environment variable overriding the configuration path.
pub const CONFIG_ENV: &str = "TALLY_CONFIG";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level configuration. Missing file → all defaults (no error).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TallyConfig {
    /// Report output settings.
    #[serde(default)]
    pub report: ReportConfig,
}

// ---------------------------------------------------------------------------
// ReportConfig
// ---------------------------------------------------------------------------

/// Report output settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// Print a line for every passing check (default: `true`).
    #[serde(default = "default_true")]
    pub show_passes: bool,

    /// Print instance-counter reports at teardown (default: `true`).
    #[serde(default = "default_true")]
    pub instance_counts: bool,

    /// Exit non-zero from the `tally` binary when any check failed
    /// (default: `false`).
    #[serde(default)]
    pub exit_on_failure: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            show_passes: true,
            instance_counts: true,
            exit_on_failure: false,
        }
    }
}

const fn default_true() -> bool {
    true
}

impl ReportConfig {
    /// The runtime options handed to an aggregator.
    #[must_use]
    pub const fn options(&self) -> ReportOptions {
        ReportOptions {
            show_passes: self.show_passes,
            instance_counts: self.instance_counts,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Why a `tally.toml` could not be used.
#[derive(Debug)]
pub struct ConfigError {
    /// File being read; `None` when parsing a bare string.
    pub path: Option<PathBuf>,
    /// 1-based line of the offending TOML, when the parser reports one.
    pub line: Option<usize>,
    /// What was wrong with it.
    pub message: String,
}

impl ConfigError {
    /// The message, prefixed with its line when known.
    #[must_use]
    pub fn detail(&self) -> String {
        match self.line {
            Some(line) => format!("line {line}: {}", self.message),
            None => self.message.clone(),
        }
    }

    fn in_file(self, path: &Path) -> Self {
        Self {
            path: Some(path.to_owned()),
            ..self
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {}", path.display(), self.detail()),
            None => write!(f, "invalid tally config: {}", self.detail()),
        }
    }
}

impl std::error::Error for ConfigError {}

impl TallyConfig {
    /// Read report settings from `path`. A file that does not exist yields
    /// the defaults.
    ///
    /// # Errors
    /// The file exists but cannot be read, is not TOML, or names a setting
    /// tally does not know.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no tally config, report defaults apply");
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(ConfigError {
                    path: Some(path.to_owned()),
                    line: None,
                    message: format!("unreadable: {err}"),
                });
            }
        };
        let config = Self::parse(&text).map_err(|err| err.in_file(path))?;
        tracing::debug!(
            path = %path.display(),
            show_passes = config.report.show_passes,
            instance_counts = config.report.instance_counts,
            "tally config loaded"
        );
        Ok(config)
    }

    /// Resolve the config file and [`load`](Self::load) it: an explicit
    /// `path` first, then `$TALLY_CONFIG`, then `./tally.toml`.
    ///
    /// # Errors
    /// As for [`load`](Self::load).
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = match path {
            Some(p) => p.to_owned(),
            None => std::env::var_os(CONFIG_ENV)
                .filter(|v| !v.is_empty())
                .map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from),
        };
        Self::load(&resolved)
    }

    /// Parse report settings from TOML text.
    ///
    /// # Errors
    /// Malformed TOML, a value of the wrong type, or an unknown setting.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|err| ConfigError {
            path: None,
            line: err.span().map(|span| line_of(text, span.start)),
            message: err.message().to_owned(),
        })
    }
}

fn line_of(text: &str, offset: usize) -> usize {
    let before = &text.as_bytes()[..offset.min(text.len())];
    before.iter().filter(|&&b| b == b'\n').count() + 1
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
